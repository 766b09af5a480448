//! Composes axes, data variables and metadata into a [`Dataset`].

use serde_json::json;
use tracing::{debug, info};

use cube_common::{
    ArrayValues, Attributes, BoundingBox, ChunkHint, Crs, CubeResult, DataType, Dataset,
    Variable,
};

use crate::axis::{AxisRole, GridAxisBuilder};
use crate::config::{CubeConfig, ResolvedCube};
use crate::georef::GeoReferencer;
use crate::temporal::TemporalAxisBuilder;

/// Name of the grid-mapping variable.
pub const CRS_VAR_NAME: &str = "crs";

/// Library default global attributes.
pub fn default_metadata() -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("Conventions".into(), json!("CF-1.7"));
    attrs.insert("title".into(), json!("Data cube template"));
    attrs.insert(
        "summary".into(),
        json!("This dataset demonstrates the common data cube convention"),
    );
    attrs.insert("keywords".into(), json!("data cube, CF, EO"));
    attrs
}

/// Merge caller metadata over `defaults`. Caller values always win.
pub fn merge_metadata(defaults: &Attributes, overrides: &Attributes) -> Attributes {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Builds one dataset from a resolved configuration.
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    cube: ResolvedCube,
}

impl DatasetAssembler {
    /// Resolve `config`. Invalid options and CRS identifiers fail here.
    pub fn new(config: &CubeConfig) -> CubeResult<Self> {
        Ok(Self {
            cube: config.resolve()?,
        })
    }

    pub fn from_resolved(cube: ResolvedCube) -> Self {
        Self { cube }
    }

    pub fn assemble(&self) -> CubeResult<Dataset> {
        let cube = &self.cube;
        let with_bounds = !cube.drop_bounds;

        let x_axis = GridAxisBuilder::new(
            cube.x_name.clone(),
            AxisRole::X,
            cube.x_start,
            cube.x_res,
            cube.width,
        )
        .units(cube.x_units.clone())
        .dtype(cube.xy_dtype)
        .bounds(with_bounds)
        .build()?;

        let y_axis = GridAxisBuilder::new(
            cube.y_name.clone(),
            AxisRole::Y,
            cube.y_start,
            cube.y_res,
            cube.height,
        )
        .units(cube.y_units.clone())
        .dtype(cube.xy_dtype)
        .inverse(cube.inverse_y)
        .bounds(with_bounds)
        .build()?;

        let time_axis = TemporalAxisBuilder::new(
            cube.time_name.clone(),
            cube.time_start,
            cube.time_step,
            cube.time_periods,
            cube.time_representation,
        )
        .calendar(cube.time_calendar)
        .units(cube.time_units)
        .bounds(with_bounds)
        .build()?;

        let mut variables = vec![
            x_axis.coordinate_variable(),
            y_axis.coordinate_variable(),
            time_axis.coordinate_variable()?,
        ];
        for bounds in [
            x_axis.bounds_variable()?,
            y_axis.bounds_variable()?,
            time_axis.bounds_variable()?,
        ]
        .into_iter()
        .flatten()
        {
            variables.push(bounds);
        }

        let dims = vec![
            cube.time_name.clone(),
            cube.y_name.clone(),
            cube.x_name.clone(),
        ];
        let shape = vec![cube.time_periods, cube.height, cube.width];
        for spec in &cube.variables {
            let mut var = Variable::new(
                spec.name.clone(),
                dims.clone(),
                shape.clone(),
                spec.dtype,
                ArrayValues::Fill,
            )?
            .with_attrs(spec.attrs.clone());
            if cube.crs.is_some() {
                var.attrs.insert("grid_mapping".into(), json!(CRS_VAR_NAME));
            }
            variables.push(var);
        }

        if let Some(crs) = &cube.crs {
            variables.push(
                Variable::scalar(CRS_VAR_NAME, DataType::Int32, 0)
                    .with_attrs(crs.to_cf())
                    .with_attr("long_name", "coordinate reference system"),
            );
        }

        let bbox = BoundingBox::from_grid(
            (cube.x_start, cube.y_start),
            (cube.x_res, cube.y_res),
            (cube.width, cube.height),
        );
        let georef = GeoReferencer::new(cube.crs.clone().unwrap_or_else(Crs::crs84));

        let mut attrs = merge_metadata(&default_metadata(), &cube.metadata);
        attrs.extend(georef.geospatial_attrs(&bbox, (cube.x_res, cube.y_res))?);
        attrs.extend(time_axis.coverage_attrs()?);

        let (x_chunk, y_chunk) = match cube.tile_size {
            Some((tx, ty)) => (ChunkHint::Size(tx), ChunkHint::Size(ty)),
            None => (ChunkHint::Auto, ChunkHint::Auto),
        };

        debug!(
            x = %cube.x_name,
            y = %cube.y_name,
            width = cube.width,
            height = cube.height,
            crs = ?cube.crs.as_ref().map(|c| c.to_string()),
            "Assembling dataset"
        );

        let dataset = Dataset::builder()
            .variables(variables)
            .attrs(attrs)
            .chunk(cube.x_name.clone(), x_chunk)
            .chunk(cube.y_name.clone(), y_chunk)
            .chunk(cube.time_name.clone(), ChunkHint::Auto)
            .build()?;

        info!(
            variables = cube.variables.len(),
            periods = cube.time_periods,
            "Assembled dataset"
        );
        Ok(dataset)
    }
}

/// Create a new dataset from `config`.
pub fn new_dataset(config: &CubeConfig) -> CubeResult<Dataset> {
    DatasetAssembler::new(config)?.assemble()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataVariableSpec, Pair};
    use cube_common::DatasetAccess;

    fn small_config() -> CubeConfig {
        CubeConfig {
            xy_size: Pair::xy(36, 18),
            xy_res: Pair::both(10.0),
            variables: vec![DataVariableSpec::new("sst", DataType::Float32)
                .with_attr("units", "K")],
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_metadata_caller_wins() {
        let mut overrides = Attributes::new();
        overrides.insert("title".into(), json!("Mine"));
        overrides.insert("id".into(), json!("abc"));
        let merged = merge_metadata(&default_metadata(), &overrides);
        assert_eq!(merged["title"], "Mine");
        assert_eq!(merged["id"], "abc");
        assert_eq!(merged["Conventions"], "CF-1.7");
    }

    #[test]
    fn test_assemble_geographic() {
        let ds = new_dataset(&small_config()).unwrap();
        assert_eq!(ds.dimension("lon"), Some(36));
        assert_eq!(ds.dimension("lat"), Some(18));
        assert_eq!(ds.dimension("time"), Some(5));
        assert_eq!(ds.dimension("bnds"), Some(2));

        let sst = ds.variable("sst").unwrap();
        assert_eq!(sst.dims, vec!["time", "lat", "lon"]);
        assert_eq!(sst.values, ArrayValues::Fill);
        assert!(!sst.attrs.contains_key("grid_mapping"));
        assert!(!ds.contains("crs"));

        for name in ["lon_bnds", "lat_bnds", "time_bnds"] {
            assert!(ds.contains(name), "missing {}", name);
        }
        assert_eq!(ds.chunk_hint("lon"), ChunkHint::Auto);
    }

    #[test]
    fn test_assemble_with_crs_and_tiles() {
        let config = CubeConfig {
            xy_names: ("x".into(), "y".into()),
            xy_units: Pair::both("meters".to_string()),
            xy_start: (500_000.0, 5_700_000.0),
            xy_tile_size: Some(Pair::both(8)),
            crs: Some("EPSG:32633".into()),
            drop_bounds: true,
            ..small_config()
        };
        let ds = new_dataset(&config).unwrap();

        let crs = ds.variable("crs").unwrap();
        assert_eq!(crs.ndim(), 0);
        assert_eq!(crs.attr_str("grid_mapping_name"), Some("transverse_mercator"));
        assert_eq!(ds.variable("sst").unwrap().attr_str("grid_mapping"), Some("crs"));
        assert!(!ds.contains("x_bnds"));
        assert!(!ds.contains("time_bnds"));
        assert_eq!(ds.chunk_hint("x"), ChunkHint::Size(8));
        assert_eq!(ds.chunk_hint("time"), ChunkHint::Auto);

        let attrs = ds.global_attributes();
        let lon_min = attrs["geospatial_lon_min"].as_f64().unwrap();
        assert!((lon_min - 15.0).abs() < 1.0);
    }

    #[test]
    fn test_bad_crs_fails_before_geometry() {
        let config = CubeConfig {
            crs: Some("+proj=lcc".into()),
            ..small_config()
        };
        assert!(DatasetAssembler::new(&config).is_err());
    }
}
