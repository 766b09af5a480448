//! Common dataset fixtures for cube tests.
//!
//! Fixtures are built directly on the `cube-common` model so verifier
//! tests do not depend on the generator.

use serde_json::json;

use cube_common::{
    ArrayValues, Attributes, DataType, Dataset, DatasetAccess, Variable,
};

/// Every global attribute the convention asks for.
pub const GLOBAL_ATTR_NAMES: [&str; 18] = [
    "Conventions",
    "title",
    "summary",
    "sources",
    "history",
    "keywords",
    "id",
    "time_coverage_start",
    "time_coverage_end",
    "time_coverage_resolution",
    "geospatial_lon_min",
    "geospatial_lon_max",
    "geospatial_lon_resolution",
    "geospatial_lon_units",
    "geospatial_lat_min",
    "geospatial_lat_max",
    "geospatial_lat_resolution",
    "geospatial_lat_units",
];

/// Global attributes with every expected name present.
pub fn full_global_attrs() -> Attributes {
    GLOBAL_ATTR_NAMES
        .iter()
        .map(|name| (name.to_string(), json!(format!("test {}", name))))
        .collect()
}

/// A 1-D coordinate variable with CF attributes.
pub fn coord(name: &str, standard_name: &str, units: &str, values: &[f64]) -> Variable {
    Variable::coordinate(name, DataType::Float64, values.to_vec())
        .with_attr("long_name", standard_name)
        .with_attr("standard_name", standard_name)
        .with_attr("units", units)
}

/// An integer-valued time coordinate in seconds since 1970.
pub fn time_coord(values: &[i64]) -> Variable {
    Variable::new(
        "time",
        vec!["time".to_string()],
        vec![values.len()],
        DataType::Int64,
        ArrayValues::Int(values.to_vec()),
    )
    .expect("valid time coordinate")
    .with_attr("long_name", "time")
    .with_attr("standard_name", "time")
    .with_attr("units", "seconds since 1970-01-01T00:00:00")
    .with_attr("calendar", "proleptic_gregorian")
}

/// A zero-filled data variable.
pub fn data_var(name: &str, dims: &[(&str, usize)]) -> Variable {
    Variable::new(
        name,
        dims.iter().map(|(d, _)| d.to_string()).collect(),
        dims.iter().map(|(_, n)| *n).collect(),
        DataType::Float32,
        ArrayValues::Fill,
    )
    .expect("valid data variable")
}

/// Editable list of variables and attributes that builds into a dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetFixture {
    pub variables: Vec<Variable>,
    pub attrs: Attributes,
}

impl DatasetFixture {
    /// A fully compliant lon/lat cube: 4 x 3 cells, 4 daily time steps
    /// and one data variable `chl`.
    pub fn lonlat() -> Self {
        Self {
            variables: vec![
                coord("lon", "longitude", "degrees_east", &[-135.0, -45.0, 45.0, 135.0]),
                coord("lat", "latitude", "degrees_north", &[-60.0, 0.0, 60.0]),
                time_coord(&[0, 86_400, 172_800, 259_200]),
                data_var("chl", &[("time", 4), ("lat", 3), ("lon", 4)]),
            ],
            attrs: full_global_attrs(),
        }
    }

    /// A fully compliant projected x/y cube with a UTM 33N `crs` variable.
    pub fn projected() -> Self {
        let crs = cube_common::Crs::parse("EPSG:32633").expect("supported CRS");
        Self {
            variables: vec![
                coord(
                    "x",
                    "projection_x_coordinate",
                    "m",
                    &[500_005.0, 500_015.0, 500_025.0],
                ),
                coord(
                    "y",
                    "projection_y_coordinate",
                    "m",
                    &[5_700_015.0, 5_700_005.0],
                ),
                time_coord(&[0, 3_600]),
                data_var("chl", &[("time", 2), ("y", 2), ("x", 3)])
                    .with_attr("grid_mapping", "crs"),
                Variable::scalar("crs", DataType::Int32, 0)
                    .with_attrs(crs.to_cf())
                    .with_attr("long_name", "coordinate reference system"),
            ],
            attrs: full_global_attrs(),
        }
    }

    /// Drop a variable by name.
    pub fn without(mut self, name: &str) -> Self {
        self.variables.retain(|v| v.name != name);
        self
    }

    /// Add a variable, replacing any variable of the same name in place.
    pub fn with(mut self, variable: Variable) -> Self {
        match self.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(slot) => *slot = variable,
            None => self.variables.push(variable),
        }
        self
    }

    /// Remove global attributes by name.
    pub fn without_attrs(mut self, names: &[&str]) -> Self {
        for name in names {
            self.attrs.remove(*name);
        }
        self
    }

    /// Remove an attribute from one variable.
    pub fn without_var_attr(mut self, var: &str, attr: &str) -> Self {
        if let Some(v) = self.variables.iter_mut().find(|v| v.name == var) {
            v.attrs.remove(attr);
        }
        self
    }

    pub fn build(self) -> Dataset {
        Dataset::builder()
            .variables(self.variables)
            .attrs(self.attrs)
            .build()
            .expect("fixture dataset must be consistent")
    }
}

/// Names of all variables, in dataset order.
pub fn variable_names(ds: &dyn DatasetAccess) -> Vec<String> {
    ds.variables().map(|v| v.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_build() {
        let ds = DatasetFixture::lonlat().build();
        assert_eq!(ds.dimension("lon"), Some(4));
        assert_eq!(ds.global_attributes().len(), GLOBAL_ATTR_NAMES.len());

        let ds = DatasetFixture::projected().without("crs").build();
        assert_eq!(variable_names(&ds), vec!["x", "y", "time", "chl"]);
    }

    #[test]
    fn test_with_replaces_in_place() {
        let fixture = DatasetFixture::lonlat().with(time_coord(&[0, 2, 1, 3]));
        assert_eq!(fixture.variables[2].name, "time");
        assert_eq!(fixture.variables.len(), 4);
    }
}
