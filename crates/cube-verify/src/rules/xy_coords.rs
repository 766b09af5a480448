use cube_common::{CubeError, Crs, DatasetAccess};
use tracing::debug;

use super::{
    check_mono_inc, check_mono_inc_or_dec, check_variable, dims_tuple, quoted, Rule,
};
use crate::issue::Issue;

const CRS_VAR: &str = "crs";
const PLANAR_YX: [&str; 2] = ["y", "x"];
const GEOGRAPHIC_YX: [&str; 2] = ["lat", "lon"];

/// Checks the spatial coordinates, the CRS marker and that the spatial
/// dimensions trail every variable that uses them.
///
/// Two conventions are recognised: planar `x`/`y` with a `crs` variable,
/// and geographic `lon`/`lat` (1-D, or 2-D over `y`/`x`). When both are
/// present, `lon`/`lat` decides the expected dimension pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct XyCoordsRule;

impl Rule for XyCoordsRule {
    fn name(&self) -> &'static str {
        "xy_coords"
    }

    fn evaluate(&self, ds: &dyn DatasetAccess) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut yx_dims: Option<[&str; 2]> = None;

        if let (Some(x), Some(y)) = (ds.variable("x"), ds.variable("y")) {
            issues.extend(check_variable(ds, "x"));
            issues.extend(check_variable(ds, "y"));
            if x.ndim() == 1 && y.ndim() == 1 {
                yx_dims = Some(PLANAR_YX);
                issues.extend(check_mono_inc(x));
                issues.extend(check_mono_inc_or_dec(y));
                issues.extend(check_crs(ds));
            } else {
                issues.push(Issue::error(
                    "coordinate variables 'x' and 'y' must both be 1-D",
                ));
            }
        }

        if let (Some(lon), Some(lat)) = (ds.variable("lon"), ds.variable("lat")) {
            issues.extend(check_variable(ds, "lon"));
            issues.extend(check_variable(ds, "lat"));
            match (lon.ndim(), lat.ndim()) {
                (1, 1) => {
                    yx_dims = Some(GEOGRAPHIC_YX);
                    issues.extend(check_mono_inc(lon));
                    issues.extend(check_mono_inc_or_dec(lat));
                }
                (2, 2) => {
                    for var in [lon, lat] {
                        if var.dims != PLANAR_YX {
                            issues.push(Issue::error(format!(
                                "dimensions of {} must be {}",
                                quoted(&var.name),
                                dims_tuple(&PLANAR_YX)
                            )));
                        }
                    }
                    yx_dims = Some(PLANAR_YX);
                }
                _ => issues.push(Issue::error(
                    "coordinate variables 'lon' and 'lat' must both be either 1-D or 2-D",
                )),
            }
        }

        let Some(yx_dims) = yx_dims else {
            issues.push(Issue::error("no valid spatial coordinates found"));
            return issues;
        };
        debug!(y = yx_dims[0], x = yx_dims[1], "Resolved spatial dimensions");

        let [y_dim, x_dim] = yx_dims;
        for var in ds.variables() {
            if var.has_dim(y_dim) && var.has_dim(x_dim) {
                let tail = &var.dims[var.dims.len().saturating_sub(2)..];
                if tail != &yx_dims[..] {
                    issues.push(Issue::error(format!(
                        "last two dimensions of variable {} must be {}, but dimensions are {}",
                        quoted(&var.name),
                        dims_tuple(&yx_dims),
                        dims_tuple(&var.dims)
                    )));
                }
            }
        }
        issues
    }
}

/// Validate the `crs` variable when it exists or a variable points at it
/// through `grid_mapping`.
fn check_crs(ds: &dyn DatasetAccess) -> Vec<Issue> {
    let referenced = ds
        .variables()
        .any(|v| v.attr_str("grid_mapping") == Some(CRS_VAR));
    if !referenced && !ds.contains(CRS_VAR) {
        return Vec::new();
    }

    let mut issues = check_variable(ds, CRS_VAR);
    if let Some(attrs) = ds.attributes(CRS_VAR) {
        if let Err(e) = Crs::from_cf(attrs) {
            let reason = match e {
                CubeError::InvalidCrs(reason) => reason,
                other => other.to_string(),
            };
            issues.push(Issue::error(format!(
                "invalid {} variable: {}",
                quoted(CRS_VAR),
                reason
            )));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_common::{ArrayValues, DataType, Variable};
    use test_utils::{assert_issues, coord, data_var, DatasetFixture};

    fn grid_2d(name: &str, dims: [&str; 2]) -> Variable {
        Variable::new(
            name,
            dims.iter().map(|d| d.to_string()).collect(),
            vec![2, 2],
            DataType::Float64,
            ArrayValues::Float(vec![0.0; 4]),
        )
        .unwrap()
        .with_attr("long_name", name)
        .with_attr("standard_name", name)
        .with_attr("units", "degrees")
    }

    #[test]
    fn test_lonlat_compliant() {
        let ds = DatasetFixture::lonlat().build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());
    }

    #[test]
    fn test_projected_compliant() {
        let ds = DatasetFixture::projected().build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());
    }

    #[test]
    fn test_no_spatial_coordinates() {
        let ds = DatasetFixture::lonlat()
            .without("lon")
            .without("lat")
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [("ERROR", "no valid spatial coordinates found")]
        );
    }

    #[test]
    fn test_wrong_dimension_order() {
        let ds = DatasetFixture::projected()
            .with(
                data_var("chl", &[("x", 3), ("y", 2), ("time", 2)])
                    .with_attr("grid_mapping", "crs"),
            )
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [(
                "ERROR",
                "last two dimensions of variable 'chl' must be ('y', 'x'), but dimensions are ('x', 'y', 'time')"
            )]
        );
    }

    #[test]
    fn test_lat_may_decrease_lon_may_not() {
        let ds = DatasetFixture::lonlat()
            .with(coord("lat", "latitude", "degrees_north", &[60.0, 0.0, -60.0]))
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());

        let ds = DatasetFixture::lonlat()
            .with(coord("lon", "longitude", "degrees_east", &[135.0, 45.0, -45.0, -135.0]))
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [("ERROR", "values of variable 'lon' must be strictly monotonically increasing")]
        );
    }

    #[test]
    fn test_missing_referenced_crs() {
        let ds = DatasetFixture::projected().without("crs").build();
        assert_issues!(XyCoordsRule.evaluate(&ds), [("ERROR", "missing variable 'crs'")]);
    }

    #[test]
    fn test_unreferenced_crs_is_optional() {
        let ds = DatasetFixture::projected()
            .without("crs")
            .without_var_attr("chl", "grid_mapping")
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());
    }

    #[test]
    fn test_invalid_crs() {
        let ds = DatasetFixture::projected()
            .with(
                Variable::scalar("crs", DataType::Int32, 0)
                    .with_attr("long_name", "coordinate reference system"),
            )
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [("ERROR", "invalid 'crs' variable: no CF grid mapping attributes found")]
        );
    }

    fn crs_var() -> Variable {
        Variable::scalar("crs", DataType::Int32, 0)
            .with_attr("long_name", "coordinate reference system")
    }

    #[test]
    fn test_laea_grid_mapping_without_wkt() {
        let ds = DatasetFixture::projected()
            .with(
                crs_var()
                    .with_attr("grid_mapping_name", "lambert_azimuthal_equal_area")
                    .with_attr("latitude_of_projection_origin", 52.0)
                    .with_attr("longitude_of_projection_origin", 10.0)
                    .with_attr("false_easting", 4_321_000.0)
                    .with_attr("false_northing", 3_210_000.0),
            )
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());
    }

    #[test]
    fn test_grid_mappings_without_reprojection_are_valid() {
        let ds = DatasetFixture::projected()
            .with(
                crs_var()
                    .with_attr("grid_mapping_name", "rotated_latitude_longitude")
                    .with_attr("grid_north_pole_latitude", 39.25)
                    .with_attr("grid_north_pole_longitude", -162.0),
            )
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());

        let ds = DatasetFixture::projected()
            .with(
                crs_var()
                    .with_attr("grid_mapping_name", "geostationary")
                    .with_attr("latitude_of_projection_origin", 0.0)
                    .with_attr("longitude_of_projection_origin", -75.0)
                    .with_attr("perspective_point_height", 35_786_023.0)
                    .with_attr("sweep_angle_axis", "x"),
            )
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());
    }

    #[test]
    fn test_wkt_without_top_level_id() {
        let wkt = r#"PROJCRS["ETRS89 / LAEA custom",
            BASEGEOGCRS["ETRS89",
                DATUM["European Terrestrial Reference System 1989",
                    ELLIPSOID["GRS 1980",6378137,298.257222101,LENGTHUNIT["metre",1],ID["EPSG",7019]]],
                ID["EPSG",4258]],
            CONVERSION["custom LAEA",
                METHOD["Lambert Azimuthal Equal Area",ID["EPSG",9820]],
                PARAMETER["Latitude of natural origin",48,ANGLEUNIT["degree",0.0174532925199433]],
                PARAMETER["Longitude of natural origin",9,ANGLEUNIT["degree",0.0174532925199433]],
                PARAMETER["False easting",0,LENGTHUNIT["metre",1]],
                PARAMETER["False northing",0,LENGTHUNIT["metre",1]]],
            CS[Cartesian,2],
                AXIS["easting (X)",east,LENGTHUNIT["metre",1]],
                AXIS["northing (Y)",north,LENGTHUNIT["metre",1]]]"#;
        let ds = DatasetFixture::projected()
            .with(crs_var().with_attr("crs_wkt", wkt))
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());
    }

    #[test]
    fn test_grid_mapping_missing_parameter() {
        let ds = DatasetFixture::projected()
            .with(
                crs_var()
                    .with_attr("grid_mapping_name", "lambert_conformal_conic")
                    .with_attr("standard_parallel", 25.0)
                    .with_attr("latitude_of_projection_origin", 25.0),
            )
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [(
                "ERROR",
                "invalid 'crs' variable: missing attribute 'longitude_of_central_meridian' for grid mapping 'lambert_conformal_conic'"
            )]
        );
    }

    #[test]
    fn test_unknown_grid_mapping_name() {
        let ds = DatasetFixture::projected()
            .with(crs_var().with_attr("grid_mapping_name", "web_mercator"))
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [("ERROR", "invalid 'crs' variable: unknown grid_mapping_name 'web_mercator'")]
        );
    }

    #[test]
    fn test_xy_not_1d() {
        let ds = DatasetFixture::default()
            .with(grid_2d("x", ["y", "x"]))
            .with(coord("y", "projection_y_coordinate", "m", &[1.0, 0.0]))
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [
                ("ERROR", "coordinate variables 'x' and 'y' must both be 1-D"),
                ("ERROR", "no valid spatial coordinates found"),
            ]
        );
    }

    #[test]
    fn test_lonlat_2d() {
        let ds = DatasetFixture::default()
            .with(grid_2d("lon", ["y", "x"]))
            .with(grid_2d("lat", ["y", "x"]))
            .with(data_var("chl", &[("time", 1), ("y", 2), ("x", 2)]))
            .build();
        assert!(XyCoordsRule.evaluate(&ds).is_empty());

        let ds = DatasetFixture::default()
            .with(grid_2d("lon", ["y", "x"]))
            .with(grid_2d("lat", ["x", "y"]))
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [
                ("ERROR", "dimensions of 'lat' must be ('y', 'x')"),
                (
                    "ERROR",
                    "last two dimensions of variable 'lat' must be ('y', 'x'), but dimensions are ('x', 'y')"
                ),
            ]
        );
    }

    #[test]
    fn test_lonlat_mixed_rank() {
        let ds = DatasetFixture::default()
            .with(grid_2d("lon", ["y", "x"]))
            .with(coord("lat", "latitude", "degrees_north", &[0.0, 1.0]))
            .build();
        assert_issues!(
            XyCoordsRule.evaluate(&ds),
            [
                ("ERROR", "coordinate variables 'lon' and 'lat' must both be either 1-D or 2-D"),
                ("ERROR", "no valid spatial coordinates found"),
            ]
        );
    }
}
