//! Sample datasets written by `cubekit new`.

use anyhow::Result;

use cube_common::{Crs, DataType};
use cube_generator::{from_crs84, CubeConfig, DataVariableSpec, Pair};

/// A float quantity and a flag variable.
pub fn sample_variables() -> Vec<DataVariableSpec> {
    vec![
        DataVariableSpec::new("var_a", DataType::Float32)
            .with_attr("long_name", "Variable A")
            .with_attr("units", "mg/kg")
            .with_attr("color_bar_name", "bone")
            .with_attr("color_value_min", 0.0)
            .with_attr("color_value_max", 0.75),
        DataVariableSpec::new("var_b", DataType::UInt16)
            .with_attr("long_name", "Variable B")
            .with_attr(
                "flag_meanings",
                "quality_good sensor_nonfunctional outside_valid_range",
            )
            .with_attr("flag_values", "1, 2, 3")
            .with_attr("color_bar_name", "tab10")
            .with_attr("color_value_min", 0)
            .with_attr("color_value_max", 10),
    ]
}

/// Global 0.05 degree lon/lat grid in 720 cell tiles.
pub fn global() -> CubeConfig {
    CubeConfig {
        xy_size: Pair::xy(7200, 3600),
        xy_tile_size: Some(Pair::both(720)),
        xy_res: Pair::both(360.0 / 7200.0),
        variables: sample_variables(),
        ..Default::default()
    }
}

/// 2048 x 2048 UTM zone 33N grid whose lower left corner is at 10E 52N.
pub fn utm_33n() -> Result<CubeConfig> {
    let crs = Crs::parse("EPSG:32633")?;
    Ok(CubeConfig {
        xy_size: Pair::both(2048),
        xy_tile_size: Some(Pair::both(512)),
        xy_start: from_crs84((10.0, 52.0), &crs)?,
        xy_names: ("x".into(), "y".into()),
        xy_units: Pair::both("meters".to_string()),
        crs: Some(crs.to_string()),
        variables: sample_variables(),
        ..Default::default()
    })
}

/// The sample datasets with their store names.
pub fn all() -> Result<Vec<(&'static str, CubeConfig)>> {
    Ok(vec![
        ("dataset_global.zarr", global()),
        ("dataset_utm33n.zarr", utm_33n()?),
    ])
}
