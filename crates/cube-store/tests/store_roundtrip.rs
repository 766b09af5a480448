//! Write datasets to a filesystem store and read them back.

use cube_common::{ArrayValues, ChunkHint, Crs, DataType, DatasetAccess};
use cube_generator::{from_crs84, new_dataset, CubeConfig, DataVariableSpec, Pair};
use cube_store::{open_dataset, StoreConfig, ZarrCompression, ZarrDatasetWriter};
use cube_verify::{verify_dataset, Level};
use test_utils::{assert_issues, DatasetFixture, TempStore};

fn small_config() -> CubeConfig {
    CubeConfig {
        xy_size: Pair::xy(36, 18),
        xy_res: Pair::both(10.0),
        xy_tile_size: Some(Pair::both(12)),
        variables: vec![
            DataVariableSpec::new("var_a", DataType::Float32).with_attr("units", "mg/kg"),
            DataVariableSpec::new("var_b", DataType::UInt16)
                .with_attr("flag_values", "1, 2, 3"),
        ],
        ..Default::default()
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_generated_dataset_round_trip() {
    let tmp = TempStore::new();
    let path = tmp.path("cube.zarr");
    let ds = new_dataset(&small_config()).unwrap();

    let summary = ZarrDatasetWriter::default().write_to_path(&ds, &path).unwrap();
    assert_eq!(summary.arrays, ds.variables().count());

    let reopened = open_dataset(&path).unwrap();
    assert_eq!(reopened.dims(), ds.dims());
    assert_eq!(reopened.global_attributes(), ds.global_attributes());

    for name in ["lon", "lat", "time", "lon_bnds"] {
        let original = ds.variable(name).unwrap();
        let read = reopened.variable(name).unwrap();
        assert_eq!(read.dims, original.dims, "{}", name);
        assert_eq!(read.dtype, original.dtype, "{}", name);
        assert_eq!(read.attrs, original.attrs, "{}", name);
    }
    assert_eq!(
        reopened.variable("lon").unwrap().values,
        ds.variable("lon").unwrap().values
    );
    assert_eq!(
        reopened.variable("time").unwrap().values,
        ds.variable("time").unwrap().values
    );

    // Multi-dimensional arrays come back unloaded.
    assert_eq!(reopened.variable("var_a").unwrap().values, ArrayValues::Fill);
    assert_eq!(reopened.chunk_hint("lon"), ChunkHint::Size(12));
}

#[test]
fn test_reopened_dataset_verifies() {
    let tmp = TempStore::new();
    let path = tmp.path("cube.zarr");
    let ds = new_dataset(&small_config()).unwrap();
    ZarrDatasetWriter::default().write_to_path(&ds, &path).unwrap();

    let reopened = open_dataset(&path).unwrap();
    assert_issues!(
        verify_dataset(&reopened, Level::Warning),
        [
            ("WARNING", "missing global attribute 'sources'"),
            ("WARNING", "missing global attribute 'history'"),
            ("WARNING", "missing global attribute 'id'"),
        ]
    );
}

#[test]
fn test_projected_round_trip_keeps_crs() {
    let crs = Crs::parse("EPSG:32633").unwrap();
    let config = CubeConfig {
        xy_names: ("x".into(), "y".into()),
        xy_units: Pair::both("meters".to_string()),
        xy_start: from_crs84((10.0, 52.0), &crs).unwrap(),
        crs: Some("EPSG:32633".into()),
        ..small_config()
    };
    let tmp = TempStore::new();
    let path = tmp.path("utm.zarr");
    let ds = new_dataset(&config).unwrap();
    let writer = ZarrDatasetWriter::new(StoreConfig {
        compression: ZarrCompression::None,
        ..Default::default()
    });
    writer.write_to_path(&ds, &path).unwrap();

    let reopened = open_dataset(&path).unwrap();
    let crs_var = reopened.variable("crs").unwrap();
    assert_eq!(crs_var.ndim(), 0);
    assert_eq!(crs_var.dtype, DataType::Int32);
    assert_eq!(Crs::from_cf(&crs_var.attrs).unwrap(), crs);
    assert!(verify_dataset(&reopened, Level::Error).is_empty());
}

#[test]
fn test_fixture_with_bad_time_fails_after_round_trip() {
    let tmp = TempStore::new();
    let path = tmp.path("bad.zarr");
    let ds = DatasetFixture::lonlat()
        .with(test_utils::time_coord(&[0, 2, 1, 3]))
        .build();
    ZarrDatasetWriter::default().write_to_path(&ds, &path).unwrap();

    let reopened = open_dataset(&path).unwrap();
    assert_issues!(
        verify_dataset(&reopened, Level::Error),
        [("ERROR", "values of variable 'time' must be strictly monotonically increasing")]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_open_missing_path() {
    let tmp = TempStore::new();
    assert!(open_dataset(tmp.path("missing.zarr")).is_err());
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = TempStore::new();
    let ds = DatasetFixture::lonlat().build();
    let writer = ZarrDatasetWriter::new(StoreConfig {
        default_chunk_size: 0,
        ..Default::default()
    });
    assert!(writer.write_to_path(&ds, tmp.path("x.zarr")).is_err());
}
