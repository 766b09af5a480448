//! CRS definitions from identifiers, WKT and CF attributes.

use cube_common::{Attributes, Crs, CrsId, GridMappingName};
use serde_json::{json, Value};

fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}

// ============================================================================
// EPSG codes
// ============================================================================

#[test]
fn test_projected_epsg_codes() {
    let laea = Crs::parse("EPSG:3035").unwrap();
    assert_eq!(laea.name, "ETRS89-extended / LAEA Europe");
    assert_eq!(laea.mapping.name(), GridMappingName::LambertAzimuthalEqualArea);
    let (x, y) = laea.from_crs84(5.0, 50.0).unwrap();
    assert!((x - 3_962_799.45).abs() < 0.01, "easting {}", x);
    assert!((y - 2_999_718.85).abs() < 0.01, "northing {}", y);

    for code in [2154, 3034, 3395, 3413, 3031, 5070, 25832, 26915] {
        let crs = Crs::epsg(code).unwrap();
        assert!(!crs.is_geographic());
        assert!(crs.projection().unwrap().is_some(), "EPSG:{}", code);
    }
}

#[test]
fn test_geographic_epsg_codes_on_other_datums() {
    let etrs89 = Crs::parse("EPSG:4258").unwrap();
    assert!(etrs89.is_geographic());
    assert_eq!(etrs89.datum.ellipsoid_name, "GRS 1980");
    assert_eq!(etrs89.to_crs84(12.0, 55.0).unwrap(), (12.0, 55.0));
    assert_ne!(etrs89, Crs::parse("EPSG:4326").unwrap());
    assert!(Crs::parse("EPSG:4269").unwrap().is_geographic());
}

#[test]
fn test_world_mercator_is_not_web_mercator() {
    let world = Crs::parse("EPSG:3395").unwrap();
    let web = Crs::parse("EPSG:3857").unwrap();
    assert_ne!(world, web);
    // Both write grid_mapping_name "mercator"
    assert_eq!(world.to_cf()["grid_mapping_name"], "mercator");
    assert_eq!(web.to_cf()["grid_mapping_name"], "mercator");

    let (_, y_world) = world.from_crs84(10.0, 52.0).unwrap();
    let (_, y_web) = web.from_crs84(10.0, 52.0).unwrap();
    assert!(y_web - y_world > 30_000.0);
}

// ============================================================================
// WKT
// ============================================================================

const LAEA_EUROPE_WKT1: &str = r#"PROJCS["ETRS89-extended / LAEA Europe",
    GEOGCS["ETRS89",
        DATUM["European_Terrestrial_Reference_System_1989",
            SPHEROID["GRS 1980",6378137,298.257222101,AUTHORITY["EPSG","7019"]],
            TOWGS84[0,0,0,0,0,0,0],
            AUTHORITY["EPSG","6258"]],
        PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],
        UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],
        AUTHORITY["EPSG","4258"]],
    PROJECTION["Lambert_Azimuthal_Equal_Area"],
    PARAMETER["latitude_of_center",52],
    PARAMETER["longitude_of_center",10],
    PARAMETER["false_easting",4321000],
    PARAMETER["false_northing",3210000],
    UNIT["metre",1,AUTHORITY["EPSG","9001"]],
    AXIS["Northing",NORTH],
    AXIS["Easting",EAST],
    AUTHORITY["EPSG","3035"]]"#;

#[test]
fn test_wkt1_with_epsg_authority() {
    let crs = Crs::parse(LAEA_EUROPE_WKT1).unwrap();
    assert_eq!(crs.id, Some(CrsId::Epsg(3035)));
    assert_eq!(crs, Crs::epsg(3035).unwrap());
}

#[test]
fn test_wkt1_without_authority_is_interpreted() {
    let wkt = LAEA_EUROPE_WKT1.replace(r#",
    AUTHORITY["EPSG","3035"]]"#, "]");
    let crs = Crs::parse(&wkt).unwrap();
    assert_eq!(crs.id, None);
    assert_eq!(crs.geographic_name, "ETRS89");
    assert_eq!(crs.mapping.name(), GridMappingName::LambertAzimuthalEqualArea);
    assert_eq!(crs.mapping.number("latitude_of_projection_origin"), Some(52.0));
    assert_eq!(crs.mapping.number("longitude_of_projection_origin"), Some(10.0));
    assert_eq!(crs.mapping.number("false_easting"), Some(4_321_000.0));

    // The nested base CRS authority must not be taken for the projected one
    assert_ne!(crs.id, Some(CrsId::Epsg(4258)));
    let (x, y) = crs.from_crs84(10.0, 52.0).unwrap();
    assert!((x - 4_321_000.0).abs() < 1e-6 && (y - 3_210_000.0).abs() < 1e-6);
}

const UTM_32N_WKT2: &str = r#"PROJCRS["ETRS89 / UTM zone 32N",
    BASEGEOGCRS["ETRS89",
        ENSEMBLE["European Terrestrial Reference System 1989 ensemble",
            MEMBER["European Terrestrial Reference Frame 1989"],
            MEMBER["European Terrestrial Reference Frame 2014"],
            ELLIPSOID["GRS 1980",6378137,298.257222101,
                LENGTHUNIT["metre",1]],
            ENSEMBLEACCURACY[0.1]],
        PRIMEM["Greenwich",0,
            ANGLEUNIT["degree",0.0174532925199433]],
        ID["EPSG",4258]],
    CONVERSION["UTM zone 32N",
        METHOD["Transverse Mercator",
            ID["EPSG",9807]],
        PARAMETER["Latitude of natural origin",0,
            ANGLEUNIT["degree",0.0174532925199433],
            ID["EPSG",8801]],
        PARAMETER["Longitude of natural origin",9,
            ANGLEUNIT["degree",0.0174532925199433],
            ID["EPSG",8802]],
        PARAMETER["Scale factor at natural origin",0.9996,
            SCALEUNIT["unity",1],
            ID["EPSG",8805]],
        PARAMETER["False easting",500000,
            LENGTHUNIT["metre",1],
            ID["EPSG",8806]],
        PARAMETER["False northing",0,
            LENGTHUNIT["metre",1],
            ID["EPSG",8807]],
        ID["EPSG",16032]],
    CS[Cartesian,2],
        AXIS["(E)",east,
            ORDER[1],
            LENGTHUNIT["metre",1]],
        AXIS["(N)",north,
            ORDER[2],
            LENGTHUNIT["metre",1]],
    ID["EPSG",25832]]"#;

#[test]
fn test_wkt2_top_level_id() {
    let crs = Crs::parse(UTM_32N_WKT2).unwrap();
    assert_eq!(crs.epsg_code(), Some(25832));
    assert_eq!(crs.to_string(), "EPSG:25832");
}

#[test]
fn test_wkt2_without_top_level_id() {
    // Nested IDs remain on the base CRS, the method and the conversion
    let wkt = UTM_32N_WKT2.replace(",\n    ID[\"EPSG\",25832]]", "]");
    assert!(wkt.contains("ID[\"EPSG\",16032]"));
    let crs = Crs::parse(&wkt).unwrap();
    assert_eq!(crs.id, None);
    assert_eq!(crs.name, "ETRS89 / UTM zone 32N");
    assert_eq!(crs.mapping.name(), GridMappingName::TransverseMercator);
    assert_eq!(crs.mapping.number("longitude_of_central_meridian"), Some(9.0));
    assert_eq!(
        crs.mapping.number("scale_factor_at_central_meridian"),
        Some(0.9996)
    );
    assert_eq!(crs.datum.ellipsoid, Crs::epsg(25832).unwrap().datum.ellipsoid);
    assert!(crs.mapping.approx_eq(&Crs::epsg(25832).unwrap().mapping));
}

#[test]
fn test_wkt2_geographic_with_ellipsoid_id() {
    // ID inside ELLIPSOID must not be read as the CRS identifier
    let wkt = r#"GEOGCRS["unnamed",
        DATUM["unnamed datum",
            ELLIPSOID["GRS 1980",6378137,298.257222101,ID["EPSG",7019]]],
        CS[ellipsoidal,2],
            AXIS["latitude",north,ANGLEUNIT["degree",0.0174532925199433]],
            AXIS["longitude",east,ANGLEUNIT["degree",0.0174532925199433]]]"#;
    let crs = Crs::parse(wkt).unwrap();
    assert!(crs.is_geographic());
    assert_eq!(crs.id, None);
    assert_eq!(crs.datum.ellipsoid_name, "GRS 1980");
}

#[test]
fn test_wkt2_bound_crs() {
    let wkt = format!(
        r#"BOUNDCRS[SOURCECRS[{}],TARGETCRS[GEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563]],ID["EPSG",4326]]],ABRIDGEDTRANSFORMATION["Transformation from ETRS89 to WGS84",METHOD["Position Vector transformation (geog2D domain)"],PARAMETER["X-axis translation",0]]]"#,
        UTM_32N_WKT2
    );
    assert_eq!(Crs::parse(&wkt).unwrap().epsg_code(), Some(25832));
}

#[test]
fn test_wkt2_lambert_conformal_without_id() {
    let wkt = r#"PROJCRS["NARR LCC",
        BASEGEOGCRS["unknown",
            DATUM["unknown",ELLIPSOID["sphere",6371229,0,LENGTHUNIT["metre",1]]],
            PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]]],
        CONVERSION["unknown",
            METHOD["Lambert Conic Conformal (2SP)",ID["EPSG",9802]],
            PARAMETER["Latitude of false origin",50,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Longitude of false origin",-107,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Latitude of 1st standard parallel",50,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Latitude of 2nd standard parallel",50,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Easting at false origin",0,LENGTHUNIT["metre",1]],
            PARAMETER["Northing at false origin",0,LENGTHUNIT["metre",1]]],
        CS[Cartesian,2],
            AXIS["(E)",east,LENGTHUNIT["metre",1]],
            AXIS["(N)",north,LENGTHUNIT["metre",1]]]"#;
    let crs = Crs::parse(wkt).unwrap();
    assert!(crs.datum.ellipsoid.is_sphere());
    assert_eq!(crs.mapping.name(), GridMappingName::LambertConformalConic);
    assert_eq!(crs.mapping.standard_parallels(), vec![50.0]);
    assert_eq!(crs.mapping.number("longitude_of_central_meridian"), Some(-107.0));
    let (x, y) = crs.from_crs84(-107.0, 50.0).unwrap();
    assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
}

#[test]
fn test_unsupported_wkt_is_rejected() {
    assert!(Crs::parse("VERTCRS[\"height\",VDATUM[\"x\"]]").is_err());
    assert!(Crs::parse("PROJCS[\"x\",GEOGCS[\"y\"").is_err());
}

// ============================================================================
// CF attributes
// ============================================================================

#[test]
fn test_laea_grid_mapping_without_wkt() {
    let crs = Crs::from_cf(&attrs(json!({
        "grid_mapping_name": "lambert_azimuthal_equal_area",
        "latitude_of_projection_origin": 52,
        "longitude_of_projection_origin": 10,
        "false_easting": 4321000,
        "false_northing": 3210000,
    })))
    .unwrap();
    assert_eq!(crs.mapping.name(), GridMappingName::LambertAzimuthalEqualArea);
    assert_eq!(crs.mapping.number("latitude_of_projection_origin"), Some(52.0));
    // Without ellipsoid attributes WGS 84 is assumed, so this is not EPSG:3035
    assert_eq!(crs.id, None);
    let (x, y) = crs.from_crs84(10.0, 52.0).unwrap();
    assert!((x - 4_321_000.0).abs() < 1e-6 && (y - 3_210_000.0).abs() < 1e-6);
}

#[test]
fn test_grid_mapping_with_ellipsoid_is_identified() {
    let crs = Crs::from_cf(&attrs(json!({
        "grid_mapping_name": "lambert_azimuthal_equal_area",
        "latitude_of_projection_origin": 52.0,
        "longitude_of_projection_origin": 10.0,
        "false_easting": 4321000.0,
        "false_northing": 3210000.0,
        "semi_major_axis": 6378137.0,
        "inverse_flattening": 298.257222101,
    })))
    .unwrap();
    assert_eq!(crs.epsg_code(), Some(3035));
}

#[test]
fn test_every_cf_grid_mapping_is_recognised() {
    let cases = [
        json!({"grid_mapping_name": "albers_conical_equal_area", "standard_parallel": [29.5, 45.5], "longitude_of_central_meridian": -96.0, "latitude_of_projection_origin": 23.0}),
        json!({"grid_mapping_name": "azimuthal_equidistant", "longitude_of_projection_origin": 0.0, "latitude_of_projection_origin": 90.0}),
        json!({"grid_mapping_name": "geostationary", "latitude_of_projection_origin": 0.0, "longitude_of_projection_origin": -75.0, "perspective_point_height": 35786023.0, "sweep_angle_axis": "x"}),
        json!({"grid_mapping_name": "lambert_azimuthal_equal_area", "longitude_of_projection_origin": 10.0, "latitude_of_projection_origin": 52.0}),
        json!({"grid_mapping_name": "lambert_conformal_conic", "standard_parallel": 25.0, "longitude_of_central_meridian": 265.0, "latitude_of_projection_origin": 25.0}),
        json!({"grid_mapping_name": "lambert_cylindrical_equal_area", "longitude_of_central_meridian": 0.0, "standard_parallel": 30.0}),
        json!({"grid_mapping_name": "latitude_longitude"}),
        json!({"grid_mapping_name": "mercator", "longitude_of_projection_origin": 0.0, "standard_parallel": 20.0}),
        json!({"grid_mapping_name": "oblique_mercator", "azimuth_of_central_line": 30.0, "latitude_of_projection_origin": 45.0, "longitude_of_projection_origin": 10.0, "scale_factor_at_projection_origin": 1.0}),
        json!({"grid_mapping_name": "orthographic", "longitude_of_projection_origin": 0.0, "latitude_of_projection_origin": 45.0}),
        json!({"grid_mapping_name": "polar_stereographic", "straight_vertical_longitude_from_pole": -45.0, "latitude_of_projection_origin": 90.0, "standard_parallel": 70.0}),
        json!({"grid_mapping_name": "rotated_latitude_longitude", "grid_north_pole_latitude": 39.25, "grid_north_pole_longitude": -162.0}),
        json!({"grid_mapping_name": "sinusoidal", "longitude_of_central_meridian": 0.0}),
        json!({"grid_mapping_name": "stereographic", "longitude_of_projection_origin": 0.0, "latitude_of_projection_origin": 45.0, "scale_factor_at_projection_origin": 1.0}),
        json!({"grid_mapping_name": "transverse_mercator", "scale_factor_at_central_meridian": 0.9996, "longitude_of_central_meridian": 9.0, "latitude_of_projection_origin": 0.0}),
        json!({"grid_mapping_name": "vertical_perspective", "latitude_of_projection_origin": 45.0, "longitude_of_projection_origin": 0.0, "perspective_point_height": 1e7}),
    ];
    assert_eq!(cases.len(), GridMappingName::ALL.len());

    for case in cases {
        let name = case["grid_mapping_name"].as_str().unwrap_or_default().to_string();
        let crs = Crs::from_cf(&attrs(case)).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert_eq!(crs.mapping.name().as_str(), name);

        // Written attributes and WKT read back to the same definition
        let written = crs.to_cf();
        assert_eq!(written["grid_mapping_name"], name.as_str());
        let reread = Crs::from_cf(&written).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert!(reread.mapping.approx_eq(&crs.mapping), "{}", name);
    }
}

#[test]
fn test_missing_grid_mapping_parameter() {
    let err = Crs::from_cf(&attrs(json!({
        "grid_mapping_name": "transverse_mercator",
        "longitude_of_central_meridian": 9.0,
        "latitude_of_projection_origin": 0.0,
    })))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid CRS: missing attribute 'scale_factor_at_central_meridian' for grid mapping 'transverse_mercator'"
    );
}

#[test]
fn test_invalid_grid_mapping_values() {
    let err = Crs::from_cf(&attrs(json!({
        "grid_mapping_name": "lambert_azimuthal_equal_area",
        "longitude_of_projection_origin": 10.0,
        "latitude_of_projection_origin": 152.0,
    })))
    .unwrap_err();
    assert!(err.to_string().contains("latitude_of_projection_origin"), "{}", err);

    let err = Crs::from_cf(&attrs(json!({
        "grid_mapping_name": "lambert_azimuthal_equal_area",
        "longitude_of_projection_origin": "ten",
        "latitude_of_projection_origin": 52.0,
    })))
    .unwrap_err();
    assert!(err.to_string().contains("must be a number"), "{}", err);
}

#[test]
fn test_non_utm_transverse_mercator() {
    // British National Grid parameters on Airy 1830
    let crs = Crs::from_cf(&attrs(json!({
        "grid_mapping_name": "transverse_mercator",
        "scale_factor_at_central_meridian": 0.9996012717,
        "longitude_of_central_meridian": -2.0,
        "latitude_of_projection_origin": 49.0,
        "false_easting": 400000.0,
        "false_northing": -100000.0,
        "semi_major_axis": 6377563.396,
        "semi_minor_axis": 6356256.909,
    })))
    .unwrap();
    assert_eq!(crs.id, None);
    let (x, y) = crs.from_crs84(-2.0, 49.0).unwrap();
    assert!((x - 400_000.0).abs() < 1e-6);
    assert!((y + 100_000.0).abs() < 1e-6);
}
