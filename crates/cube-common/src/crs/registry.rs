//! Built-in EPSG definitions.
//!
//! Covers the geographic and projected CRSs commonly used for gridded
//! products. Anything else can still be described by a PROJ string, WKT or
//! CF attributes; [`identify`] maps such definitions back to a code when
//! they match one of these.

use serde_json::json;

use projection::{utm_central_meridian, Ellipsoid};

use super::mapping::{GridMapping, GridMappingName};
use super::{Crs, CrsId, Datum};

const WGS84_DATUM: &str = "World Geodetic System 1984";
const ETRS89_DATUM: &str = "European Terrestrial Reference System 1989";
const NAD83_DATUM: &str = "North American Datum 1983";
const RGF93_DATUM: &str = "Reseau Geodesique Francais 1993 v1";

const KNOWN_DATUMS: &[&str] = &[WGS84_DATUM, ETRS89_DATUM, NAD83_DATUM, RGF93_DATUM];

/// Codes tried by [`identify`] besides the UTM families.
const NAMED_CODES: &[u32] = &[
    4326, 4258, 4269, 4171, 3857, 3395, 3034, 3035, 2154, 5070, 3413, 3031,
];

pub(crate) fn wgs84() -> Datum {
    Datum::new(WGS84_DATUM, "WGS 84", Ellipsoid::WGS84)
}

fn grs80(datum: &str) -> Datum {
    Datum::new(datum, "GRS 1980", Ellipsoid::GRS80)
}

/// Geographic CRS name and datum for a base geographic code.
fn base(code: u32) -> Option<(&'static str, Datum)> {
    match code {
        4326 => Some(("WGS 84", wgs84())),
        4258 => Some(("ETRS89", grs80(ETRS89_DATUM))),
        4269 => Some(("NAD83", grs80(NAD83_DATUM))),
        4171 => Some(("RGF93 v1", grs80(RGF93_DATUM))),
        _ => None,
    }
}

fn projected(
    code: u32,
    name: impl Into<String>,
    base_code: u32,
    kind: GridMappingName,
    params: &[(&str, serde_json::Value)],
) -> Option<Crs> {
    let (geographic_name, datum) = base(base_code)?;
    Some(Crs {
        name: name.into(),
        id: Some(CrsId::Epsg(code)),
        geographic_name: geographic_name.to_string(),
        datum,
        mapping: GridMapping::from_known(kind, params),
    })
}

fn utm(code: u32, base_code: u32, prefix: &str, zone: u32, south: bool) -> Option<Crs> {
    projected(
        code,
        format!("{} / UTM zone {}{}", prefix, zone, if south { 'S' } else { 'N' }),
        base_code,
        GridMappingName::TransverseMercator,
        &[
            ("scale_factor_at_central_meridian", json!(0.9996)),
            (
                "longitude_of_central_meridian",
                json!(utm_central_meridian(zone as u8)),
            ),
            ("latitude_of_projection_origin", json!(0.0)),
            ("false_easting", json!(500_000.0)),
            (
                "false_northing",
                json!(if south { 10_000_000.0 } else { 0.0 }),
            ),
        ],
    )
}

/// Definition of an EPSG code, if built in.
pub(crate) fn lookup(code: u32) -> Option<Crs> {
    if let Some((name, datum)) = base(code) {
        return Some(Crs {
            name: name.to_string(),
            id: Some(CrsId::Epsg(code)),
            geographic_name: name.to_string(),
            datum,
            mapping: GridMapping::latitude_longitude(),
        });
    }

    match code {
        3857 | 900913 => projected(
            3857,
            "WGS 84 / Pseudo-Mercator",
            4326,
            GridMappingName::PseudoMercator,
            &[
                ("longitude_of_projection_origin", json!(0.0)),
                ("standard_parallel", json!(0.0)),
            ],
        ),
        3395 => projected(
            code,
            "WGS 84 / World Mercator",
            4326,
            GridMappingName::Mercator,
            &[
                ("longitude_of_projection_origin", json!(0.0)),
                ("scale_factor_at_projection_origin", json!(1.0)),
            ],
        ),
        3034 => projected(
            code,
            "ETRS89-extended / LCC Europe",
            4258,
            GridMappingName::LambertConformalConic,
            &[
                ("standard_parallel", json!([35.0, 65.0])),
                ("longitude_of_central_meridian", json!(10.0)),
                ("latitude_of_projection_origin", json!(52.0)),
                ("false_easting", json!(4_000_000.0)),
                ("false_northing", json!(2_800_000.0)),
            ],
        ),
        3035 => projected(
            code,
            "ETRS89-extended / LAEA Europe",
            4258,
            GridMappingName::LambertAzimuthalEqualArea,
            &[
                ("longitude_of_projection_origin", json!(10.0)),
                ("latitude_of_projection_origin", json!(52.0)),
                ("false_easting", json!(4_321_000.0)),
                ("false_northing", json!(3_210_000.0)),
            ],
        ),
        2154 => projected(
            code,
            "RGF93 v1 / Lambert-93",
            4171,
            GridMappingName::LambertConformalConic,
            &[
                ("standard_parallel", json!([44.0, 49.0])),
                ("longitude_of_central_meridian", json!(3.0)),
                ("latitude_of_projection_origin", json!(46.5)),
                ("false_easting", json!(700_000.0)),
                ("false_northing", json!(6_600_000.0)),
            ],
        ),
        5070 => projected(
            code,
            "NAD83 / Conus Albers",
            4269,
            GridMappingName::AlbersConicalEqualArea,
            &[
                ("standard_parallel", json!([29.5, 45.5])),
                ("longitude_of_central_meridian", json!(-96.0)),
                ("latitude_of_projection_origin", json!(23.0)),
            ],
        ),
        3413 => projected(
            code,
            "WGS 84 / NSIDC Sea Ice Polar Stereographic North",
            4326,
            GridMappingName::PolarStereographic,
            &[
                ("straight_vertical_longitude_from_pole", json!(-45.0)),
                ("latitude_of_projection_origin", json!(90.0)),
                ("standard_parallel", json!(70.0)),
            ],
        ),
        3031 => projected(
            code,
            "WGS 84 / Antarctic Polar Stereographic",
            4326,
            GridMappingName::PolarStereographic,
            &[
                ("straight_vertical_longitude_from_pole", json!(0.0)),
                ("latitude_of_projection_origin", json!(-90.0)),
                ("standard_parallel", json!(-71.0)),
            ],
        ),
        32601..=32660 => utm(code, 4326, "WGS 84", code - 32600, false),
        32701..=32760 => utm(code, 4326, "WGS 84", code - 32700, true),
        25828..=25838 => utm(code, 4258, "ETRS89", code - 25800, false),
        26901..=26923 => utm(code, 4269, "NAD83", code - 26900, false),
        _ => None,
    }
}

/// Find the built-in code whose definition matches `crs`.
///
/// Definitions match on grid mapping parameters and ellipsoid. A datum
/// name that belongs to another built-in datum rules a definition out;
/// an unrecognised one is accepted when only one definition matches.
pub(crate) fn identify(crs: &Crs) -> Option<u32> {
    let mut candidates: Vec<u32> = NAMED_CODES.to_vec();
    if crs.mapping.name() == GridMappingName::TransverseMercator {
        if let Some(lon0) = crs.mapping.number("longitude_of_central_meridian") {
            let zone = ((lon0 + 183.0) / 6.0).round();
            if (1.0..=60.0).contains(&zone) {
                let zone = zone as u32;
                candidates.extend([32600 + zone, 32700 + zone, 25800 + zone, 26900 + zone]);
            }
        }
    }

    let known_datum = KNOWN_DATUMS.contains(&crs.datum.name.as_str());
    let matches: Vec<Crs> = candidates
        .into_iter()
        .filter_map(lookup)
        .filter(|known| {
            known.mapping.approx_eq(&crs.mapping)
                && ellipsoid_approx_eq(&known.datum.ellipsoid, &crs.datum.ellipsoid)
                && (!known_datum || known.datum.name == crs.datum.name)
        })
        .collect();

    match matches.as_slice() {
        [only] => only.epsg_code(),
        _ => None,
    }
}

fn ellipsoid_approx_eq(a: &Ellipsoid, b: &Ellipsoid) -> bool {
    // WGS 84 and GRS 1980 differ by 1.5e-6 in inverse flattening
    (a.semi_major_axis - b.semi_major_axis).abs() < 1e-3
        && (a.inverse_flattening - b.inverse_flattening).abs() < 1e-7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_definition_is_valid() {
        let codes = NAMED_CODES
            .iter()
            .copied()
            .chain(32601..=32660)
            .chain(32701..=32760)
            .chain(25828..=25838)
            .chain(26901..=26923);
        for code in codes {
            let crs = lookup(code).unwrap_or_else(|| panic!("EPSG:{} missing", code));
            let checked = GridMapping::new(crs.mapping.name(), crs.mapping.params())
                .unwrap_or_else(|e| panic!("EPSG:{}: {}", code, e));
            assert!(checked.approx_eq(&crs.mapping), "EPSG:{}", code);
            assert_eq!(identify(&crs), Some(code), "EPSG:{}", code);
        }
    }

    #[test]
    fn test_legacy_web_mercator_alias() {
        assert_eq!(lookup(900913).and_then(|c| c.id), Some(CrsId::Epsg(3857)));
    }

    #[test]
    fn test_grs80_geographic_needs_datum_name() {
        let mut crs = lookup(4258).unwrap();
        crs.datum.name = "unknown".to_string();
        // ETRS89, NAD83 and RGF93 v1 share GRS 1980
        assert_eq!(identify(&crs), None);
        crs.datum.name = NAD83_DATUM.to_string();
        assert_eq!(identify(&crs), Some(4269));
    }
}
