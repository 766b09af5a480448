//! PROJ strings (`+proj=... +key=value`).

use serde_json::{json, Value};
use std::collections::HashMap;

use projection::{utm_central_meridian, Ellipsoid};

use super::mapping::{GridMapping, GridMappingName};
use super::{registry, Crs, Datum};
use crate::dataset::Attributes;
use crate::error::{CubeError, CubeResult};

struct ProjParams<'a> {
    source: &'a str,
    values: HashMap<String, Option<&'a str>>,
}

impl<'a> ProjParams<'a> {
    fn parse(source: &'a str) -> Self {
        let mut values = HashMap::new();
        for token in source.split_whitespace() {
            let token = token.trim_start_matches('+');
            match token.split_once('=') {
                Some((k, v)) => values.insert(k.to_lowercase(), Some(v)),
                None => values.insert(token.to_lowercase(), None),
            };
        }
        Self { source, values }
    }

    fn flag(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn text(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied().flatten()
    }

    fn number(&self, key: &str) -> CubeResult<Option<f64>> {
        match self.text(key) {
            None => Ok(None),
            Some(v) => v.parse::<f64>().map(Some).map_err(|_| {
                CubeError::invalid_crs(format!("invalid +{} in '{}'", key, self.source))
            }),
        }
    }

    fn require(&self, key: &str) -> CubeResult<f64> {
        self.number(key)?
            .ok_or_else(|| CubeError::invalid_crs(format!("missing +{} in '{}'", key, self.source)))
    }

    fn first_number(&self, keys: &[&str]) -> CubeResult<Option<f64>> {
        for key in keys {
            if let Some(v) = self.number(key)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn datum(&self) -> CubeResult<Datum> {
        if let Some(datum) = self.text("datum") {
            return match datum.to_uppercase().as_str() {
                "WGS84" => Ok(registry::wgs84()),
                "NAD83" => Ok(Datum::new(
                    "North American Datum 1983",
                    "GRS 1980",
                    Ellipsoid::GRS80,
                )),
                other => Err(CubeError::invalid_crs(format!(
                    "unsupported +datum={} in '{}'",
                    other, self.source
                ))),
            };
        }
        if let Some(ellps) = self.text("ellps") {
            let (name, ellipsoid) = match ellps.to_uppercase().as_str() {
                "WGS84" => ("WGS 84", Ellipsoid::WGS84),
                "GRS80" => ("GRS 1980", Ellipsoid::GRS80),
                "CLRK66" => ("Clarke 1866", Ellipsoid::from_axes(6378206.4, 6356583.8)),
                "INTL" => ("International 1924", Ellipsoid::new(6378388.0, 297.0)),
                "BESSEL" => ("Bessel 1841", Ellipsoid::new(6377397.155, 299.1528128)),
                "KRASS" => ("Krassowsky 1940", Ellipsoid::new(6378245.0, 298.3)),
                other => {
                    return Err(CubeError::invalid_crs(format!(
                        "unsupported +ellps={} in '{}'",
                        other, self.source
                    )))
                }
            };
            return Ok(Datum::new("unknown", name, ellipsoid));
        }
        if let Some(radius) = self.number("r")? {
            return Ok(Datum::new("unknown", "sphere", Ellipsoid::sphere(radius)));
        }
        if let Some(a) = self.number("a")? {
            let ellipsoid = match (self.number("rf")?, self.number("b")?) {
                (Some(rf), _) => Ellipsoid::new(a, rf),
                (None, Some(b)) => Ellipsoid::from_axes(a, b),
                (None, None) => Ellipsoid::sphere(a),
            };
            return Ok(Datum::new("unknown", "unknown", ellipsoid));
        }
        Ok(registry::wgs84())
    }

    fn false_origin(&self, attrs: &mut Attributes) -> CubeResult<()> {
        attrs.insert("false_easting".into(), json!(self.number("x_0")?.unwrap_or(0.0)));
        attrs.insert("false_northing".into(), json!(self.number("y_0")?.unwrap_or(0.0)));
        Ok(())
    }
}

fn parallels(first: f64, second: Option<f64>) -> Value {
    match second {
        Some(second) => json!([first, second]),
        None => json!(first),
    }
}

fn web_mercator() -> CubeResult<Crs> {
    registry::lookup(3857).ok_or_else(|| CubeError::invalid_crs("EPSG:3857 is not available"))
}

/// Parse a PROJ string.
pub(crate) fn parse(source: &str) -> CubeResult<Crs> {
    let params = ProjParams::parse(source);
    let proj = params
        .text("proj")
        .ok_or_else(|| CubeError::invalid_crs(format!("missing +proj in '{}'", source)))?;
    let datum = params.datum()?;
    let mut attrs = Attributes::new();

    let kind = match proj {
        "longlat" | "latlong" | "lonlat" | "latlon" => {
            if datum == registry::wgs84() {
                return Ok(Crs::crs84());
            }
            GridMappingName::LatitudeLongitude
        }
        "utm" => {
            let zone: u8 = params
                .text("zone")
                .ok_or_else(|| CubeError::invalid_crs(format!("missing +zone in '{}'", source)))?
                .parse()
                .map_err(|_| CubeError::invalid_crs(format!("invalid +zone in '{}'", source)))?;
            if !(1..=60).contains(&zone) {
                return Err(CubeError::invalid_crs(format!(
                    "UTM zone must be 1-60, got {}",
                    zone
                )));
            }
            let south = params.flag("south");
            attrs.insert("scale_factor_at_central_meridian".into(), json!(0.9996));
            attrs.insert(
                "longitude_of_central_meridian".into(),
                json!(utm_central_meridian(zone)),
            );
            attrs.insert("latitude_of_projection_origin".into(), json!(0.0));
            attrs.insert("false_easting".into(), json!(500_000.0));
            attrs.insert(
                "false_northing".into(),
                json!(if south { 10_000_000.0 } else { 0.0 }),
            );
            GridMappingName::TransverseMercator
        }
        "webmerc" => return web_mercator(),
        "merc" => {
            let spherical =
                params.text("a") == Some("6378137") && params.text("b") == Some("6378137");
            if spherical {
                return web_mercator();
            }
            attrs.insert(
                "longitude_of_projection_origin".into(),
                json!(params.number("lon_0")?.unwrap_or(0.0)),
            );
            match params.number("lat_ts")? {
                Some(lat_ts) => attrs.insert("standard_parallel".into(), json!(lat_ts)),
                None => attrs.insert(
                    "scale_factor_at_projection_origin".into(),
                    json!(params.first_number(&["k_0", "k"])?.unwrap_or(1.0)),
                ),
            };
            params.false_origin(&mut attrs)?;
            GridMappingName::Mercator
        }
        "tmerc" => {
            attrs.insert(
                "scale_factor_at_central_meridian".into(),
                json!(params.first_number(&["k_0", "k"])?.unwrap_or(1.0)),
            );
            attrs.insert(
                "longitude_of_central_meridian".into(),
                json!(params.number("lon_0")?.unwrap_or(0.0)),
            );
            attrs.insert(
                "latitude_of_projection_origin".into(),
                json!(params.number("lat_0")?.unwrap_or(0.0)),
            );
            params.false_origin(&mut attrs)?;
            GridMappingName::TransverseMercator
        }
        "lcc" | "aea" => {
            let lat_1 = params.require("lat_1")?;
            attrs.insert(
                "standard_parallel".into(),
                parallels(lat_1, params.number("lat_2")?),
            );
            attrs.insert(
                "longitude_of_central_meridian".into(),
                json!(params.number("lon_0")?.unwrap_or(0.0)),
            );
            attrs.insert(
                "latitude_of_projection_origin".into(),
                json!(params.number("lat_0")?.unwrap_or(0.0)),
            );
            if let Some(k0) = params.first_number(&["k_0", "k"])?.filter(|_| proj == "lcc") {
                attrs.insert("scale_factor_at_projection_origin".into(), json!(k0));
            }
            params.false_origin(&mut attrs)?;
            if proj == "lcc" {
                GridMappingName::LambertConformalConic
            } else {
                GridMappingName::AlbersConicalEqualArea
            }
        }
        "laea" => {
            attrs.insert(
                "longitude_of_projection_origin".into(),
                json!(params.number("lon_0")?.unwrap_or(0.0)),
            );
            attrs.insert(
                "latitude_of_projection_origin".into(),
                json!(params.number("lat_0")?.unwrap_or(0.0)),
            );
            params.false_origin(&mut attrs)?;
            GridMappingName::LambertAzimuthalEqualArea
        }
        "stere" => {
            let lat_0 = params.require("lat_0")?;
            if lat_0.abs() != 90.0 {
                return Err(CubeError::invalid_crs(format!(
                    "only polar +proj=stere is supported, got +lat_0={}",
                    lat_0
                )));
            }
            attrs.insert(
                "straight_vertical_longitude_from_pole".into(),
                json!(params.number("lon_0")?.unwrap_or(0.0)),
            );
            attrs.insert("latitude_of_projection_origin".into(), json!(lat_0));
            match params.number("lat_ts")? {
                Some(lat_ts) => attrs.insert("standard_parallel".into(), json!(lat_ts)),
                None => attrs.insert(
                    "scale_factor_at_projection_origin".into(),
                    json!(params.first_number(&["k_0", "k"])?.unwrap_or(1.0)),
                ),
            };
            params.false_origin(&mut attrs)?;
            GridMappingName::PolarStereographic
        }
        other => {
            return Err(CubeError::invalid_crs(format!(
                "unsupported projection '{}'",
                other
            )))
        }
    };

    let mapping = GridMapping::new(kind, &attrs)?;
    let crs = Crs {
        name: "unknown".to_string(),
        id: None,
        geographic_name: "unknown".to_string(),
        datum,
        mapping,
    };
    Ok(crs.identified())
}
