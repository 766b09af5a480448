//! CF grid mappings and their parameters.
//!
//! Each `grid_mapping_name` of CF Appendix F has a set of required
//! attributes, some of which can be given in one of several forms (e.g. a
//! Mercator takes either `standard_parallel` or
//! `scale_factor_at_projection_origin`). [`GridMapping::new`] checks these
//! and keeps the normalised values.

use serde_json::{json, Value};
use std::fmt;

use crate::dataset::Attributes;
use crate::error::{CubeError, CubeResult};

/// A CF `grid_mapping_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridMappingName {
    AlbersConicalEqualArea,
    AzimuthalEquidistant,
    Geostationary,
    LambertAzimuthalEqualArea,
    LambertConformalConic,
    LambertCylindricalEqualArea,
    LatitudeLongitude,
    Mercator,
    ObliqueMercator,
    Orthographic,
    PolarStereographic,
    RotatedLatitudeLongitude,
    Sinusoidal,
    Stereographic,
    TransverseMercator,
    VerticalPerspective,
    /// Spherical Mercator formulas applied to ellipsoidal coordinates
    /// (EPSG:3857). CF has no name of its own for it and writes `mercator`.
    PseudoMercator,
}

/// Parameters that can appear in every projected grid mapping.
const FALSE_ORIGIN: &[(&str, f64)] = &[("false_easting", 0.0), ("false_northing", 0.0)];

const STANDARD_PARALLEL: &str = "standard_parallel";
const LAT0: &str = "latitude_of_projection_origin";
const LON0: &str = "longitude_of_projection_origin";
const CENTRAL_MERIDIAN: &str = "longitude_of_central_meridian";
const SCALE_AT_ORIGIN: &str = "scale_factor_at_projection_origin";

impl GridMappingName {
    /// All CF grid mapping names, in CF Appendix F order.
    pub const ALL: [GridMappingName; 16] = [
        GridMappingName::AlbersConicalEqualArea,
        GridMappingName::AzimuthalEquidistant,
        GridMappingName::Geostationary,
        GridMappingName::LambertAzimuthalEqualArea,
        GridMappingName::LambertConformalConic,
        GridMappingName::LambertCylindricalEqualArea,
        GridMappingName::LatitudeLongitude,
        GridMappingName::Mercator,
        GridMappingName::ObliqueMercator,
        GridMappingName::Orthographic,
        GridMappingName::PolarStereographic,
        GridMappingName::RotatedLatitudeLongitude,
        GridMappingName::Sinusoidal,
        GridMappingName::Stereographic,
        GridMappingName::TransverseMercator,
        GridMappingName::VerticalPerspective,
    ];

    /// The CF attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            GridMappingName::AlbersConicalEqualArea => "albers_conical_equal_area",
            GridMappingName::AzimuthalEquidistant => "azimuthal_equidistant",
            GridMappingName::Geostationary => "geostationary",
            GridMappingName::LambertAzimuthalEqualArea => "lambert_azimuthal_equal_area",
            GridMappingName::LambertConformalConic => "lambert_conformal_conic",
            GridMappingName::LambertCylindricalEqualArea => "lambert_cylindrical_equal_area",
            GridMappingName::LatitudeLongitude => "latitude_longitude",
            GridMappingName::Mercator | GridMappingName::PseudoMercator => "mercator",
            GridMappingName::ObliqueMercator => "oblique_mercator",
            GridMappingName::Orthographic => "orthographic",
            GridMappingName::PolarStereographic => "polar_stereographic",
            GridMappingName::RotatedLatitudeLongitude => "rotated_latitude_longitude",
            GridMappingName::Sinusoidal => "sinusoidal",
            GridMappingName::Stereographic => "stereographic",
            GridMappingName::TransverseMercator => "transverse_mercator",
            GridMappingName::VerticalPerspective => "vertical_perspective",
        }
    }

    /// Look up a CF `grid_mapping_name` value.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name.trim())
    }

    /// Whether coordinates in this mapping are longitude and latitude.
    pub fn is_geographic(&self) -> bool {
        matches!(self, GridMappingName::LatitudeLongitude)
    }

    /// Required attributes. Each inner slice lists alternatives of which at
    /// least one must be present.
    pub fn required(&self) -> &'static [&'static [&'static str]] {
        match self {
            GridMappingName::AlbersConicalEqualArea | GridMappingName::LambertConformalConic => {
                &[&[STANDARD_PARALLEL], &[CENTRAL_MERIDIAN], &[LAT0]]
            }
            GridMappingName::AzimuthalEquidistant
            | GridMappingName::LambertAzimuthalEqualArea
            | GridMappingName::Orthographic => &[&[LON0], &[LAT0]],
            GridMappingName::Geostationary => &[
                &[LAT0],
                &[LON0],
                &["perspective_point_height"],
                &["sweep_angle_axis", "fixed_angle_axis"],
            ],
            GridMappingName::LambertCylindricalEqualArea => {
                &[&[CENTRAL_MERIDIAN], &[STANDARD_PARALLEL, SCALE_AT_ORIGIN]]
            }
            GridMappingName::LatitudeLongitude => &[],
            GridMappingName::Mercator | GridMappingName::PseudoMercator => {
                &[&[LON0], &[STANDARD_PARALLEL, SCALE_AT_ORIGIN]]
            }
            GridMappingName::ObliqueMercator => &[
                &["azimuth_of_central_line"],
                &[LAT0],
                &[LON0],
                &[SCALE_AT_ORIGIN],
            ],
            GridMappingName::PolarStereographic => &[
                &["straight_vertical_longitude_from_pole", LON0],
                &[LAT0],
                &[STANDARD_PARALLEL, SCALE_AT_ORIGIN],
            ],
            GridMappingName::RotatedLatitudeLongitude => {
                &[&["grid_north_pole_latitude"], &["grid_north_pole_longitude"]]
            }
            GridMappingName::Sinusoidal => &[&[CENTRAL_MERIDIAN]],
            GridMappingName::Stereographic => &[&[LON0], &[LAT0], &[SCALE_AT_ORIGIN]],
            GridMappingName::TransverseMercator => &[
                &["scale_factor_at_central_meridian"],
                &[CENTRAL_MERIDIAN],
                &[LAT0],
            ],
            GridMappingName::VerticalPerspective => {
                &[&[LAT0], &[LON0], &["perspective_point_height"]]
            }
        }
    }

    /// Optional attributes with the value assumed when they are absent.
    pub fn optional(&self) -> &'static [(&'static str, f64)] {
        match self {
            GridMappingName::LatitudeLongitude => &[],
            GridMappingName::RotatedLatitudeLongitude => &[("north_pole_grid_longitude", 0.0)],
            _ => FALSE_ORIGIN,
        }
    }

    /// Attributes accepted without a default: they are kept when given.
    fn extra(&self) -> &'static [&'static str] {
        match self {
            // Lambert conic 1SP definitions carry a scale factor at the origin
            GridMappingName::LambertConformalConic => &[SCALE_AT_ORIGIN],
            _ => &[],
        }
    }

    fn accepts(&self, key: &str) -> bool {
        self.required().iter().any(|group| group.contains(&key))
            || self.optional().iter().any(|(name, _)| *name == key)
            || self.extra().contains(&key)
    }
}

impl fmt::Display for GridMappingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParamKind {
    Number,
    Latitude,
    Parallels,
    Positive,
    Axis,
}

fn param_kind(key: &str) -> ParamKind {
    match key {
        STANDARD_PARALLEL => ParamKind::Parallels,
        LAT0 | "grid_north_pole_latitude" => ParamKind::Latitude,
        "scale_factor_at_central_meridian" | SCALE_AT_ORIGIN | "perspective_point_height" => {
            ParamKind::Positive
        }
        "sweep_angle_axis" | "fixed_angle_axis" => ParamKind::Axis,
        _ => ParamKind::Number,
    }
}

/// A grid mapping with validated, normalised parameters.
///
/// Numbers are stored as `f64`; `standard_parallel` is a scalar for a
/// single parallel and an ascending two-element array otherwise. Optional parameters
/// are filled with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMapping {
    name: GridMappingName,
    params: Attributes,
}

impl GridMapping {
    /// Validate the parameters of a grid mapping.
    ///
    /// Attributes not belonging to the mapping are ignored, so the full
    /// attribute set of a CF `crs` variable can be passed in.
    pub fn new(name: GridMappingName, attrs: &Attributes) -> CubeResult<Self> {
        let mut params = Attributes::new();

        for group in name.required() {
            if !group.iter().any(|key| attrs.contains_key(*key)) {
                return Err(CubeError::invalid_crs(format!(
                    "missing attribute '{}' for grid mapping '{}'",
                    group.join("' or '"),
                    name
                )));
            }
        }
        for (key, value) in attrs {
            if name.accepts(key) {
                params.insert(key.clone(), normalize(name, key, value)?);
            }
        }
        for (key, default) in name.optional() {
            if !params.contains_key(*key) {
                params.insert((*key).to_string(), json!(default));
            }
        }

        let mapping = Self { name, params };
        mapping.check_consistency()?;
        Ok(mapping)
    }

    /// Build from parameters known to be valid.
    pub(crate) fn from_known(name: GridMappingName, params: &[(&str, Value)]) -> Self {
        let mut attrs = Attributes::new();
        for (key, value) in params {
            attrs.insert((*key).to_string(), value.clone());
        }
        for (key, default) in name.optional() {
            if !attrs.contains_key(*key) {
                attrs.insert((*key).to_string(), json!(default));
            }
        }
        Self {
            name,
            params: attrs,
        }
    }

    /// The geographic (longitude/latitude) mapping.
    pub fn latitude_longitude() -> Self {
        Self {
            name: GridMappingName::LatitudeLongitude,
            params: Attributes::new(),
        }
    }

    pub fn name(&self) -> GridMappingName {
        self.name
    }

    /// Normalised parameters, keyed by CF attribute name.
    pub fn params(&self) -> &Attributes {
        &self.params
    }

    /// A numeric parameter.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(Value::as_f64)
    }

    /// A numeric parameter that must be present.
    pub fn require(&self, key: &str) -> CubeResult<f64> {
        self.number(key).ok_or_else(|| {
            CubeError::invalid_crs(format!(
                "missing attribute '{}' for grid mapping '{}'",
                key, self.name
            ))
        })
    }

    /// A text parameter.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// The standard parallel(s), empty when absent.
    pub fn standard_parallels(&self) -> Vec<f64> {
        match self.params.get(STANDARD_PARALLEL) {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_f64).collect(),
            Some(value) => value.as_f64().into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Whether two mappings describe the same projection within rounding.
    pub fn approx_eq(&self, other: &GridMapping) -> bool {
        if self.name != other.name || self.params.len() != other.params.len() {
            return false;
        }
        self.params.iter().all(|(key, a)| match other.params.get(key) {
            Some(b) => values_approx_eq(a, b),
            None => false,
        })
    }

    fn check_consistency(&self) -> CubeResult<()> {
        match self.name {
            GridMappingName::PolarStereographic => {
                let lat0 = self.require(LAT0)?;
                if lat0.abs() != 90.0 {
                    return Err(self.invalid(format!(
                        "'{}' must be +90 or -90, got {}",
                        LAT0, lat0
                    )));
                }
                if let Some(sp) = self.standard_parallels().first() {
                    if sp.signum() != lat0.signum() {
                        return Err(self.invalid(format!(
                            "standard_parallel {} lies in the other hemisphere",
                            sp
                        )));
                    }
                }
            }
            GridMappingName::LambertConformalConic | GridMappingName::AlbersConicalEqualArea => {
                let sp = self.standard_parallels();
                if sp.len() == 2 && (sp[0] + sp[1]).abs() < 1e-10 {
                    return Err(self.invalid(
                        "standard parallels must not be symmetric about the equator".to_string(),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> CubeError {
        CubeError::invalid_crs(format!("grid mapping '{}': {}", self.name, reason))
    }
}

fn normalize(name: GridMappingName, key: &str, value: &Value) -> CubeResult<Value> {
    let invalid = |what: &str| {
        CubeError::invalid_crs(format!(
            "attribute '{}' of grid mapping '{}' {}, got {}",
            key, name, what, value
        ))
    };
    let number = |v: &Value| v.as_f64().filter(|n| n.is_finite());
    let latitude = |v: &Value| number(v).filter(|n| (-90.0..=90.0).contains(n));

    match param_kind(key) {
        ParamKind::Number => number(value).map(Value::from).ok_or_else(|| invalid("must be a number")),
        ParamKind::Positive => number(value)
            .filter(|n| *n > 0.0)
            .map(Value::from)
            .ok_or_else(|| invalid("must be a positive number")),
        ParamKind::Latitude => latitude(value)
            .map(Value::from)
            .ok_or_else(|| invalid("must be a latitude in [-90, 90]")),
        ParamKind::Parallels => {
            let values: Vec<f64> = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| latitude(v))
                    .collect::<Option<_>>()
                    .ok_or_else(|| invalid("must hold latitudes in [-90, 90]"))?,
                v => vec![latitude(v).ok_or_else(|| invalid("must be a latitude in [-90, 90]"))?],
            };
            match values.as_slice() {
                [single] => Ok(json!(single)),
                [first, second] if first == second => Ok(json!(first)),
                [first, second] => Ok(json!([first.min(*second), first.max(*second)])),
                _ => Err(invalid("must hold one or two latitudes")),
            }
        }
        ParamKind::Axis => match value.as_str() {
            Some(axis @ ("x" | "y")) => Ok(json!(axis)),
            _ => Err(invalid("must be \"x\" or \"y\"")),
        },
    }
}

fn values_approx_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_approx_eq(x, y))
        }
        (Value::String(x), Value::String(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => (x - y).abs() <= 1e-9 * x.abs().max(y.abs()).max(1.0),
            _ => false,
        },
    }
}
