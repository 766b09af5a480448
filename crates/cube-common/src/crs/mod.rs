//! Coordinate Reference System types and utilities.
//!
//! A [`Crs`] is parsed once from an identifier (EPSG code, PROJ string,
//! WKT or CF grid-mapping attributes) and is then the single source for CF
//! grid-mapping attributes and for transformations to and from CRS84.
//!
//! The definition is kept as a datum plus a CF [`GridMapping`] with its
//! parameters, so any CF grid mapping can be validated and written back.
//! Reprojection is available for the mappings the `projection` crate
//! implements. Geographic coordinates are not shifted between datums.

mod mapping;
mod proj_string;
mod registry;
mod wkt;

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use projection::{
    AlbersEqualArea, Ellipsoid, LambertAzimuthalEqualArea, LambertConformal, Mercator,
    PolarStereographic, Projection, TransverseMercator, WebMercator,
};

use crate::dataset::Attributes;
use crate::error::{CubeError, CubeResult};

pub use mapping::{GridMapping, GridMappingName};

/// Authority identifier of a CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsId {
    /// An EPSG code
    Epsg(u32),
    /// OGC CRS84: WGS84 geographic, longitude/latitude axis order
    Crs84,
}

impl fmt::Display for CrsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsId::Epsg(code) => write!(f, "EPSG:{}", code),
            CrsId::Crs84 => write!(f, "OGC:CRS84"),
        }
    }
}

/// Geodetic datum and its reference ellipsoid.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub name: String,
    pub ellipsoid_name: String,
    pub ellipsoid: Ellipsoid,
}

impl Datum {
    pub fn new(
        name: impl Into<String>,
        ellipsoid_name: impl Into<String>,
        ellipsoid: Ellipsoid,
    ) -> Self {
        Self {
            name: name.into(),
            ellipsoid_name: ellipsoid_name.into(),
            ellipsoid,
        }
    }
}

/// A parsed coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    /// CRS name as used in WKT
    pub name: String,
    /// Authority code, when known
    pub id: Option<CrsId>,
    /// Name of the (base) geographic CRS
    pub geographic_name: String,
    pub datum: Datum,
    pub mapping: GridMapping,
}

impl Crs {
    /// The interchange CRS used for geospatial attributes.
    pub fn crs84() -> Self {
        Self {
            name: "WGS 84 (CRS84)".to_string(),
            id: Some(CrsId::Crs84),
            geographic_name: "WGS 84 (CRS84)".to_string(),
            datum: registry::wgs84(),
            mapping: GridMapping::latitude_longitude(),
        }
    }

    /// A built-in EPSG definition.
    pub fn epsg(code: u32) -> CubeResult<Self> {
        registry::lookup(code)
            .ok_or_else(|| CubeError::invalid_crs(format!("unsupported EPSG code {}", code)))
    }

    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:3035", "epsg:4326" or a bare "4326"
    /// - "CRS84", "OGC:CRS84", "CRS:84"
    /// - "+proj=laea +lat_0=52 +lon_0=10 +ellps=GRS80"
    /// - WKT1 or WKT2, with or without an authority
    pub fn parse(s: &str) -> CubeResult<Self> {
        let trimmed = s.trim();
        let upper = trimmed.to_uppercase();

        if is_crs84_alias(&upper) {
            return Ok(Self::crs84());
        }
        if let Some(code) = upper.strip_prefix("EPSG:") {
            return parse_epsg_number(code, s);
        }
        if !upper.is_empty() && upper.chars().all(|c| c.is_ascii_digit()) {
            return parse_epsg_number(&upper, s);
        }
        if trimmed.starts_with('+') {
            return proj_string::parse(trimmed);
        }
        if is_wkt(&upper) {
            return wkt::parse(trimmed);
        }
        Err(CubeError::invalid_crs(format!(
            "unrecognized CRS identifier '{}'",
            s
        )))
    }

    /// EPSG code, if this CRS has one.
    pub fn epsg_code(&self) -> Option<u32> {
        match self.id {
            Some(CrsId::Epsg(code)) => Some(code),
            _ => None,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        self.mapping.name().is_geographic()
    }

    /// Replace an unidentified definition by the matching built-in one.
    pub(crate) fn identified(self) -> Self {
        if self.id.is_some() {
            return self;
        }
        match registry::identify(&self).and_then(registry::lookup) {
            Some(known) => known,
            None => self,
        }
    }

    /// Projection for a projected CRS, `None` for geographic ones.
    ///
    /// Grid mappings without a projection implementation are an error here
    /// even though they are valid definitions.
    pub fn projection(&self) -> CubeResult<Option<Box<dyn Projection>>> {
        use GridMappingName as M;
        let m = &self.mapping;
        let ellipsoid = self.datum.ellipsoid;
        let fe = m.number("false_easting").unwrap_or(0.0);
        let fn_ = m.number("false_northing").unwrap_or(0.0);
        let parallels = || -> CubeResult<(f64, f64)> {
            match m.standard_parallels().as_slice() {
                [one] => Ok((*one, *one)),
                [one, two] => Ok((*one, *two)),
                _ => Err(CubeError::invalid_crs(format!(
                    "grid mapping '{}' needs one or two standard parallels",
                    m.name()
                ))),
            }
        };

        let projection: Box<dyn Projection> = match m.name() {
            M::LatitudeLongitude => return Ok(None),
            M::TransverseMercator => Box::new(TransverseMercator::new(
                m.require("longitude_of_central_meridian")?,
                m.require("latitude_of_projection_origin")?,
                m.require("scale_factor_at_central_meridian")?,
                fe,
                fn_,
                ellipsoid,
            )?),
            M::Mercator => {
                let lon0 = m.require("longitude_of_projection_origin")?;
                match m.standard_parallels().first() {
                    Some(sp) => {
                        Box::new(Mercator::with_standard_parallel(lon0, *sp, fe, fn_, ellipsoid)?)
                    }
                    None => Box::new(Mercator::new(
                        lon0,
                        m.require("scale_factor_at_projection_origin")?,
                        fe,
                        fn_,
                        ellipsoid,
                    )?),
                }
            }
            M::PseudoMercator => Box::new(WebMercator {
                radius: ellipsoid.semi_major_axis,
                lon0: m.require("longitude_of_projection_origin")?,
                false_easting: fe,
                false_northing: fn_,
            }),
            M::LambertConformalConic => {
                let (sp1, sp2) = parallels()?;
                let lcc = LambertConformal::new(
                    m.require("longitude_of_central_meridian")?,
                    m.require("latitude_of_projection_origin")?,
                    sp1,
                    sp2,
                    fe,
                    fn_,
                    ellipsoid,
                )?;
                match m.number("scale_factor_at_projection_origin") {
                    Some(k0) => Box::new(lcc.with_scale_factor(k0)?),
                    None => Box::new(lcc),
                }
            }
            M::LambertAzimuthalEqualArea => Box::new(LambertAzimuthalEqualArea::new(
                m.require("longitude_of_projection_origin")?,
                m.require("latitude_of_projection_origin")?,
                fe,
                fn_,
                ellipsoid,
            )?),
            M::AlbersConicalEqualArea => {
                let (sp1, sp2) = parallels()?;
                Box::new(AlbersEqualArea::new(
                    m.require("longitude_of_central_meridian")?,
                    m.require("latitude_of_projection_origin")?,
                    sp1,
                    sp2,
                    fe,
                    fn_,
                    ellipsoid,
                )?)
            }
            M::PolarStereographic => {
                let lon0 = m
                    .number("straight_vertical_longitude_from_pole")
                    .map_or_else(|| m.require("longitude_of_projection_origin"), Ok)?;
                match m.standard_parallels().first() {
                    Some(sp) => Box::new(PolarStereographic::with_standard_parallel(
                        lon0, *sp, fe, fn_, ellipsoid,
                    )?),
                    None => Box::new(PolarStereographic::with_scale_factor(
                        lon0,
                        m.require("latitude_of_projection_origin")? > 0.0,
                        m.require("scale_factor_at_projection_origin")?,
                        fe,
                        fn_,
                        ellipsoid,
                    )?),
                }
            }
            other => {
                return Err(CubeError::invalid_crs(format!(
                    "reprojection is not supported for grid mapping '{}'",
                    other
                )))
            }
        };
        Ok(Some(projection))
    }

    /// Transform a native (x, y) coordinate to CRS84 (lon, lat).
    pub fn to_crs84(&self, x: f64, y: f64) -> CubeResult<(f64, f64)> {
        match self.projection()? {
            Some(proj) => Ok(proj.inverse(x, y)?),
            None => Ok((x, y)),
        }
    }

    /// Transform a CRS84 (lon, lat) coordinate into this CRS.
    pub fn from_crs84(&self, lon: f64, lat: f64) -> CubeResult<(f64, f64)> {
        match self.projection()? {
            Some(proj) => Ok(proj.forward(lon, lat)?),
            None => Ok((lon, lat)),
        }
    }

    /// WKT1 representation.
    pub fn to_wkt(&self) -> String {
        wkt::write(self)
    }

    /// CF grid-mapping attributes for the `crs` variable.
    pub fn to_cf(&self) -> Attributes {
        let ellipsoid = &self.datum.ellipsoid;
        let mut attrs = Attributes::new();
        attrs.insert("crs_wkt".into(), json!(self.to_wkt()));
        if ellipsoid.is_sphere() {
            attrs.insert("earth_radius".into(), json!(ellipsoid.semi_major_axis));
        } else {
            attrs.insert("semi_major_axis".into(), json!(ellipsoid.semi_major_axis));
            attrs.insert("semi_minor_axis".into(), json!(ellipsoid.semi_minor_axis()));
            attrs.insert(
                "inverse_flattening".into(),
                json!(ellipsoid.inverse_flattening),
            );
        }
        attrs.insert(
            "reference_ellipsoid_name".into(),
            json!(self.datum.ellipsoid_name),
        );
        attrs.insert("longitude_of_prime_meridian".into(), json!(0.0));
        attrs.insert("prime_meridian_name".into(), json!("Greenwich"));
        attrs.insert("geographic_crs_name".into(), json!(self.geographic_name));
        attrs.insert("horizontal_datum_name".into(), json!(self.datum.name));
        if !self.is_geographic() {
            attrs.insert("projected_crs_name".into(), json!(self.name));
        }
        attrs.insert(
            "grid_mapping_name".into(),
            json!(self.mapping.name().as_str()),
        );
        for (key, value) in self.mapping.params() {
            attrs.insert(key.clone(), value.clone());
        }
        attrs
    }

    /// Reconstruct a CRS from CF grid-mapping attributes.
    ///
    /// `crs_wkt` (or GDAL's `spatial_ref`) takes precedence; otherwise the
    /// `grid_mapping_name` and its parameters are validated and kept.
    pub fn from_cf(attrs: &Attributes) -> CubeResult<Self> {
        for key in ["crs_wkt", "spatial_ref"] {
            if let Some(value) = attrs.get(key) {
                let wkt = value.as_str().ok_or_else(|| {
                    CubeError::invalid_crs(format!("attribute '{}' must be a string", key))
                })?;
                return wkt::parse(wkt);
            }
        }

        let name = attrs
            .get("grid_mapping_name")
            .and_then(Value::as_str)
            .ok_or_else(|| CubeError::invalid_crs("no CF grid mapping attributes found"))?;
        let mut kind = GridMappingName::parse(name).ok_or_else(|| {
            CubeError::invalid_crs(format!("unknown grid_mapping_name '{}'", name))
        })?;

        let text = |key: &str| attrs.get(key).and_then(Value::as_str);
        let projected_name = text("projected_crs_name").unwrap_or("unknown");
        if kind == GridMappingName::Mercator
            && projected_name.to_lowercase().contains("pseudo-mercator")
        {
            kind = GridMappingName::PseudoMercator;
        }
        let mapping = GridMapping::new(kind, attrs)?;

        let ellipsoid = cf_ellipsoid(attrs)?;
        let default_datum = if ellipsoid == Ellipsoid::WGS84 {
            registry::wgs84()
        } else {
            Datum::new("unknown", "unknown", ellipsoid)
        };
        let datum = Datum::new(
            text("horizontal_datum_name").unwrap_or(&default_datum.name),
            text("reference_ellipsoid_name").unwrap_or(&default_datum.ellipsoid_name),
            ellipsoid,
        );
        let geographic_name = text("geographic_crs_name").unwrap_or("unknown").to_string();
        let crs = Self {
            name: if kind.is_geographic() {
                geographic_name.clone()
            } else {
                projected_name.to_string()
            },
            id: None,
            geographic_name,
            datum,
            mapping,
        };
        Ok(crs.identified())
    }
}

impl FromStr for Crs {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crs::parse(s)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(CrsId::Crs84) => write!(f, "{}", CrsId::Crs84),
            Some(CrsId::Epsg(code)) if registry::lookup(code).is_some() => {
                write!(f, "{}", CrsId::Epsg(code))
            }
            _ => f.write_str(&self.to_wkt()),
        }
    }
}

/// Ellipsoid from CF attributes, WGS84 when none is given.
fn cf_ellipsoid(attrs: &Attributes) -> CubeResult<Ellipsoid> {
    let positive = |key: &str| -> CubeResult<Option<f64>> {
        match attrs.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(Some)
                .ok_or_else(|| {
                    CubeError::invalid_crs(format!(
                        "attribute '{}' must be a positive number",
                        key
                    ))
                }),
        }
    };

    if let Some(radius) = positive("earth_radius")? {
        return Ok(Ellipsoid::sphere(radius));
    }
    let Some(a) = positive("semi_major_axis")? else {
        return Ok(Ellipsoid::WGS84);
    };
    // An inverse flattening of 0 denotes a sphere
    let invf = match attrs.get("inverse_flattening").and_then(Value::as_f64) {
        Some(invf) if invf.is_finite() && invf >= 0.0 => Some(invf),
        Some(invf) => {
            return Err(CubeError::invalid_crs(format!(
                "attribute 'inverse_flattening' must not be negative, got {}",
                invf
            )))
        }
        None => None,
    };
    Ok(match (invf, positive("semi_minor_axis")?) {
        (Some(invf), _) => Ellipsoid::new(a, invf),
        (None, Some(b)) => Ellipsoid::from_axes(a, b),
        (None, None) => Ellipsoid::sphere(a),
    })
}

fn is_crs84_alias(upper: &str) -> bool {
    matches!(
        upper,
        "CRS84"
            | "OGC:CRS84"
            | "CRS:84"
            | "URN:OGC:DEF:CRS:OGC:1.3:CRS84"
            | "URN:OGC:DEF:CRS:OGC::CRS84"
            | "HTTP://WWW.OPENGIS.NET/DEF/CRS/OGC/1.3/CRS84"
    )
}

fn is_wkt(upper: &str) -> bool {
    let keyword: String = upper
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let rest = upper[keyword.len()..].trim_start();
    (rest.starts_with('[') || rest.starts_with('('))
        && matches!(
            keyword.as_str(),
            "GEOGCS"
                | "PROJCS"
                | "COMPD_CS"
                | "GEOGCRS"
                | "GEOGRAPHICCRS"
                | "GEODCRS"
                | "GEODETICCRS"
                | "PROJCRS"
                | "PROJECTEDCRS"
                | "BOUNDCRS"
                | "COMPOUNDCRS"
        )
}

fn parse_epsg_number(code: &str, original: &str) -> CubeResult<Crs> {
    let code: u32 = code
        .trim()
        .parse()
        .map_err(|_| CubeError::invalid_crs(format!("invalid EPSG code in '{}'", original)))?;
    Crs::epsg(code)
}
