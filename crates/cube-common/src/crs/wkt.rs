//! Well-known text (WKT1 and WKT2) for coordinate reference systems.
//!
//! Parsing builds a node tree first, so authorities and parameters are
//! read from the node they belong to: the identifier of a CRS is the
//! `ID`/`AUTHORITY` that is a direct child of the outermost CRS node, never
//! one nested in its datum, ellipsoid or units.

use serde_json::{json, Value};

use projection::Ellipsoid;

use super::mapping::{GridMapping, GridMappingName};
use super::{registry, Crs, CrsId, Datum};
use crate::dataset::Attributes;
use crate::error::{CubeError, CubeResult};

/// A value inside a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WktValue {
    Text(String),
    Number(f64),
    Keyword(String),
    Node(WktNode),
}

/// `KEYWORD[arg, ...]`, with the keyword upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WktNode {
    pub keyword: String,
    pub args: Vec<WktValue>,
}

impl WktNode {
    fn is(&self, keywords: &[&str]) -> bool {
        keywords.contains(&self.keyword.as_str())
    }

    /// Direct child nodes with one of `keywords`.
    fn children(&self, keywords: &[&str]) -> Vec<&WktNode> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                WktValue::Node(node) if node.is(keywords) => Some(node),
                _ => None,
            })
            .collect()
    }

    fn child(&self, keywords: &[&str]) -> Option<&WktNode> {
        self.children(keywords).into_iter().next()
    }

    fn text(&self, index: usize) -> Option<&str> {
        match self.args.get(index) {
            Some(WktValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn number(&self, index: usize) -> Option<f64> {
        match self.args.get(index) {
            Some(WktValue::Number(n)) => Some(*n),
            // Some writers quote numbers
            Some(WktValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        self.text(0).unwrap_or("unknown")
    }

    /// `(authority, code)` of the node's own identifier.
    fn identifier(&self) -> Option<(String, String)> {
        let id = self.children(&["ID", "AUTHORITY"]).into_iter().last()?;
        let authority = id.text(0)?.to_uppercase();
        let code = match id.args.get(1)? {
            WktValue::Text(s) => s.trim().to_uppercase(),
            WktValue::Number(n) => format!("{}", n),
            _ => return None,
        };
        Some((authority, code))
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, what: &str) -> CubeError {
        CubeError::invalid_crs(format!("malformed WKT at offset {}: {}", self.pos, what))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.pos += 1;
        }
        let input = self.input;
        &input[start..self.pos]
    }

    fn node(&mut self) -> CubeResult<WktNode> {
        self.skip_whitespace();
        let keyword = self.identifier();
        if keyword.is_empty() {
            return Err(self.error("expected a keyword"));
        }
        self.skip_whitespace();
        let close = match self.peek() {
            Some('[') => ']',
            Some('(') => ')',
            _ => return Err(self.error("expected '[' after keyword")),
        };
        self.pos += 1;

        let mut node = WktNode {
            keyword: keyword.to_uppercase(),
            args: Vec::new(),
        };
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) && node.args.is_empty() {
                self.pos += 1;
                return Ok(node);
            }
            node.args.push(self.value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(node);
                }
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }
    }

    fn value(&mut self) -> CubeResult<WktValue> {
        match self.peek() {
            Some('"') => self.quoted().map(WktValue::Text),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                let word = self.identifier();
                self.skip_whitespace();
                if matches!(self.peek(), Some('[') | Some('(')) {
                    self.pos = start;
                    self.node().map(WktValue::Node)
                } else {
                    Ok(WktValue::Keyword(word.to_uppercase()))
                }
            }
            _ => Err(self.error("unexpected character")),
        }
    }

    fn quoted(&mut self) -> CubeResult<String> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            let c = self.peek().ok_or_else(|| self.error("unterminated string"))?;
            self.pos += c.len_utf8();
            if c == '"' {
                // A doubled quote is an escaped quote
                if self.peek() == Some('"') {
                    self.pos += 1;
                } else {
                    return Ok(text);
                }
            }
            text.push(c);
        }
    }

    fn number(&mut self) -> CubeResult<WktValue> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                break;
            }
            self.pos += 1;
        }
        self.input[start..self.pos]
            .parse()
            .map(WktValue::Number)
            .map_err(|_| self.error("invalid number"))
    }
}

/// Parse WKT text into its node tree.
pub(crate) fn parse_tree(wkt: &str) -> CubeResult<WktNode> {
    let mut parser = Parser { input: wkt, pos: 0 };
    let node = parser.node()?;
    parser.skip_whitespace();
    if parser.pos != wkt.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(node)
}

const GEOGRAPHIC: &[&str] = &[
    "GEOGCS",
    "GEOGCRS",
    "GEOGRAPHICCRS",
    "GEODCRS",
    "GEODETICCRS",
];
const PROJECTED: &[&str] = &["PROJCS", "PROJCRS", "PROJECTEDCRS"];
const BASE_GEOGRAPHIC: &[&str] = &["GEOGCS", "BASEGEOGCRS", "BASEGEODCRS"];
const DATUM: &[&str] = &["DATUM", "GEODETICDATUM", "TRF", "ENSEMBLE"];
const ELLIPSOID: &[&str] = &["SPHEROID", "ELLIPSOID"];
const UNIT: &[&str] = &["UNIT", "ANGLEUNIT", "LENGTHUNIT", "SCALEUNIT"];

/// Interpret a WKT CRS.
pub(crate) fn parse(wkt: &str) -> CubeResult<Crs> {
    let tree = parse_tree(wkt)?;
    let root = horizontal_crs(&tree)?;

    let id = match root.identifier() {
        Some((authority, code)) if authority == "EPSG" => {
            let code: u32 = code
                .parse()
                .map_err(|_| CubeError::invalid_crs(format!("invalid EPSG code '{}'", code)))?;
            if let Some(known) = registry::lookup(code) {
                return Ok(known);
            }
            Some(CrsId::Epsg(code))
        }
        Some((authority, code)) if authority == "OGC" && code == "CRS84" => {
            return Ok(Crs::crs84());
        }
        _ => None,
    };

    interpret(root, id)
}

/// The horizontal CRS inside bound and compound CRSs.
fn horizontal_crs(node: &WktNode) -> CubeResult<&WktNode> {
    match node.keyword.as_str() {
        "BOUNDCRS" => node
            .child(&["SOURCECRS"])
            .and_then(|source| source.args.iter().find_map(as_node))
            .ok_or_else(|| CubeError::invalid_crs("BOUNDCRS without a SOURCECRS"))
            .and_then(horizontal_crs),
        "COMPD_CS" | "COMPOUNDCRS" => node
            .args
            .iter()
            .filter_map(as_node)
            .find(|child| child.is(GEOGRAPHIC) || child.is(PROJECTED))
            .ok_or_else(|| CubeError::invalid_crs("compound CRS without a horizontal part")),
        _ => Ok(node),
    }
}

fn as_node(value: &WktValue) -> Option<&WktNode> {
    match value {
        WktValue::Node(node) => Some(node),
        _ => None,
    }
}

fn interpret(root: &WktNode, id: Option<CrsId>) -> CubeResult<Crs> {
    let (base, mapping) = if root.is(PROJECTED) {
        let base = root
            .child(BASE_GEOGRAPHIC)
            .ok_or_else(|| CubeError::invalid_crs("projected WKT without a base geographic CRS"))?;
        (base, projected_mapping(root)?)
    } else if root.is(GEOGRAPHIC) {
        (root, GridMapping::latitude_longitude())
    } else {
        return Err(CubeError::invalid_crs(format!(
            "unsupported WKT CRS type '{}'",
            root.keyword
        )));
    };

    Ok(Crs {
        name: root.name().to_string(),
        id,
        geographic_name: base.name().to_string(),
        datum: datum(base)?,
        mapping,
    })
}

fn datum(base: &WktNode) -> CubeResult<Datum> {
    let datum = base
        .child(DATUM)
        .ok_or_else(|| CubeError::invalid_crs("WKT without a datum"))?;
    let ellipsoid = datum
        .child(ELLIPSOID)
        .ok_or_else(|| CubeError::invalid_crs("WKT datum without an ellipsoid"))?;
    let a = ellipsoid.number(1);
    let invf = ellipsoid.number(2);
    let (a, invf) = match (a, invf) {
        (Some(a), Some(invf)) if a > 0.0 && invf >= 0.0 => (a, invf),
        _ => {
            return Err(CubeError::invalid_crs(format!(
                "invalid ellipsoid '{}'",
                ellipsoid.name()
            )))
        }
    };
    let factor = ellipsoid
        .child(UNIT)
        .and_then(|unit| unit.number(1))
        .unwrap_or(1.0);
    Ok(Datum::new(
        datum.name(),
        ellipsoid.name(),
        Ellipsoid::new(a * factor, invf),
    ))
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Which projection parameter a WKT parameter name denotes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Lat0,
    Lon0,
    ScaleFactor,
    FalseEasting,
    FalseNorthing,
    Parallel1,
    Parallel2,
    Azimuth,
    Height,
}

fn role(name: &str) -> Option<Role> {
    let role = match name {
        "latitudeoforigin"
        | "latitudeofnaturalorigin"
        | "latitudeofcenter"
        | "latitudeofcentre"
        | "latitudeoffalseorigin"
        | "latitudeofprojectioncentre"
        | "latitudeofprojectioncenter"
        | "latitudeofprojectionorigin" => Role::Lat0,
        "centralmeridian"
        | "longitudeofnaturalorigin"
        | "longitudeofcenter"
        | "longitudeofcentre"
        | "longitudeoffalseorigin"
        | "longitudeoforigin"
        | "longitudeofprojectioncentre"
        | "longitudeofprojectioncenter"
        | "longitudeofprojectionorigin"
        | "longitudeofcentralmeridian"
        | "straightverticallongitudefrompole" => Role::Lon0,
        "scalefactor"
        | "scalefactoratnaturalorigin"
        | "scalefactoroninitialline"
        | "scalefactoratcentralmeridian"
        | "scalefactoratprojectionorigin" => Role::ScaleFactor,
        "falseeasting" | "eastingatfalseorigin" | "eastingatprojectioncentre" => {
            Role::FalseEasting
        }
        "falsenorthing" | "northingatfalseorigin" | "northingatprojectioncentre" => {
            Role::FalseNorthing
        }
        "standardparallel1"
        | "standardparallel"
        | "latitudeof1ststandardparallel"
        | "latitudeofstandardparallel"
        | "latitudeoftruescale" => Role::Parallel1,
        "standardparallel2" | "latitudeof2ndstandardparallel" => Role::Parallel2,
        "azimuth" | "azimuthofinitialline" | "azimuthofcentralline" => Role::Azimuth,
        "satelliteheight" | "perspectivepointheight" | "viewpointheight" => Role::Height,
        _ => return None,
    };
    Some(role)
}

fn method(name: &str) -> Option<GridMappingName> {
    let mapping = match name {
        "transversemercator" | "gausskruger" => GridMappingName::TransverseMercator,
        "mercator" | "mercator1sp" | "mercator2sp" | "mercatorvarianta" | "mercatorvariantb" => {
            GridMappingName::Mercator
        }
        "popularvisualisationpseudomercator" | "mercatorauxiliarysphere" => {
            GridMappingName::PseudoMercator
        }
        "lambertconformalconic"
        | "lambertconformalconic1sp"
        | "lambertconformalconic2sp"
        | "lambertconicconformal1sp"
        | "lambertconicconformal2sp" => GridMappingName::LambertConformalConic,
        "lambertazimuthalequalarea" | "lambertazimuthalequalareaspherical" => {
            GridMappingName::LambertAzimuthalEqualArea
        }
        "albersconicequalarea" | "albersequalarea" | "albersconicalequalarea" => {
            GridMappingName::AlbersConicalEqualArea
        }
        "polarstereographic" | "polarstereographicvarianta" | "polarstereographicvariantb" => {
            GridMappingName::PolarStereographic
        }
        "stereographic" | "obliquestereographic" => GridMappingName::Stereographic,
        "orthographic" => GridMappingName::Orthographic,
        "sinusoidal" => GridMappingName::Sinusoidal,
        "azimuthalequidistant" | "modifiedazimuthalequidistant" => {
            GridMappingName::AzimuthalEquidistant
        }
        "cylindricalequalarea"
        | "lambertcylindricalequalarea"
        | "lambertcylindricalequalareaspherical" => GridMappingName::LambertCylindricalEqualArea,
        "hotineobliquemercator"
        | "hotineobliquemercatorvarianta"
        | "hotineobliquemercatorvariantb"
        | "hotineobliquemercatorazimuthcenter"
        | "obliquemercator" => GridMappingName::ObliqueMercator,
        "geostationarysatellite" | "geostationarysatellitesweepx" | "geostationarysatellitesweepy" => {
            GridMappingName::Geostationary
        }
        "verticalperspective" => GridMappingName::VerticalPerspective,
        "rotatedlatitudelongitude" => GridMappingName::RotatedLatitudeLongitude,
        _ => return None,
    };
    Some(mapping)
}

/// CF attribute receiving a parameter role for a given mapping.
fn cf_key(mapping: GridMappingName, role: Role) -> Option<&'static str> {
    use GridMappingName as M;
    let key = match role {
        Role::Lat0 => match mapping {
            M::Sinusoidal | M::LambertCylindricalEqualArea => return None,
            _ => "latitude_of_projection_origin",
        },
        Role::Lon0 => match mapping {
            M::TransverseMercator
            | M::LambertConformalConic
            | M::AlbersConicalEqualArea
            | M::Sinusoidal
            | M::LambertCylindricalEqualArea => "longitude_of_central_meridian",
            M::PolarStereographic => "straight_vertical_longitude_from_pole",
            _ => "longitude_of_projection_origin",
        },
        Role::ScaleFactor => match mapping {
            M::TransverseMercator => "scale_factor_at_central_meridian",
            M::PseudoMercator | M::Sinusoidal | M::AlbersConicalEqualArea => return None,
            _ => "scale_factor_at_projection_origin",
        },
        Role::FalseEasting => "false_easting",
        Role::FalseNorthing => "false_northing",
        Role::Parallel1 | Role::Parallel2 => "standard_parallel",
        Role::Azimuth => "azimuth_of_central_line",
        Role::Height => "perspective_point_height",
    };
    Some(key)
}

/// Value of a WKT parameter in degrees or metres.
fn parameter_value(param: &WktNode) -> Option<Value> {
    match param.args.get(1)? {
        WktValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some(json!(n)),
            Err(_) => Some(json!(s.trim())),
        },
        WktValue::Number(n) => {
            let value = match param.child(UNIT) {
                Some(unit) if unit.keyword == "ANGLEUNIT" && !is_degree(unit) => unit
                    .number(1)
                    .map(|radians_per_unit| (n * radians_per_unit).to_degrees())
                    .unwrap_or(*n),
                Some(unit) if unit.keyword == "LENGTHUNIT" => {
                    unit.number(1).map(|metres| n * metres).unwrap_or(*n)
                }
                _ => *n,
            };
            Some(json!(value))
        }
        _ => None,
    }
}

fn is_degree(unit: &WktNode) -> bool {
    normalize_name(unit.name()).starts_with("degree")
}

fn projected_mapping(root: &WktNode) -> CubeResult<GridMapping> {
    // WKT2 nests the method and parameters in CONVERSION
    let conversion = root.child(&["CONVERSION", "DERIVINGCONVERSION"]).unwrap_or(root);
    let method_name = conversion
        .child(&["PROJECTION", "METHOD"])
        .map(|m| m.name().to_string())
        .ok_or_else(|| CubeError::invalid_crs("projected WKT without a projection method"))?;
    let normalized_method = normalize_name(&method_name);
    let kind = method(&normalized_method).ok_or_else(|| {
        CubeError::invalid_crs(format!(
            "unsupported WKT projection method '{}'",
            method_name
        ))
    })?;

    let mut attrs = Attributes::new();
    let mut parallels: Vec<(Role, f64)> = Vec::new();
    let mut lat0 = None;
    let mut scale = None;
    for param in conversion.children(&["PARAMETER"]) {
        let normalized = normalize_name(param.name());
        let Some(value) = parameter_value(param) else {
            continue;
        };
        match role(&normalized) {
            Some(r @ (Role::Parallel1 | Role::Parallel2)) => {
                if let Some(v) = value.as_f64() {
                    parallels.push((r, v));
                }
            }
            Some(Role::Lat0) => lat0 = value.as_f64(),
            Some(Role::ScaleFactor) => scale = value.as_f64(),
            Some(r) => {
                if let Some(key) = cf_key(kind, r) {
                    attrs.insert(key.to_string(), value);
                }
            }
            // Parameters written under their CF name
            None => {
                let key = param.name().to_string();
                attrs.insert(key, value);
            }
        }
    }
    parallels.sort_by_key(|(r, _)| *r == Role::Parallel2);
    let parallels: Vec<f64> = parallels.into_iter().map(|(_, v)| v).collect();

    resolve_variants(kind, &mut attrs, lat0, scale, &parallels);
    if kind == GridMappingName::Geostationary
        && !attrs.contains_key("sweep_angle_axis")
        && !attrs.contains_key("fixed_angle_axis")
    {
        // PROJ sweeps around y unless told otherwise
        let axis = if normalized_method.ends_with("sweepx") { "x" } else { "y" };
        attrs.insert("sweep_angle_axis".to_string(), json!(axis));
    }
    GridMapping::new(kind, &attrs)
}

/// Place latitude of origin, scale factor and standard parallels, whose
/// meaning depends on the method variant.
fn resolve_variants(
    kind: GridMappingName,
    attrs: &mut Attributes,
    lat0: Option<f64>,
    scale: Option<f64>,
    parallels: &[f64],
) {
    use GridMappingName as M;
    let mut insert = |key: &str, value: Value| {
        attrs.insert(key.to_string(), value);
    };
    let parallels_value = || match parallels {
        [single] => json!(single),
        many => json!(many),
    };

    match kind {
        M::PolarStereographic => {
            // GDAL writes the latitude of true scale as latitude_of_origin
            let (origin, true_scale) = match (lat0, parallels.first()) {
                (Some(lat), None) if lat.abs() != 90.0 => (90f64.copysign(lat), Some(lat)),
                (Some(lat), sp) => (lat, sp.copied()),
                (None, Some(sp)) => (90f64.copysign(*sp), Some(*sp)),
                (None, None) => (90.0, None),
            };
            insert("latitude_of_projection_origin", json!(origin));
            match true_scale {
                Some(sp) if sp.abs() != 90.0 => insert("standard_parallel", json!(sp)),
                _ => insert(
                    "scale_factor_at_projection_origin",
                    json!(scale.unwrap_or(1.0)),
                ),
            }
        }
        M::LambertConformalConic => {
            let origin = lat0.or(parallels.first().copied());
            if let Some(lat) = origin {
                insert("latitude_of_projection_origin", json!(lat));
            }
            if parallels.is_empty() {
                // 1SP: tangent at the latitude of origin
                if let Some(lat) = origin {
                    insert("standard_parallel", json!(lat));
                }
            } else {
                insert("standard_parallel", parallels_value());
            }
            if let Some(k0) = scale.filter(|k| *k != 1.0) {
                insert("scale_factor_at_projection_origin", json!(k0));
            }
        }
        M::Mercator | M::LambertCylindricalEqualArea => {
            if parallels.is_empty() {
                insert(
                    "scale_factor_at_projection_origin",
                    json!(scale.unwrap_or(1.0)),
                );
            } else {
                insert("standard_parallel", parallels_value());
            }
        }
        M::PseudoMercator => {
            insert("standard_parallel", json!(0.0));
        }
        _ => {
            if let Some(lat) = lat0 {
                if let Some(key) = cf_key(kind, Role::Lat0) {
                    insert(key, json!(lat));
                }
            }
            if let Some(k0) = scale {
                if let Some(key) = cf_key(kind, Role::ScaleFactor) {
                    insert(key, json!(k0));
                }
            }
            if !parallels.is_empty() {
                insert("standard_parallel", parallels_value());
            }
        }
    }

    // Methods whose origin defaults to the equator
    if matches!(
        kind,
        M::TransverseMercator
            | M::AlbersConicalEqualArea
            | M::LambertConformalConic
            | M::Geostationary
            | M::VerticalPerspective
    ) && !attrs.contains_key("latitude_of_projection_origin")
    {
        attrs.insert("latitude_of_projection_origin".to_string(), json!(0.0));
    }
    if matches!(kind, M::Mercator | M::PseudoMercator)
        && !attrs.contains_key("longitude_of_projection_origin")
    {
        attrs.insert("longitude_of_projection_origin".to_string(), json!(0.0));
    }
}

/// WKT1 method name written for a grid mapping.
fn method_name(mapping: &GridMapping) -> &'static str {
    use GridMappingName as M;
    match mapping.name() {
        M::AlbersConicalEqualArea => "Albers_Conic_Equal_Area",
        M::AzimuthalEquidistant => "Azimuthal_Equidistant",
        M::Geostationary => "Geostationary_Satellite",
        M::LambertAzimuthalEqualArea => "Lambert_Azimuthal_Equal_Area",
        M::LambertConformalConic => "Lambert_Conformal_Conic_2SP",
        M::LambertCylindricalEqualArea => "Cylindrical_Equal_Area",
        M::LatitudeLongitude => "Latitude_Longitude",
        M::Mercator if mapping.params().contains_key("standard_parallel") => "Mercator_2SP",
        M::Mercator => "Mercator_1SP",
        M::PseudoMercator => "Popular_Visualisation_Pseudo_Mercator",
        M::ObliqueMercator => "Hotine_Oblique_Mercator_Azimuth_Center",
        M::Orthographic => "Orthographic",
        M::PolarStereographic => "Polar_Stereographic",
        M::RotatedLatitudeLongitude => "Rotated_Latitude_Longitude",
        M::Sinusoidal => "Sinusoidal",
        M::Stereographic => "Stereographic",
        M::TransverseMercator => "Transverse_Mercator",
        M::VerticalPerspective => "Vertical_Perspective",
    }
}

/// WKT1 `PARAMETER[..]` entries for a grid mapping.
fn parameters(mapping: &GridMapping) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    if mapping.name() == GridMappingName::PolarStereographic {
        let origin = match mapping.standard_parallels().first() {
            Some(sp) => *sp,
            None => mapping
                .number("latitude_of_projection_origin")
                .unwrap_or(90.0),
        };
        out.push(("latitude_of_origin".to_string(), json!(origin)));
    }

    for (key, value) in mapping.params() {
        let name = match key.as_str() {
            "latitude_of_projection_origin" => {
                if mapping.name() == GridMappingName::PolarStereographic {
                    continue;
                }
                "latitude_of_origin"
            }
            "longitude_of_projection_origin"
            | "longitude_of_central_meridian"
            | "straight_vertical_longitude_from_pole" => "central_meridian",
            "scale_factor_at_central_meridian" | "scale_factor_at_projection_origin" => {
                "scale_factor"
            }
            "azimuth_of_central_line" => "azimuth",
            "perspective_point_height" => "satellite_height",
            "standard_parallel" => {
                if mapping.name() == GridMappingName::PolarStereographic
                    || mapping.name() == GridMappingName::PseudoMercator
                {
                    continue;
                }
                let parallels = mapping.standard_parallels();
                let (first, second) = match parallels.as_slice() {
                    [one] => (*one, *one),
                    [one, two, ..] => (*one, *two),
                    [] => continue,
                };
                out.push(("standard_parallel_1".to_string(), json!(first)));
                if mapping.name() == GridMappingName::LambertConformalConic
                    || mapping.name() == GridMappingName::AlbersConicalEqualArea
                    || first != second
                {
                    out.push(("standard_parallel_2".to_string(), json!(second)));
                }
                continue;
            }
            other => other,
        };
        out.push((name.to_string(), value.clone()));
    }
    out
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        other => other.to_string(),
    }
}

fn geogcs(crs: &Crs, authority: Option<String>) -> String {
    let ellipsoid = &crs.datum.ellipsoid;
    let mut wkt = format!(
        "GEOGCS[{},DATUM[{},SPHEROID[{},{},{}]],PRIMEM[\"Greenwich\",0],\
         UNIT[\"degree\",0.0174532925199433]",
        quote(&crs.geographic_name),
        quote(&crs.datum.name),
        quote(&crs.datum.ellipsoid_name),
        ellipsoid.semi_major_axis,
        ellipsoid.inverse_flattening
    );
    if let Some(authority) = authority {
        wkt.push(',');
        wkt.push_str(&authority);
    }
    wkt.push(']');
    wkt
}

/// WKT1 representation.
pub(crate) fn write(crs: &Crs) -> String {
    let authority = crs.id.map(|id| match id {
        CrsId::Epsg(code) => format!("AUTHORITY[\"EPSG\",\"{}\"]", code),
        CrsId::Crs84 => "AUTHORITY[\"OGC\",\"CRS84\"]".to_string(),
    });

    if crs.mapping.name().is_geographic() {
        let mut geographic = crs.clone();
        geographic.geographic_name = crs.name.clone();
        return geogcs(&geographic, authority);
    }

    let mut wkt = format!(
        "PROJCS[{},{},PROJECTION[{}]",
        quote(&crs.name),
        geogcs(crs, None),
        quote(method_name(&crs.mapping))
    );
    for (name, value) in parameters(&crs.mapping) {
        wkt.push_str(&format!(",PARAMETER[{},{}]", quote(&name), format_value(&value)));
    }
    wkt.push_str(",UNIT[\"metre\",1],AXIS[\"Easting\",EAST],AXIS[\"Northing\",NORTH]");
    if let Some(authority) = authority {
        wkt.push(',');
        wkt.push_str(&authority);
    }
    wkt.push(']');
    wkt
}
