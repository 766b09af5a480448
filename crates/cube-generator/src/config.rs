//! Configuration for the cube generator.
//!
//! [`CubeConfig`] enumerates every generator option with its default and
//! is what callers (and YAML files) provide. [`CubeConfig::resolve`]
//! normalizes it exactly once into [`ResolvedCube`]: scalar options are
//! broadcast to (x, y) pairs and the CRS, time step and instants are parsed.

use serde::{Deserialize, Serialize};

use cube_common::{
    Attributes, Calendar, CalendarDateTime, Crs, CubeError, CubeResult, DataType, TimePrecision,
    TimeStep, TimeUnits,
};

/// A value given either once for both axes or separately for (x, y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pair<T> {
    Both(T),
    XY(T, T),
}

impl<T: Clone> Pair<T> {
    pub fn both(value: T) -> Self {
        Pair::Both(value)
    }

    pub fn xy(x: T, y: T) -> Self {
        Pair::XY(x, y)
    }

    /// Broadcast to an (x, y) tuple.
    pub fn resolve(&self) -> (T, T) {
        match self {
            Pair::Both(v) => (v.clone(), v.clone()),
            Pair::XY(x, y) => (x.clone(), y.clone()),
        }
    }
}

/// A data variable to add to the cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataVariableSpec {
    pub name: String,
    pub dtype: DataType,
    #[serde(default)]
    pub attrs: Attributes,
}

impl DataVariableSpec {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            attrs: Attributes::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Generator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Number of grid cells along x and y.
    pub xy_size: Pair<usize>,

    /// Spatial tile (chunk) size; automatic chunking when unset.
    pub xy_tile_size: Option<Pair<usize>>,

    /// Names of the x and y coordinate variables.
    pub xy_names: (String, String),

    /// Data type of both coordinate variables.
    pub xy_dtype: DataType,

    pub xy_units: Pair<String>,

    /// Cell size along x and y.
    pub xy_res: Pair<f64>,

    /// Minimum x and y cell edge.
    pub xy_start: (f64, f64),

    /// Create a decreasing y axis.
    pub inverse_y: bool,

    pub time_name: String,

    /// Fixed-precision timestamps. Mutually exclusive with `use_cftime`.
    pub time_precision: Option<TimePrecision>,

    /// CF time units used to encode time values.
    pub time_units: String,

    pub time_calendar: Calendar,

    /// Number of time steps.
    pub time_periods: usize,

    /// Time step as a frequency string such as `1D` or `6H`.
    pub time_res: String,

    /// First time boundary.
    pub time_start: String,

    /// Calendar-aware timestamps. Mutually exclusive with `time_precision`.
    pub use_cftime: bool,

    /// Omit all `*_bnds` variables.
    pub drop_bounds: bool,

    pub variables: Vec<DataVariableSpec>,

    /// CRS identifier. Geographic CRS84 is assumed for the geospatial
    /// attributes when unset, and no `crs` variable is written.
    pub crs: Option<String>,

    /// Global attributes overriding the library defaults.
    pub metadata: Attributes,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            xy_size: Pair::XY(3600, 1800),
            xy_tile_size: None,
            xy_names: ("lon".to_string(), "lat".to_string()),
            xy_dtype: DataType::Float64,
            xy_units: Pair::XY("degrees_east".to_string(), "degrees_north".to_string()),
            xy_res: Pair::Both(360.0 / 3600.0),
            xy_start: (-180.0, -90.0),
            inverse_y: false,
            time_name: "time".to_string(),
            time_precision: Some(TimePrecision::Seconds),
            time_units: "seconds since 1970-01-01T00:00:00".to_string(),
            time_calendar: Calendar::ProlepticGregorian,
            time_periods: 5,
            time_res: "1D".to_string(),
            time_start: "2010-01-01T00:00:00".to_string(),
            use_cftime: false,
            drop_bounds: false,
            variables: Vec::new(),
            crs: None,
            metadata: Attributes::new(),
        }
    }
}

/// How time instants are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRepresentation {
    /// Fixed-precision timestamps on the proleptic Gregorian calendar
    Fixed(TimePrecision),
    /// Calendar-aware timestamps with microsecond resolution
    CalendarAware,
}

/// A fully normalized generator configuration.
#[derive(Debug, Clone)]
pub struct ResolvedCube {
    pub width: usize,
    pub height: usize,
    pub tile_size: Option<(usize, usize)>,
    pub x_name: String,
    pub y_name: String,
    pub xy_dtype: DataType,
    pub x_units: String,
    pub y_units: String,
    pub x_res: f64,
    pub y_res: f64,
    pub x_start: f64,
    pub y_start: f64,
    pub inverse_y: bool,
    pub time_name: String,
    pub time_representation: TimeRepresentation,
    pub time_units: TimeUnits,
    pub time_calendar: Calendar,
    pub time_periods: usize,
    pub time_step: TimeStep,
    pub time_start: CalendarDateTime,
    pub drop_bounds: bool,
    pub variables: Vec<DataVariableSpec>,
    pub crs: Option<Crs>,
    pub metadata: Attributes,
}

impl CubeConfig {
    /// Validate option combinations that cannot be checked per field.
    pub fn validate(&self) -> CubeResult<()> {
        match (self.time_precision, self.use_cftime) {
            (Some(_), true) => {
                return Err(CubeError::config(
                    "time_precision must not be set when use_cftime is enabled",
                ))
            }
            (None, false) => {
                return Err(CubeError::config(
                    "either time_precision or use_cftime must be set",
                ))
            }
            (Some(_), false) if !self.time_calendar.is_gregorian() => {
                return Err(CubeError::config(format!(
                    "fixed-precision time requires a Gregorian calendar, got '{}'; \
                     enable use_cftime instead",
                    self.time_calendar
                )))
            }
            _ => {}
        }

        if self.xy_names.0.is_empty() || self.xy_names.1.is_empty() {
            return Err(CubeError::config("xy_names must not be empty"));
        }
        if self.xy_names.0 == self.xy_names.1 {
            return Err(CubeError::config(format!(
                "x and y must have different names, both are '{}'",
                self.xy_names.0
            )));
        }
        if self.time_name.is_empty() {
            return Err(CubeError::config("time_name must not be empty"));
        }
        if !self.xy_dtype.is_float() {
            return Err(CubeError::invalid_parameter(
                "xy_dtype",
                format!("coordinates must be float32 or float64, got {}", self.xy_dtype),
            ));
        }

        let (x_res, y_res) = self.xy_res.resolve();
        for (axis, res) in [("x", x_res), ("y", y_res)] {
            if !res.is_finite() || res <= 0.0 {
                return Err(CubeError::invalid_parameter(
                    "xy_res",
                    format!("{} resolution must be positive, got {}", axis, res),
                ));
            }
        }
        if let Some(tile) = &self.xy_tile_size {
            let (tx, ty) = tile.resolve();
            if tx == 0 || ty == 0 {
                return Err(CubeError::invalid_parameter(
                    "xy_tile_size",
                    "tile size must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Validate and normalize into a [`ResolvedCube`].
    ///
    /// The CRS identifier is parsed here, so a malformed CRS fails before
    /// any coordinate is computed.
    pub fn resolve(&self) -> CubeResult<ResolvedCube> {
        self.validate()?;

        let (width, height) = self.xy_size.resolve();
        let (x_units, y_units) = self.xy_units.resolve();
        let (x_res, y_res) = self.xy_res.resolve();
        let crs = self.crs.as_deref().map(Crs::parse).transpose()?;

        let time_representation = match self.time_precision {
            Some(precision) => TimeRepresentation::Fixed(precision),
            None => TimeRepresentation::CalendarAware,
        };

        Ok(ResolvedCube {
            width,
            height,
            tile_size: self.xy_tile_size.as_ref().map(Pair::resolve),
            x_name: self.xy_names.0.clone(),
            y_name: self.xy_names.1.clone(),
            xy_dtype: self.xy_dtype,
            x_units,
            y_units,
            x_res,
            y_res,
            x_start: self.xy_start.0,
            y_start: self.xy_start.1,
            inverse_y: self.inverse_y,
            time_name: self.time_name.clone(),
            time_representation,
            time_units: TimeUnits::parse(&self.time_units)?,
            time_calendar: self.time_calendar,
            time_periods: self.time_periods,
            time_step: TimeStep::parse(&self.time_res)?,
            time_start: CalendarDateTime::parse(&self.time_start)?,
            drop_bounds: self.drop_bounds,
            variables: self.variables.clone(),
            crs,
            metadata: self.metadata.clone(),
        })
    }
}
