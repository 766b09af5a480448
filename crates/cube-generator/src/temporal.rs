//! Time axis construction.

use serde_json::json;

use cube_common::time::format_iso8601_duration;
use cube_common::{
    ArrayValues, Attributes, Calendar, CalendarDateTime, CubeError, CubeResult, DataType,
    TimeStep, TimeUnits, Variable,
};

use crate::axis::BNDS_DIM;
use crate::config::TimeRepresentation;

/// Resolution of calendar-aware instants.
const CALENDAR_TICK_NANOS: i128 = 1_000;

/// Builder for a time axis of `periods` cells starting at `start`.
#[derive(Debug, Clone)]
pub struct TemporalAxisBuilder {
    name: String,
    start: CalendarDateTime,
    step: TimeStep,
    periods: usize,
    representation: TimeRepresentation,
    calendar: Calendar,
    units: TimeUnits,
    with_bounds: bool,
}

impl TemporalAxisBuilder {
    pub fn new(
        name: impl Into<String>,
        start: CalendarDateTime,
        step: TimeStep,
        periods: usize,
        representation: TimeRepresentation,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            step,
            periods,
            representation,
            calendar: Calendar::ProlepticGregorian,
            units: TimeUnits::default(),
            with_bounds: true,
        }
    }

    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn units(mut self, units: TimeUnits) -> Self {
        self.units = units;
        self
    }

    pub fn bounds(mut self, with_bounds: bool) -> Self {
        self.with_bounds = with_bounds;
        self
    }

    /// Generate `periods + 1` boundary instants and the cell centers
    /// between them.
    pub fn build(&self) -> CubeResult<TemporalAxis> {
        let tick = match self.representation {
            TimeRepresentation::Fixed(precision) => {
                if !self.calendar.is_gregorian() {
                    return Err(CubeError::config(format!(
                        "fixed-precision time cannot use the '{}' calendar",
                        self.calendar
                    )));
                }
                precision.tick_nanos()
            }
            TimeRepresentation::CalendarAware => CALENDAR_TICK_NANOS,
        };

        let step_nanos = self.step.nanos();
        if step_nanos % tick != 0 {
            return Err(CubeError::invalid_parameter(
                "time_res",
                format!(
                    "time step '{}' is not representable at {} ns resolution",
                    self.step, tick
                ),
            ));
        }
        let step_ticks = step_nanos / tick;
        let start_ticks = self.start.to_nanos(self.calendar)?.div_euclid(tick);

        let boundaries: Vec<i128> = (0..=self.periods as i128)
            .map(|i| (start_ticks + i * step_ticks) * tick)
            .collect();
        let half_step = (step_ticks / 2) * tick;
        let centers = boundaries[..self.periods]
            .iter()
            .map(|b| b + half_step)
            .collect();

        Ok(TemporalAxis {
            name: self.name.clone(),
            boundaries,
            centers,
            step: self.step,
            calendar: self.calendar,
            units: self.units,
            with_bounds: self.with_bounds,
        })
    }
}

/// A built time axis. Instants are nanoseconds since 1970-01-01 in the
/// axis calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalAxis {
    pub name: String,
    /// `periods + 1` cell edges
    pub boundaries: Vec<i128>,
    /// `periods` cell centers
    pub centers: Vec<i128>,
    pub step: TimeStep,
    pub calendar: Calendar,
    pub units: TimeUnits,
    with_bounds: bool,
}

impl TemporalAxis {
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn bounds_name(&self) -> String {
        format!("{}_{}", self.name, BNDS_DIM)
    }

    pub fn has_bounds(&self) -> bool {
        self.with_bounds
    }

    pub fn instant(&self, nanos: i128) -> CubeResult<CalendarDateTime> {
        CalendarDateTime::from_nanos(nanos, self.calendar)
    }

    /// The encoded time coordinate variable.
    pub fn coordinate_variable(&self) -> CubeResult<Variable> {
        let values = self.units.encode(&self.centers, self.calendar)?;
        let mut var = Variable::new(
            self.name.clone(),
            vec![self.name.clone()],
            vec![self.centers.len()],
            encoded_dtype(&values),
            values,
        )?
        .with_attr("standard_name", "time")
        .with_attr("long_name", "time")
        .with_attr("units", self.units.to_string())
        .with_attr("calendar", self.calendar.cf_name());
        if self.with_bounds {
            var.attrs.insert("bounds".into(), json!(self.bounds_name()));
        }
        Ok(var)
    }

    /// The encoded `(time, bnds)` variable, unless bounds are dropped.
    pub fn bounds_variable(&self) -> CubeResult<Option<Variable>> {
        if !self.with_bounds {
            return Ok(None);
        }
        let pairs: Vec<i128> = self
            .boundaries
            .windows(2)
            .flat_map(|w| [w[0], w[1]])
            .collect();
        let values = self.units.encode(&pairs, self.calendar)?;
        let var = Variable::new(
            self.bounds_name(),
            vec![self.name.clone(), BNDS_DIM.to_string()],
            vec![self.centers.len(), 2],
            encoded_dtype(&values),
            values,
        )?
        .with_attr("units", self.units.to_string())
        .with_attr("calendar", self.calendar.cf_name());
        Ok(Some(var))
    }

    /// `time_coverage_*` global attributes.
    pub fn coverage_attrs(&self) -> CubeResult<Attributes> {
        let first = self.boundaries.first().copied().unwrap_or_default();
        let last = self.boundaries.last().copied().unwrap_or(first);

        let mut attrs = Attributes::new();
        attrs.insert(
            "time_coverage_start".into(),
            json!(self.instant(first)?.to_string()),
        );
        attrs.insert(
            "time_coverage_end".into(),
            json!(self.instant(last)?.to_string()),
        );
        attrs.insert(
            "time_coverage_resolution".into(),
            json!(self.step.to_iso8601()),
        );
        attrs.insert(
            "time_coverage_duration".into(),
            json!(format_iso8601_duration(last - first)),
        );
        Ok(attrs)
    }
}

fn encoded_dtype(values: &ArrayValues) -> DataType {
    match values {
        ArrayValues::Int(_) => DataType::Int64,
        _ => DataType::Float64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_common::TimePrecision;

    fn daily(periods: usize) -> TemporalAxisBuilder {
        TemporalAxisBuilder::new(
            "time",
            CalendarDateTime::parse("2010-01-01T00:00:00").unwrap(),
            TimeStep::parse("1D").unwrap(),
            periods,
            TimeRepresentation::Fixed(TimePrecision::Seconds),
        )
    }

    #[test]
    fn test_daily_axis() {
        let axis = daily(5).build().unwrap();
        assert_eq!(axis.boundaries.len(), 6);
        assert_eq!(axis.len(), 5);

        let time = axis.coordinate_variable().unwrap();
        assert_eq!(time.dtype, DataType::Int64);
        assert_eq!(time.attr_str("units"), Some("seconds since 1970-01-01T00:00:00"));
        match &time.values {
            ArrayValues::Int(v) => {
                assert_eq!(v[0], 1_262_304_000 + 43_200);
                assert!(v.windows(2).all(|w| w[1] - w[0] == 86_400));
            }
            other => panic!("unexpected values {:?}", other),
        }
        assert!(time.is_strictly_increasing());
    }

    #[test]
    fn test_bounds_are_contiguous() {
        let axis = daily(3).build().unwrap();
        let bnds = axis.bounds_variable().unwrap().unwrap();
        assert_eq!(bnds.shape, vec![3, 2]);
        let ArrayValues::Int(v) = &bnds.values else {
            panic!("expected integer bounds");
        };
        for i in 0..2 {
            assert_eq!(v[2 * i + 1], v[2 * (i + 1)]);
        }
    }

    #[test]
    fn test_coverage_attrs() {
        let attrs = daily(5).build().unwrap().coverage_attrs().unwrap();
        assert_eq!(attrs["time_coverage_start"], "2010-01-01T00:00:00");
        assert_eq!(attrs["time_coverage_end"], "2010-01-06T00:00:00");
        assert_eq!(attrs["time_coverage_resolution"], "P1D");
        assert_eq!(attrs["time_coverage_duration"], "P5D");
    }

    #[test]
    fn test_odd_step_center_truncates() {
        let axis = TemporalAxisBuilder::new(
            "time",
            CalendarDateTime::parse("2000-01-01").unwrap(),
            TimeStep::parse("3S").unwrap(),
            2,
            TimeRepresentation::Fixed(TimePrecision::Seconds),
        )
        .build()
        .unwrap();
        assert_eq!(axis.centers[0] - axis.boundaries[0], 1_000_000_000);
    }

    #[test]
    fn test_step_below_precision() {
        let result = TemporalAxisBuilder::new(
            "time",
            CalendarDateTime::parse("2000-01-01").unwrap(),
            TimeStep::parse("500ms").unwrap(),
            2,
            TimeRepresentation::Fixed(TimePrecision::Seconds),
        )
        .build();
        assert!(matches!(result, Err(CubeError::InvalidParameter { .. })));
    }

    #[test]
    fn test_360_day_calendar() {
        let axis = TemporalAxisBuilder::new(
            "time",
            CalendarDateTime::parse("2000-02-29").unwrap(),
            TimeStep::parse("1D").unwrap(),
            2,
            TimeRepresentation::CalendarAware,
        )
        .calendar(Calendar::Day360)
        .units(TimeUnits::parse("days since 2000-01-01").unwrap())
        .build()
        .unwrap();

        let attrs = axis.coverage_attrs().unwrap();
        assert_eq!(attrs["time_coverage_end"], "2000-03-01T00:00:00");

        let time = axis.coordinate_variable().unwrap();
        assert_eq!(time.values, ArrayValues::Float(vec![58.5, 59.5]));
        assert_eq!(time.attr_str("calendar"), Some("360_day"));
    }

    #[test]
    fn test_fixed_precision_rejects_non_gregorian() {
        let result = daily(2).calendar(Calendar::Julian).build();
        assert!(matches!(result, Err(CubeError::Config(_))));
    }

    #[test]
    fn test_zero_periods() {
        let axis = daily(0).build().unwrap();
        assert!(axis.is_empty());
        let attrs = axis.coverage_attrs().unwrap();
        assert_eq!(attrs["time_coverage_duration"], "PT0S");
        assert_eq!(axis.coordinate_variable().unwrap().shape, vec![0]);
    }
}
