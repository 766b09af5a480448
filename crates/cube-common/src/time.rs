//! Time handling for cube time axes.
//!
//! Instants are carried as signed nanoseconds since `1970-01-01T00:00:00`
//! in a given [`Calendar`]. Every supported calendar has fixed 86400-second
//! days, so sub-month steps are plain nanosecond arithmetic once a date has
//! been converted to a day number.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dataset::ArrayValues;
use crate::error::{CubeError, CubeResult};

pub const NANOS_PER_SECOND: i128 = 1_000_000_000;
const SECONDS_PER_DAY: i128 = 86_400;
const NANOS_PER_DAY: i128 = SECONDS_PER_DAY * NANOS_PER_SECOND;

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;
/// Julian day number of 1970-01-01.
const UNIX_EPOCH_JDN: i64 = 2_440_588;
/// Day number of 1582-10-15, the first Gregorian day of the standard calendar.
const GREGORIAN_REFORM_DAY: i64 = -141_427;

/// Length unit of a time step or of CF time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds.
    pub fn nanos(&self) -> i128 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => NANOS_PER_SECOND,
            TimeUnit::Minutes => 60 * NANOS_PER_SECOND,
            TimeUnit::Hours => 3_600 * NANOS_PER_SECOND,
            TimeUnit::Days => NANOS_PER_DAY,
            TimeUnit::Weeks => 7 * NANOS_PER_DAY,
        }
    }

    /// Parse a pandas-style frequency alias (`D`, `6H` without the count).
    pub fn from_frequency_alias(s: &str) -> Option<Self> {
        match s {
            "ns" | "N" => Some(TimeUnit::Nanoseconds),
            "us" | "U" => Some(TimeUnit::Microseconds),
            "ms" | "L" => Some(TimeUnit::Milliseconds),
            "S" | "s" => Some(TimeUnit::Seconds),
            "T" | "min" => Some(TimeUnit::Minutes),
            "H" | "h" => Some(TimeUnit::Hours),
            "D" | "d" => Some(TimeUnit::Days),
            "W" | "w" => Some(TimeUnit::Weeks),
            _ => None,
        }
    }

    /// Canonical frequency alias.
    pub fn frequency_alias(&self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "S",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "H",
            TimeUnit::Days => "D",
            TimeUnit::Weeks => "W",
        }
    }

    /// Parse a CF/UDUNITS time unit name (`days`, `hour`, `s`).
    pub fn from_cf_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nanoseconds" | "nanosecond" | "ns" => Some(TimeUnit::Nanoseconds),
            "microseconds" | "microsecond" | "us" => Some(TimeUnit::Microseconds),
            "milliseconds" | "millisecond" | "ms" => Some(TimeUnit::Milliseconds),
            "seconds" | "second" | "secs" | "sec" | "s" => Some(TimeUnit::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(TimeUnit::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(TimeUnit::Hours),
            "days" | "day" | "d" => Some(TimeUnit::Days),
            "weeks" | "week" => Some(TimeUnit::Weeks),
            _ => None,
        }
    }

    /// CF unit name.
    pub fn cf_name(&self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
        }
    }
}

/// Tick size of a fixed-precision timestamp axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePrecision {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimePrecision {
    /// Nanoseconds per tick.
    pub fn tick_nanos(&self) -> i128 {
        match self {
            TimePrecision::Seconds => NANOS_PER_SECOND,
            TimePrecision::Milliseconds => 1_000_000,
            TimePrecision::Microseconds => 1_000,
            TimePrecision::Nanoseconds => 1,
        }
    }

    /// Short unit code (`s`, `ms`, `us`, `ns`).
    pub fn code(&self) -> &'static str {
        match self {
            TimePrecision::Seconds => "s",
            TimePrecision::Milliseconds => "ms",
            TimePrecision::Microseconds => "us",
            TimePrecision::Nanoseconds => "ns",
        }
    }
}

impl FromStr for TimePrecision {
    type Err = CubeError;

    /// Accepts `s`, `seconds` and the `datetime64[s]` notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix("datetime64[")
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s.trim());
        match inner {
            "s" | "seconds" => Ok(TimePrecision::Seconds),
            "ms" | "milliseconds" => Ok(TimePrecision::Milliseconds),
            "us" | "microseconds" => Ok(TimePrecision::Microseconds),
            "ns" | "nanoseconds" => Ok(TimePrecision::Nanoseconds),
            _ => Err(CubeError::invalid_parameter(
                "time_precision",
                format!("unsupported precision '{}'", s),
            )),
        }
    }
}

impl fmt::Display for TimePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "datetime64[{}]", self.code())
    }
}

/// CF calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Calendar {
    /// Mixed Julian/Gregorian with the 1582-10-15 reform
    #[serde(rename = "standard", alias = "gregorian")]
    Standard,
    #[serde(rename = "proleptic_gregorian")]
    ProlepticGregorian,
    #[serde(rename = "julian")]
    Julian,
    #[serde(rename = "noleap", alias = "365_day")]
    NoLeap,
    #[serde(rename = "all_leap", alias = "366_day")]
    AllLeap,
    #[serde(rename = "360_day")]
    Day360,
}

const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

impl Calendar {
    /// CF calendar attribute value.
    pub fn cf_name(&self) -> &'static str {
        match self {
            Calendar::Standard => "standard",
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::Julian => "julian",
            Calendar::NoLeap => "noleap",
            Calendar::AllLeap => "all_leap",
            Calendar::Day360 => "360_day",
        }
    }

    /// Whether the calendar agrees with the proleptic Gregorian calendar
    /// for modern dates.
    pub fn is_gregorian(&self) -> bool {
        matches!(self, Calendar::Standard | Calendar::ProlepticGregorian)
    }

    /// Number of days in a month of the given year.
    pub fn days_in_month(&self, year: i64, month: u32) -> u32 {
        if !(1..=12).contains(&month) {
            return 0;
        }
        let base = MONTH_DAYS[(month - 1) as usize];
        match self {
            Calendar::Day360 => 30,
            Calendar::NoLeap => base,
            Calendar::AllLeap => {
                if month == 2 {
                    29
                } else {
                    base
                }
            }
            Calendar::Julian | Calendar::Standard | Calendar::ProlepticGregorian => {
                if month == 2 && self.is_leap_year(year) {
                    29
                } else {
                    base
                }
            }
        }
    }

    fn is_leap_year(&self, year: i64) -> bool {
        let julian = year.rem_euclid(4) == 0;
        let gregorian = julian && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0);
        match self {
            Calendar::ProlepticGregorian => gregorian,
            Calendar::Julian => julian,
            Calendar::Standard => {
                if year > 1582 {
                    gregorian
                } else {
                    julian
                }
            }
            Calendar::NoLeap | Calendar::Day360 => false,
            Calendar::AllLeap => true,
        }
    }

    /// Day number of a date relative to 1970-01-01 in this calendar.
    pub fn days_from_epoch(&self, year: i64, month: u32, day: u32) -> CubeResult<i64> {
        if day == 0 || day > self.days_in_month(year, month) {
            return Err(CubeError::invalid_time(format!(
                "{:04}-{:02}-{:02} is not a valid date in the {} calendar",
                year,
                month,
                day,
                self.cf_name()
            )));
        }
        let days = match self {
            Calendar::ProlepticGregorian => gregorian_days(year, month, day),
            Calendar::Julian => julian_days(year, month, day),
            Calendar::Standard => {
                if (year, month, day) >= (1582, 10, 15) {
                    gregorian_days(year, month, day)
                } else if (year, month, day) < (1582, 10, 5) {
                    julian_days(year, month, day)
                } else {
                    return Err(CubeError::invalid_time(format!(
                        "1582-10-{:02} does not exist in the standard calendar",
                        day
                    )));
                }
            }
            Calendar::NoLeap => fixed_year_days(year, month, day, 365, false),
            Calendar::AllLeap => fixed_year_days(year, month, day, 366, true),
            Calendar::Day360 => year
                .checked_sub(1970)
                .and_then(|y| y.checked_mul(360))
                .and_then(|d| d.checked_add(30 * (month as i64 - 1) + day as i64 - 1)),
        };
        days.ok_or_else(|| CubeError::invalid_time(format!("year {} out of range", year)))
    }

    /// Date of a day number relative to 1970-01-01 in this calendar.
    pub fn date_from_days(&self, days: i64) -> CubeResult<(i64, u32, u32)> {
        let date = match self {
            Calendar::ProlepticGregorian => gregorian_date(days),
            Calendar::Julian => julian_date(days),
            Calendar::Standard => {
                if days >= GREGORIAN_REFORM_DAY {
                    gregorian_date(days)
                } else {
                    julian_date(days)
                }
            }
            Calendar::NoLeap => Some(fixed_year_date(days, 365, false)),
            Calendar::AllLeap => Some(fixed_year_date(days, 366, true)),
            Calendar::Day360 => {
                let year = 1970 + days.div_euclid(360);
                let doy = days.rem_euclid(360);
                Some((year, (doy / 30) as u32 + 1, (doy % 30) as u32 + 1))
            }
        };
        date.ok_or_else(|| CubeError::invalid_time(format!("day number {} out of range", days)))
    }
}

impl FromStr for Calendar {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Calendar::Standard),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "julian" => Ok(Calendar::Julian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            _ => Err(CubeError::invalid_parameter(
                "time_calendar",
                format!("unsupported calendar '{}'", s),
            )),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cf_name())
    }
}

fn gregorian_days(year: i64, month: u32, day: u32) -> Option<i64> {
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE)
}

fn gregorian_date(days: i64) -> Option<(i64, u32, u32)> {
    let n = i32::try_from(days + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
    let date = NaiveDate::from_num_days_from_ce_opt(n)?;
    Some((i64::from(date.year()), date.month(), date.day()))
}

/// `None` when the day number does not fit in an `i64`.
fn julian_days(year: i64, month: u32, day: u32) -> Option<i64> {
    let a = (14 - month as i64) / 12;
    let y = year.checked_add(4800 - a)?;
    let m = month as i64 + 12 * a - 3;
    let jdn = y
        .checked_mul(365)?
        .checked_add(y.div_euclid(4))?
        .checked_add(day as i64 + (153 * m + 2) / 5 - 32_083)?;
    jdn.checked_sub(UNIX_EPOCH_JDN)
}

fn julian_date(days: i64) -> Option<(i64, u32, u32)> {
    let c = days.checked_add(UNIX_EPOCH_JDN + 32_082)?;
    let d = c.checked_mul(4)?.checked_add(3)?.div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = d - 4800 + m / 10;
    Some((year, month as u32, day as u32))
}

fn month_lengths(leap: bool) -> [u32; 12] {
    let mut lengths = MONTH_DAYS;
    if leap {
        lengths[1] = 29;
    }
    lengths
}

fn fixed_year_days(year: i64, month: u32, day: u32, year_len: i64, leap: bool) -> Option<i64> {
    let before: u32 = month_lengths(leap)[..(month - 1) as usize].iter().sum();
    year.checked_sub(1970)?
        .checked_mul(year_len)?
        .checked_add(before as i64 + day as i64 - 1)
}

fn fixed_year_date(days: i64, year_len: i64, leap: bool) -> (i64, u32, u32) {
    let year = 1970 + days.div_euclid(year_len);
    let mut doy = days.rem_euclid(year_len) as u32;
    for (i, len) in month_lengths(leap).iter().enumerate() {
        if doy < *len {
            return (year, i as u32 + 1, doy + 1);
        }
        doy -= len;
    }
    (year, 12, 31)
}

/// A broken-down date and time, not bound to a calendar until converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub nanosecond: u32,
}

impl CalendarDateTime {
    pub fn new(year: i64, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanosecond: 0,
        }
    }

    /// Parse an ISO-8601 style instant.
    ///
    /// Accepts `2010-01-01T00:00:00`, `2010-01-01 00:00:00`, `2010-01-01`,
    /// `2010-01-01T06:30` and fractional seconds up to nanoseconds.
    /// Day validity is checked later against a calendar.
    pub fn parse(s: &str) -> CubeResult<Self> {
        let invalid = || CubeError::invalid_time(format!("invalid instant '{}'", s));
        let trimmed = s.trim().trim_end_matches('Z');
        let (date, time) = match trimmed.find(|c: char| c == 'T' || c == ' ') {
            Some(pos) => (&trimmed[..pos], Some(trimmed[pos + 1..].trim())),
            None => (trimmed, None),
        };

        let date_parts: Vec<&str> = date.split('-').collect();
        let [year, month, day] = date_parts.as_slice() else {
            return Err(invalid());
        };
        let year: i64 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }

        let mut out = CalendarDateTime::new(year, month, day, 0, 0, 0);
        if let Some(time) = time.filter(|t| !t.is_empty()) {
            let parts: Vec<&str> = time.split(':').collect();
            if parts.is_empty() || parts.len() > 3 {
                return Err(invalid());
            }
            out.hour = parts[0].parse().map_err(|_| invalid())?;
            if let Some(minute) = parts.get(1) {
                out.minute = minute.parse().map_err(|_| invalid())?;
            }
            if let Some(second) = parts.get(2) {
                let (whole, fraction) = second.split_once('.').unwrap_or((*second, ""));
                out.second = whole.parse().map_err(|_| invalid())?;
                if !fraction.is_empty() {
                    if fraction.len() > 9 || !fraction.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid());
                    }
                    let padded = format!("{:0<9}", fraction);
                    out.nanosecond = padded.parse().map_err(|_| invalid())?;
                }
            }
            if out.hour > 23 || out.minute > 59 || out.second > 59 {
                return Err(invalid());
            }
        }
        Ok(out)
    }

    /// Nanoseconds since 1970-01-01T00:00:00 in the given calendar.
    pub fn to_nanos(&self, calendar: Calendar) -> CubeResult<i128> {
        let days = calendar.days_from_epoch(self.year, self.month, self.day)? as i128;
        let seconds = days * SECONDS_PER_DAY
            + self.hour as i128 * 3_600
            + self.minute as i128 * 60
            + self.second as i128;
        Ok(seconds * NANOS_PER_SECOND + self.nanosecond as i128)
    }

    /// Inverse of [`CalendarDateTime::to_nanos`].
    pub fn from_nanos(nanos: i128, calendar: Calendar) -> CubeResult<Self> {
        let days = i64::try_from(nanos.div_euclid(NANOS_PER_DAY))
            .map_err(|_| CubeError::invalid_time("instant out of range"))?;
        let rem = nanos.rem_euclid(NANOS_PER_DAY);
        let (year, month, day) = calendar.date_from_days(days)?;
        let seconds = (rem / NANOS_PER_SECOND) as u32;
        Ok(Self {
            year,
            month,
            day,
            hour: seconds / 3_600,
            minute: (seconds / 60) % 60,
            second: seconds % 60,
            nanosecond: (rem % NANOS_PER_SECOND) as u32,
        })
    }
}

impl FromStr for CalendarDateTime {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalendarDateTime::parse(s)
    }
}

impl fmt::Display for CalendarDateTime {
    /// `YYYY-MM-DDTHH:MM:SS`, with sub-second digits only when non-zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.nanosecond != 0 {
            let fraction = format!("{:09}", self.nanosecond);
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// A fixed-length time step such as `1D` or `6H`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeStep {
    pub count: i64,
    pub unit: TimeUnit,
}

impl TimeStep {
    pub fn new(count: i64, unit: TimeUnit) -> CubeResult<Self> {
        if count <= 0 {
            return Err(CubeError::invalid_parameter(
                "time_res",
                format!("time step must be positive, got {}", count),
            ));
        }
        Ok(Self { count, unit })
    }

    /// Parse a pandas-style frequency string: an optional count followed
    /// by a unit alias.
    pub fn parse(s: &str) -> CubeResult<Self> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (count, alias) = trimmed.split_at(split);
        let count = if count.is_empty() {
            1
        } else {
            count.parse::<i64>().map_err(|_| {
                CubeError::invalid_parameter("time_res", format!("invalid step count in '{}'", s))
            })?
        };
        let unit = TimeUnit::from_frequency_alias(alias).ok_or_else(|| {
            CubeError::invalid_parameter("time_res", format!("unsupported time step '{}'", s))
        })?;
        Self::new(count, unit)
    }

    /// Step length in nanoseconds.
    pub fn nanos(&self) -> i128 {
        self.count as i128 * self.unit.nanos()
    }

    /// ISO-8601 duration of one step, e.g. `P1D`, `PT6H`.
    pub fn to_iso8601(&self) -> String {
        format_iso8601_duration(self.nanos())
    }
}

impl FromStr for TimeStep {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeStep::parse(s)
    }
}

impl TryFrom<String> for TimeStep {
    type Error = CubeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        TimeStep::parse(&s)
    }
}

impl From<TimeStep> for String {
    fn from(step: TimeStep) -> Self {
        step.to_string()
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.frequency_alias())
    }
}

/// Format a nanosecond span as an ISO-8601 duration (`P2DT6H`, `PT0.5S`).
pub fn format_iso8601_duration(nanos: i128) -> String {
    if nanos == 0 {
        return "PT0S".to_string();
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let n = nanos.abs();

    let days = n / NANOS_PER_DAY;
    let mut rem = n % NANOS_PER_DAY;
    let hours = rem / (3_600 * NANOS_PER_SECOND);
    rem %= 3_600 * NANOS_PER_SECOND;
    let minutes = rem / (60 * NANOS_PER_SECOND);
    rem %= 60 * NANOS_PER_SECOND;
    let seconds = rem / NANOS_PER_SECOND;
    let fraction = rem % NANOS_PER_SECOND;

    let mut out = format!("{}P", sign);
    if days > 0 {
        out.push_str(&format!("{}D", days));
    }
    if hours > 0 || minutes > 0 || seconds > 0 || fraction > 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{}H", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}M", minutes));
        }
        if fraction > 0 {
            let digits = format!("{:09}", fraction);
            out.push_str(&format!("{}.{}S", seconds, digits.trim_end_matches('0')));
        } else if seconds > 0 {
            out.push_str(&format!("{}S", seconds));
        }
    }
    out
}

/// CF time units, `"<unit> since <reference instant>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub reference: CalendarDateTime,
}

impl TimeUnits {
    pub fn parse(s: &str) -> CubeResult<Self> {
        let lower = s.to_lowercase();
        let pos = lower.find(" since ").ok_or_else(|| {
            CubeError::invalid_time(format!("time units must be '<unit> since <instant>': '{}'", s))
        })?;
        let unit = TimeUnit::from_cf_name(s[..pos].trim())
            .ok_or_else(|| CubeError::invalid_time(format!("unsupported time unit in '{}'", s)))?;
        let reference = CalendarDateTime::parse(&s[pos + " since ".len()..])?;
        Ok(Self { unit, reference })
    }

    /// Encode instants (nanoseconds since the epoch) as offsets in these
    /// units. Integral offsets encode as `Int`, anything else as `Float`.
    pub fn encode(&self, instants: &[i128], calendar: Calendar) -> CubeResult<ArrayValues> {
        let origin = self.reference.to_nanos(calendar)?;
        let unit = self.unit.nanos();
        let offsets: Vec<i128> = instants.iter().map(|t| t - origin).collect();

        if offsets.iter().all(|o| o % unit == 0) {
            let values = offsets
                .iter()
                .map(|o| {
                    i64::try_from(o / unit).map_err(|_| {
                        CubeError::invalid_time(format!("time offset overflows int64 in {}", self))
                    })
                })
                .collect::<CubeResult<Vec<i64>>>()?;
            Ok(ArrayValues::Int(values))
        } else {
            Ok(ArrayValues::Float(
                offsets.iter().map(|o| *o as f64 / unit as f64).collect(),
            ))
        }
    }
}

impl Default for TimeUnits {
    fn default() -> Self {
        Self {
            unit: TimeUnit::Seconds,
            reference: CalendarDateTime::new(1970, 1, 1, 0, 0, 0),
        }
    }
}

impl FromStr for TimeUnits {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnits::parse(s)
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} since {}", self.unit.cf_name(), self.reference)
    }
}
