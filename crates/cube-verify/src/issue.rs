//! Diagnostics produced by convention rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a single issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting threshold for a verification run.
///
/// `Warning` reports everything, `Error` drops warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Warning,
    #[default]
    Error,
}

impl Level {
    /// Whether an issue of `severity` is reported at this level.
    pub fn includes(&self, severity: Severity) -> bool {
        match self {
            Level::Warning => true,
            Level::Error => severity == Severity::Error,
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            _ => Err(format!(
                "invalid level '{}', expected 'warning' or 'error'",
                s
            )),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => f.write_str("WARNING"),
            Level::Error => f.write_str("ERROR"),
        }
    }
}

/// A severity-tagged finding.
///
/// Serialized as a two element array, `["ERROR", "missing variable 'time'"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Severity, String)", into = "(Severity, String)")]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<(Severity, String)> for Issue {
    fn from((severity, message): (Severity, String)) -> Self {
        Self { severity, message }
    }
}

impl From<Issue> for (Severity, String) {
    fn from(issue: Issue) -> Self {
        (issue.severity, issue.message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Number of (errors, warnings) in a list of issues.
pub fn count_by_severity(issues: &[Issue]) -> (usize, usize) {
    let errors = issues.iter().filter(|i| i.is_error()).count();
    (errors, issues.len() - errors)
}
