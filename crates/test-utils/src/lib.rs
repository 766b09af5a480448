//! Shared test utilities for the cube workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Dataset fixtures built directly on the shared data model
//! - Temporary store directories
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod paths;

pub use fixtures::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that an issue list holds exactly the given `(severity, message)`
/// pairs, in order.
///
/// # Usage
///
/// ```ignore
/// assert_issues!(issues, [("ERROR", "missing variable 'time'")]);
/// ```
#[macro_export]
macro_rules! assert_issues {
    ($issues:expr, [$(($severity:expr, $message:expr)),* $(,)?]) => {{
        let actual: Vec<(String, String)> = $issues
            .iter()
            .map(|issue| (issue.severity.to_string(), issue.message.clone()))
            .collect();
        let expected: Vec<(String, String)> = vec![$(($severity.to_string(), $message.to_string())),*];
        assert_eq!(actual, expected);
    }};
    ($issues:expr, $expected:expr) => {{
        let actual: Vec<(String, String)> = $issues
            .iter()
            .map(|issue| (issue.severity.to_string(), issue.message.clone()))
            .collect();
        let expected: Vec<(String, String)> = $expected
            .iter()
            .map(|(severity, message)| (severity.to_string(), message.to_string()))
            .collect();
        assert_eq!(actual, expected);
    }};
}
