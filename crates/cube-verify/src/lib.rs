//! Convention checker for gridded, time-varying data cubes.
//!
//! A [`Verifier`] runs an ordered set of [`Rule`]s over anything that
//! implements [`cube_common::DatasetAccess`] and returns every deviation as
//! an [`Issue`]. Findings are never errors in the `Result` sense; deciding
//! what a finding means (an exit code, a log line) is up to the caller.
//!
//! # Example
//!
//! ```ignore
//! use cube_verify::{verify_dataset, Level};
//!
//! let issues = verify_dataset(&dataset, Level::Warning);
//! for issue in &issues {
//!     println!("{}", issue);
//! }
//! ```

pub mod engine;
pub mod issue;
pub mod rules;

pub use engine::{verify_dataset, Verifier};
pub use issue::{count_by_severity, Issue, Level, Severity};
pub use rules::{
    GlobalAttrsRule, Rule, RuleRegistry, TimeCoordRule, XyCoordsRule, EXPECTED_GLOBAL_ATTRS,
};
