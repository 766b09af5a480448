//! Convention rules and the registry that orders them.
//!
//! Each rule inspects a dataset through [`DatasetAccess`] and returns the
//! issues it found. Rules are independent of each other; the registry only
//! fixes the order in which their issues are reported.

mod global_attrs;
mod time_coord;
mod xy_coords;

pub use global_attrs::{GlobalAttrsRule, EXPECTED_GLOBAL_ATTRS};
pub use time_coord::TimeCoordRule;
pub use xy_coords::XyCoordsRule;

use cube_common::{DatasetAccess, Variable};

use crate::issue::Issue;

/// A single convention check.
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `time_coord`.
    fn name(&self) -> &'static str;

    /// Inspect the dataset. Never mutates it.
    fn evaluate(&self, ds: &dyn DatasetAccess) -> Vec<Issue>;
}

/// Ordered list of rules.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard rules in reporting order:
    /// `global_attrs`, `time_coord`, `xy_coords`.
    pub fn standard() -> Self {
        Self::new()
            .with(GlobalAttrsRule)
            .with(TimeCoordRule)
            .with(XyCoordsRule)
    }

    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.register(rule);
        self
    }

    pub fn register(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}

// ============================================================================
// Shared checks
// ============================================================================

/// Attributes every checked variable should carry, and whether the
/// attribute only applies to quantity variables.
const EXPECTED_VARIABLE_ATTRS: [(&str, bool); 3] = [
    ("long_name", false),
    ("standard_name", true),
    ("units", true),
];

/// Quote a name the way the reports show it: `'time'`.
pub(crate) fn quoted(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Render a dimension list as a tuple: `('time', 'y', 'x')`, `('time',)`, `()`.
pub(crate) fn dims_tuple<S: AsRef<str>>(dims: &[S]) -> String {
    let items: Vec<String> = dims.iter().map(|d| quoted(d.as_ref())).collect();
    match items.len() {
        1 => format!("({},)", items[0]),
        _ => format!("({})", items.join(", ")),
    }
}

/// A quantity has at least one dimension, no `flag_names` and is not `crs`.
pub(crate) fn is_quantity(var: &Variable) -> bool {
    var.name != "crs" && var.ndim() > 0 && !var.attrs.contains_key("flag_names")
}

/// Presence and attribute check for a named variable.
pub(crate) fn check_variable(ds: &dyn DatasetAccess, name: &str) -> Vec<Issue> {
    let Some(var) = ds.variable(name) else {
        return vec![Issue::error(format!("missing variable {}", quoted(name)))];
    };
    let quantity = is_quantity(var);
    EXPECTED_VARIABLE_ATTRS
        .iter()
        .filter(|(_, quantity_only)| !quantity_only || quantity)
        .filter(|(attr, _)| !var.attrs.contains_key(*attr))
        .map(|(attr, _)| {
            Issue::warning(format!(
                "missing attribute {} in variable {}",
                quoted(attr),
                quoted(name)
            ))
        })
        .collect()
}

fn check_1d_coord(var: &Variable) -> Vec<Issue> {
    if var.dims.len() == 1 && var.dims[0] == var.name {
        Vec::new()
    } else {
        vec![Issue::error(format!(
            "variable {} must have a single dimension {}",
            quoted(&var.name),
            quoted(&var.name)
        ))]
    }
}

/// 1-D check then strict increase. Monotonicity is not judged on a
/// variable with the wrong dimensions.
pub(crate) fn check_mono_inc(var: &Variable) -> Vec<Issue> {
    let mut issues = check_1d_coord(var);
    if issues.is_empty() && !var.is_strictly_increasing() {
        issues.push(Issue::error(format!(
            "values of variable {} must be strictly monotonically increasing",
            quoted(&var.name)
        )));
    }
    issues
}

pub(crate) fn check_mono_inc_or_dec(var: &Variable) -> Vec<Issue> {
    let mut issues = check_1d_coord(var);
    if issues.is_empty() && !(var.is_strictly_increasing() || var.is_strictly_decreasing()) {
        issues.push(Issue::error(format!(
            "values of variable {} must be strictly monotonically increasing or decreasing",
            quoted(&var.name)
        )));
    }
    issues
}
