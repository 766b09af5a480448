use cube_common::DatasetAccess;

use super::{quoted, Rule};
use crate::issue::Issue;

/// Global attributes every cube should carry.
pub const EXPECTED_GLOBAL_ATTRS: [&str; 18] = [
    "Conventions",
    "title",
    "summary",
    "sources",
    "history",
    "keywords",
    "id",
    "time_coverage_start",
    "time_coverage_end",
    "time_coverage_resolution",
    "geospatial_lon_min",
    "geospatial_lon_max",
    "geospatial_lon_resolution",
    "geospatial_lon_units",
    "geospatial_lat_min",
    "geospatial_lat_max",
    "geospatial_lat_resolution",
    "geospatial_lat_units",
];

/// Warns about each missing global attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAttrsRule;

impl Rule for GlobalAttrsRule {
    fn name(&self) -> &'static str {
        "global_attrs"
    }

    fn evaluate(&self, ds: &dyn DatasetAccess) -> Vec<Issue> {
        let attrs = ds.global_attributes();
        EXPECTED_GLOBAL_ATTRS
            .iter()
            .filter(|name| !attrs.contains_key(**name))
            .map(|name| Issue::warning(format!("missing global attribute {}", quoted(name))))
            .collect()
    }
}
