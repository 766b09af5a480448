//! Runs the registered rules over a dataset.

use rayon::prelude::*;
use tracing::{debug, info};

use cube_common::DatasetAccess;

use crate::issue::{count_by_severity, Issue, Level};
use crate::rules::RuleRegistry;

/// Convention checker.
///
/// Issues are reported in rule order, and within a rule in the order the
/// rule found them.
#[derive(Debug, Default)]
pub struct Verifier {
    registry: RuleRegistry,
}

impl Verifier {
    /// A verifier running the standard rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Evaluate every rule and keep the issues `level` asks for.
    ///
    /// An empty list means the dataset is compliant at that level.
    pub fn verify(&self, ds: &dyn DatasetAccess, level: Level) -> Vec<Issue> {
        let per_rule: Vec<Vec<Issue>> = self
            .registry
            .rules()
            .iter()
            .map(|rule| {
                let issues = rule.evaluate(ds);
                debug!(rule = rule.name(), issues = issues.len(), "Evaluated rule");
                issues
            })
            .collect();
        Self::merge(per_rule, level)
    }

    /// Same result as [`Verifier::verify`], with rules evaluated on the
    /// rayon pool.
    pub fn verify_parallel(&self, ds: &(dyn DatasetAccess + Sync), level: Level) -> Vec<Issue> {
        let per_rule: Vec<Vec<Issue>> = self
            .registry
            .rules()
            .par_iter()
            .map(|rule| {
                let issues = rule.evaluate(ds);
                debug!(rule = rule.name(), issues = issues.len(), "Evaluated rule");
                issues
            })
            .collect();
        Self::merge(per_rule, level)
    }

    fn merge(per_rule: Vec<Vec<Issue>>, level: Level) -> Vec<Issue> {
        let issues: Vec<Issue> = per_rule
            .into_iter()
            .flatten()
            .filter(|issue| level.includes(issue.severity))
            .collect();
        let (errors, warnings) = count_by_severity(&issues);
        info!(%level, errors, warnings, "Verification finished");
        issues
    }
}

/// Verify a dataset with the standard rules.
pub fn verify_dataset(ds: &dyn DatasetAccess, level: Level) -> Vec<Issue> {
    Verifier::new().verify(ds, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{GlobalAttrsRule, TimeCoordRule};
    use test_utils::{time_coord, DatasetFixture};

    #[test]
    fn test_compliant_dataset_has_no_issues() {
        let ds = DatasetFixture::lonlat().build();
        assert!(verify_dataset(&ds, Level::Warning).is_empty());
    }

    #[test]
    fn test_error_level_drops_warnings() {
        let ds = DatasetFixture::lonlat()
            .without_attrs(&["sources", "history"])
            .build();
        assert_eq!(verify_dataset(&ds, Level::Warning).len(), 2);
        assert!(verify_dataset(&ds, Level::Error).is_empty());
    }

    #[test]
    fn test_rule_order() {
        let ds = DatasetFixture::lonlat()
            .without_attrs(&["id"])
            .with(time_coord(&[3, 2, 1, 0]))
            .without("lon")
            .build();
        let messages: Vec<String> = verify_dataset(&ds, Level::Warning)
            .into_iter()
            .map(|i| i.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "missing global attribute 'id'",
                "values of variable 'time' must be strictly monotonically increasing",
                "no valid spatial coordinates found",
            ]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ds = DatasetFixture::projected()
            .without_attrs(&["title", "keywords"])
            .with(time_coord(&[5, 5]))
            .without("crs")
            .build();
        let verifier = Verifier::new();
        assert_eq!(
            verifier.verify(&ds, Level::Warning),
            verifier.verify_parallel(&ds, Level::Warning)
        );
        assert_eq!(verifier.verify(&ds, Level::Warning).len(), 4);
    }

    #[test]
    fn test_custom_registry() {
        let registry = RuleRegistry::new().with(TimeCoordRule).with(GlobalAttrsRule);
        let verifier = Verifier::with_registry(registry);
        let ds = DatasetFixture::default().build();
        let issues = verifier.verify(&ds, Level::Warning);
        assert_eq!(issues[0].message, "missing variable 'time'");
        assert_eq!(issues.len(), 19);
    }
}
