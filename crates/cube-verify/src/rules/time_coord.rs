use cube_common::DatasetAccess;

use super::{check_mono_inc, check_variable, dims_tuple, quoted, Rule};
use crate::issue::Issue;

const TIME: &str = "time";

/// Checks the `time` coordinate and that `time` leads every
/// multi-dimensional variable that uses it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCoordRule;

impl Rule for TimeCoordRule {
    fn name(&self) -> &'static str {
        "time_coord"
    }

    fn evaluate(&self, ds: &dyn DatasetAccess) -> Vec<Issue> {
        let mut issues = check_variable(ds, TIME);
        let Some(time) = ds.variable(TIME) else {
            return issues;
        };
        issues.extend(check_mono_inc(time));

        if time.dims != [TIME] {
            return issues;
        }
        for var in ds.variables() {
            if var.ndim() > 1 && var.has_dim(TIME) && var.dims[0] != TIME {
                issues.push(Issue::error(format!(
                    "first dimension of variable {} must be {}, but dimensions are {}",
                    quoted(&var.name),
                    quoted(TIME),
                    dims_tuple(&var.dims)
                )));
            }
        }
        issues
    }
}
