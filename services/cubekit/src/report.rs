//! Console output for `cubekit verify`.

use anyhow::Result;

use cube_verify::{count_by_severity, Issue};

/// Human readable report, one line per issue after a summary line.
pub fn text_report(issues: &[Issue]) -> Vec<String> {
    if issues.is_empty() {
        return vec!["Ok, no issues found.".to_string()];
    }
    let (errors, warnings) = count_by_severity(issues);
    let mut lines = Vec::with_capacity(issues.len() + 1);
    lines.push(format!(
        "{} error(s) and {} warnings(s) found:",
        errors, warnings
    ));
    lines.extend(issues.iter().map(|issue| issue.to_string()));
    lines
}

/// Issues as a JSON array of `[severity, message]` pairs.
pub fn json_report(issues: &[Issue]) -> Result<String> {
    Ok(serde_json::to_string_pretty(issues)?)
}

/// Whether the findings make the dataset non-compliant.
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(Issue::is_error)
}
