//! YAML configuration for `cubekit new`.
//!
//! A config file is a serialized [`CubeConfig`]; every key is optional and
//! falls back to the generator default. Values may reference environment
//! variables using `${VAR}` or `${VAR:-default}`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use cube_generator::CubeConfig;

/// Load and validate a cube configuration YAML file.
pub fn load_cube_config<P: AsRef<Path>>(path: P) -> Result<CubeConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read cube config from {:?}", path.as_ref()))?;

    parse_cube_config(&content)
        .with_context(|| format!("Invalid cube config in {:?}", path.as_ref()))
}

/// Parse and validate cube configuration YAML.
pub fn parse_cube_config(content: &str) -> Result<CubeConfig> {
    let expanded = expand_env_vars(content)?;

    // An empty document means "all defaults".
    let config: CubeConfig = if expanded.trim().is_empty() {
        CubeConfig::default()
    } else {
        serde_yaml::from_str(&expanded).context("Failed to parse cube config YAML")?
    };

    config.validate()?;
    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after))?;
        result.push_str(&resolve_var_expr(&after[..end])?);
        rest = &after[end + 1..];
    }
    result.push_str(rest);

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_common::{Calendar, DataType};
    use cube_generator::Pair;

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
xy_size: [2048, 2048]
xy_tile_size: 512
xy_names: [x, y]
xy_units: meters
crs: "EPSG:32633"
time_periods: 3
variables:
  - name: var_a
    dtype: float32
    attrs:
      units: mg/kg
"#;
        let config = parse_cube_config(yaml).unwrap();
        assert_eq!(config.xy_size, Pair::xy(2048, 2048));
        assert_eq!(config.xy_tile_size, Some(Pair::both(512)));
        assert_eq!(config.xy_names, ("x".to_string(), "y".to_string()));
        assert_eq!(config.crs.as_deref(), Some("EPSG:32633"));
        assert_eq!(config.time_periods, 3);
        assert_eq!(config.variables[0].dtype, DataType::Float32);
        assert_eq!(config.time_calendar, Calendar::ProlepticGregorian);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_cube_config("").unwrap(), CubeConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(parse_cube_config("use_cftime: true\n").is_err());
        assert!(parse_cube_config("xy_res: -1.0\n").is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("CUBEKIT_TEST_PERIODS", "7");
        let result = expand_env_vars("time_periods: ${CUBEKIT_TEST_PERIODS}").unwrap();
        assert_eq!(result, "time_periods: 7");

        std::env::remove_var("CUBEKIT_TEST_UNSET");
        let result = expand_env_vars("title: ${CUBEKIT_TEST_UNSET:-cube}").unwrap();
        assert_eq!(result, "title: cube");

        assert!(expand_env_vars("${CUBEKIT_TEST_UNSET}").is_err());
        assert!(expand_env_vars("${OPEN").is_err());
    }
}
