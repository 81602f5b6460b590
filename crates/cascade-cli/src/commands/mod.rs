//! Command implementations

mod chain;
mod project;
mod resolve;
mod trace;

pub use chain::run_chain;
pub use project::run_project;
pub use resolve::run_resolve;
pub use trace::run_trace;

use crate::error::{CliError, Result};
use cascade_core::Context;
use serde_json::Value;

/// Parse repeated `key=value` field arguments into a context.
pub fn parse_fields(fields: &[String]) -> Result<Context> {
    let mut context = Context::new();
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            return Err(CliError::user(format!(
                "invalid field '{field}', expected KEY=VALUE"
            )));
        };
        if key.is_empty() {
            return Err(CliError::user(format!(
                "invalid field '{field}', key must not be empty"
            )));
        }
        context.insert(key, value);
    }
    Ok(context)
}

/// Render a merged configuration as YAML (default) or JSON.
pub fn render(value: &Value, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
    } else {
        serde_yaml::to_string(value).map_err(|e| CliError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fields_accepts_key_value_pairs() {
        let fields = vec!["episode=ep01".to_string(), "scene=s01".to_string()];
        let context = parse_fields(&fields).unwrap();
        assert_eq!(context.get("episode"), Some("ep01"));
        assert_eq!(context.get("scene"), Some("s01"));
    }

    #[test]
    fn parse_fields_allows_equals_in_value() {
        let fields = vec!["expr=a=b".to_string()];
        let context = parse_fields(&fields).unwrap();
        assert_eq!(context.get("expr"), Some("a=b"));
    }

    #[test]
    fn parse_fields_rejects_missing_separator() {
        let fields = vec!["episode".to_string()];
        assert!(parse_fields(&fields).is_err());
    }

    #[test]
    fn render_defaults_to_yaml() {
        let value = serde_json::json!({"a": 1});
        let yaml = render(&value, false).unwrap();
        assert!(yaml.contains("a: 1"));
        let json = render(&value, true).unwrap();
        assert!(json.contains("\"a\": 1"));
    }
}
