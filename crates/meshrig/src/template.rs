//! `${...}` placeholder substitution for custom proxy bootstrap templates.
//!
//! # Supported Template Variables
//!
//! Variables are looked up by their full dotted name in the map handed to
//! [`render`], e.g. `${node.id}`, `${discovery.host}`, `${drain_duration}`.
//! An unknown variable is an error.
//!
//! # Example
//!
//! ```json
//! { "node": { "id": "${node.id}", "cluster": "${cluster}" } }
//! ```

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Regex for matching template variables: ${node.id}, ${refresh_delay}, etc.
static TEMPLATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_template_regex() -> &'static Regex {
    TEMPLATE_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\}")
            .expect("template regex is valid")
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template variable '${{{0}}}'")]
    UnknownVariable(String),
}

/// Substitute every `${name}` in `template` with `vars[name]`.
///
/// Fails on the first variable that has no value.
pub fn render(template: &str, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
    let regex = get_template_regex();
    if let Some(missing) = regex
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| !vars.contains_key(name))
    {
        return Err(TemplateError::UnknownVariable(missing));
    }

    Ok(regex
        .replace_all(template, |caps: &regex::Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}

/// Check if a string contains template variables
pub fn has_template_variables(s: &str) -> bool {
    get_template_regex().is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> HashMap<String, String> {
        HashMap::from([
            ("node.id".to_string(), "sidecar~127.0.0.2~a~a".to_string()),
            ("cluster".to_string(), "test".to_string()),
            ("discovery.port".to_string(), "8080".to_string()),
        ])
    }

    #[test]
    fn test_render_dotted_and_plain_names() {
        let out = render(r#"{"id": "${node.id}", "cluster": "${cluster}"}"#, &vars()).unwrap();
        assert_eq!(out, r#"{"id": "sidecar~127.0.0.2~a~a", "cluster": "test"}"#);
    }

    #[test]
    fn test_render_repeated_variable() {
        let out = render("${cluster}-${cluster}", &vars()).unwrap();
        assert_eq!(out, "test-test");
    }

    #[test]
    fn test_render_unknown_variable() {
        let err = render(r#"{"port": ${admin.port}}"#, &vars()).unwrap_err();
        assert_eq!(err, TemplateError::UnknownVariable("admin.port".to_string()));
        assert_eq!(err.to_string(), "unknown template variable '${admin.port}'");
    }

    #[test]
    fn test_render_without_variables() {
        let out = render(r#"{"static": true}"#, &HashMap::new()).unwrap();
        assert_eq!(out, r#"{"static": true}"#);
    }

    #[test]
    fn test_has_template_variables() {
        assert!(has_template_variables("port ${discovery.port}"));
        assert!(!has_template_variables("no variables here"));
        assert!(!has_template_variables("${}"));
        assert!(!has_template_variables("$cluster"));
    }
}
