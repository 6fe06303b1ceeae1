//! Template variables.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use distmpl_core::Distribution;

use crate::error::{TemplateError, TemplateResult};

/// Variable under which the distribution metadata is exposed.
pub const DIST_VARIABLE: &str = "dzil";

/// Variables available to every template of a processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableContext {
    values: HashMap<String, Value>,
}

impl VariableContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for a distribution and a list of `name=value`
    /// assignments.
    ///
    /// Assignments are applied in order, so later ones win, and an
    /// assignment to `dzil` replaces the distribution object.
    pub fn build(dist: &Distribution, assignments: &[String]) -> TemplateResult<Self> {
        let mut context = Self::new();
        context.insert(DIST_VARIABLE, serde_json::to_value(dist)?);

        for raw in assignments {
            let (name, value) = parse_assignment(raw)?;
            context.insert(name, Value::String(value));
        }

        Ok(context)
    }

    /// Set a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split a `name=value` string on its first `=` and trim both sides.
pub fn parse_assignment(raw: &str) -> TemplateResult<(String, String)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        TemplateError::configuration(format!("variable '{}' is not of the form name=value", raw))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(TemplateError::configuration(format!(
            "variable '{}' has an empty name",
            raw
        )));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist() -> Distribution {
        Distribution::new("Foo-Bar", "1.0")
    }

    #[test]
    fn test_parse_assignment_trims_and_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("  url = http://x/?a=b  ").unwrap(),
            ("url".to_string(), "http://x/?a=b".to_string())
        );
        assert_eq!(
            parse_assignment("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_assignment_rejects_malformed() {
        assert!(matches!(
            parse_assignment("novalue"),
            Err(TemplateError::Configuration(_))
        ));
        assert!(matches!(
            parse_assignment(" = 1"),
            Err(TemplateError::Configuration(_))
        ));
    }

    #[test]
    fn test_dist_object_is_always_present() {
        let context = VariableContext::build(&dist(), &[]).unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context.get(DIST_VARIABLE).unwrap()["name"], "Foo-Bar");
    }

    #[test]
    fn test_last_assignment_wins() {
        let vars = vec!["name=1".to_string(), "name=2".to_string()];
        let context = VariableContext::build(&dist(), &vars).unwrap();
        assert_eq!(context.get("name"), Some(&Value::from("2")));
    }

    #[test]
    fn test_assignment_can_replace_dist_object() {
        let vars = vec!["dzil=override".to_string()];
        let context = VariableContext::build(&dist(), &vars).unwrap();
        assert_eq!(context.get(DIST_VARIABLE), Some(&Value::from("override")));
    }
}
