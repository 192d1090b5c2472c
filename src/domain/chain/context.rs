//! Execution context threaded through a chain run
//!
//! The context starts as the caller's input object and is only written to
//! after a step executes successfully. It is owned by a single run and is
//! dropped when the run ends.

use serde_json::{Map, Value};

use crate::domain::agent::AgentKind;
use crate::domain::DomainError;

/// Mutable key/value state of one chain run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    data: Map<String, Value>,
}

impl ExecutionContext {
    /// Create a context seeded from the caller's input
    pub fn new(input: Map<String, Value>) -> Self {
        Self { data: input }
    }

    /// Create a context from an arbitrary JSON value; `null` yields an empty context
    pub fn from_value(input: Value) -> Result<Self, DomainError> {
        match input {
            Value::Object(map) => Ok(Self::new(map)),
            Value::Null => Ok(Self::default()),
            other => Err(DomainError::validation(format!(
                "Chain input must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Whether `key` exists with a non-null value
    pub fn is_present(&self, key: &str) -> bool {
        self.data.get(key).is_some_and(|v| !v.is_null())
    }

    /// Value of `key` unless it is absent or blank
    pub fn non_blank(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !is_blank(v))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    /// Write an agent's output under the key later steps read it from
    pub fn merge_output(&mut self, agent: AgentKind, output: &Value) {
        if let Some(key) = agent.output_key() {
            self.data.insert(key.to_string(), output.clone());
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.data
    }
}

/// Null, empty strings and empty objects count as missing input
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> ExecutionContext {
        ExecutionContext::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value() {
        assert!(context(Value::Null).is_empty());
        assert_eq!(context(json!({"a": 1})).len(), 1);

        let err = ExecutionContext::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_presence() {
        let ctx = context(json!({"summary": "S", "empty": "", "nothing": null}));
        assert!(ctx.is_present("summary"));
        assert!(ctx.is_present("empty"));
        assert!(!ctx.is_present("nothing"));
        assert!(!ctx.is_present("missing"));

        assert!(ctx.non_blank("summary").is_some());
        assert!(ctx.non_blank("empty").is_none());
        assert!(ctx.non_blank("nothing").is_none());
    }

    #[test]
    fn test_merge_output_only_writes_declared_key() {
        let mut ctx = context(json!({"document_text": "doc"}));

        ctx.merge_output(AgentKind::Email, &json!("Email sent"));
        assert_eq!(ctx.len(), 1);

        ctx.merge_output(AgentKind::DocSum, &json!("a summary"));
        assert_eq!(ctx.get("summary"), Some(&json!("a summary")));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("  ")));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!([])));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!({"FirstName": "A"})));
    }
}
