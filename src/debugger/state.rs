use crate::eval::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// A named value captured from the execution context after a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
    pub type_name: String,
    pub line_defined: usize,
}

/// Immutable snapshot of a session, returned by every stepping operation.
///
/// `call_stack` is cosmetic: there is no call-depth visibility, so it
/// holds a single "line N" entry while the session runs and empties once
/// it finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionState {
    pub current_line: usize,
    pub variables: IndexMap<String, Variable>,
    pub output: Vec<String>,
    pub error: Option<String>,
    pub finished: bool,
    pub call_stack: Vec<String>,
}

/// Detail payload for a single-variable lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub repr: String,
    pub line_defined: usize,
}

/// Outcome of a watch-expression evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvalOutcome {
    pub fn success(value: &Value) -> Self {
        Self {
            success: true,
            result: Some(value.to_string()),
            type_name: Some(value.type_name().to_string()),
            repr: Some(value.repr()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            type_name: None,
            repr: None,
            error: Some(error.into()),
        }
    }
}
