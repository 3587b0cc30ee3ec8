use super::value::Value;
use indexmap::IndexMap;

/// A single name binding plus the line that last assigned it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    pub line_defined: usize,
}

/// Live name-to-value bindings for one debug session.
///
/// Owned exclusively by a `StepExecutor`; insertion order is preserved so
/// variable listings come out in the order names were first assigned.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    bindings: IndexMap<String, Binding>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Insert or overwrite a binding. Re-assignment keeps the name's
    /// original position but updates the defining line.
    pub fn set(&mut self, name: &str, value: Value, line: usize) {
        self.bindings.insert(
            name.to_string(),
            Binding {
                value,
                line_defined: line,
            },
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
