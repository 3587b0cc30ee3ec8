use thiserror::Error;

/// Failure taxonomy for the evaluator.
///
/// `Syntax` is the only variant the step executor retries (a line is
/// attempted as a statement first, then as an expression); every other
/// variant is a runtime fault and ends the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("name '{0}' is not defined")]
    Undefined(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0}")]
    Runtime(String),
}

impl EvalError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, EvalError::Syntax(_))
    }

    /// Attach a source line number, for whole-program execution where the
    /// caller has no per-line context of its own.
    pub fn at_line(self, line: usize) -> EvalError {
        match self {
            EvalError::Syntax(msg) => EvalError::Syntax(format!("line {line}: {msg}")),
            other => EvalError::Runtime(format!("line {line}: {other}")),
        }
    }
}
