mod ast;
mod context;
mod error;
mod interp;
mod lexer;
mod parser;
mod value;

pub use context::{Binding, EvalContext};
pub use error::EvalError;
pub use interp::Interpreter;
pub use value::{Builtin, Value};

/// Result of one evaluator call: the produced value plus any text printed
/// while it ran. Statements always produce `Value::None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub value: Value,
    pub output: String,
}

/// Seam between the stepping logic and the evaluation engine.
///
/// The step executor never interprets source text itself; it hands single
/// lines (or, for run-all, the whole program) to an evaluator together
/// with the session's context. Output capture is per call: each call owns
/// a fresh buffer returned in [`Execution::output`], so there is no
/// process-global stream to redirect or restore.
pub trait ScriptEvaluator {
    /// Seed a fresh context. Called on every session reset.
    fn install_builtins(&self, _ctx: &mut EvalContext) {}

    /// Execute one source line as a statement. `line` is the 1-based line
    /// number, recorded on any binding the statement creates.
    fn exec_statement(
        &mut self,
        ctx: &mut EvalContext,
        source: &str,
        line: usize,
    ) -> Result<Execution, EvalError>;

    /// Evaluate a single expression against the context.
    fn eval_expression(
        &mut self,
        ctx: &mut EvalContext,
        source: &str,
    ) -> Result<Execution, EvalError>;

    /// Execute an entire program as one unit, combining all output. The
    /// first failing line aborts and its error carries the line number.
    fn exec_program(
        &mut self,
        ctx: &mut EvalContext,
        source: &str,
    ) -> Result<Execution, EvalError>;
}
