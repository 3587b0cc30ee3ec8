//! Step-execution debugger for a small scripting language.
//!
//! The core is [`StepExecutor`]: source lines, a breakpoint table, an
//! execution cursor, and a live name-to-value context, driven one
//! substantive line at a time. Evaluation is behind the
//! [`ScriptEvaluator`] seam; [`Interpreter`] is the built-in engine.
//! [`DebugSession`] wraps an executor into JSON documents for a frontend.

pub mod debugger;
pub mod eval;

pub use debugger::{
    Breakpoint, BreakpointTable, DebugSession, EvalOutcome, ExecutionState, StepExecutor, Variable,
    VariableInfo,
};
pub use eval::{Binding, EvalContext, EvalError, Execution, Interpreter, ScriptEvaluator, Value};
