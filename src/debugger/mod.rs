mod breakpoints;
mod executor;
mod manager;
mod state;

pub use breakpoints::{Breakpoint, BreakpointTable};
pub use executor::StepExecutor;
pub use manager::DebugSession;
pub use state::{EvalOutcome, ExecutionState, Variable, VariableInfo};
