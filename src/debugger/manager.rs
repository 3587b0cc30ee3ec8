use super::executor::StepExecutor;
use super::state::ExecutionState;
use serde_json::{json, Value as Json};

/// Session facade for a GUI or RPC collaborator.
///
/// Wraps one [`StepExecutor`] and renders every operation as a JSON
/// document, so a frontend can display state without knowing any crate
/// types. Stepping operations are gated on an active session; breakpoint
/// and watch operations are not, matching how an editor marks lines
/// before debugging starts.
pub struct DebugSession {
    executor: StepExecutor,
    active: bool,
}

impl Default for DebugSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugSession {
    pub fn new() -> Self {
        Self {
            executor: StepExecutor::new(),
            active: false,
        }
    }

    /// Direct access for callers that drive breakpoints themselves.
    pub fn executor_mut(&mut self) -> &mut StepExecutor {
        &mut self.executor
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, code: &str) -> Json {
        self.executor.set_code(code);
        self.active = true;
        json!({
            "status": "started",
            "lines_count": self.executor.line_count(),
            "state": self.state_json(&self.executor.current_state()),
        })
    }

    pub fn stop(&mut self) -> Json {
        self.active = false;
        self.executor.reset();
        json!({ "status": "stopped" })
    }

    pub fn step_over(&mut self) -> Json {
        self.stepping(StepExecutor::step_over)
    }

    pub fn step_into(&mut self) -> Json {
        self.stepping(StepExecutor::step_into)
    }

    pub fn run_to_breakpoint(&mut self) -> Json {
        self.stepping(StepExecutor::run_to_breakpoint)
    }

    pub fn run_all(&mut self) -> Json {
        self.stepping(StepExecutor::run_all)
    }

    fn stepping(&mut self, op: fn(&mut StepExecutor) -> ExecutionState) -> Json {
        if !self.active {
            return json!({ "error": "no active debug session" });
        }
        let state = op(&mut self.executor);
        self.state_json(&state)
    }

    pub fn toggle_breakpoint(&mut self, line: usize) -> Json {
        let enabled = self.executor.toggle_breakpoint(line);
        json!({
            "line": line,
            "enabled": enabled,
            "breakpoints": self.executor.breakpoint_lines(),
        })
    }

    pub fn variable_details(&self, name: &str) -> Json {
        match self.executor.variable_info(name) {
            Some(info) => json!({
                "name": info.name,
                "value": info.value,
                "type": info.type_name,
                "repr": info.repr,
                "line_defined": info.line_defined,
            }),
            None => json!({ "error": format!("variable \"{name}\" not found") }),
        }
    }

    pub fn evaluate(&mut self, expression: &str) -> Json {
        let outcome = self.executor.evaluate_expression(expression);
        if outcome.success {
            json!({
                "success": true,
                "result": outcome.result,
                "type": outcome.type_name,
                "repr": outcome.repr,
            })
        } else {
            json!({
                "success": false,
                "error": outcome.error,
            })
        }
    }

    fn state_json(&self, state: &ExecutionState) -> Json {
        let variables: serde_json::Map<String, Json> = state
            .variables
            .iter()
            .map(|(name, var)| {
                (
                    name.clone(),
                    json!({
                        "value": var.value.to_string(),
                        "type": var.type_name,
                        "line_defined": var.line_defined,
                    }),
                )
            })
            .collect();
        json!({
            "current_line": state.current_line,
            "variables": variables,
            "output": state.output,
            "error": state.error,
            "finished": state.finished,
            "call_stack": state.call_stack,
            "breakpoints": self.executor.breakpoint_lines(),
        })
    }
}
