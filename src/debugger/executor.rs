use super::breakpoints::{Breakpoint, BreakpointTable};
use super::state::{EvalOutcome, ExecutionState, Variable, VariableInfo};
use crate::eval::{EvalContext, Interpreter, ScriptEvaluator, Value};
use indexmap::IndexMap;
use log::{debug, trace};

/// Blank and comment-only lines never consume a step.
fn is_substantive(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Line-by-line step executor over a pluggable evaluation engine.
///
/// Owns the source lines, the breakpoint table, the execution cursor, and
/// the live context for one debug session. Every operation returns an
/// [`ExecutionState`] snapshot; failures surface as data in that snapshot,
/// never as panics. Callers drive a session through `set_code`, the
/// breakpoint operations, and `step_over` / `run_to_breakpoint` /
/// `run_all`.
pub struct StepExecutor {
    code: String,
    lines: Vec<String>,
    breakpoints: BreakpointTable,
    /// 0-based index of the next line to consider.
    pc: usize,
    context: EvalContext,
    variables: IndexMap<String, Variable>,
    output: Vec<String>,
    error: Option<String>,
    finished: bool,
    evaluator: Box<dyn ScriptEvaluator>,
}

impl Default for StepExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StepExecutor {
    /// Executor backed by the built-in interpreter.
    pub fn new() -> Self {
        Self::with_evaluator(Box::new(Interpreter::new()))
    }

    /// Executor over a caller-supplied evaluation engine.
    pub fn with_evaluator(evaluator: Box<dyn ScriptEvaluator>) -> Self {
        let mut executor = StepExecutor {
            code: String::new(),
            lines: Vec::new(),
            breakpoints: BreakpointTable::new(),
            pc: 0,
            context: EvalContext::new(),
            variables: IndexMap::new(),
            output: Vec::new(),
            error: None,
            finished: false,
            evaluator,
        };
        executor.reset_execution();
        executor
    }

    /// Load new source. Execution state is reset; breakpoints survive so a
    /// caller can edit code and re-debug without re-marking lines.
    pub fn set_code(&mut self, code: &str) {
        self.code = code.to_string();
        self.lines = code.split('\n').map(str::to_string).collect();
        debug!("loaded {} source lines", self.lines.len());
        self.reset_execution();
    }

    /// Rewind the session: cursor to the top, fresh context, output and
    /// error cleared. Breakpoints are kept.
    pub fn reset_execution(&mut self) {
        self.pc = 0;
        self.context = EvalContext::new();
        self.evaluator.install_builtins(&mut self.context);
        self.variables.clear();
        self.output.clear();
        self.error = None;
        self.finished = false;
    }

    /// Full reset: source, breakpoints, and execution state.
    pub fn reset(&mut self) {
        self.code.clear();
        self.lines.clear();
        self.breakpoints.clear();
        self.reset_execution();
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    /// Set a breakpoint; `condition` gates it when non-empty. Returns
    /// false (and changes nothing) when the line is out of range.
    pub fn add_breakpoint(&mut self, line: usize, condition: Option<String>) -> bool {
        if line == 0 || line > self.lines.len() {
            return false;
        }
        let condition = condition.filter(|c| !c.trim().is_empty());
        match condition {
            Some(condition) => self
                .breakpoints
                .set(Breakpoint::with_condition(line, condition)),
            None => self.breakpoints.set(Breakpoint::new(line)),
        }
        true
    }

    pub fn remove_breakpoint(&mut self, line: usize) -> bool {
        self.breakpoints.remove(line)
    }

    /// Flip the breakpoint on `line`, creating an enabled one if the line
    /// has none. Returns the new enabled state (false for out-of-range).
    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        match self.breakpoints.toggle(line) {
            Some(enabled) => enabled,
            None => self.add_breakpoint(line, None),
        }
    }

    /// Lines with an enabled breakpoint, ascending.
    pub fn breakpoint_lines(&self) -> Vec<usize> {
        self.breakpoints.enabled_lines()
    }

    /// Whether execution should pause at `line`. A breakpoint with a
    /// condition breaks when the condition is truthy; a condition that
    /// fails to evaluate also breaks, so a typo never hides execution.
    pub fn should_break_at_line(&mut self, line: usize) -> bool {
        let (enabled, condition) = match self.breakpoints.get(line) {
            Some(bp) => (bp.enabled, bp.condition.clone()),
            None => return false,
        };
        if !enabled {
            return false;
        }
        let Some(condition) = condition else {
            return true;
        };
        match self.evaluator.eval_expression(&mut self.context, &condition) {
            Ok(exec) => exec.value.is_truthy(),
            Err(err) => {
                debug!("breakpoint condition at line {line} failed ({err}); breaking");
                true
            }
        }
    }

    /// Execute one line against the live context. The line is attempted as
    /// a statement first; a syntax failure retries it as an expression and
    /// a non-none result is echoed to output, REPL style. Returns
    /// `(success, output)`; on failure the output is the diagnostic and
    /// the session error is recorded.
    pub fn execute_line(&mut self, text: &str, line_number: usize) -> (bool, String) {
        trace!("executing line {line_number}: {text}");
        let attempt = self
            .evaluator
            .exec_statement(&mut self.context, text, line_number);
        let result = match attempt {
            Err(err) if err.is_syntax() => self
                .evaluator
                .eval_expression(&mut self.context, text)
                .map(|mut exec| {
                    if exec.value != Value::None {
                        exec.output.push_str(&exec.value.to_string());
                        exec.output.push('\n');
                    }
                    exec
                }),
            other => other,
        };

        match result {
            Ok(exec) => {
                if !exec.output.trim().is_empty() {
                    self.output.push(exec.output.trim().to_string());
                }
                (true, exec.output)
            }
            Err(err) => {
                let message = format!("error at line {line_number}: {err}");
                self.error = Some(message.clone());
                (false, message)
            }
        }
    }

    fn skip_nonsubstantive(&mut self) {
        while self.pc < self.lines.len() && !is_substantive(&self.lines[self.pc]) {
            self.pc += 1;
        }
    }

    /// Execute exactly one substantive line and park the cursor on the
    /// next one. Sets `finished` at end-of-source or on failure.
    fn step_once(&mut self) {
        self.skip_nonsubstantive();
        if self.pc >= self.lines.len() {
            self.finished = true;
            return;
        }

        let text = self.lines[self.pc].trim().to_string();
        let line_number = self.pc + 1;
        let (success, _) = self.execute_line(&text, line_number);
        self.refresh_variables();
        self.pc += 1;

        if !success {
            self.finished = true;
            return;
        }

        self.skip_nonsubstantive();
        if self.pc >= self.lines.len() {
            self.finished = true;
        }
    }

    /// Execute the next substantive line. One call, one step; a finished
    /// session is left untouched.
    pub fn step_over(&mut self) -> ExecutionState {
        if !self.finished {
            self.step_once();
        }
        self.current_state()
    }

    /// Identical to [`step_over`](Self::step_over): the session has no
    /// call-depth visibility, so there is nothing distinct to step into.
    pub fn step_into(&mut self) -> ExecutionState {
        self.step_over()
    }

    /// Step repeatedly until a line with a satisfied breakpoint is
    /// reached, or the session finishes. The breakpoint check happens
    /// before the line executes, so the stopped-on line has not run yet.
    pub fn run_to_breakpoint(&mut self) -> ExecutionState {
        while !self.finished {
            self.skip_nonsubstantive();
            if self.pc >= self.lines.len() {
                self.finished = true;
                break;
            }
            let line = self.pc + 1;
            if self.should_break_at_line(line) {
                debug!("stopped at breakpoint on line {line}");
                break;
            }
            self.step_once();
        }
        self.current_state()
    }

    /// Execute the whole source as one unit, ignoring breakpoints. Always
    /// finishes the session; a failure is recorded as the session error.
    pub fn run_all(&mut self) -> ExecutionState {
        if self.finished {
            return self.current_state();
        }
        match self.evaluator.exec_program(&mut self.context, &self.code) {
            Ok(exec) => {
                self.output = if exec.output.is_empty() {
                    Vec::new()
                } else {
                    exec.output
                        .trim_end_matches('\n')
                        .split('\n')
                        .map(str::to_string)
                        .collect()
                };
                self.pc = self.lines.len();
                self.refresh_variables();
            }
            Err(err) => {
                self.error = Some(format!("execution error: {err}"));
            }
        }
        self.finished = true;
        self.current_state()
    }

    /// Evaluate a watch expression against the live context. Never touches
    /// the cursor, the output, or the finished flag.
    pub fn evaluate_expression(&mut self, expression: &str) -> EvalOutcome {
        match self.evaluator.eval_expression(&mut self.context, expression) {
            Ok(exec) => EvalOutcome::success(&exec.value),
            Err(err) => EvalOutcome::failure(err.to_string()),
        }
    }

    /// Rebuild the variable snapshot from the context, wholesale. Dunder
    /// names and callables are not user variables and are filtered out.
    fn refresh_variables(&mut self) {
        self.variables = self
            .context
            .iter()
            .filter(|(name, binding)| !name.starts_with("__") && !binding.value.is_callable())
            .map(|(name, binding)| {
                (
                    name.clone(),
                    Variable {
                        name: name.clone(),
                        value: binding.value.clone(),
                        type_name: binding.value.type_name().to_string(),
                        line_defined: binding.line_defined,
                    },
                )
            })
            .collect();
    }

    pub fn variable_info(&self, name: &str) -> Option<VariableInfo> {
        self.variables.get(name).map(|var| VariableInfo {
            name: var.name.clone(),
            value: var.value.to_string(),
            type_name: var.type_name.clone(),
            repr: var.value.repr(),
            line_defined: var.line_defined,
        })
    }

    /// Snapshot of the session. `current_line` is 0 before the first line
    /// has executed, then the 1-based line the cursor is parked on, and
    /// the line count once finished.
    pub fn current_state(&self) -> ExecutionState {
        let current_line = if self.finished {
            self.lines.len()
        } else if self.pc == 0 {
            0
        } else if self.pc < self.lines.len() {
            self.pc + 1
        } else {
            self.lines.len()
        };
        let call_stack = if self.finished {
            Vec::new()
        } else {
            vec![format!("line {current_line}")]
        };
        ExecutionState {
            current_line,
            variables: self.variables.clone(),
            output: self.output.clone(),
            error: self.error.clone(),
            finished: self.finished,
            call_stack,
        }
    }
}
