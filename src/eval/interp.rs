use super::ast::{AssignOp, BinaryOp, Expr, Stmt, UnaryOp};
use super::context::EvalContext;
use super::error::EvalError;
use super::parser::{parse_expression, parse_statement};
use super::value::{Builtin, Value};
use super::{Execution, ScriptEvaluator};

/// Tree-walking evaluator for the built-in scripting language.
///
/// Holds no state of its own: all bindings live in the `EvalContext`, and
/// every call gets a fresh output buffer, so nothing leaks between lines
/// or between sessions sharing an interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Interpreter
    }

    fn run_statement(
        &self,
        ctx: &mut EvalContext,
        stmt: &Stmt,
        line: usize,
        out: &mut String,
    ) -> Result<(), EvalError> {
        match stmt {
            Stmt::Assign { name, op, value } => {
                let rhs = self.eval(ctx, value, out)?;
                let next = match op {
                    AssignOp::Set => rhs,
                    augmented => {
                        let current = ctx
                            .get(name)
                            .map(|binding| binding.value.clone())
                            .ok_or_else(|| EvalError::Undefined(name.clone()))?;
                        let bin_op = match augmented {
                            AssignOp::Add => BinaryOp::Add,
                            AssignOp::Sub => BinaryOp::Sub,
                            AssignOp::Mul => BinaryOp::Mul,
                            AssignOp::Div => BinaryOp::Div,
                            AssignOp::Set => unreachable!("handled above"),
                        };
                        apply_binary(bin_op, current, rhs)?
                    }
                };
                ctx.set(name, next, line);
                Ok(())
            }
        }
    }

    fn eval(
        &self,
        ctx: &mut EvalContext,
        expr: &Expr,
        out: &mut String,
    ) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => ctx
                .get(name)
                .map(|binding| binding.value.clone())
                .ok_or_else(|| EvalError::Undefined(name.clone())),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(ctx, item, out)?);
                }
                Ok(Value::List(values))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(ctx, operand, out)?;
                apply_unary(*op, value)
            }
            Expr::And { lhs, rhs } => {
                let left = self.eval(ctx, lhs, out)?;
                if left.is_truthy() {
                    self.eval(ctx, rhs, out)
                } else {
                    Ok(left)
                }
            }
            Expr::Or { lhs, rhs } => {
                let left = self.eval(ctx, lhs, out)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(ctx, rhs, out)
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let left = self.eval(ctx, lhs, out)?;
                let right = self.eval(ctx, rhs, out)?;
                apply_binary(*op, left, right)
            }
            Expr::Index { target, index } => {
                let target = self.eval(ctx, target, out)?;
                let index = self.eval(ctx, index, out)?;
                apply_index(target, index)
            }
            Expr::Call { callee, args } => {
                let callee = self.eval(ctx, callee, out)?;
                let builtin = match callee {
                    Value::Builtin(builtin) => builtin,
                    other => {
                        return Err(EvalError::Type(format!(
                            "'{}' object is not callable",
                            other.type_name()
                        )));
                    }
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(ctx, arg, out)?);
                }
                call_builtin(builtin, &values, out)
            }
        }
    }
}

impl ScriptEvaluator for Interpreter {
    fn install_builtins(&self, ctx: &mut EvalContext) {
        for builtin in Builtin::ALL {
            ctx.set(builtin.name(), Value::Builtin(builtin), 0);
        }
    }

    fn exec_statement(
        &mut self,
        ctx: &mut EvalContext,
        source: &str,
        line: usize,
    ) -> Result<Execution, EvalError> {
        let stmt = parse_statement(source)?;
        let mut out = String::new();
        self.run_statement(ctx, &stmt, line, &mut out)?;
        Ok(Execution {
            value: Value::None,
            output: out,
        })
    }

    fn eval_expression(&mut self, ctx: &mut EvalContext, source: &str) -> Result<Execution, EvalError> {
        let expr = parse_expression(source)?;
        let mut out = String::new();
        let value = self.eval(ctx, &expr, &mut out)?;
        Ok(Execution { value, output: out })
    }

    fn exec_program(&mut self, ctx: &mut EvalContext, source: &str) -> Result<Execution, EvalError> {
        let mut out = String::new();
        for (idx, raw) in source.split('\n').enumerate() {
            let line_no = idx + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let result = match parse_statement(text) {
                Ok(stmt) => self.run_statement(ctx, &stmt, line_no, &mut out),
                // Bare expression lines run for their side effects only;
                // auto-printing is a stepping-mode behavior.
                Err(err) if err.is_syntax() => parse_expression(text)
                    .and_then(|expr| self.eval(ctx, &expr, &mut out))
                    .map(|_| ()),
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                return Err(err.at_line(line_no));
            }
        }
        Ok(Execution {
            value: Value::None,
            output: out,
        })
    }
}

fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => match value {
            Value::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| EvalError::Runtime("integer overflow".to_string())),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(EvalError::Type(format!(
                "bad operand type for unary -: '{}'",
                other.type_name()
            ))),
        },
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (left, right) {
                (Value::Int(a), Value::Int(b)) => a == b,
                _ => {
                    let (Some(a), Some(b)) = (as_f64(left), as_f64(right)) else {
                        return false;
                    };
                    a == b
                }
            }
        }
        (a, b) => a == b,
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::Ne => return Ok(Value::Bool(!values_equal(&left, &right))),
        _ => {}
    }

    let type_error = |op: BinaryOp, left: &Value, right: &Value| {
        EvalError::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))
    };

    match op {
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
                _ => match (as_f64(&left), as_f64(&right)) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => return Err(type_error(op, &left, &right)),
                },
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            let result = match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                BinaryOp::Ge => ordering.is_ge(),
                _ => unreachable!("matched above"),
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::Runtime("integer overflow".to_string())),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (left, right) => match (as_f64(&left), as_f64(&right)) {
                (Some(a), Some(b)) => Ok(Value::Float(a + b)),
                _ => Err(type_error(BinaryOp::Add, &left, &right)),
            },
        },
        BinaryOp::Sub => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::Runtime("integer overflow".to_string())),
            (left, right) => match (as_f64(&left), as_f64(&right)) {
                (Some(a), Some(b)) => Ok(Value::Float(a - b)),
                _ => Err(type_error(BinaryOp::Sub, &left, &right)),
            },
        },
        BinaryOp::Mul => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::Runtime("integer overflow".to_string())),
            (left, right) => match (as_f64(&left), as_f64(&right)) {
                (Some(a), Some(b)) => Ok(Value::Float(a * b)),
                _ => Err(type_error(BinaryOp::Mul, &left, &right)),
            },
        },
        // Division always yields a float.
        BinaryOp::Div => match (as_f64(&left), as_f64(&right)) {
            (Some(_), Some(b)) if b == 0.0 => Err(EvalError::DivisionByZero),
            (Some(a), Some(b)) => Ok(Value::Float(a / b)),
            _ => Err(type_error(BinaryOp::Div, &left, &right)),
        },
        BinaryOp::Mod => match (left, right) {
            (Value::Int(_), Value::Int(0)) => Err(EvalError::DivisionByZero),
            (Value::Int(a), Value::Int(b)) => a
                .checked_rem(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::Runtime("integer overflow".to_string())),
            (left, right) => match (as_f64(&left), as_f64(&right)) {
                (Some(_), Some(b)) if b == 0.0 => Err(EvalError::DivisionByZero),
                (Some(a), Some(b)) => Ok(Value::Float(a % b)),
                _ => Err(type_error(BinaryOp::Mod, &left, &right)),
            },
        },
        BinaryOp::Eq | BinaryOp::Ne => unreachable!("handled above"),
    }
}

fn apply_index(target: Value, index: Value) -> Result<Value, EvalError> {
    let Value::Int(raw) = index else {
        return Err(EvalError::Type(format!(
            "indices must be integers, not '{}'",
            index.type_name()
        )));
    };

    let resolve = |len: usize| -> Option<usize> {
        let idx = if raw < 0 { raw + len as i64 } else { raw };
        if idx < 0 || idx as usize >= len {
            None
        } else {
            Some(idx as usize)
        }
    };

    match target {
        Value::List(items) => resolve(items.len())
            .map(|i| items[i].clone())
            .ok_or_else(|| EvalError::Runtime("list index out of range".to_string())),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            resolve(chars.len())
                .map(|i| Value::Str(chars[i].to_string()))
                .ok_or_else(|| EvalError::Runtime("string index out of range".to_string()))
        }
        other => Err(EvalError::Type(format!(
            "'{}' object is not indexable",
            other.type_name()
        ))),
    }
}

fn expect_arity(builtin: Builtin, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::Type(format!(
            "{}() takes exactly {} argument(s) ({} given)",
            builtin.name(),
            expected,
            args.len()
        )))
    }
}

fn call_builtin(builtin: Builtin, args: &[Value], out: &mut String) -> Result<Value, EvalError> {
    match builtin {
        Builtin::Print => {
            let parts: Vec<String> = args.iter().map(Value::to_string).collect();
            out.push_str(&parts.join(" "));
            out.push('\n');
            Ok(Value::None)
        }
        Builtin::Len => {
            expect_arity(builtin, args, 1)?;
            match &args[0] {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::List(items) => Ok(Value::Int(items.len() as i64)),
                other => Err(EvalError::Type(format!(
                    "object of type '{}' has no len()",
                    other.type_name()
                ))),
            }
        }
        Builtin::Type => {
            expect_arity(builtin, args, 1)?;
            Ok(Value::Str(args[0].type_name().to_string()))
        }
        Builtin::Str => {
            expect_arity(builtin, args, 1)?;
            Ok(Value::Str(args[0].to_string()))
        }
        Builtin::Int => {
            expect_arity(builtin, args, 1)?;
            match &args[0] {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Float(f) => {
                    if f.is_finite() && f.abs() < 9.2e18 {
                        Ok(Value::Int(f.trunc() as i64))
                    } else {
                        Err(EvalError::Runtime(format!("cannot convert {f} to int")))
                    }
                }
                Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                    EvalError::Runtime(format!("invalid literal for int(): '{s}'"))
                }),
                other => Err(EvalError::Type(format!(
                    "int() argument must be a number or string, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::Float => {
            expect_arity(builtin, args, 1)?;
            match &args[0] {
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    EvalError::Runtime(format!("invalid literal for float(): '{s}'"))
                }),
                other => Err(EvalError::Type(format!(
                    "float() argument must be a number or string, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::Abs => {
            expect_arity(builtin, args, 1)?;
            match &args[0] {
                Value::Int(i) => i
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::Runtime("integer overflow".to_string())),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(EvalError::Type(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))),
            }
        }
    }
}
