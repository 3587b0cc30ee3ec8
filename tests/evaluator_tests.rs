use script_debugger::{EvalContext, EvalError, Interpreter, ScriptEvaluator, Value};

fn fresh_context() -> (Interpreter, EvalContext) {
    let interpreter = Interpreter::new();
    let mut ctx = EvalContext::new();
    interpreter.install_builtins(&mut ctx);
    (interpreter, ctx)
}

fn eval(source: &str) -> Result<Value, EvalError> {
    let (mut interpreter, mut ctx) = fresh_context();
    interpreter
        .eval_expression(&mut ctx, source)
        .map(|exec| exec.value)
}

fn eval_ok(source: &str) -> Value {
    eval(source).unwrap_or_else(|err| panic!("'{source}' should evaluate, got {err}"))
}

#[cfg(test)]
mod expression_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval_ok("1 + 2 * 3"), Value::Int(7));
        assert_eq!(eval_ok("(1 + 2) * 3"), Value::Int(9));
        assert_eq!(eval_ok("10 - 2 - 3"), Value::Int(5), "subtraction is left-assoc");
        assert_eq!(eval_ok("7 % 3"), Value::Int(1));
    }

    #[test]
    fn test_division_always_yields_float() {
        assert_eq!(eval_ok("1 / 2"), Value::Float(0.5));
        assert_eq!(eval_ok("4 / 2"), Value::Float(2.0));
        assert_eq!(eval_ok("4 / 2").to_string(), "2.0");
    }

    #[test]
    fn test_int_float_promotion() {
        assert_eq!(eval_ok("1 + 2.5"), Value::Float(3.5));
        assert_eq!(eval_ok("2 * 1.5"), Value::Float(3.0));
        assert_eq!(eval_ok("1 == 1.0"), Value::Bool(true));
    }

    #[test]
    fn test_string_and_list_concatenation() {
        assert_eq!(eval_ok("'ab' + 'cd'"), Value::Str("abcd".to_string()));
        assert_eq!(
            eval_ok("[1] + [2, 3]"),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_ok("1 < 2"), Value::Bool(true));
        assert_eq!(eval_ok("2.5 >= 3"), Value::Bool(false));
        assert_eq!(eval_ok("'apple' < 'banana'"), Value::Bool(true));
        assert_eq!(eval_ok("[1, 2] == [1, 2]"), Value::Bool(true));
        assert_eq!(eval_ok("1 != 'one'"), Value::Bool(true));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(eval_ok("-3"), Value::Int(-3));
        assert_eq!(eval_ok("--3"), Value::Int(3));
        assert_eq!(eval_ok("not true"), Value::Bool(false));
        assert_eq!(eval_ok("not 0"), Value::Bool(true));
        assert_eq!(eval_ok("not 'text'"), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_returns_deciding_operand() {
        assert_eq!(eval_ok("0 or 5"), Value::Int(5));
        assert_eq!(eval_ok("3 or 5"), Value::Int(3));
        assert_eq!(eval_ok("0 and 5"), Value::Int(0));
        // The right side must not be evaluated at all.
        assert_eq!(eval_ok("false and missing_name"), Value::Bool(false));
        assert_eq!(eval_ok("1 or missing_name"), Value::Int(1));
    }

    #[test]
    fn test_indexing() {
        assert_eq!(eval_ok("[10, 20, 30][1]"), Value::Int(20));
        assert_eq!(eval_ok("[10, 20, 30][-1]"), Value::Int(30));
        assert_eq!(eval_ok("'abc'[0]"), Value::Str("a".to_string()));
        assert_eq!(eval_ok("'abc'[-2]"), Value::Str("b".to_string()));

        let err = eval("[1, 2][5]").expect_err("out of range");
        assert_eq!(err, EvalError::Runtime("list index out of range".to_string()));
    }

    #[test]
    fn test_error_taxonomy() {
        assert_eq!(eval("1 / 0").expect_err("zero"), EvalError::DivisionByZero);
        assert_eq!(eval("5 % 0").expect_err("zero"), EvalError::DivisionByZero);
        assert_eq!(
            eval("ghost").expect_err("unknown name"),
            EvalError::Undefined("ghost".to_string())
        );
        assert!(matches!(eval("1 + 'a'").expect_err("mixed"), EvalError::Type(_)));
        assert!(matches!(eval("1 +").expect_err("cut off"), EvalError::Syntax(_)));
        assert!(matches!(eval("1 @ 2").expect_err("bad char"), EvalError::Syntax(_)));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(eval_ok("'a\\nb'"), Value::Str("a\nb".to_string()));
        assert_eq!(eval_ok("\"say \\\"hi\\\"\""), Value::Str("say \"hi\"".to_string()));
        assert!(matches!(eval("'open").expect_err("unterminated"), EvalError::Syntax(_)));
    }

    #[test]
    fn test_value_forms() {
        assert_eq!(eval_ok("none").to_string(), "none");
        assert_eq!(eval_ok("'hi'").repr(), "\"hi\"");
        assert_eq!(eval_ok("[1, 'a']").to_string(), "[1, \"a\"]");
        assert_eq!(eval_ok("2.5").type_name(), "float");
        assert_eq!(eval_ok("true").type_name(), "bool");
    }
}

#[cfg(test)]
mod builtin_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_len_type_str() {
        assert_eq!(eval_ok("len('abc')"), Value::Int(3));
        assert_eq!(eval_ok("len([1, 2])"), Value::Int(2));
        assert_eq!(eval_ok("type(1)"), Value::Str("int".to_string()));
        assert_eq!(eval_ok("type(none)"), Value::Str("NoneType".to_string()));
        assert_eq!(eval_ok("str(2.0)"), Value::Str("2.0".to_string()));
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(eval_ok("int('42')"), Value::Int(42));
        assert_eq!(eval_ok("int(3.9)"), Value::Int(3));
        assert_eq!(eval_ok("float(1)"), Value::Float(1.0));
        assert_eq!(eval_ok("abs(-3)"), Value::Int(3));
        assert_eq!(eval_ok("abs(-1.5)"), Value::Float(1.5));

        assert!(matches!(
            eval("int('nope')").expect_err("bad literal"),
            EvalError::Runtime(_)
        ));
    }

    #[test]
    fn test_arity_is_checked() {
        assert!(matches!(eval("len()").expect_err("no args"), EvalError::Type(_)));
        assert!(matches!(eval("abs(1, 2)").expect_err("two args"), EvalError::Type(_)));
    }

    #[test]
    fn test_print_writes_to_captured_output() {
        let (mut interpreter, mut ctx) = fresh_context();

        let exec = interpreter
            .eval_expression(&mut ctx, "print(1, 'a', [2])")
            .expect("print succeeds");

        assert_eq!(exec.output, "1 a [2]\n");
        assert_eq!(exec.value, Value::None);
    }

    #[test]
    fn test_non_callable_call_is_a_type_error() {
        let err = eval("'abc'(1)").expect_err("strings are not callable");
        assert!(matches!(err, EvalError::Type(_)));
    }
}

#[cfg(test)]
mod statement_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assignment_records_value_and_line() {
        let (mut interpreter, mut ctx) = fresh_context();

        interpreter
            .exec_statement(&mut ctx, "x = 1 + 2", 4)
            .expect("assignment succeeds");

        let binding = ctx.get("x").expect("bound");
        assert_eq!(binding.value, Value::Int(3));
        assert_eq!(binding.line_defined, 4);
    }

    #[test]
    fn test_augmented_assignment() {
        let (mut interpreter, mut ctx) = fresh_context();
        interpreter.exec_statement(&mut ctx, "x = 10", 1).expect("set");

        interpreter.exec_statement(&mut ctx, "x += 5", 2).expect("add");
        assert_eq!(ctx.get("x").expect("bound").value, Value::Int(15));
        assert_eq!(ctx.get("x").expect("bound").line_defined, 2);

        interpreter.exec_statement(&mut ctx, "x /= 2", 3).expect("div");
        assert_eq!(ctx.get("x").expect("bound").value, Value::Float(7.5));

        let err = interpreter
            .exec_statement(&mut ctx, "ghost += 1", 4)
            .expect_err("augmenting an unbound name");
        assert_eq!(err, EvalError::Undefined("ghost".to_string()));
    }

    #[test]
    fn test_bare_expression_is_not_a_statement() {
        let (mut interpreter, mut ctx) = fresh_context();

        let err = interpreter
            .exec_statement(&mut ctx, "1 + 1", 1)
            .expect_err("expressions are routed through the retry");
        assert!(err.is_syntax());
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        let (mut interpreter, mut ctx) = fresh_context();

        interpreter
            .exec_statement(&mut ctx, "x = 1  # the answer, eventually", 1)
            .expect("comment does not affect the statement");

        assert_eq!(ctx.get("x").expect("bound").value, Value::Int(1));
    }
}

#[cfg(test)]
mod program_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_program_combines_output() {
        let (mut interpreter, mut ctx) = fresh_context();

        let exec = interpreter
            .exec_program(&mut ctx, "x = 1\n\n# note\nprint(x)\nprint(x + 1)")
            .expect("program runs");

        assert_eq!(exec.output, "1\n2\n");
    }

    #[test]
    fn test_program_expression_lines_do_not_echo() {
        let (mut interpreter, mut ctx) = fresh_context();

        let exec = interpreter
            .exec_program(&mut ctx, "x = 1\nx + 1\nprint(x)")
            .expect("program runs");

        assert_eq!(exec.output, "1\n", "no REPL echo in whole-program mode");
    }

    #[test]
    fn test_program_error_names_the_line() {
        let (mut interpreter, mut ctx) = fresh_context();

        let err = interpreter
            .exec_program(&mut ctx, "x = 1\ny = x / 0")
            .expect_err("division fails");

        assert_eq!(
            err,
            EvalError::Runtime("line 2: division by zero".to_string())
        );
    }
}
