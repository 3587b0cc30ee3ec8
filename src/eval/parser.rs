use super::ast::{AssignOp, BinaryOp, Expr, Stmt, UnaryOp};
use super::error::EvalError;
use super::lexer::{tokenize, Token};
use super::value::Value;

/// Parse one source line as a statement.
pub fn parse_statement(source: &str) -> Result<Stmt, EvalError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(EvalError::Syntax("empty statement".to_string()));
    }

    let assign_op = match (tokens.first(), tokens.get(1)) {
        (Some(Token::Ident(_)), Some(Token::Assign)) => AssignOp::Set,
        (Some(Token::Ident(_)), Some(Token::PlusAssign)) => AssignOp::Add,
        (Some(Token::Ident(_)), Some(Token::MinusAssign)) => AssignOp::Sub,
        (Some(Token::Ident(_)), Some(Token::StarAssign)) => AssignOp::Mul,
        (Some(Token::Ident(_)), Some(Token::SlashAssign)) => AssignOp::Div,
        _ => {
            return Err(EvalError::Syntax("not an assignment".to_string()));
        }
    };

    let name = match &tokens[0] {
        Token::Ident(name) => name.clone(),
        _ => unreachable!("matched above"),
    };

    let mut parser = Parser {
        tokens: &tokens,
        pos: 2,
    };
    let value = parser.expression()?;
    parser.expect_end()?;

    Ok(Stmt::Assign {
        name,
        op: assign_op,
        value,
    })
}

/// Parse one source line as an expression.
pub fn parse_expression(source: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(EvalError::Syntax("empty expression".to_string()));
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let expr = parser.expression()?;
    parser.expect_end()?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), EvalError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(match self.peek() {
                Some(found) => {
                    EvalError::Syntax(format!("expected '{expected}', found '{found}'"))
                }
                None => EvalError::Syntax(format!("expected '{expected}', found end of line")),
            })
        }
    }

    fn expect_end(&self) -> Result<(), EvalError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(EvalError::Syntax(format!(
                "unexpected trailing input at '{token}'"
            ))),
        }
    }

    // Precedence, loosest first: or, and, not, comparison, +/-, */'/'/%,
    // unary -, postfix call/index, atom.
    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::Or) {
            let rhs = self.and_expr()?;
            lhs = Expr::Or {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.not_expr()?;
        while self.eat(&Token::And) {
            let rhs = self.not_expr()?;
            lhs = Expr::And {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Not) {
            let operand = self.not_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Minus) {
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&Token::LParen) {
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    loop {
                        args.push(self.expression()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Token::RParen)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.eat(&Token::LBracket) {
                let index = self.expression()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, EvalError> {
        let token = match self.advance() {
            Some(token) => token.clone(),
            None => {
                return Err(EvalError::Syntax(
                    "unexpected end of expression".to_string(),
                ));
            }
        };
        match token {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::NoneLit => Ok(Expr::Literal(Value::None)),
            Token::Ident(name) => Ok(Expr::Ident(name)),
            Token::LParen => {
                let expr = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => {
                let mut items = Vec::new();
                if self.peek() != Some(&Token::RBracket) {
                    loop {
                        items.push(self.expression()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                        // allow a trailing comma
                        if self.peek() == Some(&Token::RBracket) {
                            break;
                        }
                    }
                }
                self.expect(&Token::RBracket)?;
                Ok(Expr::List(items))
            }
            other => Err(EvalError::Syntax(format!("unexpected token '{other}'"))),
        }
    }
}
