use super::error::EvalError;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    NoneLit,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(i) => write!(f, "{i}"),
            Token::Float(x) => write!(f, "{x}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::NoneLit => write!(f, "none"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Assign => write!(f, "="),
            Token::PlusAssign => write!(f, "+="),
            Token::MinusAssign => write!(f, "-="),
            Token::StarAssign => write!(f, "*="),
            Token::SlashAssign => write!(f, "/="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Tokenize one source line. A `#` starts a comment running to the end of
/// the input.
pub fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '#' {
            break;
        }

        if ch.is_ascii_digit() {
            tokens.push(lex_number(&mut chars)?);
            continue;
        }

        if ch == '"' || ch == '\'' {
            tokens.push(lex_string(&mut chars)?);
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(match name.as_str() {
                "true" => Token::True,
                "false" => Token::False,
                "none" => Token::NoneLit,
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                _ => Token::Ident(name),
            });
            continue;
        }

        chars.next();
        let follows_eq = chars.peek() == Some(&'=');
        let token = match (ch, follows_eq) {
            ('=', true) => {
                chars.next();
                Token::Eq
            }
            ('=', false) => Token::Assign,
            ('!', true) => {
                chars.next();
                Token::Ne
            }
            ('<', true) => {
                chars.next();
                Token::Le
            }
            ('<', false) => Token::Lt,
            ('>', true) => {
                chars.next();
                Token::Ge
            }
            ('>', false) => Token::Gt,
            ('+', true) => {
                chars.next();
                Token::PlusAssign
            }
            ('+', false) => Token::Plus,
            ('-', true) => {
                chars.next();
                Token::MinusAssign
            }
            ('-', false) => Token::Minus,
            ('*', true) => {
                chars.next();
                Token::StarAssign
            }
            ('*', false) => Token::Star,
            ('/', true) => {
                chars.next();
                Token::SlashAssign
            }
            ('/', false) => Token::Slash,
            ('%', _) => Token::Percent,
            ('(', _) => Token::LParen,
            (')', _) => Token::RParen,
            ('[', _) => Token::LBracket,
            (']', _) => Token::RBracket,
            (',', _) => Token::Comma,
            _ => {
                return Err(EvalError::Syntax(format!("unexpected character '{ch}'")));
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn lex_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<Token, EvalError> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }

    // A dot only continues the number when a digit follows, so "1.x" still
    // fails loudly instead of lexing as 1.0 followed by garbage.
    let mut is_float = false;
    if chars.peek() == Some(&'.') {
        let mut lookahead = chars.clone();
        lookahead.next();
        if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            chars.next();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }

    if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| EvalError::Syntax(format!("invalid number literal '{text}'")))
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| EvalError::Syntax(format!("invalid number literal '{text}'")))
    }
}

fn lex_string(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<Token, EvalError> {
    let quote = chars.next().expect("caller checked the quote");
    let mut text = String::new();

    while let Some(c) = chars.next() {
        if c == quote {
            return Ok(Token::Str(text));
        }
        if c == '\\' {
            match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('\\') => text.push('\\'),
                Some('"') => text.push('"'),
                Some('\'') => text.push('\''),
                Some(other) => {
                    return Err(EvalError::Syntax(format!("unknown escape '\\{other}'")));
                }
                None => break,
            }
            continue;
        }
        text.push(c);
    }

    Err(EvalError::Syntax("unterminated string literal".to_string()))
}
