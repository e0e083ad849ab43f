//! Tokenizer for textual predicates
//!
//! Splits an expression like `(age >= 21) AND (name ~= /^J/)` into tokens,
//! respecting quoted string literals and `/regex/` delimiters. Each token
//! carries its byte position for error reporting.

use super::error::{ExprError, ExprResult};

use std::iter::Peekable;
use std::str::CharIndices;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// One token of a predicate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Cmp(CmpOp),
    /// `~=` regex-match operator
    Match,
    Ident(String),
    Number(String),
    Quoted(String),
    Regex(String),
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
            Token::Not => "NOT".to_string(),
            Token::Cmp(op) => op.symbol().to_string(),
            Token::Match => "~=".to_string(),
            Token::Ident(s) => s.clone(),
            Token::Number(s) => s.clone(),
            Token::Quoted(s) => format!("'{}'", s),
            Token::Regex(s) => format!("/{}/", s),
        }
    }
}

/// Tokenize a predicate expression into (token, position) pairs
pub fn tokenize(text: &str) -> ExprResult<Vec<(Token, usize)>> {
    let mut chars: Peekable<CharIndices<'_>> = text.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push((Token::LParen, pos));
            }
            ')' => {
                chars.next();
                tokens.push((Token::RParen, pos));
            }
            '^' => {
                chars.next();
                tokens.push((Token::Not, pos));
            }
            '=' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push((Token::Cmp(CmpOp::Eq), pos));
                    }
                    _ => return Err(ExprError::unexpected("=", pos, "expected '=='")),
                }
            }
            '!' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push((Token::Cmp(CmpOp::Ne), pos));
                    }
                    _ => return Err(ExprError::unexpected("!", pos, "expected '!='")),
                }
            }
            '<' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push((Token::Cmp(CmpOp::Le), pos));
                } else {
                    tokens.push((Token::Cmp(CmpOp::Lt), pos));
                }
            }
            '>' => {
                chars.next();
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    tokens.push((Token::Cmp(CmpOp::Ge), pos));
                } else {
                    tokens.push((Token::Cmp(CmpOp::Gt), pos));
                }
            }
            '~' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, '=')) => {
                        chars.next();
                        tokens.push((Token::Match, pos));
                    }
                    _ => return Err(ExprError::unexpected("~", pos, "expected '~='")),
                }
            }
            '/' => {
                chars.next();
                let mut pattern = String::new();
                loop {
                    match chars.next() {
                        Some((_, '/')) => break,
                        Some((_, c)) => pattern.push(c),
                        None => return Err(ExprError::eof(text.len(), "closing '/'".to_string())),
                    }
                }
                tokens.push((Token::Regex(pattern), pos));
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => literal.push(c),
                        None => {
                            return Err(ExprError::eof(text.len(), format!("closing {}", quote)));
                        }
                    }
                }
                tokens.push((Token::Quoted(literal), pos));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let mut number = String::new();
                number.push(c);
                chars.next();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '-' || c == '+'
                    {
                        // Sign continuation only directly after an exponent.
                        if (c == '-' || c == '+')
                            && !matches!(number.chars().last(), Some('e') | Some('E'))
                        {
                            break;
                        }
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Number(number), pos));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.as_str() {
                    "AND" => tokens.push((Token::And, pos)),
                    "OR" => tokens.push((Token::Or, pos)),
                    "NOT" => tokens.push((Token::Not, pos)),
                    _ => tokens.push((Token::Ident(word), pos)),
                }
            }
            other => {
                return Err(ExprError::unexpected(
                    other.to_string(),
                    pos,
                    "not a valid predicate character",
                ));
            }
        }
    }

    Ok(tokens)
}
