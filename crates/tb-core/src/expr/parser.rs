//! Recursive-descent parser for textual predicates
//!
//! The grammar carries no operator precedence: every binary connective's
//! operands must be parenthesised comparisons or groups. A second connective
//! at the same level is rejected with a dedicated error so callers learn the
//! rule from the message.

use super::error::{ExprError, ExprResult};
use super::token::{tokenize, Token};
use super::{Operand, Predicate};
use crate::table::{Header, Value};

/// Predicate parser over a token stream
pub struct ExprParser<'a> {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    end: usize,
    header: &'a Header,
}

impl<'a> ExprParser<'a> {
    /// Compile a textual predicate against a header
    pub fn parse(text: &str, header: &'a Header) -> ExprResult<Predicate> {
        let tokens = tokenize(text)?;
        let mut parser = ExprParser {
            tokens,
            cursor: 0,
            end: text.len(),
            header,
        };

        if parser.peek().is_none() {
            return Err(ExprError::eof(0, "a predicate expression"));
        }

        let predicate = parser.parse_clause()?;

        match parser.peek() {
            None => Ok(predicate),
            Some((Token::And | Token::Or, pos)) => Err(ExprError::MissingParens { position: *pos }),
            Some((token, pos)) => Err(ExprError::unexpected(
                token.describe(),
                *pos,
                "expected end of expression",
            )),
        }
    }

    // clause := operand [ (AND|OR) operand ]
    fn parse_clause(&mut self) -> ExprResult<Predicate> {
        let left = self.parse_operand()?;

        match self.peek() {
            Some((Token::And, _)) => {
                self.advance();
                let right = self.parse_operand()?;
                self.reject_chain()?;
                Ok(Predicate::and(left, right))
            }
            Some((Token::Or, _)) => {
                self.advance();
                let right = self.parse_operand()?;
                self.reject_chain()?;
                Ok(Predicate::or(left, right))
            }
            _ => Ok(left),
        }
    }

    // A third operand at the same level needs its own parentheses.
    fn reject_chain(&mut self) -> ExprResult<()> {
        if let Some((Token::And | Token::Or, pos)) = self.peek() {
            return Err(ExprError::MissingParens { position: *pos });
        }
        Ok(())
    }

    // operand := NOT operand | '(' clause ')' | comparison
    fn parse_operand(&mut self) -> ExprResult<Predicate> {
        match self.peek() {
            Some((Token::Not, _)) => {
                self.advance();
                Ok(Predicate::negate(self.parse_operand()?))
            }
            Some((Token::LParen, open_pos)) => {
                let open_pos = *open_pos;
                self.advance();
                let inner = self.parse_clause()?;
                match self.peek() {
                    Some((Token::RParen, _)) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some((Token::And | Token::Or, pos)) => {
                        Err(ExprError::MissingParens { position: *pos })
                    }
                    Some((token, pos)) => Err(ExprError::unexpected(
                        token.describe(),
                        *pos,
                        "expected ')'",
                    )),
                    None => Err(ExprError::UnmatchedParen { position: open_pos }),
                }
            }
            Some(_) => self.parse_comparison(),
            None => Err(ExprError::eof(self.end, "an operand")),
        }
    }

    // comparison := column cmpop rhs | column '~=' /regex/
    fn parse_comparison(&mut self) -> ExprResult<Predicate> {
        let (column, col_pos) = match self.next() {
            Some((Token::Ident(name), pos)) => (name, pos),
            Some((token, pos)) => {
                return Err(ExprError::unexpected(
                    token.describe(),
                    pos,
                    "expected a column name",
                ));
            }
            None => return Err(ExprError::eof(self.end, "a column name")),
        };

        if !self.header.contains(&column) {
            return Err(ExprError::UnknownColumn {
                name: column,
                position: col_pos,
            });
        }

        match self.next() {
            Some((Token::Cmp(op), _)) => {
                let rhs = self.parse_rhs()?;
                Ok(Predicate::compare(column, op, rhs))
            }
            Some((Token::Match, _)) => match self.next() {
                Some((Token::Regex(pattern), pos)) => {
                    let regex =
                        regex::Regex::new(&pattern).map_err(|source| ExprError::BadRegex {
                            pattern: pattern.clone(),
                            position: pos,
                            source,
                        })?;
                    Ok(Predicate::Match { column, regex })
                }
                Some((token, pos)) => Err(ExprError::unexpected(
                    token.describe(),
                    pos,
                    "expected /regex/ after '~='",
                )),
                None => Err(ExprError::eof(self.end, "/regex/ after '~='")),
            },
            Some((token, pos)) => Err(ExprError::unexpected(
                token.describe(),
                pos,
                "expected a comparison operator",
            )),
            None => Err(ExprError::eof(self.end, "a comparison operator")),
        }
    }

    // rhs := literal | column
    fn parse_rhs(&mut self) -> ExprResult<Operand> {
        match self.next() {
            Some((Token::Number(text), pos)) => {
                let value = if text.contains(['.', 'e', 'E']) {
                    text.parse::<f64>().map(Value::Float)
                } else {
                    text.parse::<i64>().map(Value::Int).or_else(|_| {
                        // Too large for i64; fall back to float.
                        text.parse::<f64>().map(Value::Float)
                    })
                };
                value
                    .map(Operand::Literal)
                    .map_err(|_| ExprError::BadLiteral {
                        token: text,
                        position: pos,
                    })
            }
            Some((Token::Quoted(text), _)) => Ok(Operand::Literal(Value::Str(text))),
            Some((Token::Ident(name), pos)) => match name.as_str() {
                "true" => Ok(Operand::Literal(Value::Bool(true))),
                "false" => Ok(Operand::Literal(Value::Bool(false))),
                "NA" => Ok(Operand::Literal(Value::Na)),
                _ => {
                    if self.header.contains(&name) {
                        Ok(Operand::Column(name))
                    } else {
                        Err(ExprError::UnknownColumn {
                            name,
                            position: pos,
                        })
                    }
                }
            },
            Some((token, pos)) => Err(ExprError::unexpected(
                token.describe(),
                pos,
                "expected a literal or column name",
            )),
            None => Err(ExprError::eof(self.end, "a literal or column name")),
        }
    }

    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }
}
