//! Predicate compilation errors
//!
//! Every error names the offending token and its byte position in the
//! source text; compile errors are never recoverable in place.

use thiserror::Error;

/// Errors raised while compiling a textual predicate
#[derive(Debug, Error)]
pub enum ExprError {
    #[error("Unexpected token '{token}' at position {position}: {message}")]
    UnexpectedToken {
        token: String,
        position: usize,
        message: String,
    },

    #[error("Unexpected end of expression at position {position}: expected {expected}")]
    UnexpectedEnd { position: usize, expected: String },

    #[error("Unmatched parenthesis at position {position}")]
    UnmatchedParen { position: usize },

    #[error("Unknown column '{name}' at position {position}")]
    UnknownColumn { name: String, position: usize },

    #[error("Malformed literal '{token}' at position {position}")]
    BadLiteral { token: String, position: usize },

    #[error("Invalid regex /{pattern}/ at position {position}: {source}")]
    BadRegex {
        pattern: String,
        position: usize,
        source: regex::Error,
    },

    #[error(
        "Missing parentheses around binary expression at position {position}: \
         every AND/OR operand must be parenthesised"
    )]
    MissingParens { position: usize },
}

/// Result type for predicate compilation
pub type ExprResult<T> = std::result::Result<T, ExprError>;

impl ExprError {
    /// Create an unexpected-token error
    pub fn unexpected(token: impl Into<String>, position: usize, message: impl Into<String>) -> Self {
        ExprError::UnexpectedToken {
            token: token.into(),
            position,
            message: message.into(),
        }
    }

    /// Create an unexpected-end error
    pub fn eof(position: usize, expected: impl Into<String>) -> Self {
        ExprError::UnexpectedEnd {
            position,
            expected: expected.into(),
        }
    }
}
