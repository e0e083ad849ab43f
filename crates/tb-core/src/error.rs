use crate::expr::error::ExprError;
use crate::table::TableError;

#[derive(thiserror::Error, Debug)]
pub enum TabulonError {
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("Query error: {0}")]
    Query(String),
}
