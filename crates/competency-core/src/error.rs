//! Question bank configuration errors.
//!
//! These are raised when a bank or threshold table is constructed, so a
//! misconfigured bank is rejected before any learner is graded against it.

use thiserror::Error;

use crate::model::Category;

/// Errors that can occur when building a question bank or threshold table.
#[derive(Debug, Error, PartialEq)]
pub enum BankError {
    /// Two questions share the same identifier.
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(String),

    /// A question carries no weight.
    #[error("question {0} has zero points")]
    ZeroPoints(String),

    /// A threshold table does not cover a category.
    #[error("no pass threshold configured for category {0}")]
    MissingThreshold(Category),

    /// A threshold is outside the 0-100 percentage range.
    #[error("pass threshold for {category} must be between 0 and 100, got {value}")]
    InvalidThreshold { category: Category, value: f64 },
}
