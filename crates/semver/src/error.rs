use thiserror::Error;

/// Errors produced while parsing versions and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected a version of the form major.minor.patch, got: {0}")]
    InvalidVersion(String),

    #[error("expected a numeric version component, got: {0}")]
    InvalidComponent(String),

    #[error("expected a constraint of the form `>=LOWER <UPPER`, got: {0}")]
    InvalidConstraint(String),

    #[error("unknown comparison operator: {0}")]
    InvalidOperator(String),

    #[error("constraint lower bound {lower} is not less than upper bound {upper}")]
    EmptyInterval { lower: String, upper: String },
}
