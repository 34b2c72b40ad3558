use thiserror::Error;

pub type HnResult<T> = Result<T, HnError>;

/// Workspace-wide error. Crate-specific errors convert into this one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HnError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Structural error: {what}")]
    Structural { what: String },

    #[error("Numerical error: {what}")]
    Numerical { what: String },
}
