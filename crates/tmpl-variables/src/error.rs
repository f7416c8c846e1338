//! Variable pipeline error types.

use thiserror::Error;

use crate::json_repair::RepairPass;

pub type VariableResult<T> = Result<T, VariableError>;

#[derive(Debug, Error)]
pub enum VariableError {
    /// Text could not be turned into JSON by any repair pass.
    #[error("Malformed input after {last_pass} pass: {repaired}")]
    MalformedInput {
        original: String,
        repaired: String,
        last_pass: RepairPass,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl VariableError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VariableError::NotFound(_))
    }
}
