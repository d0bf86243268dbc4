//! Controller-level errors.

use thiserror::Error;

use crate::blockchain::ChainError;

/// Errors returned to callers of the controller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The provider reported no accounts.
    #[error("No account available from the provider")]
    NoAccount,

    #[error("No product at index {index} ({len} listed)")]
    NoSuchProduct { index: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The controller task is gone.
    #[error("Controller disconnected")]
    Disconnected,
}

impl AppError {
    /// Text of the rejection banner shown for a failed user action.
    ///
    /// Contract reverts show the bare reason.
    pub fn notice_message(&self) -> String {
        match self {
            Self::Chain(ChainError::Reverted { reason }) => reason.clone(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
