use thiserror::Error;

use crate::domain::{LedgerError, ParsePesosError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("You must log in first")]
    NotLoggedIn,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppError {
    /// Returns true for errors caused by what the user typed, which the
    /// front end should show as a validation message.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Ledger(LedgerError::InvalidAmount(_))
                | AppError::Ledger(LedgerError::InsufficientFunds { .. })
                | AppError::InvalidCredentials(_)
        )
    }
}

/// Unparseable amount text is reported the same way as a non-positive amount.
impl From<ParsePesosError> for AppError {
    fn from(err: ParsePesosError) -> Self {
        AppError::Ledger(LedgerError::InvalidAmount(err.to_string()))
    }
}
