use crate::common::{money::Money, quantity::Quantity};

/// Failures raised by the ledger core. None of them leave a partial write
/// behind: every check runs before a transaction is appended.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("amount must be positive, got {amount}")]
    InvalidAmount { amount: Money },
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: Quantity },
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },
    #[error("insufficient holdings of {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: Quantity,
        held: Quantity,
    },
    #[error("unknown symbol: {0}")]
    InvalidSymbol(String),
    #[error("amount overflows the supported range")]
    Overflow,
    #[error("ledger lock poisoned")]
    Poisoned,
}

impl LedgerError {
    /// True for the non-positive amount/quantity/initial-deposit class.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount { .. } | LedgerError::InvalidQuantity { .. }
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<&AppError> for std::process::ExitCode {
    fn from(err: &AppError) -> Self {
        let code: u8 = match err {
            AppError::Io(_) | AppError::Csv(_) => 1,
            AppError::Parse(_) => 2,
            AppError::Ledger(_) => 3,
        };
        std::process::ExitCode::from(code)
    }
}
