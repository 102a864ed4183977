use chrono::{DateTime, Utc};

use crate::common::{money::Money, quantity::Quantity};

/// One ledger operation parsed from the operations file and handed to the
/// processor. `timestamp: None` means "record at the current time".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Deposit {
        amount: Money,
        timestamp: Option<DateTime<Utc>>,
    },
    Withdraw {
        amount: Money,
        timestamp: Option<DateTime<Utc>>,
    },
    Buy {
        symbol: String,
        quantity: Quantity,
        timestamp: Option<DateTime<Utc>>,
    },
    Sell {
        symbol: String,
        quantity: Quantity,
        timestamp: Option<DateTime<Utc>>,
    },
}
