use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    common::{error::LedgerError, money::Money, quantity::Quantity},
    domain::{ledger::Ledger, snapshot::Snapshot, transaction::Transaction},
};

/// A cloneable handle that serializes all access to one [`Ledger`].
///
/// Withdraw, buy and sell each replay, validate and append while holding the
/// lock, so two threads can never both pass the funds check against the same
/// balance.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::Poisoned)
    }

    pub fn deposit(
        &self,
        amount: Money,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        self.lock()?.deposit(amount, timestamp).cloned()
    }

    pub fn withdraw(
        &self,
        amount: Money,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        self.lock()?.withdraw(amount, timestamp).cloned()
    }

    pub fn buy(
        &self,
        symbol: &str,
        quantity: Quantity,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        self.lock()?.buy(symbol, quantity, timestamp).cloned()
    }

    pub fn sell(
        &self,
        symbol: &str,
        quantity: Quantity,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        self.lock()?.sell(symbol, quantity, timestamp).cloned()
    }

    pub fn snapshot(&self, as_of: Option<DateTime<Utc>>) -> Result<Snapshot, LedgerError> {
        Ok(self.lock()?.snapshot(as_of))
    }

    pub fn cash_balance(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        Ok(self.lock()?.cash_balance(as_of))
    }

    pub fn holdings(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, Quantity>, LedgerError> {
        Ok(self.lock()?.holdings(as_of))
    }

    pub fn portfolio_value(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        self.lock()?.portfolio_value(as_of)
    }

    pub fn profit_loss(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        self.lock()?.profit_loss(as_of)
    }

    pub fn transaction_history(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .lock()?
            .transaction_history(since, until)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Runs `f` with exclusive access, for multi-step reads that must agree.
    pub fn with_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> Result<T, LedgerError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }
}
