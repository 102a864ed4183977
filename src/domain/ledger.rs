use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    common::{error::LedgerError, money::Money, quantity::Quantity},
    domain::{
        oracle::PriceOracle,
        snapshot::{replay, Snapshot},
        transaction::Transaction,
    },
};

/// A single trading account: an append-only transaction log plus the queries
/// derived from replaying it.
///
/// Every balance and holdings figure, including the checks run before a
/// withdraw, buy or sell is accepted, comes from [`replay`] over the log as of
/// some timestamp. Transactions may be recorded with past timestamps; the
/// replay places them where they belong.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use trade_ledger::common::{money::Money, quantity::Quantity};
/// use trade_ledger::domain::{ledger::Ledger, oracle::FixedPriceOracle};
///
/// let mut ledger = Ledger::new(Money::from_units(1000), Arc::new(FixedPriceOracle::default())).unwrap();
/// ledger.buy("AAPL", Quantity::from_units(2), None).unwrap();
/// assert_eq!(ledger.cash_balance(None), Money::from_units(700));
/// ```
pub struct Ledger {
    initial_deposit: Money,
    transactions: Vec<Transaction>,
    oracle: Arc<dyn PriceOracle + Send + Sync>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("initial_deposit", &self.initial_deposit)
            .field("transactions", &self.transactions)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Opens the account with a seed deposit dated now.
    pub fn new(
        initial_deposit: Money,
        oracle: Arc<dyn PriceOracle + Send + Sync>,
    ) -> Result<Self, LedgerError> {
        Self::new_at(initial_deposit, Utc::now(), oracle)
    }

    /// Opens the account with a seed deposit dated `opened_at`.
    pub fn new_at(
        initial_deposit: Money,
        opened_at: DateTime<Utc>,
        oracle: Arc<dyn PriceOracle + Send + Sync>,
    ) -> Result<Self, LedgerError> {
        if !initial_deposit.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount: initial_deposit,
            });
        }
        tracing::debug!(%initial_deposit, %opened_at, "opening ledger");
        Ok(Self {
            initial_deposit,
            transactions: vec![Transaction::deposit(opened_at, initial_deposit)],
            oracle,
        })
    }

    pub fn deposit(
        &mut self,
        amount: Money,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<&Transaction, LedgerError> {
        ensure_positive_amount(amount)?;
        let ts = effective(timestamp);
        self.record(Transaction::deposit(ts, amount))
    }

    pub fn withdraw(
        &mut self,
        amount: Money,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<&Transaction, LedgerError> {
        ensure_positive_amount(amount)?;
        let ts = effective(timestamp);

        let available = replay(&self.transactions, ts).cash;
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        self.record(Transaction::withdraw(ts, amount))
    }

    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: Quantity,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<&Transaction, LedgerError> {
        ensure_positive_quantity(quantity)?;
        let ts = effective(timestamp);

        let price = self.oracle.price_of(symbol)?;
        let cost = price
            .checked_mul_quantity(quantity)
            .ok_or(LedgerError::Overflow)?;

        let available = replay(&self.transactions, ts).cash;
        if available < cost {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available,
            });
        }

        self.record(Transaction::buy(ts, symbol, quantity, price, cost))
    }

    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: Quantity,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<&Transaction, LedgerError> {
        ensure_positive_quantity(quantity)?;
        let ts = effective(timestamp);

        // holdings are checked before the price lookup
        let held = replay(&self.transactions, ts).held(symbol);
        if held < quantity {
            return Err(LedgerError::InsufficientHoldings {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }

        let price = self.oracle.price_of(symbol)?;
        let proceeds = price
            .checked_mul_quantity(quantity)
            .ok_or(LedgerError::Overflow)?;

        self.record(Transaction::sell(ts, symbol, quantity, price, proceeds))
    }

    /// Full replay as of `as_of`, or as of the latest recorded timestamp.
    pub fn snapshot(&self, as_of: Option<DateTime<Utc>>) -> Snapshot {
        let cutoff = as_of.unwrap_or_else(|| self.latest_timestamp());
        replay(&self.transactions, cutoff)
    }

    pub fn cash_balance(&self, as_of: Option<DateTime<Utc>>) -> Money {
        self.snapshot(as_of).cash
    }

    /// Share counts per symbol, without zero entries.
    pub fn holdings(&self, as_of: Option<DateTime<Utc>>) -> BTreeMap<String, Quantity> {
        self.snapshot(as_of).non_zero_holdings()
    }

    /// Cash plus holdings valued at the oracle's current prices. Historical
    /// `as_of` values still use current prices.
    pub fn portfolio_value(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        let snapshot = self.snapshot(as_of);
        let mut value = snapshot.cash;
        for (symbol, quantity) in snapshot.non_zero_holdings() {
            value = value
                .checked_add(self.market_value(&symbol, quantity)?)
                .ok_or(LedgerError::Overflow)?;
        }
        Ok(value)
    }

    /// Portfolio value minus the initial deposit. Later deposits are not part
    /// of the baseline.
    pub fn profit_loss(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        Ok(self.portfolio_value(as_of)? - self.initial_deposit)
    }

    /// Transactions with `since <= timestamp <= until`, in recorded order.
    pub fn transaction_history(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| since.is_none_or(|s| tx.timestamp() >= s))
            .filter(|tx| until.is_none_or(|u| tx.timestamp() <= u))
            .collect()
    }

    pub fn market_value(&self, symbol: &str, quantity: Quantity) -> Result<Money, LedgerError> {
        self.oracle
            .price_of(symbol)?
            .checked_mul_quantity(quantity)
            .ok_or(LedgerError::Overflow)
    }

    pub fn price_of(&self, symbol: &str) -> Result<Money, LedgerError> {
        self.oracle.price_of(symbol)
    }

    pub fn initial_deposit(&self) -> Money {
        self.initial_deposit
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The greatest timestamp in the log, regardless of insertion order.
    pub fn latest_timestamp(&self) -> DateTime<Utc> {
        // the seed deposit guarantees a non-empty log
        self.transactions
            .iter()
            .map(Transaction::timestamp)
            .max()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Appends `tx` unless the log's gross cash or share totals would leave the
    /// `i64` range. Every replayed balance is bounded by those totals, so a
    /// log that passes this check can be replayed at any cutoff.
    fn record(&mut self, tx: Transaction) -> Result<&Transaction, LedgerError> {
        let gross = |f: fn(&Transaction) -> i64| -> i128 {
            self.transactions
                .iter()
                .chain(std::iter::once(&tx))
                .map(|t| i128::from(f(t)).abs())
                .sum()
        };
        let limit = i128::from(i64::MAX);
        if gross(|t| t.total_amount().as_i64()) > limit
            || gross(|t| t.quantity().as_i64()) > limit
        {
            return Err(LedgerError::Overflow);
        }

        tracing::debug!(
            kind = %tx.kind(),
            timestamp = %tx.timestamp(),
            symbol = tx.symbol().unwrap_or(""),
            quantity = %tx.quantity(),
            total = %tx.total_amount(),
            "recorded transaction"
        );
        let idx = self.transactions.len();
        self.transactions.push(tx);
        Ok(&self.transactions[idx])
    }
}

fn effective(timestamp: Option<DateTime<Utc>>) -> DateTime<Utc> {
    timestamp.unwrap_or_else(Utc::now)
}

fn ensure_positive_amount(amount: Money) -> Result<(), LedgerError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount { amount })
    }
}

fn ensure_positive_quantity(quantity: Quantity) -> Result<(), LedgerError> {
    if quantity.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidQuantity { quantity })
    }
}
