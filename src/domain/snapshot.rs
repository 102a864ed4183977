use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::{
    common::{money::Money, quantity::Quantity},
    domain::transaction::Transaction,
};

/// Cash and per-symbol share counts reconstructed from the log as of a cutoff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub cash: Money,
    /// May contain zero entries for symbols that were fully sold; see
    /// [`Snapshot::non_zero_holdings`].
    pub holdings: BTreeMap<String, Quantity>,
}

impl Snapshot {
    pub fn held(&self, symbol: &str) -> Quantity {
        self.holdings.get(symbol).copied().unwrap_or_default()
    }

    pub fn non_zero_holdings(&self) -> BTreeMap<String, Quantity> {
        self.holdings
            .iter()
            .filter(|(_, qty)| !qty.is_zero())
            .map(|(sym, qty)| (sym.clone(), *qty))
            .collect()
    }
}

/// Folds every transaction with `timestamp <= cutoff` in timestamp order.
///
/// The sort is stable, so transactions sharing a timestamp are applied in the
/// order they were recorded. Nothing is cached: back-dated inserts are picked
/// up on the next call.
pub fn replay(transactions: &[Transaction], cutoff: DateTime<Utc>) -> Snapshot {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.timestamp());

    let mut snapshot = Snapshot::default();
    for tx in ordered.into_iter().take_while(|tx| tx.timestamp() <= cutoff) {
        snapshot.cash += tx.total_amount();
        if !tx.kind().is_trade() {
            continue;
        }
        if let Some(symbol) = tx.symbol() {
            *snapshot.holdings.entry(symbol.to_string()).or_default() += tx.quantity();
        }
    }
    snapshot
}
