use chrono::{DateTime, Utc};
use std::fmt;

use crate::common::{money::Money, quantity::Quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Deposit,
    Withdraw,
    Buy,
    Sell,
}

impl TxKind {
    /// Serialized name used in CSV input and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deposit => "deposit",
            TxKind::Withdraw => "withdraw",
            TxKind::Buy => "buy",
            TxKind::Sell => "sell",
        }
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, TxKind::Buy | TxKind::Sell)
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable ledger entry. Fields are only reachable through accessors so a
/// recorded transaction can never be edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    timestamp: DateTime<Utc>,
    kind: TxKind,
    symbol: Option<String>,
    quantity: Quantity,
    price_per_share: Option<Money>,
    total_amount: Money,
}

impl Transaction {
    pub(crate) fn deposit(timestamp: DateTime<Utc>, amount: Money) -> Self {
        Self::cash(timestamp, TxKind::Deposit, amount)
    }

    pub(crate) fn withdraw(timestamp: DateTime<Utc>, amount: Money) -> Self {
        Self::cash(timestamp, TxKind::Withdraw, -amount)
    }

    pub(crate) fn buy(
        timestamp: DateTime<Utc>,
        symbol: &str,
        quantity: Quantity,
        price: Money,
        cost: Money,
    ) -> Self {
        Self::trade(timestamp, TxKind::Buy, symbol, quantity, price, -cost)
    }

    pub(crate) fn sell(
        timestamp: DateTime<Utc>,
        symbol: &str,
        quantity: Quantity,
        price: Money,
        proceeds: Money,
    ) -> Self {
        Self::trade(timestamp, TxKind::Sell, symbol, -quantity, price, proceeds)
    }

    fn cash(timestamp: DateTime<Utc>, kind: TxKind, total_amount: Money) -> Self {
        Self {
            timestamp,
            kind,
            symbol: None,
            quantity: Quantity::zero(),
            price_per_share: None,
            total_amount,
        }
    }

    fn trade(
        timestamp: DateTime<Utc>,
        kind: TxKind,
        symbol: &str,
        quantity: Quantity,
        price: Money,
        total_amount: Money,
    ) -> Self {
        Self {
            timestamp,
            kind,
            symbol: Some(symbol.to_string()),
            quantity,
            price_per_share: Some(price),
            total_amount,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Signed share count: positive for buys, negative for sells, zero otherwise.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn price_per_share(&self) -> Option<Money> {
        self.price_per_share
    }

    /// Signed cash flow: positive for deposits and sells, negative for
    /// withdrawals and buys.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn cash_moves_carry_no_symbol_or_price() {
        let dep = Transaction::deposit(ts(), Money::from_units(50));
        assert_eq!(dep.kind(), TxKind::Deposit);
        assert_eq!(dep.total_amount(), Money::from_units(50));
        assert_eq!(dep.symbol(), None);
        assert_eq!(dep.price_per_share(), None);
        assert!(dep.quantity().is_zero());

        let wd = Transaction::withdraw(ts(), Money::from_units(30));
        assert_eq!(wd.kind(), TxKind::Withdraw);
        assert_eq!(wd.total_amount(), Money::from_units(-30));
    }

    #[test]
    fn trades_are_signed_by_direction() {
        let price = Money::from_units(150);
        let buy = Transaction::buy(
            ts(),
            "AAPL",
            Quantity::from_units(2),
            price,
            Money::from_units(300),
        );
        assert_eq!(buy.quantity(), Quantity::from_units(2));
        assert_eq!(buy.total_amount(), Money::from_units(-300));
        assert_eq!(buy.symbol(), Some("AAPL"));
        assert_eq!(buy.price_per_share(), Some(price));

        let sell = Transaction::sell(
            ts(),
            "AAPL",
            Quantity::from_units(1),
            price,
            Money::from_units(150),
        );
        assert_eq!(sell.quantity(), Quantity::from_units(-1));
        assert_eq!(sell.total_amount(), Money::from_units(150));
    }

    #[test]
    fn kind_names_match_serialized_form() {
        assert_eq!(TxKind::Deposit.to_string(), "deposit");
        assert_eq!(TxKind::Withdraw.to_string(), "withdraw");
        assert_eq!(TxKind::Buy.as_str(), "buy");
        assert_eq!(TxKind::Sell.as_str(), "sell");
        assert!(TxKind::Sell.is_trade());
        assert!(!TxKind::Deposit.is_trade());
    }
}
