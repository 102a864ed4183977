use crate::{
    common::{error::LedgerError, event::LedgerEvent},
    domain::ledger::Ledger,
};

/// Applies parsed events to a ledger and keeps a tally of the outcome.
#[derive(Debug, Default)]
pub struct Processor {
    applied: usize,
    rejected: usize,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches one event. A rejected operation leaves the ledger untouched
    /// and is returned to the caller, which decides whether to continue.
    pub fn process(&mut self, ledger: &mut Ledger, event: LedgerEvent) -> Result<(), LedgerError> {
        let outcome = match &event {
            LedgerEvent::Deposit { amount, timestamp } => {
                ledger.deposit(*amount, *timestamp).map(|_| ())
            }
            LedgerEvent::Withdraw { amount, timestamp } => {
                ledger.withdraw(*amount, *timestamp).map(|_| ())
            }
            LedgerEvent::Buy {
                symbol,
                quantity,
                timestamp,
            } => ledger.buy(symbol, *quantity, *timestamp).map(|_| ()),
            LedgerEvent::Sell {
                symbol,
                quantity,
                timestamp,
            } => ledger.sell(symbol, *quantity, *timestamp).map(|_| ()),
        };

        match outcome {
            Ok(()) => {
                self.applied += 1;
                Ok(())
            }
            Err(err) => {
                self.rejected += 1;
                tracing::warn!(?event, error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Arc;

    use super::*;
    use crate::{
        common::{money::Money, quantity::Quantity},
        domain::oracle::FixedPriceOracle,
    };

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Some(base() + Duration::seconds(secs))
    }

    fn ledger() -> Ledger {
        Ledger::new_at(
            Money::from_units(1000),
            base(),
            Arc::new(FixedPriceOracle::default()),
        )
        .unwrap()
    }

    #[test]
    fn dispatches_each_event_kind() {
        let mut ledger = ledger();
        let mut processor = Processor::new();

        let events = vec![
            LedgerEvent::Deposit {
                amount: Money::from_units(500),
                timestamp: at(5),
            },
            LedgerEvent::Withdraw {
                amount: Money::from_units(200),
                timestamp: at(10),
            },
            LedgerEvent::Buy {
                symbol: "AAPL".into(),
                quantity: Quantity::from_units(2),
                timestamp: at(15),
            },
            LedgerEvent::Sell {
                symbol: "AAPL".into(),
                quantity: Quantity::from_units(1),
                timestamp: at(20),
            },
        ];
        for event in events {
            processor.process(&mut ledger, event).unwrap();
        }

        assert_eq!(processor.applied(), 4);
        assert_eq!(processor.rejected(), 0);
        assert_eq!(ledger.transactions().len(), 5);
        assert_eq!(ledger.cash_balance(None), Money::from_units(1150));
    }

    #[test]
    fn rejected_event_is_counted_and_returned() {
        let mut ledger = ledger();
        let mut processor = Processor::new();

        let err = processor
            .process(
                &mut ledger,
                LedgerEvent::Buy {
                    symbol: "MSFT".into(),
                    quantity: Quantity::from_units(1),
                    timestamp: at(1),
                },
            )
            .unwrap_err();

        assert_eq!(err, LedgerError::InvalidSymbol("MSFT".into()));
        assert_eq!(processor.applied(), 0);
        assert_eq!(processor.rejected(), 1);
        assert_eq!(ledger.transactions().len(), 1);
    }
}
