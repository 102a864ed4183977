use std::collections::HashMap;

use crate::common::{error::LedgerError, money::Money};

/// Current-price lookup. Implementations return one price per symbol with no
/// notion of time, and fail with [`LedgerError::InvalidSymbol`] for tickers
/// they do not know.
pub trait PriceOracle {
    fn price_of(&self, symbol: &str) -> Result<Money, LedgerError>;
}

/// A fixed in-memory catalog of prices.
#[derive(Debug, Clone)]
pub struct FixedPriceOracle {
    prices: HashMap<String, Money>,
}

impl FixedPriceOracle {
    pub fn new<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Money)>,
        S: Into<String>,
    {
        Self {
            prices: prices.into_iter().map(|(s, p)| (s.into(), p)).collect(),
        }
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.prices.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl Default for FixedPriceOracle {
    fn default() -> Self {
        Self::new([
            ("AAPL", Money::from_units(150)),
            ("TSLA", Money::from_units(800)),
            ("GOOGL", Money::from_units(2800)),
        ])
    }
}

impl PriceOracle for FixedPriceOracle {
    fn price_of(&self, symbol: &str) -> Result<Money, LedgerError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| LedgerError::InvalidSymbol(symbol.to_string()))
    }
}
