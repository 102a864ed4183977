use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

use crate::{
    common::error::AppError,
    domain::{ledger::Ledger, transaction::Transaction},
};

#[derive(serde::Serialize)]
/// Internal CSV row for the transaction history report.
///
/// Headers written (in this order):
/// `timestamp,type,symbol,quantity,price_per_share,total_amount`.
/// Cash moves leave `symbol` and `price_per_share` empty.
struct HistoryRow<'a> {
    timestamp: String,
    #[serde(rename = "type")]
    tx_type: &'a str,
    symbol: &'a str,
    quantity: String,
    price_per_share: String,
    total_amount: String,
}

#[derive(serde::Serialize)]
struct HoldingRow {
    symbol: String,
    quantity: String,
    price: String,
    market_value: String,
}

#[derive(serde::Serialize)]
struct SummaryRow {
    metric: &'static str,
    value: String,
}

/// Writes transactions in the order given.
///
/// Timestamps are RFC 3339 UTC with second precision; numbers use 4 dp.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chrono::{TimeZone, Utc};
/// use trade_ledger::common::money::Money;
/// use trade_ledger::domain::{ledger::Ledger, oracle::FixedPriceOracle};
/// use trade_ledger::io::writer::write_history;
///
/// let opened = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
/// let ledger = Ledger::new_at(Money::from_units(100), opened, Arc::new(FixedPriceOracle::default())).unwrap();
///
/// let mut out = Vec::new();
/// write_history(&mut out, ledger.transaction_history(None, None)).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert_eq!(
///     s,
///     "timestamp,type,symbol,quantity,price_per_share,total_amount\n\
///      2023-01-01T00:00:00Z,deposit,,0.0000,,100.0000\n"
/// );
/// ```
pub fn write_history<'a, W, I>(writer: W, transactions: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for tx in transactions {
        let row = HistoryRow {
            timestamp: tx.timestamp().to_rfc3339_opts(SecondsFormat::Secs, true),
            tx_type: tx.kind().as_str(),
            symbol: tx.symbol().unwrap_or(""),
            quantity: tx.quantity().to_string_4dp(),
            price_per_share: tx
                .price_per_share()
                .map(|p| p.to_string_4dp())
                .unwrap_or_default(),
            total_amount: tx.total_amount().to_string_4dp(),
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the non-zero holdings as of `as_of` (default: the latest timestamp),
/// sorted by symbol, valued at current prices.
pub fn write_holdings<W: Write>(
    writer: W,
    ledger: &Ledger,
    as_of: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    // BTreeMap iteration gives symbol order.
    for (symbol, quantity) in ledger.holdings(as_of) {
        let price = ledger.price_of(&symbol)?;
        let market_value = ledger.market_value(&symbol, quantity)?;
        wtr.serialize(HoldingRow {
            symbol,
            quantity: quantity.to_string_4dp(),
            price: price.to_string_4dp(),
            market_value: market_value.to_string_4dp(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `metric,value` rows describing the account as of `as_of`, or at its
/// latest timestamp. `transactions` always counts the whole log.
pub fn write_summary<W: Write>(
    writer: W,
    ledger: &Ledger,
    as_of: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    let rows = [
        SummaryRow {
            metric: "cash_balance",
            value: ledger.cash_balance(as_of).to_string_4dp(),
        },
        SummaryRow {
            metric: "portfolio_value",
            value: ledger.portfolio_value(as_of)?.to_string_4dp(),
        },
        SummaryRow {
            metric: "profit_loss",
            value: ledger.profit_loss(as_of)?.to_string_4dp(),
        },
        SummaryRow {
            metric: "initial_deposit",
            value: ledger.initial_deposit().to_string_4dp(),
        },
        SummaryRow {
            metric: "transactions",
            value: ledger.transactions().len().to_string(),
        },
    ];

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
