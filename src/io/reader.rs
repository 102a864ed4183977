use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::{io::Read, str::FromStr};

use crate::{
    common::{event::LedgerEvent, money::Money, quantity::Quantity},
    domain::oracle::FixedPriceOracle,
};

#[derive(serde::Deserialize)]
/// Internal CSV row representation matching the operations file headers.
/// Cash rows leave `symbol`/`quantity` blank, trade rows leave `amount` blank.
struct OperationRow {
    #[serde(rename = "type")]
    tx_type: String,
    symbol: Option<String>,
    quantity: Option<String>,
    amount: Option<String>,
    timestamp: Option<String>,
}

#[derive(serde::Deserialize)]
struct PriceRow {
    symbol: String,
    price: String,
}

/// Reads ledger operations from a CSV reader.
///
/// Supported headers: `type,symbol,quantity,amount,timestamp`.
/// `type` is case-insensitive (`deposit`, `withdraw`/`withdrawal`, `buy`,
/// `sell`). Errors name the 1-based data row they came from.
///
/// # Examples
///
/// ```
/// use trade_ledger::io::reader::read_operations;
/// use trade_ledger::common::event::LedgerEvent;
/// use csv::ReaderBuilder;
///
/// let data = "type,symbol,quantity,amount,timestamp\n\
/// deposit,,,100,2023-01-01T00:00:00Z\n\
/// buy,AAPL,2,,\n";
/// let mut rdr = ReaderBuilder::new().from_reader(data.as_bytes());
/// let events: Vec<_> = read_operations(&mut rdr).collect();
///
/// assert!(matches!(events[0], Ok(LedgerEvent::Deposit { timestamp: Some(_), .. })));
/// assert!(matches!(events[1], Ok(LedgerEvent::Buy { timestamp: None, .. })));
/// ```
pub fn read_operations<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> impl Iterator<Item = Result<LedgerEvent, String>> + '_ {
    rdr.deserialize::<OperationRow>()
        .enumerate()
        .map(|(idx, res)| {
            let row_no = idx + 1;
            let row = res.map_err(|e| format!("row {row_no}: {e}"))?;
            parse_operation(row).map_err(|e| format!("row {row_no}: {e}"))
        })
}

fn parse_operation(row: OperationRow) -> Result<LedgerEvent, String> {
    let kind = row.tx_type.trim().to_ascii_lowercase();
    let timestamp = non_empty(row.timestamp)
        .map(|s| parse_timestamp(&s))
        .transpose()?;

    match kind.as_str() {
        "deposit" => Ok(LedgerEvent::Deposit {
            amount: required_money(row.amount, "deposit")?,
            timestamp,
        }),
        "withdraw" | "withdrawal" => Ok(LedgerEvent::Withdraw {
            amount: required_money(row.amount, "withdraw")?,
            timestamp,
        }),
        "buy" => Ok(LedgerEvent::Buy {
            symbol: required_symbol(row.symbol, "buy")?,
            quantity: required_quantity(row.quantity, "buy")?,
            timestamp,
        }),
        "sell" => Ok(LedgerEvent::Sell {
            symbol: required_symbol(row.symbol, "sell")?,
            quantity: required_quantity(row.quantity, "sell")?,
            timestamp,
        }),
        other => Err(format!("unknown transaction type: {other}")),
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_money(field: Option<String>, kind: &str) -> Result<Money, String> {
    let raw = non_empty(field).ok_or_else(|| format!("{kind} missing amount"))?;
    Money::from_str(&raw).map_err(|e| format!("{kind} amount {raw:?}: {e}"))
}

fn required_quantity(field: Option<String>, kind: &str) -> Result<Quantity, String> {
    let raw = non_empty(field).ok_or_else(|| format!("{kind} missing quantity"))?;
    Quantity::from_str(&raw).map_err(|e| format!("{kind} quantity {raw:?}: {e}"))
}

fn required_symbol(field: Option<String>, kind: &str) -> Result<String, String> {
    non_empty(field).ok_or_else(|| format!("{kind} missing symbol"))
}

/// Parses an RFC 3339 timestamp, or a zone-less date/date-time taken as UTC.
///
/// ```
/// use trade_ledger::io::reader::parse_timestamp;
///
/// let a = parse_timestamp("2023-01-01T02:00:00+02:00").unwrap();
/// let b = parse_timestamp("2023-01-01 00:00:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp: {s:?}"))
}

/// Reads a `symbol,price` catalog into a price oracle.
pub fn read_prices<R: Read>(rdr: &mut csv::Reader<R>) -> Result<FixedPriceOracle, String> {
    let mut prices = Vec::new();
    for (idx, res) in rdr.deserialize::<PriceRow>().enumerate() {
        let row_no = idx + 1;
        let row = res.map_err(|e| format!("price row {row_no}: {e}"))?;
        let symbol = row.symbol.trim().to_string();
        if symbol.is_empty() {
            return Err(format!("price row {row_no}: missing symbol"));
        }
        let price = Money::from_str(&row.price)
            .map_err(|e| format!("price row {row_no}: price {:?}: {e}", row.price))?;
        if !price.is_positive() {
            return Err(format!("price row {row_no}: price must be positive"));
        }
        prices.push((symbol, price));
    }
    Ok(FixedPriceOracle::new(prices))
}
