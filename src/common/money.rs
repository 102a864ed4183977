use bigdecimal::BigDecimal;
use bigdecimal::ParseBigDecimalError;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::common::quantity::Quantity;

/// Fixed-point scale shared by `Money` and `Quantity`: four decimal places.
pub(crate) const SCALE: i64 = 10_000;

/// Parses decimal text into a value scaled by [`SCALE`], rounding to 4 dp.
pub(crate) fn parse_scaled(s: &str) -> Result<i64, ParseBigDecimalError> {
    let t = s.trim();
    if t.is_empty() {
        return Err(ParseBigDecimalError::Other("empty amount".into()));
    }

    let bd: BigDecimal = t.parse()?;

    let scaled = (bd * BigDecimal::from(SCALE)).round(0);
    scaled
        .to_i64()
        .ok_or_else(|| ParseBigDecimalError::Other("amount overflow".into()))
}

pub(crate) fn format_scaled(value: i64) -> String {
    let bd = BigDecimal::from(value) / BigDecimal::from(SCALE);
    format!("{:.4}", bd)
}

#[derive(Debug, Clone, Copy, Default)]
/// A signed cash amount held in ten-thousandths of the account currency.
///
/// # Why Use Money? It is a Value Object.
/// Storing cash as an integer avoids the drift that floating point would
/// introduce when the ledger sums hundreds of transactions during a replay.
/// Deposits and sell proceeds are positive, withdrawals and buy costs negative.
///
/// # Examples
/// ```
/// use trade_ledger::common::money::Money;
///
/// let amount = Money::new(1000); // Represents 0.1000 in currency
/// assert_eq!(amount.as_i64(), 1000);
/// assert_eq!(amount.to_string_4dp(), "0.1000");
/// ```
pub struct Money(i64);

impl Money {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Whole currency units, e.g. `Money::from_units(150)` is 150.0000.
    pub fn from_units(units: i64) -> Self {
        Money(units * SCALE)
    }

    pub fn zero() -> Self {
        Money(0)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Price per share times a share count, rounded to 4 dp.
    /// Returns `None` when the product does not fit.
    pub fn checked_mul_quantity(&self, quantity: Quantity) -> Option<Money> {
        let product = BigDecimal::from(self.0) * BigDecimal::from(quantity.as_i64())
            / BigDecimal::from(SCALE);
        product.round(0).to_i64().map(Money)
    }

    pub fn to_string_4dp(&self) -> String {
        format_scaled(self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_4dp())
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(Money::zero(), Money(0));
        assert!(!Money::zero().is_positive());
    }

    #[test]
    fn test_from_units() {
        assert_eq!(Money::from_units(150), Money(1_500_000));
        assert_eq!(Money::from_units(-2), Money(-20_000));
    }

    #[test]
    fn test_from_str_valid() {
        assert_eq!(Money::from_str("1").unwrap(), Money(10000));
        assert_eq!(Money::from_str("1.5").unwrap(), Money(15000));
        assert_eq!(Money::from_str("1.2345").unwrap(), Money(12345));
        assert_eq!(Money::from_str("0.0001").unwrap(), Money(1));
        assert_eq!(Money::from_str("  2.0000 ").unwrap(), Money(20000));
        assert_eq!(Money::from_str("-30").unwrap(), Money(-300000));
    }

    #[test]
    fn test_from_str_rounding() {
        assert_eq!(Money::from_str("1.99999").unwrap(), Money(20000));
        assert_eq!(Money::from_str("0.00001").unwrap(), Money(0));
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("   ").is_err());
        assert!(Money::from_str("abc").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money(10000).to_string(), "1.0000");
        assert_eq!(Money(12345).to_string(), "1.2345");
        assert_eq!(Money(0).to_string(), "0.0000");
        assert_eq!(Money(-3_000_000).to_string(), "-300.0000");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Money(10000) + Money(5000), Money(15000));
        assert_eq!(Money(15000) - Money(5000), Money(10000));
        assert_eq!(-Money(5000), Money(-5000));

        let mut m = Money(10000);
        m += Money(5000);
        m -= Money(2500);
        assert_eq!(m, Money(12500));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money(1), Money(2), Money(-3)].into_iter().sum();
        assert_eq!(total, Money::zero());
    }

    #[test]
    fn test_ordering() {
        assert!(Money(10000) < Money(15000));
        assert!(Money(-1) < Money::zero());
        assert!(Money(10000) <= Money(10000));
    }

    #[test]
    fn test_checked_mul_quantity() {
        let price = Money::from_units(150);
        assert_eq!(
            price.checked_mul_quantity(Quantity::from_units(2)),
            Some(Money::from_units(300))
        );
        // 150 * 0.5 shares
        assert_eq!(
            price.checked_mul_quantity(Quantity::from_str("0.5").unwrap()),
            Some(Money::from_units(75))
        );
        // 0.0003 * 0.5 = 0.00015 rounds to 0.0002
        assert_eq!(
            Money(3).checked_mul_quantity(Quantity::from_str("0.5").unwrap()),
            Some(Money(2))
        );
    }

    #[test]
    fn test_checked_mul_quantity_overflow() {
        let price = Money::new(i64::MAX);
        assert_eq!(price.checked_mul_quantity(Quantity::from_units(10)), None);
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(Money(1).checked_add(Money(-3)), Some(Money(-2)));
        assert_eq!(Money::new(i64::MAX).checked_add(Money(1)), None);
        let big = Money::from_str("900000000000000").unwrap();
        assert_eq!(big.checked_add(big), None);
    }
}
