use bigdecimal::ParseBigDecimalError;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use crate::common::money::{format_scaled, parse_scaled, SCALE};

/// A signed share count with four decimal places, so fractional shares are
/// representable. Positive on buys, negative on sells, zero on cash moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub fn from_units(units: i64) -> Self {
        Quantity(units * SCALE)
    }

    pub fn zero() -> Self {
        Quantity(0)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn to_string_4dp(&self) -> String {
        format_scaled(self.0)
    }
}

impl std::str::FromStr for Quantity {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s).map(Quantity)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_4dp())
    }
}

impl Add for Quantity {
    type Output = Quantity;
    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;
    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl Neg for Quantity {
    type Output = Quantity;
    fn neg(self) -> Quantity {
        Quantity(-self.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_whole_and_fractional_shares() {
        assert_eq!(Quantity::from_str("2").unwrap(), Quantity::from_units(2));
        assert_eq!(Quantity::from_str("0.25").unwrap(), Quantity(2500));
        assert!(Quantity::from_str("two").is_err());
        assert!(Quantity::from_str("").is_err());
    }

    #[test]
    fn sign_helpers() {
        assert!(Quantity::zero().is_zero());
        assert!(Quantity::from_units(1).is_positive());
        assert!(!(-Quantity::from_units(1)).is_positive());
    }

    #[test]
    fn arithmetic_and_display() {
        let mut q = Quantity::from_units(3);
        q += -Quantity::from_units(2);
        assert_eq!(q, Quantity::from_units(1));
        assert_eq!(q - Quantity::from_units(1), Quantity::zero());
        assert_eq!(Quantity::from_units(-1).to_string(), "-1.0000");
    }
}
