use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A currency amount held as an exact decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Wraps `decimal` as-is. Use [`Money::round_cents`] when the value may carry
    /// more than two decimal places.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    /// Rounds to cents, with midpoints going away from zero (1.005 -> 1.01, -1.005 -> -1.01).
    pub fn round_cents(decimal: Decimal) -> Self {
        Money(decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// This amount rounded to cents.
    pub fn to_cents_precision(self) -> Self {
        Money::round_cents(self.0)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

impl From<Decimal> for Money {
    fn from(decimal: Decimal) -> Self {
        Money(decimal)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn from_cents_has_two_places() {
        assert_eq!(Money::from_cents(15_000).as_decimal(), dec("150.00"));
        assert_eq!(Money::from_cents(-5).as_decimal(), dec("-0.05"));
    }

    #[test]
    fn round_cents_goes_half_away_from_zero() {
        assert_eq!(Money::round_cents(dec("1.005")), Money::from_cents(101));
        assert_eq!(Money::round_cents(dec("1.004")), Money::from_cents(100));
        assert_eq!(Money::round_cents(dec("-1.005")), Money::from_cents(-101));
        // Banker's rounding would give 0.02 here.
        assert_eq!(Money::round_cents(dec("0.025")), Money::from_cents(3));
    }

    #[test]
    fn abs_and_sign() {
        let m = Money::from_cents(-1234);
        assert!(m.is_negative());
        assert!(!m.is_positive());
        assert_eq!(m.abs(), Money::from_cents(1234));
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn sum_of_amounts() {
        let lines = [Money::from_cents(3300), Money::from_cents(3300), Money::from_cents(3400)];
        assert_eq!(lines.iter().sum::<Money>(), Money::from_cents(10_000));
    }

    #[test]
    fn display_formats_dollars() {
        assert_eq!(Money::from_cents(4999).to_string(), "$49.99");
        assert_eq!(Money::from_cents(-150).to_string(), "-$1.50");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_str: Money = serde_json::from_str("\"150.25\"").unwrap();
        let from_num: Money = serde_json::from_str("150.25").unwrap();
        assert_eq!(from_str, Money::from_cents(15_025));
        assert_eq!(from_num.to_cents_precision(), Money::from_cents(15_025));
    }
}
