use crate::error::OrderError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// A decimal currency value.
///
/// Wraps `rust_decimal::Decimal` so prices, billing amounts and payment totals
/// never go through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Sum of two values. Fails instead of overflowing the decimal range.
    pub fn checked_add(self, rhs: Self) -> Result<Self, OrderError> {
        self.0.checked_add(rhs.0).map(Self).ok_or_else(overflow)
    }

    /// Price of `quantity` units at this unit price.
    pub fn times(self, quantity: u32) -> Result<Self, OrderError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or_else(overflow)
    }

    pub fn total<I: IntoIterator<Item = Self>>(values: I) -> Result<Self, OrderError> {
        values
            .into_iter()
            .try_fold(Self::ZERO, |acc, value| acc.checked_add(value))
    }

    /// Difference down to zero, used for the amount still owed on an order.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if self > rhs { self - rhs } else { Self::ZERO }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

fn overflow() -> OrderError {
    OrderError::ValidationError("Amount exceeds the supported range".to_string())
}

/// A strictly positive amount submitted with a payment.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, OrderError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(OrderError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = OrderError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.0));
        let b = Money::new(dec!(2.5));
        assert_eq!(a.checked_add(b).unwrap(), Money::new(dec!(12.5)));
        assert_eq!(a - b, Money::new(dec!(7.5)));
        assert_eq!(b.times(4).unwrap(), Money::new(dec!(10.0)));
        assert_eq!(b.saturating_sub(a), Money::ZERO);
    }

    #[test]
    fn test_money_sum_and_display() {
        let total = Money::total([dec!(40), dec!(60.00)].into_iter().map(Money::new)).unwrap();
        assert_eq!(total, Money::new(dec!(100)));
        assert_eq!(total.to_string(), "100");
    }

    #[test]
    fn test_money_overflow_is_an_error() {
        let max = Money::new(Decimal::MAX);
        assert!(matches!(
            max.checked_add(Money::new(dec!(1))),
            Err(OrderError::ValidationError(_))
        ));
        assert!(matches!(max.times(2), Err(OrderError::ValidationError(_))));
        assert!(Money::total([max, max]).is_err());
        assert_eq!(max.times(1).unwrap(), max);
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(0.01)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(OrderError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-5)),
            Err(OrderError::ValidationError(_))
        ));
    }
}
