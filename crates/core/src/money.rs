//! Monetary amounts in Brazilian reais.

use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// Amount in centavos (the smallest currency unit). Never negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    /// `R$ 54,00`: comma decimal separator, no grouping.
    pub fn to_brl(self) -> String {
        format!("R$ {},{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_brl_with_comma_decimal() {
        assert_eq!(Money::from_cents(5400).to_brl(), "R$ 54,00");
        assert_eq!(Money::from_cents(2240).to_brl(), "R$ 22,40");
        assert_eq!(Money::from_cents(7).to_brl(), "R$ 0,07");
        assert_eq!(Money::from_cents(420).to_string(), "4.20");
    }

    #[test]
    fn sums_empty_to_zero() {
        let total: Money = Vec::<Money>::new().into_iter().sum();
        assert_eq!(total, Money::ZERO);
    }

    proptest! {
        #[test]
        fn sum_matches_cent_arithmetic(cents in prop::collection::vec(0u64..10_000_000, 0..20)) {
            let expected: u64 = cents.iter().sum();
            let total: Money = cents.iter().copied().map(Money::from_cents).sum();
            prop_assert_eq!(total.cents(), expected);
        }
    }
}
