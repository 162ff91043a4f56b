//! Fixed-point currency and trust-point quantities.
//!
//! Capital is held as whole cents so liquidity arithmetic never drifts.
//! Trust points are a plain counter with no fractional part.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use thiserror::Error;

const CENTS_PER_UNIT: u64 = 100;

/// An amount of investor capital, stored in cents.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("amounts have at most two decimal places")]
    TooPrecise,
}

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(CENTS_PER_UNIT))
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Whole units, truncating any cents.
    #[must_use]
    pub const fn units(self) -> u64 {
        self.0 / CENTS_PER_UNIT
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[must_use]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Apply a rate expressed in basis points (1/100 of a percent), rounding down.
    #[must_use]
    pub fn apply_basis_points(self, bps: u32) -> Money {
        let scaled = u128::from(self.0) * u128::from(bps) / 10_000;
        Money(u64::try_from(scaled).unwrap_or(u64::MAX))
    }

    /// Parse user input such as `2000`, `2000.5` or `1,250.75`.
    pub fn parse(input: &str) -> Result<Self, MoneyParseError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',' && *c != '_')
            .collect();
        if cleaned.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let invalid = || MoneyParseError::Invalid(input.trim().to_string());
        let (whole, frac) = match cleaned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (cleaned.as_str(), ""),
        };
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !digits_only(whole) || !digits_only(frac) || (whole.is_empty() && frac.is_empty()) {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(MoneyParseError::TooPrecise);
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(frac_cents))
            .map(Money)
            .ok_or_else(invalid)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.saturating_add(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / CENTS_PER_UNIT;
        let cents = self.0 % CENTS_PER_UNIT;
        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "${grouped}.{cents:02}")
    }
}

/// Community-reputation currency spent on vouches.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct TrustPoints(u64);

impl TrustPoints {
    pub const ZERO: TrustPoints = TrustPoints(0);

    #[must_use]
    pub const fn new(points: u64) -> Self {
        Self(points)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn checked_sub(self, other: TrustPoints) -> Option<TrustPoints> {
        match self.0.checked_sub(other.0) {
            Some(points) => Some(TrustPoints(points)),
            None => None,
        }
    }

    #[must_use]
    pub const fn saturating_add(self, other: TrustPoints) -> TrustPoints {
        TrustPoints(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for TrustPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pts", self.0)
    }
}
