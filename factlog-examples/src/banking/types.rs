//! Validated domain types for the banking example.
//!
//! Illegal values are unrepresentable: money is non-negative from
//! construction onwards, so "negative deposit" is not a guard the
//! aggregate ever needs to write.

use nutype::nutype;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use uuid::Uuid;

/// Currency every example account is denominated in.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Largest representable amount (one trillion).
pub const MAX_MONEY_AMOUNT: Decimal = dec!(1_000_000_000_000.00);

/// Rejections from [`Money`] construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is negative.
    #[error("money amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// The amount carries sub-cent precision.
    #[error("money can have at most 2 decimal places, got: {0}")]
    TooManyDecimalPlaces(Decimal),

    /// The amount is beyond [`MAX_MONEY_AMOUNT`].
    #[error("money amount {0} exceeds the maximum of {1}")]
    ExceedsMaximum(Decimal, Decimal),
}

/// A non-negative monetary amount with at most two decimal places.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Money(Decimal);

impl Money {
    /// Validates and wraps a decimal amount.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() {
            return Err(MoneyError::NegativeAmount(amount));
        }
        if amount.scale() > 2 {
            return Err(MoneyError::TooManyDecimalPlaces(amount));
        }
        if amount > MAX_MONEY_AMOUNT {
            return Err(MoneyError::ExceedsMaximum(amount, MAX_MONEY_AMOUNT));
        }
        Ok(Self(amount))
    }

    /// The wrapped amount.
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Zero.
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Addition clamped to [`MAX_MONEY_AMOUNT`].
    ///
    /// Used by event application, which must be total: guards have
    /// already run by the time an event exists.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        let sum = self.0.saturating_add(other.0);
        if sum > MAX_MONEY_AMOUNT {
            Self(MAX_MONEY_AMOUNT)
        } else {
            Self(sum)
        }
    }

    /// Subtraction clamped at zero, for the same reason as
    /// [`saturating_add`](Money::saturating_add).
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::zero()
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier; doubles as the account's stream identity.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Display,
        AsRef,
        Deref,
        Serialize,
        Deserialize
    )
)]
pub struct AccountId(String);

impl AccountId {
    /// Generates a unique `AccountId` from a UUIDv7.
    pub fn generate() -> Self {
        Self::try_new(format!("acct-{}", Uuid::now_v7().simple()))
            .expect("generated account ids are valid")
    }
}

/// Identity of the customer who owns an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderId(Uuid);

impl HolderId {
    /// Generates a unique `HolderId`.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
