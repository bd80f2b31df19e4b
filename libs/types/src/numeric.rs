//! Fixed-width unsigned amounts and timestamps
//!
//! Token amounts are `u128` base units and timestamps are unix seconds in
//! `u64`. Neither type exposes wrapping operators; all arithmetic goes through
//! the checked methods below and reports `ArithmeticError` instead of wrapping.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ArithmeticError;

/// Amount of the custodied token, in the token's smallest unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);
    pub const MAX: TokenAmount = TokenAmount(u128::MAX);

    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    pub const fn get(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add, failing instead of wrapping past `u128::MAX`.
    pub fn checked_add(self, rhs: TokenAmount) -> Result<TokenAmount, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(TokenAmount)
            .ok_or_else(|| ArithmeticError::overflow(self, rhs))
    }

    /// Subtract, failing instead of going below zero.
    pub fn checked_sub(self, rhs: TokenAmount) -> Result<TokenAmount, ArithmeticError> {
        self.0
            .checked_sub(rhs.0)
            .map(TokenAmount)
            .ok_or_else(|| ArithmeticError::underflow(self, rhs))
    }

    /// Big-endian bytes, used for canonical hashing.
    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }
}

impl From<u128> for TokenAmount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<u64> for TokenAmount {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point in time as unix seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Timestamp `secs` seconds later, failing on overflow.
    pub fn checked_add_secs(self, secs: u64) -> Result<Timestamp, ArithmeticError> {
        self.0
            .checked_add(secs)
            .map(Timestamp)
            .ok_or_else(|| ArithmeticError::overflow(self.0, secs))
    }

    /// Timestamp `secs` seconds earlier, failing before the epoch.
    pub fn checked_sub_secs(self, secs: u64) -> Result<Timestamp, ArithmeticError> {
        self.0
            .checked_sub(secs)
            .map(Timestamp)
            .ok_or_else(|| ArithmeticError::underflow(self.0, secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Far-future values that chrono cannot represent fall back to raw seconds
        match i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}s", self.0),
        }
    }
}
