//! Contract-specific error types
//!
//! Error taxonomy for the pledge engine, the token gateway, configuration
//! loading, and ledger invariant checks.

use thiserror::Error;
use types::errors::ArithmeticError;
use types::ids::AccountId;
use types::numeric::{TokenAmount, Timestamp};

/// Errors returned by pledge / unpledge / withdraw.
///
/// Every variant aborts the whole call; the ledger is unchanged afterwards.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PledgeError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient pledge: requested {requested}, pledged {pledged}")]
    InsufficientPledge {
        requested: TokenAmount,
        pledged: TokenAmount,
    },

    #[error("Withdrawal still locked: now {now}, unlocks at {lock_deadline}")]
    StillLocked {
        now: Timestamp,
        lock_deadline: Timestamp,
    },

    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    #[error("Token transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Reentrant call rejected")]
    ReentrantCall,

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(#[from] ArithmeticError),
}

/// Failure reported synchronously by a token gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Insufficient token balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        required: TokenAmount,
        available: TokenAmount,
    },

    #[error("Insufficient allowance from {owner}: required {required}, approved {approved}")]
    InsufficientAllowance {
        owner: AccountId,
        required: TokenAmount,
        approved: TokenAmount,
    },

    #[error("Token balance overflow for {account}")]
    BalanceOverflow { account: AccountId },

    #[error("Transfer rejected by token: {reason}")]
    Rejected { reason: String },
}

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid pledge config: {reason}")]
    Invalid { reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Invalid {
            reason: err.to_string(),
        }
    }
}

/// Ledger invariant violations found by recomputation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Total pledged mismatch: recorded {recorded}, computed {computed}")]
    TotalPledgedMismatch { recorded: String, computed: String },

    #[error("Pledged account count mismatch: recorded {recorded}, computed {computed}")]
    AccountCountMismatch { recorded: u64, computed: u64 },

    #[error("Total withdrawable mismatch: recorded {recorded}, computed {computed}")]
    TotalWithdrawableMismatch { recorded: String, computed: String },

    #[error("Custody shortfall: held {held}, owed {owed}")]
    CustodyShortfall { held: TokenAmount, owed: TokenAmount },
}
