//! Ledger state — global totals and per-account pledge records
//!
//! Pure data container: accessors only, no business rules. The engine is the
//! single writer; setters are crate-private so nothing outside the crate can
//! mutate balances.
//!
//! A zeroed `AccountRecord` is equivalent to absence, so zeroed records are
//! removed from the map and a lookup of an unknown account yields zeros.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use types::ids::{AccountId, TokenId};
use types::numeric::{TokenAmount, Timestamp};

use crate::errors::LedgerError;

/// Per-account balances held in custody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Committed funds not yet released for withdrawal
    pub pledged_amount: TokenAmount,
    /// Funds released via unpledge, awaiting the lock deadline
    pub withdrawable_amount: TokenAmount,
}

impl AccountRecord {
    pub fn is_empty(&self) -> bool {
        self.pledged_amount.is_zero() && self.withdrawable_amount.is_zero()
    }
}

/// Process-wide contract state fixed or accumulated since construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    token: TokenId,
    lock_deadline: Timestamp,
    purpose: String,
    total_pledged_amount: TokenAmount,
    total_pledged_account_count: u64,
    total_withdrawable_amount: TokenAmount,
}

impl GlobalState {
    pub fn token(&self) -> &TokenId {
        &self.token
    }

    pub fn lock_deadline(&self) -> Timestamp {
        self.lock_deadline
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn total_pledged_amount(&self) -> TokenAmount {
        self.total_pledged_amount
    }

    pub fn total_pledged_account_count(&self) -> u64 {
        self.total_pledged_account_count
    }

    pub fn total_withdrawable_amount(&self) -> TokenAmount {
        self.total_withdrawable_amount
    }
}

/// Point-in-time copy of the whole ledger, ordered by account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub global: GlobalState,
    pub accounts: BTreeMap<AccountId, AccountRecord>,
}

/// Authoritative account and global balance records.
#[derive(Debug, Clone)]
pub struct LedgerState {
    global: GlobalState,
    accounts: HashMap<AccountId, AccountRecord>,
}

impl LedgerState {
    /// Create an empty ledger. The immutables are fixed here.
    pub fn new(token: TokenId, lock_deadline: Timestamp, purpose: impl Into<String>) -> Self {
        Self {
            global: GlobalState {
                token,
                lock_deadline,
                purpose: purpose.into(),
                total_pledged_amount: TokenAmount::ZERO,
                total_pledged_account_count: 0,
                total_withdrawable_amount: TokenAmount::ZERO,
            },
            accounts: HashMap::new(),
        }
    }

    // ───────────────────────── Reads ─────────────────────────

    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    /// Record for `account_id`, zeroed if the account never pledged.
    pub fn account(&self, account_id: &AccountId) -> AccountRecord {
        self.accounts.get(account_id).copied().unwrap_or_default()
    }

    /// Number of accounts holding a non-zero record.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    // ───────────────────────── Writes (engine only) ─────────────────────────

    pub(crate) fn set_account(&mut self, account_id: AccountId, record: AccountRecord) {
        if record.is_empty() {
            self.accounts.remove(&account_id);
        } else {
            self.accounts.insert(account_id, record);
        }
    }

    pub(crate) fn set_total_pledged_amount(&mut self, amount: TokenAmount) {
        self.global.total_pledged_amount = amount;
    }

    pub(crate) fn set_total_pledged_account_count(&mut self, count: u64) {
        self.global.total_pledged_account_count = count;
    }

    pub(crate) fn set_total_withdrawable_amount(&mut self, amount: TokenAmount) {
        self.global.total_withdrawable_amount = amount;
    }

    // ───────────────────────── Verification ─────────────────────────

    /// Comparable copy of every field.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            global: self.global.clone(),
            accounts: self
                .accounts
                .iter()
                .map(|(id, record)| (*id, *record))
                .collect(),
        }
    }

    /// Recompute totals from account records and compare with the recorded
    /// globals.
    pub fn check_invariants(&self) -> Result<(), LedgerError> {
        let mut pledged: Option<TokenAmount> = Some(TokenAmount::ZERO);
        let mut withdrawable: Option<TokenAmount> = Some(TokenAmount::ZERO);
        let mut pledged_accounts: u64 = 0;

        for record in self.accounts.values() {
            pledged = pledged.and_then(|sum| sum.checked_add(record.pledged_amount).ok());
            withdrawable =
                withdrawable.and_then(|sum| sum.checked_add(record.withdrawable_amount).ok());
            if !record.pledged_amount.is_zero() {
                pledged_accounts += 1;
            }
        }

        if pledged != Some(self.global.total_pledged_amount) {
            return Err(LedgerError::TotalPledgedMismatch {
                recorded: self.global.total_pledged_amount.to_string(),
                computed: describe_sum(pledged),
            });
        }
        if pledged_accounts != self.global.total_pledged_account_count {
            return Err(LedgerError::AccountCountMismatch {
                recorded: self.global.total_pledged_account_count,
                computed: pledged_accounts,
            });
        }
        if withdrawable != Some(self.global.total_withdrawable_amount) {
            return Err(LedgerError::TotalWithdrawableMismatch {
                recorded: self.global.total_withdrawable_amount.to_string(),
                computed: describe_sum(withdrawable),
            });
        }
        Ok(())
    }

    /// Check that `held` custody tokens cover everything the ledger owes.
    pub fn check_custody(&self, held: TokenAmount) -> Result<(), LedgerError> {
        let owed = self
            .global
            .total_pledged_amount
            .checked_add(self.global.total_withdrawable_amount)
            .unwrap_or(TokenAmount::MAX);
        if held < owed {
            return Err(LedgerError::CustodyShortfall { held, owed });
        }
        Ok(())
    }

    /// SHA-256 root over a canonical encoding of the ledger.
    ///
    /// Accounts are encoded in sorted order, so equal ledgers hash equally
    /// regardless of insertion history.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        let global = &self.global;
        hasher.update((global.token.as_str().len() as u64).to_be_bytes());
        hasher.update(global.token.as_str().as_bytes());
        hasher.update(global.lock_deadline.as_secs().to_be_bytes());
        hasher.update((global.purpose.len() as u64).to_be_bytes());
        hasher.update(global.purpose.as_bytes());
        hasher.update(global.total_pledged_amount.to_be_bytes());
        hasher.update(global.total_pledged_account_count.to_be_bytes());
        hasher.update(global.total_withdrawable_amount.to_be_bytes());

        let sorted: BTreeMap<&AccountId, &AccountRecord> = self.accounts.iter().collect();
        for (id, record) in sorted {
            hasher.update(id.as_bytes());
            hasher.update(record.pledged_amount.to_be_bytes());
            hasher.update(record.withdrawable_amount.to_be_bytes());
        }
        hasher.finalize().into()
    }
}

fn describe_sum(sum: Option<TokenAmount>) -> String {
    match sum {
        Some(amount) => amount.to_string(),
        None => "overflow".to_string(),
    }
}
