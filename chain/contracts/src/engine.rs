//! Pledge engine — pledge, unpledge, and time-locked withdraw
//!
//! Funds move through three ledger classifications per account:
//! `Idle → Pledged` (pledge, accumulates) `→ Withdrawable` (unpledge, partial
//! or full) `→ Idle` (withdraw, only once the lock deadline is reached).
//!
//! Every state-changing call:
//! 1. Acquires the reentrancy guard (nested calls fail with `ReentrantCall`)
//! 2. Validates preconditions and computes new values with checked arithmetic
//! 3. Commits ledger effects and calls the token in checks-effects-interactions
//!    order
//! 4. Records an event only after success
//!
//! Operations take `&self`. The ledger sits in a `RefCell` and no borrow is
//! held across a token call, so a token that re-enters the engine reaches the
//! guard and is rejected instead of observing a half-applied call.

use std::cell::RefCell;
use tracing::{debug, info, warn};
use types::errors::ArithmeticError;
use types::ids::{AccountId, TokenId};
use types::numeric::{TokenAmount, Timestamp};

use crate::clock::Clock;
use crate::config::PledgeConfig;
use crate::errors::{LedgerError, PledgeError};
use crate::events::{ContractEvent, EventLog};
use crate::gateway::TokenGateway;
use crate::ledger::{AccountRecord, LedgerSnapshot, LedgerState};
use crate::security::{GuardScope, ReentrancyGuard};

/// Custodial pledge contract over a single token.
#[derive(Debug)]
pub struct PledgeEngine<G, C> {
    ledger: RefCell<LedgerState>,
    reentrancy_guard: ReentrancyGuard,
    events: RefCell<EventLog>,
    gateway: G,
    clock: C,
}

impl<G: TokenGateway, C: Clock> PledgeEngine<G, C> {
    /// Create an engine whose lock deadline is `clock.now()` plus the
    /// configured locking period.
    pub fn new(config: PledgeConfig, gateway: G, clock: C) -> Result<Self, PledgeError> {
        let now = clock.now();
        let lock_deadline = now.checked_add_secs(config.locking_period_secs)?;

        info!(
            token = %config.token,
            locking_period_secs = config.locking_period_secs,
            lock_deadline = %lock_deadline,
            "PledgeEngine initialized"
        );

        Ok(Self {
            ledger: RefCell::new(LedgerState::new(config.token, lock_deadline, config.purpose)),
            reentrancy_guard: ReentrancyGuard::new(),
            events: RefCell::new(EventLog::new()),
            gateway,
            clock,
        })
    }

    // ───────────────────────── Pledge ─────────────────────────

    /// Move `amount` from `caller` into custody and credit their pledge.
    ///
    /// The inbound transfer must succeed before anything is committed; a
    /// failed transfer leaves the ledger untouched.
    pub fn pledge(
        &self,
        caller: AccountId,
        amount: TokenAmount,
    ) -> Result<ContractEvent, PledgeError> {
        let _scope = self.enter()?;

        if amount.is_zero() {
            debug!(account = %caller, "Rejecting zero pledge");
            return Err(PledgeError::InvalidAmount);
        }

        let (record, total_pledged, pledged_count) = {
            let ledger = self.ledger.borrow();
            let global = ledger.global();
            let current = ledger.account(&caller);

            let count = if current.pledged_amount.is_zero() {
                increment(global.total_pledged_account_count())?
            } else {
                global.total_pledged_account_count()
            };
            let record = AccountRecord {
                pledged_amount: current.pledged_amount.checked_add(amount)?,
                ..current
            };
            (record, global.total_pledged_amount().checked_add(amount)?, count)
        };

        if let Err(err) = self.gateway.transfer_in(&caller, amount) {
            warn!(account = %caller, %amount, error = %err, "Pledge transfer failed");
            return Err(err.into());
        }

        {
            let mut ledger = self.ledger.borrow_mut();
            ledger.set_account(caller, record);
            ledger.set_total_pledged_amount(total_pledged);
            ledger.set_total_pledged_account_count(pledged_count);
        }

        Ok(self.emit(ContractEvent::pledged(caller, amount)))
    }

    // ───────────────────────── Unpledge ─────────────────────────

    /// Reclassify `amount` of the caller's pledge as withdrawable.
    ///
    /// No tokens move and the lock deadline is not consulted.
    pub fn unpledge(
        &self,
        caller: AccountId,
        amount: TokenAmount,
    ) -> Result<ContractEvent, PledgeError> {
        let _scope = self.enter()?;

        if amount.is_zero() {
            debug!(account = %caller, "Rejecting zero unpledge");
            return Err(PledgeError::InvalidAmount);
        }

        let mut ledger = self.ledger.borrow_mut();
        let current = ledger.account(&caller);
        if amount > current.pledged_amount {
            debug!(
                account = %caller,
                requested = %amount,
                pledged = %current.pledged_amount,
                "Rejecting unpledge above pledged balance"
            );
            return Err(PledgeError::InsufficientPledge {
                requested: amount,
                pledged: current.pledged_amount,
            });
        }

        let global = ledger.global();
        let record = AccountRecord {
            pledged_amount: current.pledged_amount.checked_sub(amount)?,
            withdrawable_amount: current.withdrawable_amount.checked_add(amount)?,
        };
        let total_pledged = global.total_pledged_amount().checked_sub(amount)?;
        let total_withdrawable = global.total_withdrawable_amount().checked_add(amount)?;
        let pledged_count = if record.pledged_amount.is_zero() {
            decrement(global.total_pledged_account_count())?
        } else {
            global.total_pledged_account_count()
        };

        ledger.set_account(caller, record);
        ledger.set_total_pledged_amount(total_pledged);
        ledger.set_total_withdrawable_amount(total_withdrawable);
        ledger.set_total_pledged_account_count(pledged_count);
        drop(ledger);

        Ok(self.emit(ContractEvent::unpledged(caller, amount)))
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Transfer the caller's full withdrawable balance out of custody.
    ///
    /// The balance is zeroed before the outbound transfer so a re-entering
    /// token sees it already debited. If the transfer fails the prior values
    /// are restored and the call fails.
    pub fn withdraw(&self, caller: AccountId) -> Result<ContractEvent, PledgeError> {
        let _scope = self.enter()?;

        let now = self.clock.now();
        let (previous, total_withdrawable) = {
            let ledger = self.ledger.borrow();
            let lock_deadline = ledger.global().lock_deadline();
            if now < lock_deadline {
                debug!(account = %caller, %now, %lock_deadline, "Withdrawal still locked");
                return Err(PledgeError::StillLocked { now, lock_deadline });
            }
            (ledger.account(&caller), ledger.global().total_withdrawable_amount())
        };

        let amount = previous.withdrawable_amount;
        if amount.is_zero() {
            return Err(PledgeError::NothingToWithdraw);
        }
        let remaining_withdrawable = total_withdrawable.checked_sub(amount)?;

        {
            let mut ledger = self.ledger.borrow_mut();
            ledger.set_account(
                caller,
                AccountRecord {
                    withdrawable_amount: TokenAmount::ZERO,
                    ..previous
                },
            );
            ledger.set_total_withdrawable_amount(remaining_withdrawable);
        }

        if let Err(err) = self.gateway.transfer_out(&caller, amount) {
            warn!(
                account = %caller,
                %amount,
                error = %err,
                "Withdraw transfer failed, restoring withdrawable balance"
            );
            let mut ledger = self.ledger.borrow_mut();
            ledger.set_account(caller, previous);
            ledger.set_total_withdrawable_amount(total_withdrawable);
            return Err(err.into());
        }

        Ok(self.emit(ContractEvent::withdrawn(caller, amount)))
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn pledged(&self, account_id: &AccountId) -> TokenAmount {
        self.ledger.borrow().account(account_id).pledged_amount
    }

    pub fn withdrawable(&self, account_id: &AccountId) -> TokenAmount {
        self.ledger.borrow().account(account_id).withdrawable_amount
    }

    pub fn total_pledged_amount(&self) -> TokenAmount {
        self.ledger.borrow().global().total_pledged_amount()
    }

    pub fn total_pledged_account_count(&self) -> u64 {
        self.ledger.borrow().global().total_pledged_account_count()
    }

    pub fn total_withdrawable_amount(&self) -> TokenAmount {
        self.ledger.borrow().global().total_withdrawable_amount()
    }

    pub fn lock_deadline(&self) -> Timestamp {
        self.ledger.borrow().global().lock_deadline()
    }

    /// Whether withdrawals are still blocked at the clock's current time.
    pub fn is_locked(&self) -> bool {
        self.clock.now() < self.lock_deadline()
    }

    pub fn token(&self) -> TokenId {
        self.ledger.borrow().global().token().clone()
    }

    pub fn purpose(&self) -> String {
        self.ledger.borrow().global().purpose().to_string()
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.borrow().snapshot()
    }

    pub fn state_root(&self) -> [u8; 32] {
        self.ledger.borrow().state_root()
    }

    /// Recompute ledger totals and check them against `custody_balance`.
    pub fn verify(&self, custody_balance: TokenAmount) -> Result<(), LedgerError> {
        let ledger = self.ledger.borrow();
        ledger.check_invariants()?;
        ledger.check_custody(custody_balance)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ───────────────────────── Events ─────────────────────────

    /// All events emitted so far.
    pub fn events(&self) -> Vec<ContractEvent> {
        self.events.borrow().entries().to_vec()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<ContractEvent> {
        self.events.borrow_mut().drain()
    }

    // ───────────────────────── Internal ─────────────────────────

    fn enter(&self) -> Result<GuardScope<'_>, PledgeError> {
        self.reentrancy_guard.enter().ok_or_else(|| {
            warn!("Reentrant call rejected");
            PledgeError::ReentrantCall
        })
    }

    fn emit(&self, event: ContractEvent) -> ContractEvent {
        info!(
            event = event.label(),
            account = %event.account_id(),
            amount = %event.amount(),
            "Pledge state transition"
        );
        self.events.borrow_mut().record(event.clone());
        event
    }
}

fn increment(count: u64) -> Result<u64, ArithmeticError> {
    count
        .checked_add(1)
        .ok_or_else(|| ArithmeticError::overflow(count, 1u64))
}

fn decrement(count: u64) -> Result<u64, ArithmeticError> {
    count
        .checked_sub(1)
        .ok_or_else(|| ArithmeticError::underflow(count, 1u64))
}
