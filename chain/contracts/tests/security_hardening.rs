//! Security Hardening Tests
//!
//! Adversarial testing of the pledge engine:
//! - Reentrancy attacks from a hostile token
//! - Failed and non-standard token transfers
//! - Lock deadline boundary
//! - Fuzz testing (proptest) of ledger invariants and conservation

use contracts::clock::ManualClock;
use contracts::config::PledgeConfig;
use contracts::errors::{PledgeError, TransferError};
use contracts::events::ContractEvent;
use contracts::gateway::TokenGateway;
use contracts::mock::MemoryToken;
use contracts::{PledgeEngine, CONTRACT_ABI_VERSION};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use types::ids::{AccountId, TokenId};
use types::numeric::{TokenAmount, Timestamp};

const START: u64 = 1_700_000_000;
const LOCKING_PERIOD: u64 = 7 * 24 * 60 * 60;

// ═══════════════════════════════════════════════════════════════════
// Hostile Token
// ═══════════════════════════════════════════════════════════════════

type HostileEngine = PledgeEngine<Rc<HostileToken>, Rc<ManualClock>>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Attack {
    None,
    WithdrawOnTransferOut,
    PledgeOnTransferIn,
    UnpledgeOnTransferIn,
    UnpledgeOnTransferOut,
}

/// Token that calls back into the engine before completing a transfer.
struct HostileToken {
    inner: MemoryToken,
    engine: RefCell<Weak<HostileEngine>>,
    attack: Cell<Attack>,
    nested: RefCell<Vec<Result<ContractEvent, PledgeError>>>,
    observed_withdrawable: RefCell<Vec<TokenAmount>>,
}

impl HostileToken {
    fn new(custody: AccountId) -> Self {
        Self {
            inner: MemoryToken::new(custody),
            engine: RefCell::new(Weak::new()),
            attack: Cell::new(Attack::None),
            nested: RefCell::new(Vec::new()),
            observed_withdrawable: RefCell::new(Vec::new()),
        }
    }

    fn engine(&self) -> Option<Rc<HostileEngine>> {
        self.engine.borrow().upgrade()
    }
}

impl TokenGateway for HostileToken {
    fn transfer_in(&self, from: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        if let Some(engine) = self.engine() {
            let nested = match self.attack.get() {
                Attack::PledgeOnTransferIn => Some(engine.pledge(*from, amount)),
                Attack::UnpledgeOnTransferIn => Some(engine.unpledge(*from, amount)),
                _ => None,
            };
            if let Some(result) = nested {
                self.nested.borrow_mut().push(result);
            }
        }
        self.inner.transfer_in(from, amount)
    }

    fn transfer_out(&self, to: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        if let Some(engine) = self.engine() {
            self.observed_withdrawable
                .borrow_mut()
                .push(engine.withdrawable(to));
            let nested = match self.attack.get() {
                Attack::WithdrawOnTransferOut => Some(engine.withdraw(*to)),
                Attack::UnpledgeOnTransferOut => {
                    Some(engine.unpledge(*to, TokenAmount::new(1)))
                }
                _ => None,
            };
            if let Some(result) = nested {
                self.nested.borrow_mut().push(result);
            }
        }
        self.inner.transfer_out(to, amount)
    }
}

fn setup_hostile(attack: Attack) -> (Rc<HostileEngine>, Rc<HostileToken>, Rc<ManualClock>, AccountId) {
    let token = Rc::new(HostileToken::new(AccountId::new()));
    let clock = Rc::new(ManualClock::new(Timestamp::from_secs(START)));
    let engine = Rc::new(
        PledgeEngine::new(config(), Rc::clone(&token), Rc::clone(&clock)).unwrap(),
    );
    *token.engine.borrow_mut() = Rc::downgrade(&engine);

    let user = AccountId::new();
    token.inner.mint(user, TokenAmount::new(10_000)).unwrap();
    token
        .inner
        .approve(user, token.inner.custody(), TokenAmount::new(10_000));
    token.attack.set(attack);
    (engine, token, clock, user)
}

// ═══════════════════════════════════════════════════════════════════
// Reentrancy Tests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_reentrant_withdraw_rejected() {
    let (engine, token, clock, user) = setup_hostile(Attack::WithdrawOnTransferOut);
    engine.pledge(user, TokenAmount::new(100)).unwrap();
    engine.unpledge(user, TokenAmount::new(100)).unwrap();
    clock.set(engine.lock_deadline());

    let event = engine.withdraw(user).unwrap();
    assert_eq!(event, ContractEvent::withdrawn(user, TokenAmount::new(100)));

    assert_eq!(*token.nested.borrow(), reentrant_rejection());

    // Paid exactly once
    assert_eq!(token.inner.balance_of(&user), TokenAmount::new(10_000));
    assert_eq!(token.inner.balance_of(&token.inner.custody()), TokenAmount::ZERO);
    assert_eq!(engine.withdrawable(&user), TokenAmount::ZERO);
}

#[test]
fn test_withdrawable_debited_before_transfer_out() {
    let (engine, token, clock, user) = setup_hostile(Attack::None);
    engine.pledge(user, TokenAmount::new(100)).unwrap();
    engine.unpledge(user, TokenAmount::new(100)).unwrap();
    clock.set(engine.lock_deadline());

    engine.withdraw(user).unwrap();
    assert_eq!(
        token.observed_withdrawable.borrow().as_slice(),
        &[TokenAmount::ZERO]
    );
}

#[test]
fn test_reentrant_pledge_rejected() {
    let (engine, token, _, user) = setup_hostile(Attack::PledgeOnTransferIn);
    engine.pledge(user, TokenAmount::new(100)).unwrap();

    assert_eq!(*token.nested.borrow(), reentrant_rejection());
    // Credited once, matching the single transfer
    assert_eq!(engine.pledged(&user), TokenAmount::new(100));
    assert_eq!(
        token.inner.balance_of(&token.inner.custody()),
        TokenAmount::new(100)
    );
    assert_eq!(engine.events().len(), 1);
}

#[test]
fn test_reentrant_unpledge_during_pledge_rejected() {
    let (engine, token, _, user) = setup_hostile(Attack::None);
    engine.pledge(user, TokenAmount::new(100)).unwrap();

    token.attack.set(Attack::UnpledgeOnTransferIn);
    engine.pledge(user, TokenAmount::new(50)).unwrap();

    assert_eq!(*token.nested.borrow(), reentrant_rejection());
    assert_eq!(engine.pledged(&user), TokenAmount::new(150));
    assert_eq!(engine.withdrawable(&user), TokenAmount::ZERO);
}

#[test]
fn test_reentrant_unpledge_during_withdraw_rejected() {
    let (engine, token, clock, user) = setup_hostile(Attack::UnpledgeOnTransferOut);
    engine.pledge(user, TokenAmount::new(100)).unwrap();
    engine.unpledge(user, TokenAmount::new(40)).unwrap();
    clock.set(engine.lock_deadline());

    engine.withdraw(user).unwrap();
    assert_eq!(*token.nested.borrow(), reentrant_rejection());
    assert_eq!(engine.pledged(&user), TokenAmount::new(60));
    assert!(engine
        .verify(token.inner.balance_of(&token.inner.custody()))
        .is_ok());
}

#[test]
fn test_guard_released_after_reentrancy_attempt() {
    let (engine, token, _, user) = setup_hostile(Attack::PledgeOnTransferIn);
    engine.pledge(user, TokenAmount::new(10)).unwrap();

    token.attack.set(Attack::None);
    engine.pledge(user, TokenAmount::new(20)).unwrap();
    engine.unpledge(user, TokenAmount::new(30)).unwrap();
    assert_eq!(engine.withdrawable(&user), TokenAmount::new(30));
}

// ═══════════════════════════════════════════════════════════════════
// Failing Token Tests
// ═══════════════════════════════════════════════════════════════════

/// Token that reports every transfer as rejected.
struct RejectingToken;

impl TokenGateway for RejectingToken {
    fn transfer_in(&self, _: &AccountId, _: TokenAmount) -> Result<(), TransferError> {
        Err(TransferError::Rejected {
            reason: "paused".to_string(),
        })
    }

    fn transfer_out(&self, _: &AccountId, _: TokenAmount) -> Result<(), TransferError> {
        Err(TransferError::Rejected {
            reason: "paused".to_string(),
        })
    }
}

#[test]
fn test_rejected_transfer_in_leaves_ledger_unchanged() {
    let clock = ManualClock::new(Timestamp::from_secs(START));
    let engine = PledgeEngine::new(config(), RejectingToken, clock).unwrap();
    let user = AccountId::new();
    let root = engine.state_root();

    let result = engine.pledge(user, TokenAmount::new(100));
    assert_eq!(
        result,
        Err(PledgeError::TransferFailed(TransferError::Rejected {
            reason: "paused".to_string()
        }))
    );
    assert_eq!(engine.state_root(), root);
    assert_eq!(engine.total_pledged_account_count(), 0);
    assert!(engine.events().is_empty());
}

#[test]
fn test_failed_withdraw_can_be_retried() {
    let token = Rc::new(MemoryToken::new(AccountId::new()));
    let clock = Rc::new(ManualClock::new(Timestamp::from_secs(START)));
    let engine = PledgeEngine::new(config(), Rc::clone(&token), Rc::clone(&clock)).unwrap();
    let user = AccountId::new();
    token.mint(user, TokenAmount::new(100)).unwrap();
    token.approve(user, token.custody(), TokenAmount::new(100));

    engine.pledge(user, TokenAmount::new(100)).unwrap();
    engine.unpledge(user, TokenAmount::new(100)).unwrap();
    clock.set(engine.lock_deadline());

    // Custody temporarily short
    token.burn(token.custody(), TokenAmount::new(100)).unwrap();
    assert!(matches!(
        engine.withdraw(user),
        Err(PledgeError::TransferFailed(TransferError::InsufficientBalance { .. }))
    ));
    assert_eq!(engine.withdrawable(&user), TokenAmount::new(100));

    // Custody replenished, retry succeeds
    token.mint(token.custody(), TokenAmount::new(100)).unwrap();
    engine.withdraw(user).unwrap();
    assert_eq!(token.balance_of(&user), TokenAmount::new(100));
    assert_eq!(engine.withdraw(user), Err(PledgeError::NothingToWithdraw));
}

// ═══════════════════════════════════════════════════════════════════
// Timing Tests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_withdraw_deadline_boundary_inclusive() {
    let (engine, _, clock, user) = setup_hostile(Attack::None);
    engine.pledge(user, TokenAmount::new(100)).unwrap();
    engine.unpledge(user, TokenAmount::new(100)).unwrap();

    let deadline = engine.lock_deadline();
    clock.set(deadline.checked_sub_secs(1).unwrap());
    assert!(matches!(
        engine.withdraw(user),
        Err(PledgeError::StillLocked { .. })
    ));

    clock.set(deadline);
    assert!(engine.withdraw(user).is_ok());
}

#[test]
fn test_still_locked_checked_before_balance() {
    let (engine, _, _, user) = setup_hostile(Attack::None);
    // No withdrawable balance, but the lock is reported first
    assert!(matches!(
        engine.withdraw(user),
        Err(PledgeError::StillLocked { .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════
// Upgrade Path (ABI Freeze)
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_contract_abi_version_frozen() {
    assert_eq!(CONTRACT_ABI_VERSION, "1.0.0");
}

// ═══════════════════════════════════════════════════════════════════
// Fuzz Tests (Proptest)
// ═══════════════════════════════════════════════════════════════════

mod fuzz {
    use super::*;
    use proptest::prelude::*;

    const ACCOUNTS: usize = 3;
    const INITIAL_BALANCE: u128 = 10_000;

    #[derive(Debug, Clone)]
    enum Op {
        Pledge(usize, u128),
        Unpledge(usize, u128),
        Withdraw(usize),
        Advance(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..ACCOUNTS, 0u128..4_000).prop_map(|(a, n)| Op::Pledge(a, n)),
            (0..ACCOUNTS, 0u128..4_000).prop_map(|(a, n)| Op::Unpledge(a, n)),
            (0..ACCOUNTS).prop_map(Op::Withdraw),
            (0..LOCKING_PERIOD / 2).prop_map(Op::Advance),
        ]
    }

    proptest! {
        /// Invariant: totals, account count, and custody coverage hold after
        /// every call; failed calls change nothing; no token is lost or
        /// duplicated.
        #[test]
        fn fuzz_ledger_invariants_and_conservation(ops in prop::collection::vec(op(), 1..60)) {
            let token = Rc::new(MemoryToken::new(AccountId::new()));
            let clock = Rc::new(ManualClock::new(Timestamp::from_secs(START)));
            let engine = PledgeEngine::new(config(), Rc::clone(&token), Rc::clone(&clock)).unwrap();
            let deadline = engine.lock_deadline();

            let accounts: Vec<AccountId> = (0..ACCOUNTS).map(|_| AccountId::new()).collect();
            for acc in &accounts {
                token.mint(*acc, TokenAmount::new(INITIAL_BALANCE)).unwrap();
                token.approve(*acc, token.custody(), TokenAmount::MAX);
            }

            for op in ops {
                let before = engine.ledger_snapshot();
                let result = match op {
                    Op::Pledge(a, n) => engine.pledge(accounts[a], TokenAmount::new(n)).map(|_| ()),
                    Op::Unpledge(a, n) => engine.unpledge(accounts[a], TokenAmount::new(n)).map(|_| ()),
                    Op::Withdraw(a) => engine.withdraw(accounts[a]).map(|_| ()),
                    Op::Advance(secs) => {
                        clock.advance(secs);
                        Ok(())
                    }
                };

                if result.is_err() {
                    prop_assert_eq!(engine.ledger_snapshot(), before);
                }
                prop_assert!(engine.verify(token.balance_of(&token.custody())).is_ok());
                prop_assert_eq!(engine.lock_deadline(), deadline);

                for acc in &accounts {
                    let held = token
                        .balance_of(acc)
                        .checked_add(engine.pledged(acc))
                        .and_then(|sum| sum.checked_add(engine.withdrawable(acc)))
                        .unwrap();
                    prop_assert_eq!(held, TokenAmount::new(INITIAL_BALANCE));
                }
            }
        }

        /// Round trip: pledge, unpledge, and withdraw of the same amount
        /// returns exactly that amount and clears the account.
        #[test]
        fn fuzz_round_trip_returns_exact_amount(amount in 1u128..=INITIAL_BALANCE) {
            let token = Rc::new(MemoryToken::new(AccountId::new()));
            let clock = Rc::new(ManualClock::new(Timestamp::from_secs(START)));
            let engine = PledgeEngine::new(config(), Rc::clone(&token), Rc::clone(&clock)).unwrap();
            let acc = AccountId::new();
            token.mint(acc, TokenAmount::new(INITIAL_BALANCE)).unwrap();
            token.approve(acc, token.custody(), TokenAmount::new(amount));

            engine.pledge(acc, TokenAmount::new(amount)).unwrap();
            prop_assert_eq!(engine.total_pledged_account_count(), 1);
            engine.unpledge(acc, TokenAmount::new(amount)).unwrap();
            prop_assert_eq!(engine.total_pledged_account_count(), 0);

            clock.set(engine.lock_deadline());
            let event = engine.withdraw(acc).unwrap();
            prop_assert_eq!(event.amount(), TokenAmount::new(amount));
            prop_assert_eq!(engine.pledged(&acc), TokenAmount::ZERO);
            prop_assert_eq!(engine.withdrawable(&acc), TokenAmount::ZERO);
            prop_assert_eq!(token.balance_of(&acc), TokenAmount::new(INITIAL_BALANCE));
        }

        /// Invariant: cannot unpledge more than pledged.
        #[test]
        fn fuzz_cannot_unpledge_more_than_pledged(
            pledge in 1u128..5_000,
            extra in 1u128..1_000,
        ) {
            let (engine, _, _, user) = setup_hostile(Attack::None);
            engine.pledge(user, TokenAmount::new(pledge)).unwrap();
            let before = engine.ledger_snapshot();

            let result = engine.unpledge(user, TokenAmount::new(pledge + extra));
            let is_insufficient = matches!(result, Err(PledgeError::InsufficientPledge { .. }));
            prop_assert!(is_insufficient);
            prop_assert_eq!(engine.ledger_snapshot(), before);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn reentrant_rejection() -> Vec<Result<ContractEvent, PledgeError>> {
    vec![Err(PledgeError::ReentrantCall)]
}

fn config() -> PledgeConfig {
    PledgeConfig::new(TokenId::new("TRVL"), LOCKING_PERIOD, "What's for?")
}
