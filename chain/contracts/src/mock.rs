//! In-memory fungible token for tests and simulations
//!
//! Follows approve/transfer-from semantics: a participant approves the
//! custody account, and `transfer_in` spends that allowance. Every failure
//! is reported as a `TransferError`; balances never change on failure.

use std::cell::RefCell;
use std::collections::HashMap;
use types::ids::AccountId;
use types::numeric::TokenAmount;

use crate::errors::TransferError;
use crate::gateway::TokenGateway;

#[derive(Debug, Default)]
struct Balances {
    balances: HashMap<AccountId, TokenAmount>,
    allowances: HashMap<(AccountId, AccountId), TokenAmount>,
    total_supply: TokenAmount,
}

/// Token ledger with a fixed custody account acting as spender.
#[derive(Debug)]
pub struct MemoryToken {
    custody: AccountId,
    state: RefCell<Balances>,
}

impl MemoryToken {
    /// Create an empty token whose gateway side operates on `custody`.
    pub fn new(custody: AccountId) -> Self {
        Self {
            custody,
            state: RefCell::new(Balances::default()),
        }
    }

    pub fn custody(&self) -> AccountId {
        self.custody
    }

    pub fn balance_of(&self, account: &AccountId) -> TokenAmount {
        self.state
            .borrow()
            .balances
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> TokenAmount {
        self.state
            .borrow()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.state.borrow().total_supply
    }

    /// Create new tokens for `to`.
    pub fn mint(&self, to: AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        let supply = state
            .total_supply
            .checked_add(amount)
            .map_err(|_| TransferError::BalanceOverflow { account: to })?;
        let balance = state.balances.get(&to).copied().unwrap_or_default();
        let balance = balance
            .checked_add(amount)
            .map_err(|_| TransferError::BalanceOverflow { account: to })?;
        state.total_supply = supply;
        state.balances.insert(to, balance);
        Ok(())
    }

    /// Destroy tokens held by `from`.
    pub fn burn(&self, from: AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        let available = state.balances.get(&from).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .map_err(|_| TransferError::InsufficientBalance {
                account: from,
                required: amount,
                available,
            })?;
        // Supply always covers any single balance
        state.total_supply = state
            .total_supply
            .checked_sub(amount)
            .unwrap_or(TokenAmount::ZERO);
        state.balances.insert(from, remaining);
        Ok(())
    }

    /// Set the amount `spender` may move out of `owner`'s balance.
    pub fn approve(&self, owner: AccountId, spender: AccountId, amount: TokenAmount) {
        self.state
            .borrow_mut()
            .allowances
            .insert((owner, spender), amount);
    }

    /// Move tokens from `from` to `to`.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: TokenAmount,
    ) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        Self::move_balance(&mut state, from, to, amount)
    }

    /// Move tokens from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    pub fn transfer_from(
        &self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: TokenAmount,
    ) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        let approved = state
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or_default();
        let remaining = approved
            .checked_sub(amount)
            .map_err(|_| TransferError::InsufficientAllowance {
                owner: from,
                required: amount,
                approved,
            })?;
        Self::move_balance(&mut state, from, to, amount)?;
        state.allowances.insert((from, spender), remaining);
        Ok(())
    }

    fn move_balance(
        state: &mut Balances,
        from: AccountId,
        to: AccountId,
        amount: TokenAmount,
    ) -> Result<(), TransferError> {
        let available = state.balances.get(&from).copied().unwrap_or_default();
        let debited = available
            .checked_sub(amount)
            .map_err(|_| TransferError::InsufficientBalance {
                account: from,
                required: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = state
            .balances
            .get(&to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .map_err(|_| TransferError::BalanceOverflow { account: to })?;
        state.balances.insert(from, debited);
        state.balances.insert(to, credited);
        Ok(())
    }
}

impl TokenGateway for MemoryToken {
    fn transfer_in(&self, from: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        self.transfer_from(self.custody, *from, self.custody, amount)
    }

    fn transfer_out(&self, to: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        self.transfer(self.custody, *to, amount)
    }
}
