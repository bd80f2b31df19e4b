//! Token gateway — the narrow transfer interface consumed from the token
//!
//! The token ledger is untrusted: an implementation may call back into the
//! engine before returning. Failures must be reported through the `Result`,
//! never swallowed.

use std::rc::Rc;
use types::ids::AccountId;
use types::numeric::TokenAmount;

use crate::errors::TransferError;

/// Moves the custodied token between participants and custody.
pub trait TokenGateway {
    /// Debit `from` and credit custody by `amount` (approve/transfer-from).
    fn transfer_in(&self, from: &AccountId, amount: TokenAmount) -> Result<(), TransferError>;

    /// Debit custody and credit `to` by `amount`.
    fn transfer_out(&self, to: &AccountId, amount: TokenAmount) -> Result<(), TransferError>;
}

impl<T: TokenGateway + ?Sized> TokenGateway for Rc<T> {
    fn transfer_in(&self, from: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        (**self).transfer_in(from, amount)
    }

    fn transfer_out(&self, to: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        (**self).transfer_out(to, amount)
    }
}

impl<T: TokenGateway + ?Sized> TokenGateway for &T {
    fn transfer_in(&self, from: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        (**self).transfer_in(from, amount)
    }

    fn transfer_out(&self, to: &AccountId, amount: TokenAmount) -> Result<(), TransferError> {
        (**self).transfer_out(to, amount)
    }
}
