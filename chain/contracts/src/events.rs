//! Contract events and the append-only event log
//!
//! Events are immutable records of committed state transitions. They are
//! only recorded after a call succeeds, so a failed call never leaves an
//! event behind.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::TokenAmount;

/// Tokens moved into custody and credited to the pledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pledged {
    pub account_id: AccountId,
    pub amount: TokenAmount,
}

/// Pledged tokens reclassified as withdrawable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpledged {
    pub account_id: AccountId,
    pub amount: TokenAmount,
}

/// Withdrawable tokens transferred out of custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub account_id: AccountId,
    pub amount: TokenAmount,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Pledged(Pledged),
    Unpledged(Unpledged),
    Withdrawn(Withdrawn),
}

impl ContractEvent {
    pub fn pledged(account_id: AccountId, amount: TokenAmount) -> Self {
        ContractEvent::Pledged(Pledged { account_id, amount })
    }

    pub fn unpledged(account_id: AccountId, amount: TokenAmount) -> Self {
        ContractEvent::Unpledged(Unpledged { account_id, amount })
    }

    pub fn withdrawn(account_id: AccountId, amount: TokenAmount) -> Self {
        ContractEvent::Withdrawn(Withdrawn { account_id, amount })
    }

    pub fn account_id(&self) -> AccountId {
        match self {
            ContractEvent::Pledged(e) => e.account_id,
            ContractEvent::Unpledged(e) => e.account_id,
            ContractEvent::Withdrawn(e) => e.account_id,
        }
    }

    pub fn amount(&self) -> TokenAmount {
        match self {
            ContractEvent::Pledged(e) => e.amount,
            ContractEvent::Unpledged(e) => e.amount,
            ContractEvent::Withdrawn(e) => e.amount,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ContractEvent::Pledged(_) => "Pledged",
            ContractEvent::Unpledged(_) => "Unpledged",
            ContractEvent::Withdrawn(_) => "Withdrawn",
        }
    }
}

/// Append-only log of emitted events
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<ContractEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&mut self, event: ContractEvent) {
        self.entries.push(event);
    }

    pub fn entries(&self) -> &[ContractEvent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain all events (consume and clear).
    pub fn drain(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.entries)
    }

    /// Serialize the log as a JSON array for external observers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}
