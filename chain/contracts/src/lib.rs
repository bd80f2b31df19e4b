//! Pledge Contract Logic
//!
//! This crate implements a custodial pledge contract over a single fungible
//! token: accounts pledge tokens into custody, unpledge them into a
//! withdrawable balance, and withdraw once a global lock deadline has passed.
//!
//! # Modules
//! - `errors`: Contract-specific error types
//! - `events`: Contract events and the append-only event log
//! - `security`: Reentrancy guard
//! - `ledger`: Global totals and per-account records
//! - `gateway`: Token transfer interface consumed from the token ledger
//! - `clock`: Time sources for the lock deadline
//! - `config`: Construction parameters
//! - `engine`: Pledge / unpledge / withdraw
//! - `mock`: In-memory approve/transfer-from token
//!
//! # Version
//! v0.1.0

pub mod errors;
pub mod events;
pub mod security;
pub mod ledger;
pub mod gateway;
pub mod clock;
pub mod config;
pub mod engine;
pub mod mock;

pub use engine::PledgeEngine;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
