//! Types library for the pledge custody contract
//!
//! Core type definitions shared by the contract crate and its callers,
//! keeping identities and fixed-width amounts strongly typed.
//!
//! # Version
//! v1.0.0
//!
//! # Modules
//! - `ids`: Identifiers (AccountId, TokenId)
//! - `numeric`: Fixed-width amounts and timestamps (TokenAmount, Timestamp)
//! - `errors`: Checked arithmetic errors

pub mod ids;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
