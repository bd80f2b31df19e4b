//! Error types shared by the pledge crates
//!
//! Fixed-width arithmetic never wraps: every addition or subtraction that
//! would leave the representable range is reported as an `ArithmeticError`.

use std::fmt::Display;
use thiserror::Error;

/// Checked arithmetic failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Overflow: {lhs} + {rhs} exceeds representable range")]
    Overflow { lhs: String, rhs: String },

    #[error("Underflow: {lhs} - {rhs} is negative")]
    Underflow { lhs: String, rhs: String },
}

impl ArithmeticError {
    pub fn overflow(lhs: impl Display, rhs: impl Display) -> Self {
        Self::Overflow {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }

    pub fn underflow(lhs: impl Display, rhs: impl Display) -> Self {
        Self::Underflow {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }
}
