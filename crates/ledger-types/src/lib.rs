// ledger-types/src/lib.rs

//! Shared primitive types for the token-sale ledger
//!
//! This crate provides:
//! - Addresses (20-byte, hex-encoded, zero sentinel for "unset")
//! - Amounts (arbitrary-precision, 18 decimal base units)
//! - Timestamps

pub mod address;
pub mod amount;

pub use address::Address;
pub use amount::{Amount, DECIMALS};

/// Timestamp in Unix epoch seconds
pub type Timestamp = u64;

/// Result type for primitive type operations
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors that can occur when parsing primitive types
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
