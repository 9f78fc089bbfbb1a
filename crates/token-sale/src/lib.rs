// token-sale/src/lib.rs

//! Capped token sale domain model
//!
//! This crate provides:
//! - A capped, mintable, burnable token ledger
//! - A funder whitelist with a delegated whitelister role
//! - A tiered-rate crowdsale with a one-way finalized state
//! - Deployment wiring that cross-links the three entities
//!
//! Every mutating operation names the role it requires and validates
//! completely before touching state, so a rejected call leaves all
//! observable state unchanged.

pub mod crowdsale;
pub mod ledger;
pub mod roles;
pub mod schedule;
pub mod token;
pub mod whitelist;

pub use crowdsale::{Crowdsale, SalePhase, TierRates};
pub use ledger::{DeployParams, SaleLedger};
pub use roles::{Ownership, Role};
pub use schedule::{SaleSchedule, Tier};
pub use token::{Minting, Token, TOKEN_NAME, TOKEN_SYMBOL};
pub use whitelist::Whitelist;

use ledger_types::{Address, Amount};

/// Result type for sale operations
pub type SaleResult<T> = Result<T, SaleError>;

/// Errors that can occur in sale operations
///
/// Every variant surfaces as an atomic rejection: the failed call has
/// committed no state change.
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    #[error("Caller {caller} is not authorized as {role}")]
    Unauthorized { role: Role, caller: Address },

    #[error("Minting {amount} would push total supply past the cap of {cap}")]
    CapExceeded { cap: Amount, amount: Amount },

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient allowance")]
    InsufficientAllowance,

    #[error("Minting has been finished")]
    MintingFinished,

    #[error("Crowdsale has been finalized")]
    SaleFinalized,

    #[error("Address {0} is not whitelisted")]
    NotWhitelisted(Address),

    #[error("Whitelist contract is not set")]
    WhitelistNotSet,

    #[error("Sale is not open at the given time")]
    SaleNotOpen,

    #[error("Batch arrays differ in length: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("Schedule timestamps are not strictly increasing")]
    InvalidSchedule,

    #[error("Amount overflow")]
    AmountOverflow,
}
