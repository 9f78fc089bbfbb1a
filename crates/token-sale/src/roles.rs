// token-sale/src/roles.rs

use crate::{SaleError, SaleResult};
use ledger_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named roles required by gated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Administrative owner of an entity
    Owner,
    /// Address allowed to mint (the crowdsale once injected)
    Minter,
    /// Address allowed to burn another account's balance
    Destroyer,
    /// Address allowed to manage whitelist membership
    Whitelister,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::Minter => "minter",
            Role::Destroyer => "destroyer",
            Role::Whitelister => "whitelister",
        };
        write!(f, "{}", name)
    }
}

/// Ownership slot shared by all entities
///
/// The zero address can never authenticate, so a renounced entity rejects
/// every owner-gated call from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Guard clause run before any owner-gated mutation
    pub fn require_owner(&self, caller: &Address) -> SaleResult<()> {
        if caller.is_zero() || *caller != self.owner {
            return Err(SaleError::Unauthorized {
                role: Role::Owner,
                caller: *caller,
            });
        }
        Ok(())
    }

    pub fn transfer(&mut self, caller: &Address, new_owner: Address) -> SaleResult<()> {
        self.require_owner(caller)?;
        tracing::info!("Ownership transferred from {} to {}", self.owner, new_owner);
        self.owner = new_owner;
        Ok(())
    }

    /// Set the owner to the zero address; irreversible
    pub fn renounce(&mut self, caller: &Address) -> SaleResult<()> {
        self.require_owner(caller)?;
        tracing::warn!("Ownership renounced by {}", self.owner);
        self.owner = Address::zero();
        Ok(())
    }
}

/// Check a caller against a role slot that may still be unset
///
/// An unset slot holds the zero address and authorizes nobody.
pub fn require_role(slot: &Address, caller: &Address, role: Role) -> SaleResult<()> {
    if slot.is_zero() || caller.is_zero() || caller != slot {
        return Err(SaleError::Unauthorized {
            role,
            caller: *caller,
        });
    }
    Ok(())
}
