// token-sale/src/whitelist.rs

use crate::{
    roles::{require_role, Ownership, Role},
    SaleResult,
};
use ledger_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Funder access-control set
///
/// Membership is managed by the owner or a delegated whitelister; the
/// whitelister defaults to the owner at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whitelist {
    ownership: Ownership,
    whitelister: Address,
    members: HashSet<Address>,
}

impl Whitelist {
    pub fn new(owner: Address) -> Self {
        Self {
            ownership: Ownership::new(owner),
            whitelister: owner,
            members: HashSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn whitelister(&self) -> Address {
        self.whitelister
    }

    /// Pure membership query; callable by anyone
    pub fn is_whitelisted(&self, addr: &Address) -> bool {
        self.members.contains(addr)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Batch add; idempotent for already-present addresses
    pub fn whitelist(&mut self, caller: Address, addrs: &[Address]) -> SaleResult<()> {
        self.require_whitelister(&caller)?;
        for addr in addrs {
            self.members.insert(*addr);
        }
        tracing::debug!("Whitelisted {} address(es)", addrs.len());
        Ok(())
    }

    /// Batch remove; idempotent for absent addresses
    pub fn unwhitelist(&mut self, caller: Address, addrs: &[Address]) -> SaleResult<()> {
        self.require_whitelister(&caller)?;
        for addr in addrs {
            self.members.remove(addr);
        }
        tracing::debug!("Unwhitelisted {} address(es)", addrs.len());
        Ok(())
    }

    /// Reassign the whitelister role; owner-only
    pub fn set_new_whitelister(&mut self, caller: Address, whitelister: Address) -> SaleResult<()> {
        self.ownership.require_owner(&caller)?;
        self.whitelister = whitelister;
        tracing::info!("Whitelister set to {}", whitelister);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> SaleResult<()> {
        self.ownership.transfer(&caller, new_owner)
    }

    fn require_whitelister(&self, caller: &Address) -> SaleResult<()> {
        if self.ownership.require_owner(caller).is_ok() {
            return Ok(());
        }
        require_role(&self.whitelister, caller, Role::Whitelister)
    }
}
