// token-sale/src/token.rs

use crate::{
    roles::{require_role, Ownership, Role},
    SaleError, SaleResult,
};
use ledger_types::{Address, Amount, DECIMALS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TOKEN_NAME: &str = "Bitminer Factory Token";
pub const TOKEN_SYMBOL: &str = "BMF";

/// Minting lifecycle; the transition to `Finished` is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Minting {
    Open,
    Finished,
}

/// Capped, mintable, burnable balance ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    ownership: Ownership,
    /// Authorized minter; zero until the crowdsale is injected
    crowdsale: Address,
    /// Authorized burner; zero until injected
    destroyer: Address,
    /// Immutable maximum total supply
    cap: Amount,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    /// allowances[owner][spender]
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    minting: Minting,
}

impl Token {
    /// Create a token with the given supply cap, owned by the deployer
    pub fn new(owner: Address, cap: Amount) -> Self {
        Self {
            ownership: Ownership::new(owner),
            crowdsale: Address::zero(),
            destroyer: Address::zero(),
            cap,
            total_supply: Amount::zero(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            minting: Minting::Open,
        }
    }

    // --- read accessors ---

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u32 {
        DECIMALS
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn crowdsale(&self) -> Address {
        self.crowdsale
    }

    pub fn destroyer(&self) -> Address {
        self.destroyer
    }

    pub fn cap(&self) -> &Amount {
        &self.cap
    }

    pub fn total_supply(&self) -> &Amount {
        &self.total_supply
    }

    pub fn minting_finished(&self) -> bool {
        self.minting == Minting::Finished
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances
            .get(account)
            .cloned()
            .unwrap_or_else(Amount::zero)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .cloned()
            .unwrap_or_else(Amount::zero)
    }

    // --- minting ---

    /// Mint `amount` to `to`; caller must be the owner or the injected crowdsale
    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> SaleResult<()> {
        self.require_minter(&caller)?;
        self.require_minting_open()?;
        self.require_under_cap(&amount)?;

        self.credit(to, &amount)?;
        self.total_supply = self
            .total_supply
            .checked_add(&amount)
            .ok_or(SaleError::AmountOverflow)?;
        Ok(())
    }

    /// Batch mint to parallel recipient/amount lists
    ///
    /// The whole batch is validated up front; either every entry commits
    /// or none does.
    pub fn multiple_transfer(
        &mut self,
        caller: Address,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> SaleResult<()> {
        if recipients.len() != amounts.len() {
            return Err(SaleError::LengthMismatch(recipients.len(), amounts.len()));
        }
        self.require_minter(&caller)?;
        self.require_minting_open()?;

        let mut batch_total = Amount::zero();
        for amount in amounts {
            batch_total = batch_total
                .checked_add(amount)
                .ok_or(SaleError::AmountOverflow)?;
        }
        self.require_under_cap(&batch_total)?;

        for (to, amount) in recipients.iter().zip(amounts) {
            self.credit(*to, amount)?;
        }
        self.total_supply = self
            .total_supply
            .checked_add(&batch_total)
            .ok_or(SaleError::AmountOverflow)?;
        Ok(())
    }

    /// Close minting permanently; owner-only
    pub fn finish_minting(&mut self, caller: Address) -> SaleResult<()> {
        self.ownership.require_owner(&caller)?;
        self.require_minting_open()?;

        self.minting = Minting::Finished;
        tracing::info!("Token minting finished");
        Ok(())
    }

    // --- transfers and allowances ---

    pub fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> SaleResult<()> {
        self.debit(&caller, &amount)?;
        self.credit(to, &amount)?;
        Ok(())
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: Amount) {
        self.allowances
            .entry(caller)
            .or_default()
            .insert(spender, amount);
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> SaleResult<()> {
        let remaining = self
            .allowance(&from, &caller)
            .checked_sub(&amount)
            .ok_or(SaleError::InsufficientAllowance)?;

        self.debit(&from, &amount)?;
        self.credit(to, &amount)?;
        self.allowances
            .entry(from)
            .or_default()
            .insert(caller, remaining);
        Ok(())
    }

    // --- burning ---

    /// Burn from an account; caller must be the owner or the injected destroyer
    pub fn burn_from(&mut self, caller: Address, account: Address, amount: Amount) -> SaleResult<()> {
        if self.ownership.require_owner(&caller).is_err() {
            require_role(&self.destroyer, &caller, Role::Destroyer)?;
        }

        self.debit(&account, &amount)?;
        self.total_supply = self
            .total_supply
            .checked_sub(&amount)
            .ok_or(SaleError::AmountOverflow)?;
        Ok(())
    }

    // --- administration ---

    pub fn set_crowdsale(&mut self, caller: Address, crowdsale: Address) -> SaleResult<()> {
        self.ownership.require_owner(&caller)?;
        self.crowdsale = crowdsale;
        tracing::info!("Token minter set to {}", crowdsale);
        Ok(())
    }

    pub fn set_destroyer(&mut self, caller: Address, destroyer: Address) -> SaleResult<()> {
        self.ownership.require_owner(&caller)?;
        self.destroyer = destroyer;
        tracing::info!("Token destroyer set to {}", destroyer);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> SaleResult<()> {
        self.ownership.transfer(&caller, new_owner)
    }

    pub fn renounce_ownership(&mut self, caller: Address) -> SaleResult<()> {
        self.ownership.renounce(&caller)
    }

    // --- internal guards and balance plumbing ---

    fn require_minter(&self, caller: &Address) -> SaleResult<()> {
        if self.ownership.require_owner(caller).is_ok() {
            return Ok(());
        }
        require_role(&self.crowdsale, caller, Role::Minter)
    }

    fn require_minting_open(&self) -> SaleResult<()> {
        if self.minting == Minting::Finished {
            return Err(SaleError::MintingFinished);
        }
        Ok(())
    }

    fn require_under_cap(&self, amount: &Amount) -> SaleResult<()> {
        let projected = self
            .total_supply
            .checked_add(amount)
            .ok_or(SaleError::AmountOverflow)?;
        if projected > self.cap {
            return Err(SaleError::CapExceeded {
                cap: self.cap.clone(),
                amount: amount.clone(),
            });
        }
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: &Amount) -> SaleResult<()> {
        let balance = self.balances.entry(account).or_insert_with(Amount::zero);
        *balance = balance
            .checked_add(amount)
            .ok_or(SaleError::AmountOverflow)?;
        Ok(())
    }

    fn debit(&mut self, account: &Address, amount: &Amount) -> SaleResult<()> {
        let balance = self.balance_of(account);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(SaleError::InsufficientBalance)?;
        self.balances.insert(*account, remaining);
        Ok(())
    }
}
