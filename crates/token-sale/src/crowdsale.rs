// token-sale/src/crowdsale.rs

use crate::{
    roles::Ownership,
    schedule::{SaleSchedule, Tier},
    SaleError, SaleResult,
};
use ledger_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Sale lifecycle; the transition to `Finalized` is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalePhase {
    Open,
    Finalized,
}

/// The three fixed exchange rates, one per sale tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierRates {
    pub rate_one: u64,
    pub rate_two: u64,
    pub rate_three: u64,
}

impl TierRates {
    pub fn rate_for(&self, tier: Tier) -> u64 {
        match tier {
            Tier::One => self.rate_one,
            Tier::Two => self.rate_two,
            Tier::Three => self.rate_three,
        }
    }
}

/// Tiered-rate crowdsale with funder gating
///
/// Holds sale state and validation only; the cross-entity contribution
/// flow (whitelist check, token mint, fund forwarding) is driven by
/// [`crate::ledger::SaleLedger`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crowdsale {
    ownership: Ownership,
    rates: TierRates,
    /// Address receiving raised funds
    beneficiary: Address,
    /// Immutable reference to the token instance
    token_contract: Address,
    /// Funder gate; zero until injected
    whitelist_contract: Address,
    schedule: SaleSchedule,
    wei_raised: Amount,
    phase: SalePhase,
}

impl Crowdsale {
    pub fn new(
        owner: Address,
        rates: TierRates,
        beneficiary: Address,
        token_contract: Address,
        schedule: SaleSchedule,
    ) -> Self {
        Self {
            ownership: Ownership::new(owner),
            rates,
            beneficiary,
            token_contract,
            whitelist_contract: Address::zero(),
            schedule,
            wei_raised: Amount::zero(),
            phase: SalePhase::Open,
        }
    }

    // --- read accessors ---

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn token_contract(&self) -> Address {
        self.token_contract
    }

    pub fn whitelist_contract(&self) -> Address {
        self.whitelist_contract
    }

    pub fn rate_one(&self) -> u64 {
        self.rates.rate_one
    }

    pub fn rate_two(&self) -> u64 {
        self.rates.rate_two
    }

    pub fn rate_three(&self) -> u64 {
        self.rates.rate_three
    }

    pub fn schedule(&self) -> &SaleSchedule {
        &self.schedule
    }

    pub fn wei_raised(&self) -> &Amount {
        &self.wei_raised
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == SalePhase::Finalized
    }

    // --- administration ---

    /// Inject or update the whitelist gate; owner-only
    pub fn set_whitelist_contract(&mut self, caller: Address, whitelist: Address) -> SaleResult<()> {
        self.ownership.require_owner(&caller)?;
        self.whitelist_contract = whitelist;
        tracing::info!("Crowdsale whitelist gate set to {}", whitelist);
        Ok(())
    }

    /// Close the sale permanently; owner-only
    pub fn finalize(&mut self, caller: Address) -> SaleResult<()> {
        self.ownership.require_owner(&caller)?;
        if self.phase == SalePhase::Finalized {
            return Err(SaleError::SaleFinalized);
        }
        self.phase = SalePhase::Finalized;
        tracing::info!("Crowdsale finalized; wei raised: {}", self.wei_raised);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> SaleResult<()> {
        self.ownership.transfer(&caller, new_owner)
    }

    // --- contribution validation ---

    /// Exchange rate active at `now`
    pub fn rate_at(&self, now: Timestamp) -> SaleResult<u64> {
        let tier = self.schedule.tier_at(now).ok_or(SaleError::SaleNotOpen)?;
        Ok(self.rates.rate_for(tier))
    }

    /// Validation run before any contribution side effect
    pub fn ensure_accepting(&self) -> SaleResult<()> {
        if self.phase == SalePhase::Finalized {
            return Err(SaleError::SaleFinalized);
        }
        if self.whitelist_contract.is_zero() {
            return Err(SaleError::WhitelistNotSet);
        }
        Ok(())
    }

    /// Account for an accepted payment
    pub fn record_contribution(&mut self, value: &Amount) -> SaleResult<()> {
        self.wei_raised = self
            .wei_raised
            .checked_add(value)
            .ok_or(SaleError::AmountOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: TierRates = TierRates {
        rate_one: 100,
        rate_two: 200,
        rate_three: 300,
    };

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn new_crowdsale() -> Crowdsale {
        let schedule = SaleSchedule::new(100, 200, 300, 400).unwrap();
        Crowdsale::new(addr(1), RATES, addr(4), addr(30), schedule)
    }

    #[test]
    fn test_expected_crowdsale_parameters() {
        let crowd = new_crowdsale();

        assert_eq!(crowd.owner(), addr(1));
        assert!(crowd.whitelist_contract().is_zero());
        assert_eq!(crowd.token_contract(), addr(30));
        assert_eq!(crowd.beneficiary(), addr(4));
        assert_eq!(crowd.rate_one(), 100);
        assert_eq!(crowd.rate_two(), 200);
        assert_eq!(crowd.rate_three(), 300);
        assert!(crowd.wei_raised().is_zero());
        assert!(!crowd.is_finalized());
    }

    #[test]
    fn test_whitelist_injection() {
        let mut crowd = new_crowdsale();

        assert!(crowd.set_whitelist_contract(addr(3), addr(40)).is_err());
        assert!(crowd.whitelist_contract().is_zero());

        crowd.set_whitelist_contract(addr(1), addr(40)).unwrap();
        assert_eq!(crowd.whitelist_contract(), addr(40));
    }

    #[test]
    fn test_ownership_transfer() {
        let mut crowd = new_crowdsale();

        crowd.transfer_ownership(addr(1), addr(3)).unwrap();
        assert_eq!(crowd.owner(), addr(3));

        assert!(crowd.transfer_ownership(addr(1), addr(1)).is_err());
    }

    #[test]
    fn test_finalize_is_owner_gated_and_one_way() {
        let mut crowd = new_crowdsale();

        assert!(crowd.finalize(addr(2)).is_err());
        assert!(!crowd.is_finalized());

        crowd.finalize(addr(1)).unwrap();
        assert!(crowd.is_finalized());
        assert!(matches!(crowd.finalize(addr(1)), Err(SaleError::SaleFinalized)));

        assert!(matches!(
            crowd.ensure_accepting(),
            Err(SaleError::SaleFinalized)
        ));
    }

    #[test]
    fn test_accepting_requires_whitelist_gate() {
        let mut crowd = new_crowdsale();

        assert!(matches!(
            crowd.ensure_accepting(),
            Err(SaleError::WhitelistNotSet)
        ));

        crowd.set_whitelist_contract(addr(1), addr(40)).unwrap();
        assert!(crowd.ensure_accepting().is_ok());
    }

    #[test]
    fn test_rate_follows_schedule() {
        let crowd = new_crowdsale();

        assert_eq!(crowd.rate_at(150).unwrap(), 100);
        assert_eq!(crowd.rate_at(250).unwrap(), 200);
        assert_eq!(crowd.rate_at(350).unwrap(), 300);
        assert!(matches!(crowd.rate_at(50), Err(SaleError::SaleNotOpen)));
        assert!(matches!(crowd.rate_at(400), Err(SaleError::SaleNotOpen)));
    }
}
