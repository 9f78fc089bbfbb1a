// token-sale/src/ledger.rs

use crate::{
    crowdsale::{Crowdsale, TierRates},
    schedule::SaleSchedule,
    token::Token,
    whitelist::Whitelist,
    SaleError, SaleResult,
};
use ledger_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Constructor arguments for a full deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployParams {
    /// Maximum token supply in base units
    pub cap: Amount,
    pub rates: TierRates,
    /// Address receiving raised funds
    pub beneficiary: Address,
    pub schedule: SaleSchedule,
}

/// The three wired entities plus the raised-funds record
///
/// Stands in for the globally ordered ledger of the execution
/// environment: every mutating call validates completely before applying,
/// and callers serialize access by taking `&mut self` (wrap in a lock for
/// shared use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLedger {
    token_address: Address,
    whitelist_address: Address,
    crowdsale_address: Address,
    token: Token,
    whitelist: Whitelist,
    crowdsale: Crowdsale,
    /// Payments forwarded toward the beneficiary
    funds: HashMap<Address, Amount>,
}

impl SaleLedger {
    /// Run the full deployment sequence and cross-wire the entities
    ///
    /// Order mirrors the original migration: whitelist, token with its
    /// cap, crowdsale with rates/beneficiary/token address, then
    /// `token.set_crowdsale` and `crowdsale.set_whitelist_contract`.
    pub fn deploy(deployer: Address, params: DeployParams) -> SaleResult<Self> {
        let whitelist_address = Address::derive(&deployer, 0);
        let token_address = Address::derive(&deployer, 1);
        let crowdsale_address = Address::derive(&deployer, 2);

        let whitelist = Whitelist::new(deployer);
        let token = Token::new(deployer, params.cap);
        let crowdsale = Crowdsale::new(
            deployer,
            params.rates,
            params.beneficiary,
            token_address,
            params.schedule,
        );

        let mut ledger = Self {
            token_address,
            whitelist_address,
            crowdsale_address,
            token,
            whitelist,
            crowdsale,
            funds: HashMap::new(),
        };

        ledger.token.set_crowdsale(deployer, crowdsale_address)?;
        ledger
            .crowdsale
            .set_whitelist_contract(deployer, whitelist_address)?;

        tracing::info!(
            "Deployed whitelist {} token {} crowdsale {}",
            whitelist_address,
            token_address,
            crowdsale_address
        );
        Ok(ledger)
    }

    // --- entity access ---

    pub fn token_address(&self) -> Address {
        self.token_address
    }

    pub fn whitelist_address(&self) -> Address {
        self.whitelist_address
    }

    pub fn crowdsale_address(&self) -> Address {
        self.crowdsale_address
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn whitelist_mut(&mut self) -> &mut Whitelist {
        &mut self.whitelist
    }

    pub fn crowdsale(&self) -> &Crowdsale {
        &self.crowdsale
    }

    pub fn crowdsale_mut(&mut self) -> &mut Crowdsale {
        &mut self.crowdsale
    }

    /// Funds forwarded to `addr` so far
    pub fn funds_of(&self, addr: &Address) -> Amount {
        self.funds.get(addr).cloned().unwrap_or_else(Amount::zero)
    }

    // --- the payment flow ---

    /// Accept a payment from `funder` at time `now`
    ///
    /// Validates the sale state, the whitelist gate and the schedule
    /// before any side effect; on success mints `value * rate` tokens to
    /// the funder, forwards `value` to the beneficiary and bumps
    /// `wei_raised`. Returns the minted token amount.
    pub fn contribute(
        &mut self,
        funder: Address,
        value: Amount,
        now: Timestamp,
    ) -> SaleResult<Amount> {
        self.crowdsale.ensure_accepting()?;
        if !self.whitelist.is_whitelisted(&funder) {
            return Err(SaleError::NotWhitelisted(funder));
        }
        let rate = self.crowdsale.rate_at(now)?;
        let tokens = value
            .checked_mul_rate(rate)
            .ok_or(SaleError::AmountOverflow)?;

        // Mint validates the cap; past this point nothing can fail
        self.token
            .mint(self.crowdsale_address, funder, tokens.clone())?;
        self.crowdsale.record_contribution(&value)?;

        let beneficiary = self.crowdsale.beneficiary();
        let forwarded = self.funds.entry(beneficiary).or_insert_with(Amount::zero);
        *forwarded = forwarded
            .checked_add(&value)
            .ok_or(SaleError::AmountOverflow)?;

        tracing::info!(
            "Accepted {} from {} at rate {}; minted {}",
            value,
            funder,
            rate,
            tokens
        );
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    const RATES: TierRates = TierRates {
        rate_one: 100,
        rate_two: 200,
        rate_three: 300,
    };

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn params() -> DeployParams {
        DeployParams {
            cap: Amount::from_tokens(1000),
            rates: RATES,
            beneficiary: addr(4),
            schedule: SaleSchedule::new(100, 200, 300, 400).unwrap(),
        }
    }

    fn deployed() -> SaleLedger {
        SaleLedger::deploy(addr(1), params()).unwrap()
    }

    #[test]
    fn test_deployment_wiring() {
        let ledger = deployed();

        assert_eq!(ledger.token().owner(), addr(1));
        assert_eq!(ledger.whitelist().owner(), addr(1));
        assert_eq!(ledger.crowdsale().owner(), addr(1));

        assert_eq!(ledger.token().crowdsale(), ledger.crowdsale_address());
        assert_eq!(
            ledger.crowdsale().whitelist_contract(),
            ledger.whitelist_address()
        );
        assert_eq!(ledger.crowdsale().token_contract(), ledger.token_address());

        // The three derived addresses are distinct and non-zero
        assert_ne!(ledger.token_address(), ledger.whitelist_address());
        assert_ne!(ledger.token_address(), ledger.crowdsale_address());
        assert!(!ledger.token_address().is_zero());
    }

    #[test]
    fn test_contribution_rejected_while_gate_unset() {
        let crowd = Crowdsale::new(
            addr(1),
            RATES,
            addr(4),
            addr(30),
            SaleSchedule::new(100, 200, 300, 400).unwrap(),
        );
        // Whitelist never injected: every contribution path is closed,
        // the crowdsale owner included
        assert!(matches!(
            crowd.ensure_accepting(),
            Err(SaleError::WhitelistNotSet)
        ));
    }

    #[test]
    fn test_contribution_rejected_for_non_whitelisted() {
        let mut ledger = deployed();

        for funder in [addr(4), addr(1), addr(8)] {
            let err = ledger.contribute(funder, Amount::from_u64(1), 150);
            assert!(matches!(err, Err(SaleError::NotWhitelisted(_))));
        }
        assert!(ledger.crowdsale().wei_raised().is_zero());
        assert!(ledger.token().total_supply().is_zero());
        assert!(ledger.funds_of(&addr(4)).is_zero());
    }

    #[test]
    fn test_whitelisted_funders_fulfill() {
        let mut ledger = deployed();
        ledger
            .whitelist_mut()
            .whitelist(addr(1), &[addr(14), addr(17)])
            .unwrap();

        let minted_one = ledger.contribute(addr(14), Amount::from_u64(1), 150).unwrap();
        let minted_two = ledger.contribute(addr(17), Amount::from_u64(1), 250).unwrap();

        // Tier one rate, then tier two rate
        assert_eq!(minted_one, Amount::from_u64(100));
        assert_eq!(minted_two, Amount::from_u64(200));
        assert_eq!(ledger.token().balance_of(&addr(14)), Amount::from_u64(100));
        assert_eq!(ledger.token().balance_of(&addr(17)), Amount::from_u64(200));

        assert_eq!(ledger.crowdsale().wei_raised(), &Amount::from_u64(2));
        assert_eq!(ledger.funds_of(&addr(4)), Amount::from_u64(2));
    }

    #[test]
    fn test_contribution_outside_window_rejected() {
        let mut ledger = deployed();
        ledger.whitelist_mut().whitelist(addr(1), &[addr(14)]).unwrap();

        assert!(matches!(
            ledger.contribute(addr(14), Amount::from_u64(1), 50),
            Err(SaleError::SaleNotOpen)
        ));
        assert!(matches!(
            ledger.contribute(addr(14), Amount::from_u64(1), 400),
            Err(SaleError::SaleNotOpen)
        ));
        assert!(ledger.crowdsale().wei_raised().is_zero());
    }

    #[test]
    fn test_finalize_closes_contributions() {
        let mut ledger = deployed();
        ledger.whitelist_mut().whitelist(addr(1), &[addr(14)]).unwrap();

        ledger.crowdsale_mut().finalize(addr(1)).unwrap();

        let err = ledger.contribute(addr(14), Amount::from_u64(1), 150);
        assert!(matches!(err, Err(SaleError::SaleFinalized)));
        assert!(ledger.token().total_supply().is_zero());
    }

    #[test]
    fn test_rejected_contribution_changes_nothing() {
        let mut ledger = deployed();
        ledger.whitelist_mut().whitelist(addr(1), &[addr(14)]).unwrap();

        // Exhaust the cap so the mint itself fails
        let cap = ledger.token().cap().clone();
        ledger.token_mut().mint(addr(1), addr(9), cap).unwrap();
        let supply_before = ledger.token().total_supply().clone();

        let err = ledger.contribute(addr(14), Amount::from_u64(1), 150);
        assert!(matches!(err, Err(SaleError::CapExceeded { .. })));

        assert_eq!(ledger.token().total_supply(), &supply_before);
        assert!(ledger.crowdsale().wei_raised().is_zero());
        assert!(ledger.funds_of(&addr(4)).is_zero());
        assert!(ledger.token().balance_of(&addr(14)).is_zero());
    }

    #[test]
    fn test_renounced_owner_loses_every_gate() {
        let mut ledger = deployed();
        ledger.token_mut().renounce_ownership(addr(1)).unwrap();

        assert!(ledger.token().owner().is_zero());
        let err = ledger.token_mut().finish_minting(addr(1));
        assert!(matches!(
            err,
            Err(SaleError::Unauthorized { role: Role::Owner, .. })
        ));

        // The crowdsale keeps minting rights independently of ownership
        ledger.whitelist_mut().whitelist(addr(1), &[addr(14)]).unwrap();
        assert!(ledger.contribute(addr(14), Amount::from_u64(1), 150).is_ok());
    }
}
