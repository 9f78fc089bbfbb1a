// sale-node/src/config.rs
use ledger_types::Address;
use serde::{Deserialize, Serialize};
use token_sale::{DeployParams, SaleResult, SaleSchedule, TierRates};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Address performing the deployment and owning all three entities
    pub deployer: Address,
    pub token: TokenConfig,
    pub crowdsale: CrowdsaleConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Supply cap in whole tokens (scaled by 10^18 internally)
    pub cap_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdsaleConfig {
    pub rate_one: u64,
    pub rate_two: u64,
    pub rate_three: u64,
    pub beneficiary: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub opening: u64,
    pub tier_one_end: u64,
    pub tier_two_end: u64,
    pub closing: u64,
}

impl Default for SaleConfig {
    fn default() -> Self {
        // Parameters of the original deployment: rates 2/3/2, 100-token
        // cap; a 90-day window split into three 30-day tiers from now.
        let now = chrono::Utc::now().timestamp() as u64;
        const THIRTY_DAYS: u64 = 30 * 24 * 60 * 60;

        Self {
            deployer: Address::new([1u8; 20]),
            token: TokenConfig { cap_tokens: 100 },
            crowdsale: CrowdsaleConfig {
                rate_one: 2,
                rate_two: 3,
                rate_three: 2,
                beneficiary: Address::new([5u8; 20]),
            },
            schedule: ScheduleConfig {
                opening: now,
                tier_one_end: now + THIRTY_DAYS,
                tier_two_end: now + 2 * THIRTY_DAYS,
                closing: now + 3 * THIRTY_DAYS,
            },
        }
    }
}

impl SaleConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Translate into deployment parameters, validating the schedule
    pub fn to_params(&self) -> SaleResult<DeployParams> {
        let schedule = SaleSchedule::new(
            self.schedule.opening,
            self.schedule.tier_one_end,
            self.schedule.tier_two_end,
            self.schedule.closing,
        )?;
        Ok(DeployParams {
            cap: ledger_types::Amount::from_tokens(self.token.cap_tokens),
            rates: TierRates {
                rate_one: self.crowdsale.rate_one,
                rate_two: self.crowdsale.rate_two,
                rate_three: self.crowdsale.rate_three,
            },
            beneficiary: self.crowdsale.beneficiary,
            schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_deployable() {
        let config = SaleConfig::default();
        let params = config.to_params().unwrap();

        assert_eq!(params.rates.rate_one, 2);
        assert_eq!(params.rates.rate_two, 3);
        assert_eq!(params.rates.rate_three, 2);
        assert_eq!(params.cap, ledger_types::Amount::from_tokens(100));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SaleConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: SaleConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(back.deployer, config.deployer);
        assert_eq!(back.crowdsale.beneficiary, config.crowdsale.beneficiary);
        assert_eq!(back.schedule.closing, config.schedule.closing);
    }

    #[test]
    fn test_bad_schedule_rejected() {
        let mut config = SaleConfig::default();
        config.schedule.closing = config.schedule.opening;

        assert!(config.to_params().is_err());
    }
}
