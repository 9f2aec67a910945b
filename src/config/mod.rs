//! Configuration management for StockTax
//!
//! Loads from optional TOML/YAML files + environment variables via .env

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fees::FeeSchedule;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub fees: FeesConfig,
    pub persistence: PersistenceConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    pub bind_addr: String,
    /// Allow any origin (frontend dev server runs on another port)
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    /// Broker commission as a fraction of gross
    pub broker_rate: Decimal,
    /// SEBON fee as a fraction of gross
    pub regulatory_rate: Decimal,
    /// Flat DP charge per trade
    pub depository_charge: Decimal,
    /// Capital gains tax as a fraction of profit
    pub cgt_rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Data directory
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Longest accepted stock symbol
    pub max_symbol_len: usize,
}

impl AppConfig {
    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            // Server defaults
            .set_default("server.bind_addr", "127.0.0.1:8000")?
            .set_default("server.cors_permissive", true)?
            // NEPSE fee schedule
            .set_default("fees.broker_rate", "0.0036")?
            .set_default("fees.regulatory_rate", "0.00015")?
            .set_default("fees.depository_charge", "25")?
            .set_default("fees.cgt_rate", "0.075")?
            // Persistence defaults
            .set_default("persistence.data_dir", "./data")?
            // Ledger defaults
            .set_default("ledger.max_symbol_len", 20)?;
        Ok(builder)
    }

    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (STOCKTAX__SECTION__KEY)
            .add_source(Environment::with_prefix("STOCKTAX").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn builtin() -> Result<Self> {
        Self::defaults()?
            .build()
            .context("Failed to build default configuration")?
            .try_deserialize()
            .context("Failed to deserialize default configuration")
    }

    /// Fee schedule for the calculator, rejecting negative rates
    pub fn fee_schedule(&self) -> Result<FeeSchedule> {
        let fees = &self.fees;
        for (name, value) in [
            ("fees.broker_rate", fees.broker_rate),
            ("fees.regulatory_rate", fees.regulatory_rate),
            ("fees.depository_charge", fees.depository_charge),
            ("fees.cgt_rate", fees.cgt_rate),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                bail!("{} must not be negative (got {})", name, value);
            }
        }

        Ok(FeeSchedule {
            broker_rate: fees.broker_rate,
            regulatory_rate: fees.regulatory_rate,
            depository_charge: fees.depository_charge,
            cgt_rate: fees.cgt_rate,
        })
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "bind={} data_dir={} broker={} sebon={} dp={} cgt={}",
            self.server.bind_addr,
            self.persistence.data_dir,
            self.fees.broker_rate,
            self.fees.regulatory_rate,
            self.fees.depository_charge,
            self.fees.cgt_rate
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builtin_defaults_match_nepse_schedule() {
        let config = AppConfig::builtin().unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.persistence.data_dir, "./data");
        assert_eq!(config.ledger.max_symbol_len, 20);
        assert_eq!(config.fee_schedule().unwrap(), FeeSchedule::default());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut config = AppConfig::builtin().unwrap();
        config.fees.cgt_rate = dec!(-0.01);
        let err = config.fee_schedule().unwrap_err();
        assert!(err.to_string().contains("fees.cgt_rate"), "{}", err);
    }

    #[test]
    fn overridden_rates_flow_into_schedule() {
        let mut config = AppConfig::builtin().unwrap();
        config.fees.depository_charge = dec!(0);
        config.fees.broker_rate = dec!(0.0027);
        let schedule = config.fee_schedule().unwrap();
        assert_eq!(schedule.depository_charge, Decimal::ZERO);
        assert_eq!(schedule.broker_rate, dec!(0.0027));
    }

    #[test]
    fn digest_lists_rates() {
        let config = AppConfig::builtin().unwrap();
        let digest = config.to_string();
        assert!(digest.contains("broker=0.0036"), "{}", digest);
        assert!(digest.contains("cgt=0.075"), "{}", digest);
    }
}
