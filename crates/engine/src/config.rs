use bankrules_core::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse engine config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Tolerance must not be negative: {0}")]
    NegativeTolerance(String),
}

/// Numeric tolerances used when checking split lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allowed distance of a percent split's total from 100.
    pub percent_tolerance: Decimal,
    /// Allowed distance of an amount split's total from the transaction amount,
    /// compared after both are rounded to cents.
    pub amount_tolerance: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percent_tolerance: Decimal::new(1, 2),
            amount_tolerance: Money::zero(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_content)?;
        config.check()?;
        Ok(config)
    }

    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        if self.percent_tolerance < Decimal::ZERO {
            return Err(ConfigError::NegativeTolerance(format!(
                "percent_tolerance = {}",
                self.percent_tolerance
            )));
        }
        if self.amount_tolerance.is_negative() {
            return Err(ConfigError::NegativeTolerance(format!(
                "amount_tolerance = {}",
                self.amount_tolerance.as_decimal()
            )));
        }
        Ok(())
    }
}
