use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::rule::Rule;
use crate::runner::RuleEngine;
use crate::validate::{validate_rule, ValidationError};

#[derive(Debug, Error)]
pub enum RuleFileError {
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A stored rule set: engine settings plus the rules themselves.
///
/// ```toml
/// [engine]
/// percent_tolerance = "0.01"
///
/// [[rules]]
/// id = "sun-life"
/// name = "Sun Life premiums"
/// conditions = [{ field = "description", operator = "contains", value = "sun life" }]
/// actions = [{ action = "set_category", category_id = "cat-insurance" }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleFile {
    pub fn from_toml(toml_content: &str) -> Result<Self, RuleFileError> {
        let file: RuleFile = toml::from_str(toml_content)?;
        file.engine.check()?;
        Ok(file)
    }

    pub fn from_json(json_content: &str) -> Result<Self, RuleFileError> {
        let file: RuleFile = serde_json::from_str(json_content)?;
        file.engine.check()?;
        Ok(file)
    }

    /// Validation problems per rule, skipping rules without any.
    pub fn validate(&self) -> Vec<(&Rule, Vec<ValidationError>)> {
        self.rules
            .iter()
            .map(|rule| (rule, validate_rule(rule, &self.engine)))
            .filter(|(_, errors)| !errors.is_empty())
            .collect()
    }

    pub fn into_engine(self) -> RuleEngine {
        RuleEngine::new(self.rules, self.engine)
    }
}
