//! Page configuration: which module to load and which forms to show.
//!
//! The default configuration is compiled in from `default_scenarios.toml`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::module::{ModuleRef, Operation};

const DEFAULT_SCENARIOS: &str = include_str!("default_scenarios.toml");

/// One form on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    pub operation: Operation,
    pub sample_input: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub module_ref: ModuleRef,
    /// Listed as `[[scenario]]` tables, in page order.
    #[serde(rename = "scenario", default)]
    pub scenarios: Vec<ScenarioDescriptor>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("configuration lists no scenarios")]
    NoScenarios,
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(source)?;
        if config.scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        Ok(config)
    }

    /// The built-in scenario list: five expression evaluations followed by
    /// six reactions to balance.
    pub fn default_config() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_SCENARIOS)
    }

    /// Scenarios bound to `operation`, in page order.
    pub fn scenarios_for(&self, operation: Operation) -> impl Iterator<Item = &ScenarioDescriptor> {
        self.scenarios
            .iter()
            .filter(move |scenario| scenario.operation == operation)
    }
}
