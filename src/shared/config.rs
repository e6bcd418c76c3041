use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::risk::{RiskScorer, RiskWeights, TierTable};
use crate::shared::errors::AppError;
use crate::shared::types::Address;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "RiskShield.toml";

/// Scoring constants: impermanent-loss tier table and factor weights
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub tiers: TierTable,
    pub weights: RiskWeights,
}

impl ScoringConfig {
    pub fn build_scorer(&self) -> Result<RiskScorer, AppError> {
        RiskScorer::new(self.tiers.clone(), self.weights).map_err(AppError::from)
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only identity allowed to write risk profiles
    pub owner: Address,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl EngineConfig {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from RiskShield.toml
    pub fn load_config() -> Result<EngineConfig, AppError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<EngineConfig, AppError> {
        let config_content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::parse(&config_content)
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> Result<EngineConfig, AppError> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        // reject bad constants at load time rather than on first write
        config.scoring.build_scorer()?;
        Ok(config)
    }
}
