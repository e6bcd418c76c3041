//! Risk domain - pool risk scoring and the per-pool profile registry

pub mod registry;
pub mod scoring;

pub use registry::{PoolRiskRegistry, RegistrySnapshot};
pub use scoring::{
    calculate_impermanent_loss_risk, RiskLevel, RiskScorer, RiskTier, RiskWeights, TierTable,
};

use serde::{Deserialize, Serialize};

use crate::shared::errors::RiskError;
use crate::shared::types::PoolId;

/// Latest risk assessment of one pool.
///
/// `risk_score` is the overall aggregate where higher means safer; the four
/// factor scores are risks, where higher means riskier. All lie in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolRiskProfile {
    pub pool_id: PoolId,
    pub risk_score: u8,
    pub impermanent_loss_risk: u8,
    pub volatility_risk: u8,
    pub liquidity_risk: u8,
    pub contract_risk: u8,
    /// Unix seconds; 0 if never written
    pub last_updated: u64,
}

impl PoolRiskProfile {
    pub fn sub_scores(&self) -> SubScores {
        SubScores {
            impermanent_loss: self.impermanent_loss_risk,
            volatility: self.volatility_risk,
            liquidity: self.liquidity_risk,
            contract: self.contract_risk,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    /// Reject any field outside 0..=100.
    pub fn validate(&self) -> Result<(), RiskError> {
        let fields = [
            ("risk_score", self.risk_score),
            ("impermanent_loss_risk", self.impermanent_loss_risk),
            ("volatility_risk", self.volatility_risk),
            ("liquidity_risk", self.liquidity_risk),
            ("contract_risk", self.contract_risk),
        ];
        for (field, value) in fields {
            if value > scoring::MAX_SCORE {
                return Err(RiskError::OutOfRange { field, value: u64::from(value) });
            }
        }
        Ok(())
    }
}

/// The four factor risks that feed the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubScores {
    pub impermanent_loss: u8,
    pub volatility: u8,
    pub liquidity: u8,
    pub contract: u8,
}

/// Whether a pool has ever been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    Unregistered,
    Registered,
}

/// Notification emitted after every successful profile write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskUpdated {
    pub pool_id: PoolId,
    pub risk_score: u8,
    pub timestamp: u64,
}
