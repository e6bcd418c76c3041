//! Risk tiering and aggregation

use serde::{Deserialize, Serialize};

use super::SubScores;
use crate::shared::errors::RiskError;

/// Total of all factor weights, in basis points.
pub const WEIGHT_TOTAL_BPS: u32 = 10_000;

/// Highest value any score may take.
pub const MAX_SCORE: u8 = 100;

/// One band of the impermanent-loss tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTier {
    /// Upper edge of the band, inclusive, on `|price change %|`
    pub max_change_percent: u64,
    pub score: u8,
}

/// Maps a price-change magnitude onto a discrete impermanent-loss risk score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub bands: Vec<RiskTier>,
    /// Score for moves beyond the last band
    pub ceiling_score: u8,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            bands: vec![
                RiskTier { max_change_percent: 10, score: 20 },
                RiskTier { max_change_percent: 25, score: 40 },
                RiskTier { max_change_percent: 50, score: 60 },
                RiskTier { max_change_percent: 100, score: 80 },
            ],
            ceiling_score: 95,
        }
    }
}

impl TierTable {
    pub fn validate(&self) -> Result<(), RiskError> {
        for pair in self.bands.windows(2) {
            if pair[1].max_change_percent <= pair[0].max_change_percent {
                return Err(RiskError::InvalidConfig(format!(
                    "tier bounds must be strictly increasing ({} then {})",
                    pair[0].max_change_percent, pair[1].max_change_percent
                )));
            }
        }

        let scores = self.bands.iter().map(|b| b.score).chain(std::iter::once(self.ceiling_score));
        for score in scores {
            if score > MAX_SCORE {
                return Err(RiskError::InvalidConfig(format!("tier score {} exceeds 100", score)));
            }
        }

        Ok(())
    }

    /// Score a signed price change by its magnitude.
    pub fn score(&self, price_change_percent: i64) -> u8 {
        let magnitude = price_change_percent.unsigned_abs();
        self.bands
            .iter()
            .find(|band| magnitude <= band.max_change_percent)
            .map(|band| band.score)
            .unwrap_or(self.ceiling_score)
    }
}

/// Weights of the four risk factors, in basis points summing to 10 000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub impermanent_loss: u32,
    pub volatility: u32,
    pub liquidity: u32,
    pub contract: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            impermanent_loss: 2_500,
            volatility: 2_500,
            liquidity: 2_500,
            contract: 2_500,
        }
    }
}

impl RiskWeights {
    pub fn validate(&self) -> Result<(), RiskError> {
        let total = self
            .impermanent_loss
            .checked_add(self.volatility)
            .and_then(|t| t.checked_add(self.liquidity))
            .and_then(|t| t.checked_add(self.contract));

        match total {
            Some(WEIGHT_TOTAL_BPS) => Ok(()),
            _ => Err(RiskError::InvalidConfig(format!(
                "risk weights must sum to {} bps",
                WEIGHT_TOTAL_BPS
            ))),
        }
    }
}

/// Human-facing bucket for an overall score (higher score = safer pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(risk_score: u8) -> Self {
        match risk_score {
            80..=u8::MAX => RiskLevel::Low,
            60..=79 => RiskLevel::Medium,
            40..=59 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::VeryHigh => "Very High Risk",
        }
    }
}

/// Stateless scoring engine: IL tiering plus weighted aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskScorer {
    tiers: TierTable,
    weights: RiskWeights,
}

impl RiskScorer {
    pub fn new(tiers: TierTable, weights: RiskWeights) -> Result<Self, RiskError> {
        tiers.validate()?;
        weights.validate()?;
        Ok(Self { tiers, weights })
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    pub fn calculate_impermanent_loss_risk(&self, price_change_percent: i64) -> u8 {
        self.tiers.score(price_change_percent)
    }

    /// `100 - round(weighted mean of sub-risks)`, clamped to 0..=100.
    pub fn overall_score(&self, scores: &SubScores) -> u8 {
        let w = &self.weights;
        let weighted = u64::from(w.impermanent_loss) * u64::from(scores.impermanent_loss)
            + u64::from(w.volatility) * u64::from(scores.volatility)
            + u64::from(w.liquidity) * u64::from(scores.liquidity)
            + u64::from(w.contract) * u64::from(scores.contract);

        let total = u64::from(WEIGHT_TOTAL_BPS);
        let mean = (weighted + total / 2) / total;
        u64::from(MAX_SCORE).saturating_sub(mean) as u8
    }
}

/// Impermanent-loss tier under the default table.
pub fn calculate_impermanent_loss_risk(price_change_percent: i64) -> u8 {
    TierTable::default().score(price_change_percent)
}
