// src/report.rs
use chrono::{DateTime, TimeZone, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::domain::pricing::SwapQuote;
use crate::domain::risk::{PoolRiskProfile, PoolStatus, RiskLevel};
use crate::shared::types::PoolId;
use crate::shared::utils::{format_percent, format_scaled};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRiskReport {
    pub pool_id: PoolId,
    pub status: PoolStatus,
    pub profile: PoolRiskProfile,
    pub risk_level: RiskLevel,
    pub last_updated: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl PoolRiskReport {
    pub fn new(pool_id: PoolId, status: PoolStatus, profile: PoolRiskProfile) -> Self {
        let last_updated = match status {
            PoolStatus::Registered => i64::try_from(profile.last_updated)
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            PoolStatus::Unregistered => None,
        };

        Self {
            pool_id,
            status,
            risk_level: profile.risk_level(),
            profile,
            last_updated,
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self) -> String {
        if self.status == PoolStatus::Unregistered {
            return format!("Pool {}: not registered", self.pool_id);
        }

        let p = &self.profile;
        let updated = self
            .last_updated
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "Pool {}\n  Risk score:      {}/100 ({})\n  Impermanent loss: {}\n  Volatility:      {}\n  Liquidity:       {}\n  Contract:        {}\n  Last updated:    {}",
            self.pool_id,
            p.risk_score,
            self.risk_level.as_str(),
            p.impermanent_loss_risk,
            p.volatility_risk,
            p.liquidity_risk,
            p.contract_risk,
            updated
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceImpactReport {
    pub quote: SwapQuote,
    pub price_impact_bps: u64,
}

impl PriceImpactReport {
    pub fn new(quote: SwapQuote) -> Self {
        Self {
            price_impact_bps: quote.price_impact_bps(),
            quote,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self) -> String {
        let q = &self.quote;
        format!(
            "Amount in:       {}\n  Amount out:      {}\n  Spot price:      {}\n  Execution price: {}\n  Price impact:    {} ({} bps)",
            format_scaled(q.amount_in, 6),
            format_scaled(q.amount_out, 6),
            format_scaled(q.spot_price, 6),
            format_scaled(q.execution_price, 6),
            format_percent(q.price_impact, 4),
            self.price_impact_bps
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpermanentLossReport {
    pub price_change_percent: i64,
    pub estimated_loss_percent: u64,
    pub estimated_loss_scaled: U256,
    pub impermanent_loss_risk: u8,
}

impl ImpermanentLossReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self) -> String {
        format!(
            "Price change:    {}%\n  Estimated loss:  {}\n  IL risk tier:    {}/100",
            self.price_change_percent,
            format_percent(self.estimated_loss_scaled, 4),
            self.impermanent_loss_risk
        )
    }
}
