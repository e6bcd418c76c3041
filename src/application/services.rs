//! Application services and use cases

use primitive_types::U256;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::pricing::{estimate_impermanent_loss, estimate_impermanent_loss_scaled, quote_swap};
use crate::domain::risk::{PoolRiskProfile, PoolRiskRegistry, RiskScorer};
use crate::infrastructure::SnapshotStore;
use crate::report::{ImpermanentLossReport, PoolRiskReport, PriceImpactReport};
use crate::shared::clock::Clock;
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{Address, PoolId};

/// Application service wiring the registry to its persistent snapshot
pub struct RiskService {
    registry: PoolRiskRegistry,
    store: SnapshotStore,
}

impl RiskService {
    /// Build the registry from config and restore any saved profiles
    pub fn open(config: &EngineConfig, store: SnapshotStore, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let scorer = config.scoring.build_scorer()?;
        let snapshot = store.load()?;
        let registry = PoolRiskRegistry::restore(config.owner, scorer, clock, snapshot)?;

        info!("Risk registry ready (owner {}, {} pools)", registry.owner(), registry.len());
        Ok(Self { registry, store })
    }

    pub fn registry(&self) -> &PoolRiskRegistry {
        &self.registry
    }

    /// Score a pool, persist the registry with the new profile, then store
    /// it in memory and wait for the update notification. A failed save
    /// leaves the registry untouched.
    pub async fn update_pool(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        volatility_risk: u64,
        liquidity_risk: u64,
        contract_risk: u64,
        price_change_percent: i64,
    ) -> Result<PoolRiskProfile, AppError> {
        let mut events = self.registry.subscribe();

        let profile = self.registry.stage_pool_risk(
            caller,
            pool_id,
            volatility_risk,
            liquidity_risk,
            contract_risk,
            price_change_percent,
        )?;
        self.store.save(&self.registry.snapshot_with(&profile))?;
        self.registry.commit(profile);

        match events.recv().await {
            Ok(event) => info!(
                "RiskUpdated: pool={} score={} at {}",
                event.pool_id, event.risk_score, event.timestamp
            ),
            Err(e) => warn!("Risk update notification lost: {}", e),
        }

        Ok(profile)
    }

    pub fn pool_report(&self, pool_id: &PoolId) -> PoolRiskReport {
        let status = self.registry.status(pool_id);
        PoolRiskReport::new(*pool_id, status, self.registry.get_pool_risk(pool_id))
    }

    pub fn impermanent_loss_report(&self, price_change_percent: i64) -> Result<ImpermanentLossReport, AppError> {
        impermanent_loss_report(self.registry.scorer(), price_change_percent)
    }
}

/// Estimate impermanent loss and its risk tier. Needs only the scorer.
pub fn impermanent_loss_report(
    scorer: &RiskScorer,
    price_change_percent: i64,
) -> Result<ImpermanentLossReport, AppError> {
    Ok(ImpermanentLossReport {
        price_change_percent,
        estimated_loss_percent: estimate_impermanent_loss(price_change_percent)?,
        estimated_loss_scaled: estimate_impermanent_loss_scaled(price_change_percent)?,
        impermanent_loss_risk: scorer.calculate_impermanent_loss_risk(price_change_percent),
    })
}

/// Quote a constant-product swap. Needs no registry.
pub fn price_impact_report(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<PriceImpactReport, AppError> {
    let quote = quote_swap(amount_in, reserve_in, reserve_out)?;
    Ok(PriceImpactReport::new(quote))
}
