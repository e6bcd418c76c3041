//! Owner-gated store of the latest risk profile per pool

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{scoring::MAX_SCORE, PoolRiskProfile, PoolStatus, RiskScorer, RiskUpdated, SubScores};
use crate::shared::clock::Clock;
use crate::shared::errors::RiskError;
use crate::shared::types::{Address, PoolId};

const EVENT_CAPACITY: usize = 64;

/// Serializable copy of every stored profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub profiles: Vec<PoolRiskProfile>,
}

/// Maps pool ids to their last-written profile.
///
/// Only the owner fixed at construction may write. Entries are created on
/// the first write and afterwards only overwritten.
pub struct PoolRiskRegistry {
    owner: Address,
    scorer: RiskScorer,
    clock: Arc<dyn Clock>,
    profiles: HashMap<PoolId, PoolRiskProfile>,
    events: broadcast::Sender<RiskUpdated>,
}

impl PoolRiskRegistry {
    pub fn new(owner: Address, scorer: RiskScorer, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            owner,
            scorer,
            clock,
            profiles: HashMap::new(),
            events,
        }
    }

    /// Rebuild a registry from a snapshot. Fails without loading anything if
    /// any stored field is out of range or a pool appears twice.
    pub fn restore(
        owner: Address,
        scorer: RiskScorer,
        clock: Arc<dyn Clock>,
        snapshot: RegistrySnapshot,
    ) -> Result<Self, RiskError> {
        for profile in &snapshot.profiles {
            profile.validate()?;
        }

        let mut profiles = HashMap::with_capacity(snapshot.profiles.len());
        for profile in snapshot.profiles {
            if profiles.insert(profile.pool_id, profile).is_some() {
                return Err(RiskError::CorruptSnapshot(format!(
                    "pool {} appears more than once",
                    profile.pool_id
                )));
            }
        }

        let mut registry = Self::new(owner, scorer, clock);
        registry.profiles = profiles;

        info!("Restored {} pool risk profiles", registry.profiles.len());
        Ok(registry)
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Receive a `RiskUpdated` for every write made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RiskUpdated> {
        self.events.subscribe()
    }

    pub fn calculate_impermanent_loss_risk(&self, price_change_percent: i64) -> u8 {
        self.scorer.calculate_impermanent_loss_risk(price_change_percent)
    }

    /// Score a pool and store the result.
    pub fn update_pool_risk(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        volatility_risk: u64,
        liquidity_risk: u64,
        contract_risk: u64,
        price_change_percent: i64,
    ) -> Result<PoolRiskProfile, RiskError> {
        let profile = self.stage_pool_risk(
            caller,
            pool_id,
            volatility_risk,
            liquidity_risk,
            contract_risk,
            price_change_percent,
        )?;
        self.commit(profile);
        Ok(profile)
    }

    /// Check and score an update without storing it. Pair with
    /// [`commit`](Self::commit) once the profile has been persisted.
    pub fn stage_pool_risk(
        &self,
        caller: Address,
        pool_id: PoolId,
        volatility_risk: u64,
        liquidity_risk: u64,
        contract_risk: u64,
        price_change_percent: i64,
    ) -> Result<PoolRiskProfile, RiskError> {
        if caller != self.owner {
            warn!("Rejected risk update for {} from non-owner {}", pool_id, caller);
            return Err(RiskError::NotOwner);
        }

        let volatility = check_score("volatility_risk", volatility_risk)?;
        let liquidity = check_score("liquidity_risk", liquidity_risk)?;
        let contract = check_score("contract_risk", contract_risk)?;

        let scores = SubScores {
            impermanent_loss: self.scorer.calculate_impermanent_loss_risk(price_change_percent),
            volatility,
            liquidity,
            contract,
        };
        let risk_score = self.scorer.overall_score(&scores);

        // never move a pool's timestamp backwards
        let previous = self.profiles.get(&pool_id).map_or(0, |p| p.last_updated);
        let last_updated = self.clock.now().max(previous);

        Ok(PoolRiskProfile {
            pool_id,
            risk_score,
            impermanent_loss_risk: scores.impermanent_loss,
            volatility_risk: scores.volatility,
            liquidity_risk: scores.liquidity,
            contract_risk: scores.contract,
            last_updated,
        })
    }

    /// Store a staged profile and notify subscribers.
    pub fn commit(&mut self, profile: PoolRiskProfile) {
        self.profiles.insert(profile.pool_id, profile);

        info!(
            "Pool {} risk updated: score={} il={} vol={} liq={} contract={}",
            profile.pool_id,
            profile.risk_score,
            profile.impermanent_loss_risk,
            profile.volatility_risk,
            profile.liquidity_risk,
            profile.contract_risk
        );

        // no subscribers is fine
        let _ = self.events.send(RiskUpdated {
            pool_id: profile.pool_id,
            risk_score: profile.risk_score,
            timestamp: profile.last_updated,
        });
    }

    /// Stored profile, or the all-zero profile for a pool never written.
    pub fn get_pool_risk(&self, pool_id: &PoolId) -> PoolRiskProfile {
        match self.profiles.get(pool_id) {
            Some(profile) => *profile,
            None => {
                debug!("No risk profile for {}", pool_id);
                PoolRiskProfile::default()
            }
        }
    }

    pub fn status(&self, pool_id: &PoolId) -> PoolStatus {
        if self.profiles.contains_key(pool_id) {
            PoolStatus::Registered
        } else {
            PoolStatus::Unregistered
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut profiles: Vec<PoolRiskProfile> = self.profiles.values().copied().collect();
        profiles.sort_by_key(|p| p.pool_id);
        RegistrySnapshot { profiles }
    }

    /// Snapshot as it will look once `staged` is committed.
    pub fn snapshot_with(&self, staged: &PoolRiskProfile) -> RegistrySnapshot {
        let mut profiles: Vec<PoolRiskProfile> = self
            .profiles
            .values()
            .filter(|p| p.pool_id != staged.pool_id)
            .copied()
            .chain(std::iter::once(*staged))
            .collect();
        profiles.sort_by_key(|p| p.pool_id);
        RegistrySnapshot { profiles }
    }
}

fn check_score(field: &'static str, value: u64) -> Result<u8, RiskError> {
    if value > u64::from(MAX_SCORE) {
        return Err(RiskError::OutOfRange { field, value });
    }
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::clock::ManualClock;

    const START: u64 = 1_700_000_000;

    fn owner() -> Address {
        Address::new([0x01; 20])
    }

    fn stranger() -> Address {
        Address::new([0x02; 20])
    }

    fn pool() -> PoolId {
        "0x1234567890123456789012345678901234567890".parse().unwrap()
    }

    fn registry_with_clock() -> (PoolRiskRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let registry = PoolRiskRegistry::new(owner(), RiskScorer::default(), clock.clone());
        (registry, clock)
    }

    #[test]
    fn test_update_then_get_round_trips() {
        let (mut registry, _) = registry_with_clock();

        registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        let profile = registry.get_pool_risk(&pool());

        assert_eq!(profile.pool_id, pool());
        assert_eq!(profile.impermanent_loss_risk, 40);
        assert_eq!(registry.calculate_impermanent_loss_risk(25), 40);
        assert_eq!(profile.volatility_risk, 30);
        assert_eq!(profile.liquidity_risk, 20);
        assert_eq!(profile.contract_risk, 10);
        assert_eq!(profile.risk_score, 75);
        assert_eq!(profile.last_updated, START);
        assert_eq!(registry.status(&pool()), PoolStatus::Registered);
    }

    #[test]
    fn test_overall_score_recomputes_deterministically() {
        let (mut registry, _) = registry_with_clock();
        let scorer = RiskScorer::default();

        for (v, l, c, p) in [(0, 0, 0, 0), (100, 100, 100, 500), (55, 3, 71, -40), (9, 99, 1, 101)] {
            registry.update_pool_risk(owner(), pool(), v, l, c, p).unwrap();
            let profile = registry.get_pool_risk(&pool());
            assert_eq!(profile.volatility_risk as u64, v);
            assert_eq!(profile.liquidity_risk as u64, l);
            assert_eq!(profile.contract_risk as u64, c);
            assert_eq!(profile.risk_score, scorer.overall_score(&profile.sub_scores()));
        }
    }

    #[test]
    fn test_unregistered_pool_reads_as_zero_profile() {
        let (registry, _) = registry_with_clock();

        let profile = registry.get_pool_risk(&pool());
        assert_eq!(profile, PoolRiskProfile::default());
        assert_eq!(profile.last_updated, 0);
        assert_eq!(profile.pool_id, Address::ZERO);
        assert_eq!(registry.status(&pool()), PoolStatus::Unregistered);
    }

    #[test]
    fn test_non_owner_cannot_write() {
        let (mut registry, _) = registry_with_clock();
        registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        let before = registry.get_pool_risk(&pool());

        let result = registry.update_pool_risk(stranger(), pool(), 90, 90, 90, 200);
        assert_eq!(result, Err(RiskError::NotOwner));
        assert_eq!(registry.get_pool_risk(&pool()), before);

        let other: PoolId = Address::new([0x33; 20]);
        assert_eq!(
            registry.update_pool_risk(stranger(), other, 1, 1, 1, 1),
            Err(RiskError::NotOwner)
        );
        assert_eq!(registry.status(&other), PoolStatus::Unregistered);
    }

    #[test]
    fn test_out_of_range_sub_scores_rejected() {
        let (mut registry, _) = registry_with_clock();

        assert_eq!(
            registry.update_pool_risk(owner(), pool(), 101, 0, 0, 0),
            Err(RiskError::OutOfRange { field: "volatility_risk", value: 101 })
        );
        assert_eq!(
            registry.update_pool_risk(owner(), pool(), 0, 1_000, 0, 0),
            Err(RiskError::OutOfRange { field: "liquidity_risk", value: 1_000 })
        );
        assert_eq!(
            registry.update_pool_risk(owner(), pool(), 0, 0, u64::MAX, 0),
            Err(RiskError::OutOfRange { field: "contract_risk", value: u64::MAX })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_owner_check_precedes_validation() {
        let (mut registry, _) = registry_with_clock();
        assert_eq!(
            registry.update_pool_risk(stranger(), pool(), 500, 0, 0, 0),
            Err(RiskError::NotOwner)
        );
    }

    #[test]
    fn test_repeated_update_only_moves_timestamp_forward() {
        let (mut registry, clock) = registry_with_clock();

        let first = registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        clock.advance(120);
        let second = registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();

        assert_eq!(second.sub_scores(), first.sub_scores());
        assert_eq!(second.risk_score, first.risk_score);
        assert_eq!(second.last_updated, START + 120);

        // a clock that steps back must not rewind the stored timestamp
        clock.set(START - 1_000);
        let third = registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        assert_eq!(third.last_updated, START + 120);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_update_emits_notification() {
        let (mut registry, _) = registry_with_clock();
        let mut events = registry.subscribe();

        let profile = registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        let event = events.recv().await.unwrap();

        assert_eq!(
            event,
            RiskUpdated {
                pool_id: pool(),
                risk_score: profile.risk_score,
                timestamp: START,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_update_emits_nothing() {
        let (mut registry, _) = registry_with_clock();
        let mut events = registry.subscribe();

        let _ = registry.update_pool_risk(stranger(), pool(), 30, 20, 10, 25);
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut registry, clock) = registry_with_clock();
        registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        registry.update_pool_risk(owner(), Address::new([0x44; 20]), 70, 60, 50, -80).unwrap();

        let snapshot = registry.snapshot();
        let restored =
            PoolRiskRegistry::restore(owner(), RiskScorer::default(), clock, snapshot.clone()).unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.get_pool_risk(&pool()), registry.get_pool_risk(&pool()));
    }

    #[tokio::test]
    async fn test_staged_update_is_invisible_until_commit() {
        let (mut registry, _) = registry_with_clock();
        let mut events = registry.subscribe();

        let staged = registry.stage_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        assert_eq!(staged.risk_score, 75);
        assert_eq!(registry.status(&pool()), PoolStatus::Unregistered);
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
        assert_eq!(registry.snapshot_with(&staged).profiles, vec![staged]);

        registry.commit(staged);
        assert_eq!(registry.get_pool_risk(&pool()), staged);
        assert_eq!(events.recv().await.unwrap().risk_score, 75);
    }

    #[test]
    fn test_snapshot_with_replaces_existing_entry() {
        let (mut registry, clock) = registry_with_clock();
        registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        registry.update_pool_risk(owner(), Address::new([0x44; 20]), 70, 60, 50, -80).unwrap();

        clock.advance(60);
        let staged = registry.stage_pool_risk(owner(), pool(), 90, 90, 90, 200).unwrap();
        let snapshot = registry.snapshot_with(&staged);

        assert_eq!(snapshot.profiles.len(), 2);
        assert!(snapshot.profiles.contains(&staged));
        assert_eq!(registry.snapshot().profiles.len(), 2);
        assert_ne!(registry.get_pool_risk(&pool()), staged);
    }

    #[test]
    fn test_restore_rejects_duplicate_pool() {
        let (mut registry, clock) = registry_with_clock();
        let first = registry.update_pool_risk(owner(), pool(), 30, 20, 10, 25).unwrap();
        let second = PoolRiskProfile {
            risk_score: 10,
            ..first
        };

        let result = PoolRiskRegistry::restore(
            owner(),
            RiskScorer::default(),
            clock,
            RegistrySnapshot { profiles: vec![first, second] },
        );
        assert!(matches!(result, Err(RiskError::CorruptSnapshot(_))));
    }

    #[test]
    fn test_restore_rejects_corrupt_profile() {
        let corrupt = PoolRiskProfile {
            pool_id: pool(),
            risk_score: 101,
            ..PoolRiskProfile::default()
        };
        let result = PoolRiskRegistry::restore(
            owner(),
            RiskScorer::default(),
            Arc::new(ManualClock::new(START)),
            RegistrySnapshot { profiles: vec![corrupt] },
        );
        assert!(matches!(result, Err(RiskError::OutOfRange { field: "risk_score", .. })));
    }
}
