//! RiskShield - liquidity pool risk scoring engine
//! Fixed-point pricing math, impermanent loss estimation and an owner-gated
//! per-pool risk registry

pub mod math;
pub mod report;
pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use domain::pricing::{calculate_price_impact, estimate_impermanent_loss, SwapQuote};
pub use domain::risk::{calculate_impermanent_loss_risk, PoolRiskProfile, PoolRiskRegistry, RiskScorer};
pub use shared::errors::{AppError, RiskError};
pub use shared::types::{Address, PoolId};
