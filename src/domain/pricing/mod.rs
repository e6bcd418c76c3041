//! Pricing domain - stateless calculators over pool reserves and price moves

mod impermanent_loss;
mod price_impact;

pub use impermanent_loss::{estimate_impermanent_loss, estimate_impermanent_loss_scaled};
pub use price_impact::{calculate_price_impact, quote_swap};

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::math::SCALE;

/// Constant-product swap quote. Prices and impact are scaled by 10^18.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in: U256,
    pub amount_out: U256,
    /// Output per unit of input before the trade
    pub spot_price: U256,
    /// Output per unit of input actually received
    pub execution_price: U256,
    /// `(spot - execution) / spot`
    pub price_impact: U256,
}

impl SwapQuote {
    /// Price impact in basis points, rounded down.
    pub fn price_impact_bps(&self) -> u64 {
        (self.price_impact * U256::from(10_000u64) / SCALE).low_u64()
    }
}
