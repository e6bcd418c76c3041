//! Impermanent loss for a 50/50 two-asset pool
//!
//! For a relative price move `r = 1 + p/100` the value of the LP position
//! against simply holding is `2*sqrt(r) / (1 + r)`; the loss is one minus that.

use primitive_types::U256;

use crate::math::{checked_add, mul_div, sqrt_scaled, HUNDRED, SCALE};
use crate::shared::errors::RiskError;

/// Estimated loss as a fraction scaled by 10^18.
pub fn estimate_impermanent_loss_scaled(price_change_percent: i64) -> Result<U256, RiskError> {
    if price_change_percent <= -100 {
        return Err(RiskError::InvalidPriceChange(price_change_percent));
    }

    // > 0 after the check above, and fits u64 for every i64 input
    let ratio_percent = (100i128 + price_change_percent as i128) as u64;
    let ratio = mul_div(U256::from(ratio_percent), SCALE, HUNDRED)?;

    let root = sqrt_scaled(ratio);
    let lp_over_hold = mul_div(root, SCALE * U256::from(2u64), checked_add(SCALE, ratio)?)?;

    Ok(SCALE.saturating_sub(lp_over_hold))
}

/// Estimated loss as a whole percentage in 0..=100, rounded down.
pub fn estimate_impermanent_loss(price_change_percent: i64) -> Result<u64, RiskError> {
    let loss = estimate_impermanent_loss_scaled(price_change_percent)?;
    Ok(mul_div(loss, HUNDRED, SCALE)?.low_u64())
}
