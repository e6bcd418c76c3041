//! Price impact against a constant-product pool

use primitive_types::U256;
use tracing::debug;

use super::SwapQuote;
use crate::math::{checked_add, mul_div, SCALE};
use crate::shared::errors::RiskError;

/// Quote a swap of `amount_in` against `reserve_in`/`reserve_out` using
/// `reserve_in * reserve_out = k`.
pub fn quote_swap(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<SwapQuote, RiskError> {
    if amount_in.is_zero() {
        return Err(RiskError::InvalidAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(RiskError::InvalidReserves);
    }

    let new_reserve_in = checked_add(reserve_in, amount_in)?;
    // reserve_out - reserve_in * reserve_out / new_reserve_in, rounded toward the pool
    let amount_out = mul_div(reserve_out, amount_in, new_reserve_in)?;

    let spot_price = mul_div(reserve_out, SCALE, reserve_in)?;
    let execution_price = mul_div(amount_out, SCALE, amount_in)?;
    // (spot - exec) / spot reduces to amount_in / new_reserve_in on x*y = k.
    // Evaluated directly so truncated prices never leak into the impact.
    let price_impact = mul_div(amount_in, SCALE, new_reserve_in)?;

    debug!(
        "Quoted swap: in={} out={} spot={} exec={} impact={}",
        amount_in, amount_out, spot_price, execution_price, price_impact
    );

    Ok(SwapQuote {
        amount_in,
        amount_out,
        spot_price,
        execution_price,
        price_impact,
    })
}

/// Price impact of a trade as a fraction scaled by 10^18 (10^16 = 1%).
pub fn calculate_price_impact(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, RiskError> {
    quote_swap(amount_in, reserve_in, reserve_out).map(|quote| quote.price_impact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::to_scaled;

    #[test]
    fn test_price_impact_is_positive_for_eth_usdc_trade() {
        let impact = calculate_price_impact(to_scaled(1), to_scaled(100), to_scaled(200_000)).unwrap();
        assert!(impact > U256::zero());
    }

    #[test]
    fn test_quote_swap_values() {
        let quote = quote_swap(to_scaled(1), to_scaled(100), to_scaled(200_000)).unwrap();

        assert_eq!(quote.spot_price, to_scaled(2_000));
        // 200000 * 1 / 101 = 1980.19...
        assert_eq!(quote.amount_out / SCALE, U256::from(1_980));
        assert!(quote.execution_price < quote.spot_price);
        // 1 - 1980.198/2000 = 0.990%
        assert_eq!(quote.price_impact_bps(), 99);
    }

    #[test]
    fn test_larger_trade_has_larger_impact() {
        let small = calculate_price_impact(to_scaled(1), to_scaled(100), to_scaled(200_000)).unwrap();
        let large = calculate_price_impact(to_scaled(10), to_scaled(100), to_scaled(200_000)).unwrap();
        assert!(large > small);
    }

    #[test]
    fn test_price_impact_on_dust_amounts() {
        // selling 1 into a 1/1 pool halves the execution price
        let impact = calculate_price_impact(U256::one(), U256::one(), U256::one()).unwrap();
        assert_eq!(impact, SCALE / U256::from(2));
    }

    #[test]
    fn test_price_impact_exact_when_spot_truncates() {
        // doubling reserve_in leaves exactly 25% impact
        let impact = calculate_price_impact(to_scaled(1), to_scaled(3), to_scaled(1)).unwrap();
        assert_eq!(impact, SCALE / U256::from(4));

        // spot price of 1 wei per 2e18 truncates to zero; impact is still defined
        let quote = quote_swap(to_scaled(1), to_scaled(2), U256::one()).unwrap();
        assert_eq!(quote.spot_price, U256::zero());
        assert_eq!(quote.price_impact, U256::from(333_333_333_333_333_333u64));
    }

    #[test]
    fn test_price_impact_rejects_bad_inputs() {
        assert_eq!(
            calculate_price_impact(U256::zero(), to_scaled(100), to_scaled(100)),
            Err(RiskError::InvalidAmount)
        );
        assert_eq!(
            calculate_price_impact(to_scaled(1), U256::zero(), to_scaled(100)),
            Err(RiskError::InvalidReserves)
        );
        assert_eq!(
            calculate_price_impact(to_scaled(1), to_scaled(100), U256::zero()),
            Err(RiskError::InvalidReserves)
        );
    }

    #[test]
    fn test_price_impact_overflow_is_reported() {
        assert_eq!(
            calculate_price_impact(U256::MAX, U256::MAX, to_scaled(1)),
            Err(RiskError::ArithmeticOverflow)
        );
    }
}
