//! Utility functions and helpers

use ethers_core::utils::{format_units, parse_units, ParseUnits};
use primitive_types::U256;

use crate::shared::errors::AppError;

const DECIMALS: u32 = 18;

/// Parse a decimal token amount ("1.5", "200000") into a 10^18-scaled integer
pub fn parse_scaled(input: &str) -> Result<U256, AppError> {
    match parse_units(input.trim(), DECIMALS) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AppError::ParseError(format!("amount must not be negative: {}", input))),
        Err(e) => Err(AppError::ParseError(format!("invalid amount {}: {}", input, e))),
    }
}

/// Format a 10^18-scaled integer as a decimal string with `precision` places
pub fn format_scaled(value: U256, precision: usize) -> String {
    let full = match format_units(value, DECIMALS) {
        Ok(full) => full,
        Err(_) => return value.to_string(),
    };
    let (whole, frac) = full.split_once('.').unwrap_or((full.as_str(), ""));
    let precision = precision.min(frac.len());
    if precision == 0 {
        whole.to_string()
    } else {
        format!("{}.{}", whole, &frac[..precision])
    }
}

/// Format a 10^18-scaled fraction as a percentage
pub fn format_percent(fraction: U256, precision: usize) -> String {
    format!("{}%", format_scaled(fraction * U256::from(100u64), precision))
}
