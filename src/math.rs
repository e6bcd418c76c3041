// src/math.rs
//! Fixed-point arithmetic over 10^18-scaled integers.
//!
//! Every product is formed in a 512-bit intermediate before dividing, and the
//! square root is integer Newton iteration, so results are bit-identical on
//! every platform.

use primitive_types::{U256, U512};

use crate::shared::errors::RiskError;

/// 10^18, the unit of every scaled quantity.
pub const SCALE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// 100 as a `U256`, for percentage conversions.
pub const HUNDRED: U256 = U256([100, 0, 0, 0]);

/// Calculate `a * b / denom`, rounding down.
pub fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, RiskError> {
    if denom.is_zero() {
        return Err(RiskError::DivisionByZero);
    }

    let quotient = a.full_mul(b) / U512::from(denom);
    U256::try_from(quotient).map_err(|_| RiskError::ArithmeticOverflow)
}

/// Addition that reports overflow as a `RiskError`.
pub fn checked_add(a: U256, b: U256) -> Result<U256, RiskError> {
    a.checked_add(b).ok_or(RiskError::ArithmeticOverflow)
}

/// Floor of the square root of `n`.
pub fn isqrt(n: U512) -> U512 {
    if n.is_zero() {
        return n;
    }

    // 2^ceil(bits/2) is never below the root, so the iterates fall monotonically.
    let shift = (n.bits() + 1) / 2;
    let mut x = U512::one() << shift;
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root of a scaled value: `sqrt(x / SCALE) * SCALE`, rounded down.
pub fn sqrt_scaled(x: U256) -> U256 {
    let root = isqrt(x.full_mul(SCALE));
    // root < 2^256 because the radicand is below 2^512
    U256([root.0[0], root.0[1], root.0[2], root.0[3]])
}

/// Scale a plain integer up to fixed point.
pub fn to_scaled(value: u64) -> U256 {
    U256::from(value) * SCALE
}
