//! Checked arithmetic helpers - overflow surfaces as an error, never a wrap

use crate::error::{MirrorError, MirrorResult};

/// Fixed-point scale of every reward accumulator.
pub const ACC_SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Add u128, naming the quantity on overflow
pub fn add_u128(a: u128, b: u128, what: &'static str) -> MirrorResult<u128> {
    a.checked_add(b).ok_or(MirrorError::ArithmeticOverflow(what))
}

/// Subtract u128, naming the quantity on underflow
pub fn sub_u128(a: u128, b: u128, what: &'static str) -> MirrorResult<u128> {
    a.checked_sub(b).ok_or(MirrorError::ArithmeticOverflow(what))
}

/// Multiply u128, naming the quantity on overflow
pub fn mul_u128(a: u128, b: u128, what: &'static str) -> MirrorResult<u128> {
    a.checked_mul(b).ok_or(MirrorError::ArithmeticOverflow(what))
}

/// `a * b / d` with a checked product; a zero divisor is an error
pub fn mul_div_u128(a: u128, b: u128, d: u128, what: &'static str) -> MirrorResult<u128> {
    mul_u128(a, b, what)?
        .checked_div(d)
        .ok_or(MirrorError::ArithmeticOverflow(what))
}

/// Narrow to u64 the way the ledger does before storing
pub fn to_u64(x: u128, what: &'static str) -> MirrorResult<u64> {
    u64::try_from(x).map_err(|_| MirrorError::ArithmeticOverflow(what))
}

/// Apply basis points: `amount * bps / 10_000`
pub fn apply_bps(amount: u128, bps: u64, what: &'static str) -> MirrorResult<u128> {
    mul_div_u128(amount, bps as u128, BPS_DENOMINATOR as u128, what)
}

/// Seconds from `from` to `to`, zero when `to` is not later
pub fn elapsed_secs(from: i64, to: i64) -> u64 {
    if to > from {
        to.abs_diff(from)
    } else {
        0
    }
}
