use crate::error::EvalError;
use crate::functions::Registry;
use crate::kernel::{self, Number, Precision};
use sigma_macros::native_fn;

pub fn register(registry: &mut Registry) {
    registry.register_function("bbpTerm", bbp_term);
}

/// `k`-th term of the Bailey–Borwein–Plouffe series for π:
/// `16^-k (4/(8k+1) - 2/(8k+4) - 1/(8k+5) - 1/(8k+6))`.
#[native_fn(name = "bbpTerm")]
fn bbp_term(precision: Precision, k: Number) -> Result<Number, EvalError> {
    let work = precision.with_guard(16);
    let eight_k = k.mul(&Number::from_i64(8, work), work);
    let fraction = |numerator: i64, offset: i64| {
        let denominator = eight_k.add(&Number::from_i64(offset, work), work);
        Number::from_i64(numerator, work).div(&denominator, work)
    };

    let series = fraction(4, 1)?
        .sub(&fraction(2, 4)?, work)
        .sub(&fraction(1, 5)?, work)
        .sub(&fraction(1, 6)?, work);
    let scale = kernel::power(&Number::from_i64(16, work), &k.neg(), work)?;
    Ok(series.mul(&scale, work).normalize(precision))
}
