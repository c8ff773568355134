use super::{exp, factorial, ln, Number, Precision};
use crate::error::EvalError;
use log::trace;

/// Largest magnitude accepted by [`gamma`].
const GAMMA_LIMIT: i64 = 100_000;

/// Euler's gamma function.
///
/// Positive integers go through [`factorial`]. Other arguments are moved into
/// `[1, 2)` with `Γ(x + 1) = x Γ(x)` and evaluated there by [`gamma_reduced`].
pub fn gamma(x: &Number, precision: Precision) -> Result<Number, EvalError> {
    if x.abs() > Number::from_i64(GAMMA_LIMIT, precision) {
        return Err(EvalError::domain(
            "gamma",
            format!("argument magnitude exceeds {}", GAMMA_LIMIT),
        ));
    }
    if x.is_integer() {
        if x.is_negative() || x.is_zero() {
            return Err(EvalError::domain(
                "gamma",
                "argument must not be a non-positive integer",
            ));
        }
        let work = precision.with_guard(8);
        return factorial(&x.sub(&Number::one(work), work), precision);
    }

    // 17 bits cover the integer part of anything below the limit.
    let work = precision.with_guard(64 + 17);
    let one = Number::one(work);
    let two = Number::from_i64(2, work);
    let mut z = x.normalize(work);
    let mut factor = Number::one(work);
    while z >= two {
        z = z.sub(&one, work);
        factor = factor.mul(&z, work);
    }
    while z < one {
        factor = factor.quotient(&z, work);
        z = z.add(&one, work);
    }

    let reduced = gamma_reduced(&z, work)?;
    Ok(reduced.mul(&factor, work).normalize(precision))
}

/// `Γ(z)` for `1 <= z < 2` as `N^z e^-N sum N^k / (z (z+1) ... (z+k))`.
///
/// The sum is the incomplete integral up to `N`; the part beyond `N` is below
/// `N^z e^-N`, so `N` grows with the precision.
fn gamma_reduced(z: &Number, work: Precision) -> Result<Number, EvalError> {
    let bits = work.bits() as f64;
    let cutoff = (bits * std::f64::consts::LN_2 + 2.0 * bits.ln() + 20.0).ceil() as u64;
    let inner = work.with_guard(64 + 64 - cutoff.leading_zeros() as usize);
    let n = Number::from_u64(cutoff, inner);

    let tolerance = inner.epsilon();
    let mut term = Number::one(inner).quotient(z, inner);
    let mut sum = term.clone();
    let mut k = 1u64;
    loop {
        let denominator = z.add(&Number::from_u64(k, inner), inner);
        term = term.mul(&n, inner).quotient(&denominator, inner);
        sum = sum.add(&term, inner);
        if k > cutoff && term < sum.mul(&tolerance, inner) {
            break;
        }
        k += 1;
    }
    trace!("gamma series with cutoff {} summed {} terms", cutoff, k);

    let scale = exp(&z.mul(&ln(&n, inner)?, inner).sub(&n, inner), inner)?;
    Ok(sum.mul(&scale, inner).normalize(work))
}
