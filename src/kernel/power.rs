use super::{exp, ln, Number, Precision};
use crate::error::EvalError;
use log::trace;

/// Largest `n` accepted by [`factorial`].
const FACTORIAL_LIMIT: u64 = 100_000;

/// Exact `2^exponent` by repeated squaring.
pub(crate) fn pow2(exponent: i64, precision: Precision) -> Number {
    let two = Number::from_i64(2, precision);
    let magnitude = unsigned_power(&two, exponent.unsigned_abs(), precision);
    if exponent < 0 {
        Number::one(precision).quotient(&magnitude, precision)
    } else {
        magnitude
    }
}

fn unsigned_power(base: &Number, mut exponent: u64, precision: Precision) -> Number {
    let mut result = Number::one(precision);
    let mut square = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.mul(&square, precision);
        }
        exponent >>= 1;
        if exponent > 0 {
            square = square.mul(&square, precision);
        }
    }
    result
}

/// `base^exponent` for an integer exponent.
pub fn powi(base: &Number, exponent: i64, precision: Precision) -> Result<Number, EvalError> {
    if exponent == 0 {
        return Ok(Number::one(precision));
    }
    if base.is_zero() {
        if exponent < 0 {
            return Err(EvalError::DivisionByZero);
        }
        return Ok(Number::zero(precision));
    }

    // Each squaring may lose one ulp, one guard bit per exponent bit covers it.
    let bit_length = 64 - exponent.unsigned_abs().leading_zeros() as usize;
    let work = precision.with_guard(64 + bit_length);
    // A negative exponent raises the reciprocal, so results that underflow
    // reach zero instead of overflowing first.
    let base = if exponent < 0 {
        Number::one(work).quotient(base, work)
    } else {
        base.clone()
    };
    let result = unsigned_power(&base, exponent.unsigned_abs(), work);
    if !result.is_finite() {
        return Err(EvalError::domain("pow", "result is too large"));
    }
    Ok(result.normalize(precision))
}

/// `base^exponent` for arbitrary real operands.
///
/// Integral exponents that fit an `i64` are computed by repeated squaring,
/// everything else as `exp(exponent * ln(base))`, which needs a positive base.
pub fn power(base: &Number, exponent: &Number, precision: Precision) -> Result<Number, EvalError> {
    if exponent.is_integer() {
        if let Some(n) = exponent.to_i64() {
            return powi(base, n, precision);
        }
    }
    if base.is_zero() {
        return if exponent.is_negative() {
            Err(EvalError::DivisionByZero)
        } else {
            Ok(Number::zero(precision))
        };
    }
    if base.is_negative() {
        return Err(EvalError::domain(
            "pow",
            "negative base requires an integer exponent",
        ));
    }

    trace!("pow via exp/ln with exponent {}", exponent);
    let work = precision.with_guard(64);
    let logarithm = ln(base, work)?;
    let result = exp(&exponent.mul(&logarithm, work), work)?;
    Ok(result.normalize(precision))
}

/// `n!` for a non-negative integral `n`.
pub fn factorial(value: &Number, precision: Precision) -> Result<Number, EvalError> {
    if value.is_negative() {
        return Err(EvalError::domain(
            "factorial",
            "argument must not be negative",
        ));
    }
    if !value.is_integer() {
        return Err(EvalError::domain("factorial", "argument must be an integer"));
    }
    let n = match value.to_u64() {
        Some(n) if n <= FACTORIAL_LIMIT => n,
        _ => {
            return Err(EvalError::domain(
                "factorial",
                format!("argument exceeds {}", FACTORIAL_LIMIT),
            ))
        }
    };

    let work = precision.with_guard(64);
    let mut result = Number::one(work);
    for k in 2..=n {
        result = result.mul(&Number::from_u64(k, work), work);
    }
    Ok(result.normalize(precision))
}
