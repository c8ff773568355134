use super::power::pow2;
use super::{Number, Precision};
use crate::error::EvalError;

/// Beyond `2^OVERFLOW_EXPONENT` the result of `exp` leaves the exponent range.
const OVERFLOW_EXPONENT: i64 = 30;

/// Natural exponential.
///
/// The argument is halved until it is below `2^-8`, the Taylor series is
/// summed there and the result squared back once per halving.
pub fn exp(x: &Number, precision: Precision) -> Result<Number, EvalError> {
    if x.is_zero() {
        return Ok(Number::one(precision));
    }
    let exponent = x.binary_exponent().unwrap_or(0);
    if exponent > OVERFLOW_EXPONENT {
        if x.is_negative() {
            return Ok(Number::zero(precision));
        }
        return Err(EvalError::domain("exp", "result is too large"));
    }
    if x.is_negative() {
        let work = precision.with_guard(8);
        let positive = exp(&x.neg(), work)?;
        return Ok(Number::one(work)
            .quotient(&positive, work)
            .normalize(precision));
    }

    let halvings = (exponent + 8).max(0) as usize;
    let work = precision.with_guard(64 + halvings);
    let reduced = x.mul(&pow2(-(halvings as i64), work), work);

    let tolerance = work.epsilon();
    let mut term = Number::one(work);
    let mut sum = Number::one(work);
    let mut k = 1u64;
    loop {
        term = term
            .mul(&reduced, work)
            .quotient(&Number::from_u64(k, work), work);
        sum = sum.add(&term, work);
        if term.abs() < tolerance {
            break;
        }
        k += 1;
    }

    for _ in 0..halvings {
        sum = sum.mul(&sum, work);
    }
    Ok(sum.normalize(precision))
}

/// Euler's number as `sum 1/k!`.
pub fn euler(precision: Precision) -> Number {
    let work = precision.with_guard(32);
    let tolerance = work.epsilon();
    let mut term = Number::one(work);
    let mut sum = Number::one(work);
    let mut k = 1u64;
    while term >= tolerance {
        term = term.quotient(&Number::from_u64(k, work), work);
        sum = sum.add(&term, work);
        k += 1;
    }
    sum.normalize(precision)
}

/// Natural logarithm of a positive argument.
///
/// Writes `x = m * 2^e` with `m` in `[0.75, 1.5)` so that
/// `ln x = 2 atanh((m - 1) / (m + 1)) + e ln 2`.
pub fn ln(x: &Number, precision: Precision) -> Result<Number, EvalError> {
    if x.is_zero() || x.is_negative() {
        return Err(EvalError::domain("ln", "argument must be positive"));
    }
    let mut exponent = x.binary_exponent().unwrap_or(0);
    let exponent_bits = 64 - exponent.unsigned_abs().leading_zeros() as usize;
    let work = precision.with_guard(64 + exponent_bits);

    let mut mantissa = x.mul(&pow2(-exponent, work), work);
    if mantissa < Number::from_f64(0.75, work).unwrap_or_else(|| Number::one(work)) {
        mantissa = mantissa.mul(&Number::from_i64(2, work), work);
        exponent -= 1;
    }

    let mut result = log_series(&mantissa, work);
    if exponent != 0 {
        let ln2 = log_series(&Number::from_i64(2, work), work);
        result = result.add(&ln2.mul(&Number::from_i64(exponent, work), work), work);
    }
    Ok(result.normalize(precision))
}

/// `2 atanh(t)` with `t = (m - 1) / (m + 1)`, which equals `ln m`.
fn log_series(m: &Number, work: Precision) -> Number {
    let one = Number::one(work);
    let t = m.sub(&one, work).quotient(&m.add(&one, work), work);
    if t.is_zero() {
        return Number::zero(work);
    }

    let tolerance = work.epsilon();
    let t_squared = t.mul(&t, work);
    let mut power = t.clone();
    let mut sum = t;
    let mut k = 1u64;
    loop {
        power = power.mul(&t_squared, work);
        let term = power.quotient(&Number::from_u64(2 * k + 1, work), work);
        sum = sum.add(&term, work);
        if term.abs() < tolerance {
            break;
        }
        k += 1;
    }
    sum.mul(&Number::from_i64(2, work), work)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precision() -> Precision {
        Precision::new(256)
    }

    #[test]
    fn test_exp_one() {
        let e = exp(&Number::one(precision()), precision()).unwrap();
        assert_eq!(e.to_decimal_string(30), "2.71828182845904523536028747135");
    }

    #[test]
    fn test_euler_matches_exp() {
        let p = precision();
        let e = euler(p);
        let reference = exp(&Number::one(p), p).unwrap();
        assert!(e.sub(&reference, p).abs() < p.power_of_two(-250));
    }

    #[test]
    fn test_exp_zero_and_negative() {
        let p = precision();
        assert_eq!(exp(&Number::zero(p), p).unwrap(), Number::one(p));
        let product = exp(&Number::from_i64(3, p), p)
            .unwrap()
            .mul(&exp(&Number::from_i64(-3, p), p).unwrap(), p);
        assert_eq!(product.to_decimal_string(60), "1");
    }

    #[test]
    fn test_exp_overflow() {
        let p = precision();
        let huge = p.power_of_two(40);
        assert!(matches!(exp(&huge, p), Err(EvalError::DomainError { .. })));
        assert_eq!(exp(&huge.neg(), p).unwrap(), Number::zero(p));
    }

    #[test]
    fn test_ln_two() {
        let p = precision();
        let ln2 = ln(&Number::from_i64(2, p), p).unwrap();
        assert_eq!(ln2.to_decimal_string(30), "0.693147180559945309417232121458");
    }

    #[test]
    fn test_ln_one_is_zero() {
        let p = precision();
        assert!(ln(&Number::one(p), p).unwrap().is_zero());
    }

    #[test]
    fn test_ln_inverts_exp() {
        let p = precision();
        for value in [0.001, 0.5, 1.75, 10.0, 12345.678] {
            let x = Number::from_f64(value, p).unwrap();
            let back = exp(&ln(&x, p).unwrap(), p).unwrap();
            let error = back.sub(&x, p).abs();
            assert!(error <= p.power_of_two(-200).mul(&x, p));
        }
    }

    #[test]
    fn test_ln_domain() {
        let p = precision();
        assert!(ln(&Number::zero(p), p).is_err());
        assert!(ln(&Number::from_i64(-1, p), p).is_err());
    }
}
