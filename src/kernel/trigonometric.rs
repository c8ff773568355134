use super::{Number, Precision};
use crate::error::EvalError;

/// π by Machin's formula `16 atan(1/5) - 4 atan(1/239)`.
pub fn pi(precision: Precision) -> Number {
    let work = precision.with_guard(32);
    let a = arctan_inverse(5, work).mul(&Number::from_i64(16, work), work);
    let b = arctan_inverse(239, work).mul(&Number::from_i64(4, work), work);
    a.sub(&b, work).normalize(precision)
}

/// `atan(1/n)` by its alternating Taylor series.
fn arctan_inverse(n: u64, work: Precision) -> Number {
    let tolerance = work.epsilon();
    let n_squared = Number::from_u64(n * n, work);
    let mut power = Number::one(work).quotient(&Number::from_u64(n, work), work);
    let mut sum = power.clone();
    let mut k = 1u64;
    loop {
        power = power.quotient(&n_squared, work);
        let term = power.quotient(&Number::from_u64(2 * k + 1, work), work);
        sum = if k % 2 == 1 {
            sum.sub(&term, work)
        } else {
            sum.add(&term, work)
        };
        if term < tolerance {
            break;
        }
        k += 1;
    }
    sum
}

/// Working precision for an angle: large arguments lose their leading bits
/// to the reduction.
fn angle_precision(x: &Number, precision: Precision) -> Precision {
    let exponent = x.binary_exponent().unwrap_or(0).max(0) as usize;
    precision.with_guard(64 + exponent)
}

/// Maps `x` into `[-π, π]`.
fn reduce_angle(x: &Number, work: Precision) -> Number {
    let pi = pi(work);
    if x.abs() <= pi {
        return x.clone();
    }
    let two_pi = pi.mul(&Number::from_i64(2, work), work);
    let turns = x.quotient(&two_pi, work).trunc(work);
    let mut reduced = x.sub(&turns.mul(&two_pi, work), work);
    if reduced > pi {
        reduced = reduced.sub(&two_pi, work);
    } else if reduced < pi.neg() {
        reduced = reduced.add(&two_pi, work);
    }
    reduced
}

fn sine_series(r: &Number, work: Precision) -> Number {
    if r.is_zero() {
        return Number::zero(work);
    }
    let tolerance = work.epsilon();
    let r_squared = r.mul(r, work);
    let mut term = r.clone();
    let mut sum = r.clone();
    let mut n = 1u64;
    loop {
        let divisor = Number::from_u64((2 * n) * (2 * n + 1), work);
        term = term.mul(&r_squared, work).quotient(&divisor, work).neg();
        sum = sum.add(&term, work);
        if term.abs() < tolerance {
            break;
        }
        n += 1;
    }
    sum
}

fn cosine_series(r: &Number, work: Precision) -> Number {
    let tolerance = work.epsilon();
    let r_squared = r.mul(r, work);
    let mut term = Number::one(work);
    let mut sum = Number::one(work);
    if r.is_zero() {
        return sum;
    }
    let mut n = 1u64;
    loop {
        let divisor = Number::from_u64((2 * n - 1) * (2 * n), work);
        term = term.mul(&r_squared, work).quotient(&divisor, work).neg();
        sum = sum.add(&term, work);
        if term.abs() < tolerance {
            break;
        }
        n += 1;
    }
    sum
}

pub fn sin(x: &Number, precision: Precision) -> Number {
    let work = angle_precision(x, precision);
    sine_series(&reduce_angle(x, work), work).normalize(precision)
}

pub fn cos(x: &Number, precision: Precision) -> Number {
    let work = angle_precision(x, precision);
    cosine_series(&reduce_angle(x, work), work).normalize(precision)
}

/// `sin x / cos x`. Arguments whose cosine vanishes at this precision are
/// poles.
pub fn tan(x: &Number, precision: Precision) -> Result<Number, EvalError> {
    let work = angle_precision(x, precision);
    let reduced = reduce_angle(x, work);
    let cosine = cosine_series(&reduced, work);
    let pole = precision.power_of_two(8 - precision.bits() as i64);
    if cosine.abs() < pole {
        return Err(EvalError::domain("tan", "argument is an odd multiple of pi/2"));
    }
    let sine = sine_series(&reduced, work);
    Ok(sine.quotient(&cosine, work).normalize(precision))
}

/// Halvings applied by [`atan`] before summing its series.
const ATAN_HALVINGS: usize = 8;

/// Arctangent, in `(-π/2, π/2)`.
///
/// Arguments above 1 use `atan x = π/2 - atan(1/x)`. The rest is halved with
/// `atan x = 2 atan(x / (1 + sqrt(1 + x^2)))` before the Taylor series.
pub fn atan(x: &Number, precision: Precision) -> Number {
    if x.is_zero() {
        return Number::zero(precision);
    }
    if x.is_negative() {
        return atan(&x.neg(), precision).neg();
    }
    let work = precision.with_guard(64 + ATAN_HALVINGS);
    let one = Number::one(work);
    if x.abs() > one {
        let half_pi = pi(work).quotient(&Number::from_i64(2, work), work);
        let inverse = one.quotient(x, work);
        return half_pi
            .sub(&arctan_reduced(&inverse, work), work)
            .normalize(precision);
    }
    arctan_reduced(x, work).normalize(precision)
}

/// `atan x` for `0 < x <= 1`.
fn arctan_reduced(x: &Number, work: Precision) -> Number {
    let one = Number::one(work);
    let mut r = x.clone();
    for _ in 0..ATAN_HALVINGS {
        // 1 + r^2 >= 1, so the root exists.
        let root = one
            .add(&r.mul(&r, work), work)
            .sqrt(work)
            .unwrap_or_else(|_| one.clone());
        r = r.quotient(&one.add(&root, work), work);
    }

    let tolerance = work.epsilon();
    let r_squared = r.mul(&r, work);
    let mut power = r.clone();
    let mut sum = r;
    let mut k = 1u64;
    loop {
        power = power.mul(&r_squared, work).neg();
        let term = power.quotient(&Number::from_u64(2 * k + 1, work), work);
        sum = sum.add(&term, work);
        if term.abs() < tolerance {
            break;
        }
        k += 1;
    }
    sum.mul(&Number::from_u64(1 << ATAN_HALVINGS, work), work)
}

fn check_unit_interval(function: &str, x: &Number, precision: Precision) -> Result<(), EvalError> {
    if x.abs() > Number::one(precision) {
        return Err(EvalError::domain(function, "argument must lie in [-1, 1]"));
    }
    Ok(())
}

/// Arcsine, in `[-π/2, π/2]`, as `atan(x / sqrt((1 - x)(1 + x)))`.
pub fn asin(x: &Number, precision: Precision) -> Result<Number, EvalError> {
    check_unit_interval("asin", x, precision)?;
    let work = precision.with_guard(64);
    let one = Number::one(work);
    let cosine = one.sub(x, work).mul(&one.add(x, work), work).sqrt(work)?;
    if cosine.is_zero() {
        let half_pi = pi(work).quotient(&Number::from_i64(2, work), work);
        let signed = if x.is_negative() { half_pi.neg() } else { half_pi };
        return Ok(signed.normalize(precision));
    }
    Ok(atan(&x.quotient(&cosine, work), work).normalize(precision))
}

/// Arccosine, in `[0, π]`, as `2 atan(sqrt((1 - x) / (1 + x)))`.
pub fn acos(x: &Number, precision: Precision) -> Result<Number, EvalError> {
    check_unit_interval("acos", x, precision)?;
    let work = precision.with_guard(64);
    let one = Number::one(work);
    let denominator = one.add(x, work);
    if denominator.is_zero() {
        return Ok(pi(precision));
    }
    let ratio = one.sub(x, work).quotient(&denominator, work).sqrt(work)?;
    let half = atan(&ratio, work);
    Ok(half.mul(&Number::from_i64(2, work), work).normalize(precision))
}
