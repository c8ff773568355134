//! Arbitrary-precision numeric kernel.
//!
//! [`Number`] wraps an `astro_float::BigFloat`; only the primitive operations
//! are delegated to it. Powers, exponentials, logarithms and trigonometric
//! functions are series expansions built on top of those primitives in the
//! submodules.

mod decimal;
mod exponential;
mod gamma;
mod power;
mod trigonometric;

pub use exponential::{euler, exp, ln};
pub use gamma::gamma;
pub use power::{factorial, power, powi};
pub use trigonometric::{acos, asin, atan, cos, pi, sin, tan};

use crate::error::EvalError;
use astro_float::{BigFloat, RoundingMode};
use log::warn;
use std::f64::consts::LOG10_2;
use std::fmt;

/// Significand width and rounding mode shared by every kernel operation.
#[derive(Debug, Clone, Copy)]
pub struct Precision {
    bits: usize,
    rounding: RoundingMode,
}

impl Precision {
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            rounding: RoundingMode::ToEven,
        }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Same rounding, `extra` more significand bits.
    pub fn with_guard(&self, extra: usize) -> Self {
        Self {
            bits: self.bits + extra,
            rounding: self.rounding,
        }
    }

    /// Number of decimal digits this precision can represent reliably.
    pub fn decimal_digits(&self) -> usize {
        ((self.bits as f64 * LOG10_2).floor() as usize)
            .saturating_sub(1)
            .max(1)
    }

    /// Exact `2^exponent`.
    pub fn power_of_two(&self, exponent: i64) -> Number {
        power::pow2(exponent, *self)
    }

    /// `2^-bits`, the convergence threshold of every kernel series.
    pub fn epsilon(&self) -> Number {
        self.power_of_two(-(self.bits as i64))
    }
}

/// An arbitrary-precision binary floating-point value.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct Number(BigFloat);

impl Number {
    pub fn zero(precision: Precision) -> Self {
        Self::from_i64(0, precision)
    }

    pub fn one(precision: Precision) -> Self {
        Self::from_i64(1, precision)
    }

    pub fn from_i64(value: i64, precision: Precision) -> Self {
        Number(BigFloat::from_i64(value, precision.bits))
    }

    pub fn from_u64(value: u64, precision: Precision) -> Self {
        Number(BigFloat::from_u64(value, precision.bits))
    }

    /// Exact binary value of `value`; `None` for NaN and infinities.
    pub fn from_f64(value: f64, precision: Precision) -> Option<Self> {
        value
            .is_finite()
            .then(|| Number(BigFloat::from_f64(value, precision.bits)))
    }

    pub fn as_big_float(&self) -> &BigFloat {
        &self.0
    }

    /// Significand bits this value carries, `None` for NaN and infinities.
    pub fn precision(&self) -> Option<usize> {
        self.0.precision()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_negative()
    }

    pub fn is_finite(&self) -> bool {
        !self.0.is_nan() && !self.0.is_inf()
    }

    /// `e` such that `2^(e-1) <= |self| < 2^e`; `None` for zero.
    pub fn binary_exponent(&self) -> Option<i64> {
        if self.is_zero() {
            return None;
        }
        self.0.exponent().map(i64::from)
    }

    pub fn add(&self, other: &Number, precision: Precision) -> Number {
        Number(self.0.add(&other.0, precision.bits, precision.rounding))
    }

    pub fn sub(&self, other: &Number, precision: Precision) -> Number {
        Number(self.0.sub(&other.0, precision.bits, precision.rounding))
    }

    pub fn mul(&self, other: &Number, precision: Precision) -> Number {
        Number(self.0.mul(&other.0, precision.bits, precision.rounding))
    }

    pub fn div(&self, other: &Number, precision: Precision) -> Result<Number, EvalError> {
        if other.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Ok(self.quotient(other, precision))
    }

    /// Division by a divisor the caller knows to be non-zero.
    pub(crate) fn quotient(&self, other: &Number, precision: Precision) -> Number {
        Number(self.0.div(&other.0, precision.bits, precision.rounding))
    }

    pub fn neg(&self) -> Number {
        Number(self.0.neg())
    }

    pub fn abs(&self) -> Number {
        Number(self.0.abs())
    }

    pub fn sqrt(&self, precision: Precision) -> Result<Number, EvalError> {
        if self.is_negative() {
            return Err(EvalError::domain("sqrt", "argument must not be negative"));
        }
        if self.is_zero() {
            return Ok(Number::zero(precision));
        }
        Ok(Number(self.0.sqrt(precision.bits, precision.rounding)))
    }

    /// Rounds to `precision`.
    ///
    /// Resizing the mantissa fails only when it cannot be allocated; the
    /// value is then returned at its current, wider precision, which still
    /// holds the same number.
    pub fn normalize(&self, precision: Precision) -> Number {
        let mut value = self.0.clone();
        match value.set_precision(precision.bits, precision.rounding) {
            Ok(()) => Number(value),
            Err(err) => {
                warn!(
                    "Keeping {:?} bits, rounding to {} failed: {:?}",
                    self.precision(),
                    precision.bits,
                    err
                );
                self.clone()
            }
        }
    }
}

impl From<BigFloat> for Number {
    fn from(value: BigFloat) -> Self {
        Number(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.precision().unwrap_or(crate::config::MIN_PRECISION);
        let precision = Precision::new(bits);
        write!(f, "{}", self.to_decimal_string(precision.decimal_digits()))
    }
}
