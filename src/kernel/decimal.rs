//! Conversions between [`Number`] and integers, `f64` and decimal text.
//!
//! All of them read the raw mantissa words: a finite non-zero value equals
//! `mantissa * 2^(exponent - width)` where `width` is the mantissa size in bits.

use super::{Number, Precision};
use crate::error::EvalError;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};
use std::f64::consts::LOG10_2;

struct RawParts {
    mantissa: BigUint,
    width: i64,
    exponent: i64,
    negative: bool,
}

impl RawParts {
    /// Power of two applied to the mantissa integer.
    fn shift(&self) -> i64 {
        self.exponent - self.width
    }
}

impl Number {
    fn raw_parts(&self) -> Option<RawParts> {
        if self.is_zero() || !self.is_finite() {
            return None;
        }
        let (words, _, sign, exponent, _) = self.as_big_float().as_raw_parts()?;
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        Some(RawParts {
            mantissa: BigUint::from_bytes_le(&bytes),
            width: bytes.len() as i64 * 8,
            exponent: exponent as i64,
            negative: sign.is_negative(),
        })
    }

    pub fn is_integer(&self) -> bool {
        if self.is_zero() {
            return true;
        }
        let Some(raw) = self.raw_parts() else {
            return false;
        };
        let fraction_bits = -raw.shift();
        if fraction_bits <= 0 {
            return true;
        }
        if raw.exponent <= 0 {
            return false;
        }
        raw.mantissa
            .trailing_zeros()
            .map_or(true, |zeros| zeros >= fraction_bits as u64)
    }

    /// Integer part, truncated toward zero. `None` for NaN and infinities.
    pub fn to_bigint(&self) -> Option<BigInt> {
        if self.is_zero() {
            return Some(BigInt::zero());
        }
        let raw = self.raw_parts()?;
        let shift = raw.shift();
        let magnitude = if shift >= 0 {
            raw.mantissa << (shift as u64)
        } else {
            raw.mantissa >> ((-shift) as u64)
        };
        let sign = if raw.negative { Sign::Minus } else { Sign::Plus };
        Some(BigInt::from_biguint(sign, magnitude))
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_bigint()?.to_i64()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.to_bigint()?.to_u64()
    }

    /// Converts an integer, rounding it to `precision` if it does not fit.
    pub fn from_bigint(value: &BigInt, precision: Precision) -> Number {
        let radix = precision.power_of_two(64);
        let (sign, digits) = value.to_u64_digits();
        let magnitude = digits.iter().rev().fold(Number::zero(precision), |acc, digit| {
            acc.mul(&radix, precision)
                .add(&Number::from_u64(*digit, precision), precision)
        });
        if sign == Sign::Minus {
            magnitude.neg()
        } else {
            magnitude
        }
    }

    /// Converts a plain decimal literal such as `"12"`, `"0.125"` or `".5"`.
    pub fn from_decimal(literal: &str, precision: Precision) -> Result<Number, EvalError> {
        let invalid = || EvalError::InvalidNumber(literal.to_string());
        let (integer, fraction) = literal.split_once('.').unwrap_or((literal, ""));
        let digits = format!("{}{}", integer, fraction);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let mantissa: BigInt = digits.parse().map_err(|_| invalid())?;

        let work = precision.with_guard(64);
        let value = Number::from_bigint(&mantissa, work);
        if fraction.is_empty() {
            return Ok(value.normalize(precision));
        }
        let scale = BigInt::from(10u32).pow(fraction.len() as u32);
        let divisor = Number::from_bigint(&scale, work);
        Ok(value.quotient(&divisor, work).normalize(precision))
    }

    /// Drops the fractional part.
    pub fn trunc(&self, precision: Precision) -> Number {
        match self.to_bigint() {
            Some(integer) => Number::from_bigint(&integer, precision),
            None => self.clone(),
        }
    }

    /// Nearest `f64`, truncating mantissa bits beyond the 64 most significant.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        if self.as_big_float().is_nan() {
            return f64::NAN;
        }
        if self.as_big_float().is_inf() {
            return if self.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
        }
        let Some(raw) = self.raw_parts() else {
            return f64::NAN;
        };
        let top = (&raw.mantissa >> ((raw.width - 64).max(0) as u64))
            .to_u64()
            .unwrap_or(u64::MAX);
        let scale = (raw.exponent - 64).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let magnitude = top as f64 * 2f64.powi(scale);
        if raw.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Positional decimal rendering with at most `significant` significant
    /// digits, rounded half up, trailing zeros removed. Never uses exponent
    /// notation.
    pub fn to_decimal_string(&self, significant: usize) -> String {
        if self.as_big_float().is_nan() {
            return "NaN".to_string();
        }
        if self.as_big_float().is_inf() {
            return if self.is_negative() { "-inf" } else { "inf" }.to_string();
        }
        let Some(raw) = self.raw_parts() else {
            return "0".to_string();
        };

        let integer_digits = (raw.exponent as f64 * LOG10_2).ceil() as i64;
        let fraction_digits = (significant as i64 - integer_digits).max(0) as u32;
        let scaled = &raw.mantissa * BigUint::from(10u32).pow(fraction_digits);
        let shift = raw.shift();
        let digits = if shift >= 0 {
            scaled << (shift as u64)
        } else {
            let k = (-shift) as u64;
            let half = BigUint::one() << (k - 1);
            (scaled + half) >> k
        };

        let digits = digits.to_string();
        let fraction_digits = fraction_digits as usize;
        let (integer, fraction) = if digits.len() > fraction_digits {
            let split = digits.len() - fraction_digits;
            (digits[..split].to_string(), digits[split..].to_string())
        } else {
            (
                "0".to_string(),
                format!("{}{}", "0".repeat(fraction_digits - digits.len()), digits),
            )
        };

        let fraction = fraction.trim_end_matches('0');
        let body = if fraction.is_empty() {
            integer
        } else {
            format!("{}.{}", integer, fraction)
        };
        if raw.negative && body != "0" {
            format!("-{}", body)
        } else {
            body
        }
    }
}
