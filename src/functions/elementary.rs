use crate::error::EvalError;
use crate::functions::Registry;
use crate::kernel::{self, Number, Precision};
use sigma_macros::native_fn;

pub fn register(registry: &mut Registry) {
    registry.register_function("sin", sin);
    registry.register_function("cos", cos);
    registry.register_function("tan", tan);
    registry.register_function("asin", asin);
    registry.register_function("acos", acos);
    registry.register_function("atan", atan);
    registry.register_function("exp", exp);
    registry.register_function("ln", ln);
    registry.register_function("log", log);
    registry.register_function("log10", log10);
    registry.register_function("sqrt", sqrt);
    registry.register_function("cbrt", cbrt);
    registry.register_function("pow", pow);
    registry.register_function("abs", abs);
}

#[native_fn]
fn sin(precision: Precision, x: Number) -> Result<Number, EvalError> {
    Ok(kernel::sin(&x, precision))
}

#[native_fn]
fn cos(precision: Precision, x: Number) -> Result<Number, EvalError> {
    Ok(kernel::cos(&x, precision))
}

#[native_fn]
fn tan(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::tan(&x, precision)
}

#[native_fn]
fn asin(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::asin(&x, precision)
}

#[native_fn]
fn acos(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::acos(&x, precision)
}

#[native_fn]
fn atan(precision: Precision, x: Number) -> Result<Number, EvalError> {
    Ok(kernel::atan(&x, precision))
}

#[native_fn]
fn exp(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::exp(&x, precision)
}

#[native_fn]
fn ln(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::ln(&x, precision)
}

/// Natural logarithm.
#[native_fn]
fn log(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::ln(&x, precision)
}

#[native_fn]
fn log10(precision: Precision, x: Number) -> Result<Number, EvalError> {
    let work = precision.with_guard(16);
    let numerator = kernel::ln(&x, work)?;
    let ten = kernel::ln(&Number::from_i64(10, work), work)?;
    Ok(numerator.quotient(&ten, work).normalize(precision))
}

#[native_fn]
fn sqrt(precision: Precision, x: Number) -> Result<Number, EvalError> {
    x.sqrt(precision)
}

/// Real cube root; negative arguments give negative roots.
#[native_fn]
fn cbrt(precision: Precision, x: Number) -> Result<Number, EvalError> {
    if x.is_zero() {
        return Ok(Number::zero(precision));
    }
    let work = precision.with_guard(16);
    let third = Number::one(work).quotient(&Number::from_i64(3, work), work);
    let root = kernel::exp(&kernel::ln(&x.abs(), work)?.mul(&third, work), work)?;
    let root = if x.is_negative() { root.neg() } else { root };
    Ok(root.normalize(precision))
}

#[native_fn]
fn pow(precision: Precision, base: Number, exponent: Number) -> Result<Number, EvalError> {
    kernel::power(&base, &exponent, precision)
}

#[native_fn]
fn abs(x: Number) -> Result<Number, EvalError> {
    Ok(x.abs())
}
