use crate::error::EvalError;
use crate::functions::Registry;
use crate::kernel::{Number, Precision};
use sigma_macros::native_fn;
use std::cmp::Ordering;

pub fn register(registry: &mut Registry) {
    registry.register_function("mean", mean);
    registry.register_function("median", median);
    registry.register_function("stddev", stddev);
}

fn average(values: &[Number], precision: Precision) -> Number {
    let sum = values
        .iter()
        .fold(Number::zero(precision), |acc, value| acc.add(value, precision));
    sum.quotient(&Number::from_u64(values.len() as u64, precision), precision)
}

pub(crate) fn sorted(mut values: Vec<Number>) -> Vec<Number> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    values
}

#[native_fn]
fn mean(precision: Precision, values: Vec<Number>) -> Result<Number, EvalError> {
    Ok(average(&values, precision))
}

#[native_fn]
fn median(precision: Precision, values: Vec<Number>) -> Result<Number, EvalError> {
    let values = sorted(values);
    let half = values.len() / 2;
    if values.len() % 2 == 1 {
        return Ok(values[half].normalize(precision));
    }
    Ok(average(&values[half - 1..=half], precision))
}

/// Population standard deviation.
#[native_fn(min_args = 2)]
fn stddev(precision: Precision, values: Vec<Number>) -> Result<Number, EvalError> {
    let work = precision.with_guard(16);
    let mean = average(&values, work);
    let squares: Vec<Number> = values
        .iter()
        .map(|value| {
            let deviation = value.sub(&mean, work);
            deviation.mul(&deviation, work)
        })
        .collect();
    let variance = average(&squares, work);
    Ok(variance.sqrt(work)?.normalize(precision))
}
