use crate::error::EvalError;
use crate::functions::statistics::sorted;
use crate::functions::Registry;
use crate::kernel::{Number, Precision};
use sigma_macros::native_fn;
use std::cmp::Ordering;

pub fn register(registry: &mut Registry) {
    registry.register_action("sort", sort);
    registry.register_function("binarySearch", binary_search);
}

/// Ascending order. Returns every argument, so it is only callable as an
/// action.
pub fn sort(_precision: Precision, args: &[Number]) -> Result<Vec<Number>, EvalError> {
    Ok(sorted(args.to_vec()))
}

/// Index of the last argument within the preceding, ascending arguments, or
/// -1 when absent.
#[native_fn(name = "binarySearch", min_args = 2)]
fn binary_search(precision: Precision, args: Vec<Number>) -> Result<Number, EvalError> {
    let (target, haystack) = match args.split_last() {
        Some(split) => split,
        None => return Ok(Number::from_i64(-1, precision)),
    };

    let mut low = 0usize;
    let mut high = haystack.len();
    while low < high {
        let mid = low + (high - low) / 2;
        match haystack[mid].partial_cmp(target) {
            Some(Ordering::Equal) => return Ok(Number::from_u64(mid as u64, precision)),
            Some(Ordering::Less) => low = mid + 1,
            _ => high = mid,
        }
    }
    Ok(Number::from_i64(-1, precision))
}
