use crate::error::EvalError;
use crate::functions::Registry;
use crate::kernel::{Number, Precision};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};
use sigma_macros::native_fn;

pub fn register(registry: &mut Registry) {
    registry.register_function("gcd", gcd);
    registry.register_function("isPrime", is_prime);
}

fn integer_argument(function: &str, value: &Number) -> Result<BigInt, EvalError> {
    if !value.is_integer() {
        return Err(EvalError::domain(function, "arguments must be integers"));
    }
    value
        .to_bigint()
        .ok_or_else(|| EvalError::domain(function, "arguments must be finite"))
}

#[native_fn]
fn gcd(precision: Precision, a: Number, b: Number) -> Result<Number, EvalError> {
    let mut a = integer_argument("gcd", &a)?.abs();
    let mut b = integer_argument("gcd", &b)?.abs();
    while !b.is_zero() {
        let remainder = &a % &b;
        a = b;
        b = remainder;
    }
    Ok(Number::from_bigint(&a, precision))
}

/// 1 when the argument is a prime, 0 otherwise.
#[native_fn(name = "isPrime")]
fn is_prime(precision: Precision, n: Number) -> Result<Number, EvalError> {
    let n = integer_argument("isPrime", &n)?;
    let prime = match n.to_biguint() {
        Some(n) => miller_rabin(&n),
        None => false,
    };
    Ok(Number::from_i64(prime as i64, precision))
}

/// Deterministic below 3.3 * 10^24 with these witnesses; a strong probable
/// prime test above.
fn miller_rabin(n: &BigUint) -> bool {
    const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if *n < BigUint::from(2u32) {
        return false;
    }
    for p in WITNESSES {
        if (n % p).is_zero() {
            return *n == BigUint::from(p);
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for a in WITNESSES {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = x.modpow(&BigUint::from(2u32), n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
