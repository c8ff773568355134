use crate::error::EvalError;
use crate::functions::Registry;
use crate::kernel::{self, Number, Precision};
use sigma_macros::native_fn;

pub fn register(registry: &mut Registry) {
    registry.register_function("gamma", gamma);
}

/// Euler's gamma function; `gamma(n) = (n - 1)!` for positive integers.
#[native_fn]
fn gamma(precision: Precision, x: Number) -> Result<Number, EvalError> {
    kernel::gamma(&x, precision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precision() -> Precision {
        Precision::new(256)
    }

    #[test]
    fn test_gamma() {
        let p = precision();
        assert_eq!(
            gamma(p, &[Number::from_i64(6, p)]).unwrap(),
            Number::from_i64(120, p)
        );
        let half = Number::from_f64(0.5, p).unwrap();
        let squared = gamma(p, &[half]).unwrap();
        let squared = squared.mul(&squared, p);
        assert!(squared.sub(&kernel::pi(p), p).abs() < p.power_of_two(-240));
    }

    #[test]
    fn test_gamma_rejects_poles() {
        let p = precision();
        assert!(matches!(
            gamma(p, &[Number::from_i64(-2, p)]),
            Err(EvalError::DomainError { .. })
        ));
        assert!(matches!(
            gamma(p, &[]),
            Err(EvalError::ArityMismatch { found: 0, .. })
        ));
    }
}
