use crate::error::ConfigError;
use crate::kernel::{Number, Precision};
use once_cell::sync::OnceCell;

/// Significand width used when nothing else is configured.
pub const DEFAULT_PRECISION: usize = 512;
pub const MIN_PRECISION: usize = 64;
pub const DEFAULT_CACHE_SIZE: usize = 100;

static DEFAULT_PRECISION_BITS: OnceCell<usize> = OnceCell::new();

/// Fixes the process-wide default precision.
///
/// Must run before the first engine is built: once the default has been read
/// it can no longer change.
pub fn set_default_precision(bits: usize) -> Result<(), ConfigError> {
    if bits < MIN_PRECISION {
        return Err(ConfigError::PrecisionTooLow(bits));
    }
    DEFAULT_PRECISION_BITS
        .set(bits)
        .map_err(|_| ConfigError::PrecisionAlreadySet(default_precision()))
}

pub fn default_precision() -> usize {
    *DEFAULT_PRECISION_BITS.get_or_init(|| DEFAULT_PRECISION)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Significand bits of every value produced during evaluation.
    pub precision: usize,
    /// An infinite summation stops once a term is smaller than
    /// `2^-series_tolerance_bits`. Defaults to the precision.
    pub series_tolerance_bits: Option<usize>,
    /// Upper bound on the number of terms any summation may add.
    pub max_series_terms: Option<u64>,
    /// Capacity of the parsed-expression cache; 0 disables it.
    pub cache_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            series_tolerance_bits: None,
            max_series_terms: None,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn with_precision(mut self, bits: usize) -> Self {
        self.precision = bits;
        self
    }

    pub fn with_series_tolerance_bits(mut self, bits: usize) -> Self {
        self.series_tolerance_bits = Some(bits);
        self
    }

    pub fn with_max_series_terms(mut self, terms: u64) -> Self {
        self.max_series_terms = Some(terms);
        self
    }

    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision < MIN_PRECISION {
            return Err(ConfigError::PrecisionTooLow(self.precision));
        }
        Ok(())
    }

    pub fn precision(&self) -> Precision {
        Precision::new(self.precision)
    }

    /// Magnitude below which a term of an infinite summation is negligible.
    pub fn series_tolerance(&self) -> Number {
        let bits = self.series_tolerance_bits.unwrap_or(self.precision);
        self.precision().power_of_two(-(bits as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.precision, default_precision());
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_low_precision() {
        let config = EngineConfig::default().with_precision(16);
        assert_eq!(config.validate(), Err(ConfigError::PrecisionTooLow(16)));
        assert_eq!(
            set_default_precision(8),
            Err(ConfigError::PrecisionTooLow(8))
        );
    }

    #[test]
    fn test_default_precision_is_fixed_once_read() {
        let current = default_precision();
        assert_eq!(
            set_default_precision(1024),
            Err(ConfigError::PrecisionAlreadySet(current))
        );
    }

    #[test]
    fn test_series_tolerance() {
        let config = EngineConfig::default()
            .with_precision(128)
            .with_series_tolerance_bits(10);
        let tolerance = config.series_tolerance();
        assert_eq!(tolerance.to_f64(), 1.0 / 1024.0);
    }
}
