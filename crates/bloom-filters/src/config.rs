//! Filter construction and loading configuration

use std::time::Duration;

use crate::error::FilterError;

/// Default filter size in bits (10^10 bits, ~1.16 GiB per filter)
pub const DEFAULT_SIZE_BITS: usize = 10_000_000_000;

/// Default number of hash functions
pub const DEFAULT_HASH_COUNT: usize = 5;

/// Parameters shared by every filter loaded at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    /// Size of each filter in bits (m)
    pub size_bits: usize,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Upper bound on the whole loading phase (None = wait indefinitely)
    pub load_timeout: Option<Duration>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            size_bits: DEFAULT_SIZE_BITS,
            hash_count: DEFAULT_HASH_COUNT,
            load_timeout: None,
        }
    }
}

impl FilterConfig {
    /// Create a configuration with explicit size and hash count
    pub fn new(size_bits: usize, hash_count: usize) -> Self {
        Self {
            size_bits,
            hash_count,
            load_timeout: None,
        }
    }

    /// Set the loading timeout
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.size_bits == 0 {
            return Err(FilterError::InvalidParameters(
                "size_bits must be greater than 0".to_string(),
            ));
        }
        if self.hash_count == 0 {
            return Err(FilterError::InvalidParameters(
                "hash_count must be greater than 0".to_string(),
            ));
        }
        if self.load_timeout == Some(Duration::ZERO) {
            return Err(FilterError::InvalidParameters(
                "load_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_legacy_parameters() {
        let config = FilterConfig::default();
        assert_eq!(config.size_bits, 10_000_000_000);
        assert_eq!(config.hash_count, 5);
        assert!(config.load_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        let config = FilterConfig::new(0, 5);
        assert!(matches!(
            config.validate(),
            Err(FilterError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_zero_hash_count_rejected() {
        let config = FilterConfig::new(1024, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = FilterConfig::new(1024, 5).with_load_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
