//! Tunables for the committee client

use dac_crypto::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fetch timeout cannot be zero")]
    FetchTimeoutZero,

    #[error("sign timeout cannot be zero")]
    SignTimeoutZero,
}

/// Configuration for the read and write paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCommitteeConfig {
    /// Upper bound for one `GetOffChainData` or trusted sequencer call
    pub fetch_timeout: Duration,

    /// Upper bound for one member's `SignSequence` call
    pub sign_timeout: Duration,

    /// Coinbase bound into every batch of a signed sequence
    pub l2_coinbase: Address,
}

impl Default for DataCommitteeConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            sign_timeout: Duration::from_secs(60),
            l2_coinbase: Address::ZERO,
        }
    }
}

impl DataCommitteeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::FetchTimeoutZero);
        }
        if self.sign_timeout.is_zero() {
            return Err(ConfigError::SignTimeoutZero);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DataCommitteeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let config = DataCommitteeConfig {
            fetch_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::FetchTimeoutZero));

        let config = DataCommitteeConfig {
            sign_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SignTimeoutZero));
    }
}
