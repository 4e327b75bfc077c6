//! `dac-node` configuration file

use anyhow::{Context, Result};
use dac_committee::DataCommitteeConfig;
use dac_crypto::{Address, KeyPair};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted when `[sequencer] private_key` is unset
pub const PRIVATE_KEY_ENV: &str = "DAC_SEQUENCER_PRIVATE_KEY";

pub const DEFAULT_CONFIG_PATH: &str = "$HOME/.dac-node/config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub l1: L1Config,
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub committee: CommitteeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
}

#[derive(Debug, Deserialize)]
pub struct L1Config {
    pub rpc_url: String,
    pub committee_address: Address,
}

#[derive(Debug, Default, Deserialize)]
pub struct SequencerConfig {
    pub trusted_rpc_url: Option<String>,
    pub private_key: Option<String>,
    #[serde(default)]
    pub l2_coinbase: Address,
    #[serde(default)]
    pub trusted_sequencer_mode: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CommitteeConfig {
    pub fetch_timeout_secs: u64,
    pub sign_timeout_secs: u64,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            sign_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "$HOME/.dac-node/db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub request_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

pub fn expand_path(path: &str) -> String {
    path.replace("$HOME", &std::env::var("HOME").unwrap_or_default())
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn data_committee(&self) -> Result<DataCommitteeConfig> {
        let config = DataCommitteeConfig {
            fetch_timeout: Duration::from_secs(self.committee.fetch_timeout_secs),
            sign_timeout: Duration::from_secs(self.committee.sign_timeout_secs),
            l2_coinbase: self.sequencer.l2_coinbase,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.request_timeout_secs)
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.storage.path))
    }

    /// Trusted sequencer signing key, from the config file or the environment
    pub fn sequencer_key(&self) -> Result<KeyPair> {
        let hex = match &self.sequencer.private_key {
            Some(key) => key.clone(),
            None => std::env::var(PRIVATE_KEY_ENV).with_context(|| {
                format!(
                    "no [sequencer] private_key configured and {} is not set",
                    PRIVATE_KEY_ENV
                )
            })?,
        };
        Ok(KeyPair::from_private_key_hex(hex.trim())?)
    }
}
