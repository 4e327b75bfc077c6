//! Data Availability Committee client
//!
//! - [`CommitteeDirectory`] snapshots the committee registered on L1
//! - [`DataFetcher`] reads batch data with hash-checked failover
//! - [`SignatureCollector`] gathers a quorum of member signatures

pub mod collector;
pub mod config;
pub mod directory;
pub mod error;
pub mod fetcher;
pub mod selector;

pub use collector::{
    build_signatures_and_addrs, CollectedSignature, MemberSignatureResult, SignatureCollector,
};
pub use config::{ConfigError, DataCommitteeConfig};
pub use directory::CommitteeDirectory;
pub use error::{AttemptError, DataCommitteeError, Result};
pub use fetcher::DataFetcher;
pub use selector::SelectorState;
