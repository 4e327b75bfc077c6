//! DAC Core Library
//!
//! Shared types for the Data Availability Committee client: committee
//! snapshots, signed batch sequences and the interfaces of external systems.

pub mod backend;
pub mod committee;
pub mod hex_serde;
pub mod sequence;

// Re-export main types
pub use backend::{
    BatchStore, ClientError, CommitteeRegistry, MemberClient, MemberClientFactory, RegistryError,
    StoreError, StoredBatch, TrustedBatch, TrustedSequencerClient,
};
pub use committee::{CommitteeMember, CommitteeSnapshot};
pub use dac_crypto::{Address, Hash};
pub use sequence::{Batch, Sequence, SequenceBatch, SignedSequence};
