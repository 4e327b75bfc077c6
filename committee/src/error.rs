//! Committee client error types
//!
//! [`AttemptError`] is a soft failure of one source (a member, the trusted
//! sequencer). It drives rotation on the read path and counts against the
//! quorum budget on the write path, but is never returned to the caller.
//! [`DataCommitteeError`] is what the public operations return.

use crate::config::ConfigError;
use dac_core::{ClientError, RegistryError, StoreError};
use dac_crypto::{Address, CryptoError, Hash};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(#[from] ClientError),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("mismatch on transaction data. Expected hash {expected}, actual hash: {actual}")]
    HashMismatch { expected: Hash, actual: Hash },

    #[error("invalid signature: {0}")]
    InvalidSignature(CryptoError),

    #[error("invalid signer. Expected {expected}, actual {actual}")]
    WrongSigner { expected: Address, actual: Address },
}

#[derive(Error, Debug)]
pub enum DataCommitteeError {
    #[error("error getting {call} from L1 SC: {source}")]
    ContractRead {
        call: &'static str,
        #[source]
        source: RegistryError,
    },

    #[error("failed to read local store: {0}")]
    Store(#[from] StoreError),

    #[error("data for batch {batch_number} not found on the local store{}", not_found_sources(.trusted_sequencer_mode))]
    NotFound {
        batch_number: u64,
        trusted_sequencer_mode: bool,
    },

    #[error("too many members failed to send their signature: {failures} of {members} failed, {required} required")]
    QuorumUnreachable {
        members: usize,
        failures: usize,
        required: usize,
    },

    #[error("cannot sign an empty sequence")]
    EmptySequence,

    #[error("previous batch {0} not found on the local store")]
    MissingPreviousBatch(u64),

    #[error("failed to sign sequence: {0}")]
    Signing(#[from] CryptoError),

    #[error("signature collection cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

fn not_found_sources(trusted_sequencer_mode: &bool) -> &'static str {
    if *trusted_sequencer_mode {
        " nor on any committee member"
    } else {
        ", nor from the trusted sequencer nor on any committee member"
    }
}

pub type Result<T> = std::result::Result<T, DataCommitteeError>;
