//! Interfaces to the systems the committee client talks to.
//!
//! The committee logic only depends on these traits; concrete HTTP and
//! database implementations live in `dac-network` and `dac-storage`.

use crate::hex_serde;
use crate::sequence::SignedSequence;
use async_trait::async_trait;
use dac_crypto::{Address, Hash};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("L1 call {call} failed: {message}")]
    CallFailed { call: String, message: String },

    #[error("Malformed return data from {call}: {message}")]
    Decode { call: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found")]
    NotFound,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Batch record in the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBatch {
    pub batch_number: u64,
    pub acc_input_hash: Hash,
    #[serde(with = "hex_serde::bytes")]
    pub batch_l2_data: Vec<u8>,
}

/// Batch as served by the trusted sequencer RPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedBatch {
    #[serde(with = "hex_serde::quantity")]
    pub number: u64,
    #[serde(rename = "batchL2Data", with = "hex_serde::bytes")]
    pub batch_l2_data: Vec<u8>,
}

/// Read-only view of the committee registry contract
#[async_trait]
pub trait CommitteeRegistry: Send + Sync {
    async fn committee_hash(&self) -> Result<Hash, RegistryError>;
    async fn required_amount_of_signatures(&self) -> Result<u64, RegistryError>;
    async fn get_amount_of_members(&self) -> Result<u64, RegistryError>;
    /// `(endpoint, address)` of the member at `index`
    async fn members(&self, index: u64) -> Result<(String, Address), RegistryError>;
}

/// RPC client for a single committee member
#[async_trait]
pub trait MemberClient: Send + Sync {
    async fn get_off_chain_data(&self, hash: Hash) -> Result<Vec<u8>, ClientError>;
    async fn sign_sequence(&self, signed_sequence: &SignedSequence) -> Result<Vec<u8>, ClientError>;
}

/// Builds member clients from registry endpoints
pub trait MemberClientFactory: Send + Sync {
    fn client(&self, endpoint: &str) -> Arc<dyn MemberClient>;
}

/// Local authoritative batch store
#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn get_batch_l2_data_by_number(
        &self,
        batch_number: u64,
    ) -> Result<Option<Vec<u8>>, StoreError>;
    async fn get_batch_by_number(
        &self,
        batch_number: u64,
    ) -> Result<Option<StoredBatch>, StoreError>;
}

/// RPC client for the trusted sequencer
#[async_trait]
pub trait TrustedSequencerClient: Send + Sync {
    async fn batch_by_number(&self, batch_number: u64) -> Result<TrustedBatch, ClientError>;
}
