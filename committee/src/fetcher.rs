//! Read path: batch data with failover
//!
//! Sources are tried cheapest and most trusted first: the local store, the
//! trusted sequencer (unless this node is the trusted sequencer), then each
//! committee member in rotation order. Every candidate is checked against the
//! expected keccak hash before it is accepted.

use crate::config::DataCommitteeConfig;
use crate::directory::CommitteeDirectory;
use crate::error::{AttemptError, DataCommitteeError, Result};
use crate::selector::SelectorState;
use dac_core::{
    BatchStore, CommitteeMember, CommitteeSnapshot, MemberClientFactory, TrustedSequencerClient,
};
use dac_crypto::{keccak256, Hash};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Resolves batch L2 data for one caller.
///
/// The rotation cursor lives inside the fetcher and every fetch takes
/// `&mut self`, so a fetcher is never shared between concurrent reads.
pub struct DataFetcher<R = StdRng> {
    directory: CommitteeDirectory,
    store: Arc<dyn BatchStore>,
    trusted_sequencer: Option<Arc<dyn TrustedSequencerClient>>,
    clients: Arc<dyn MemberClientFactory>,
    config: DataCommitteeConfig,
    snapshot: CommitteeSnapshot,
    selector: SelectorState,
    rng: R,
}

impl DataFetcher<StdRng> {
    pub fn new(
        directory: CommitteeDirectory,
        store: Arc<dyn BatchStore>,
        trusted_sequencer: Option<Arc<dyn TrustedSequencerClient>>,
        clients: Arc<dyn MemberClientFactory>,
        config: DataCommitteeConfig,
    ) -> Self {
        Self::with_rng(
            directory,
            store,
            trusted_sequencer,
            clients,
            config,
            StdRng::from_entropy(),
        )
    }
}

impl<R: Rng + Send> DataFetcher<R> {
    /// Same as [`DataFetcher::new`] with an explicit source for the starting cursor
    pub fn with_rng(
        directory: CommitteeDirectory,
        store: Arc<dyn BatchStore>,
        trusted_sequencer: Option<Arc<dyn TrustedSequencerClient>>,
        clients: Arc<dyn MemberClientFactory>,
        config: DataCommitteeConfig,
        rng: R,
    ) -> Self {
        Self {
            directory,
            store,
            trusted_sequencer,
            clients,
            config,
            snapshot: CommitteeSnapshot::default(),
            selector: SelectorState::default(),
            rng,
        }
    }

    /// Load the committee and pick a random starting member
    pub async fn init(&mut self) -> Result<()> {
        self.config.validate()?;
        let snapshot = self.directory.refresh().await?;
        self.install(snapshot);
        Ok(())
    }

    pub fn snapshot(&self) -> &CommitteeSnapshot {
        &self.snapshot
    }

    pub fn selector(&self) -> SelectorState {
        self.selector
    }

    /// Move the cursor to `cursor` (wrapped into the committee size)
    pub fn set_cursor(&mut self, cursor: usize) {
        self.selector = SelectorState::starting_at(cursor, self.snapshot.len());
    }

    fn install(&mut self, snapshot: CommitteeSnapshot) {
        self.selector = SelectorState::reset(snapshot.len(), &mut self.rng);
        self.snapshot = snapshot;
    }

    /// Batch L2 data whose keccak256 equals `expected_hash`
    pub async fn fetch_batch_data(
        &mut self,
        batch_number: u64,
        expected_hash: Hash,
        trusted_sequencer_mode: bool,
    ) -> Result<Vec<u8>> {
        if let Some(data) = self.from_local_store(batch_number, expected_hash).await? {
            return Ok(data);
        }

        if !trusted_sequencer_mode {
            info!(batch_number, "trying to get data from trusted sequencer");
            match self.from_trusted_sequencer(batch_number, expected_hash).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    error!(batch_number, error = %e, "failed to get batch from trusted sequencer")
                }
            }
        }

        info!(batch_number, "trying to get data from data committee node");
        if let Some(data) = self.from_committee(batch_number, expected_hash).await {
            return Ok(data);
        }

        self.reload_committee().await;
        Err(DataCommitteeError::NotFound {
            batch_number,
            trusted_sequencer_mode,
        })
    }

    /// Resolve several batches in order, stopping at the first one that cannot be found
    pub async fn fetch_batches(
        &mut self,
        batches: &[(u64, Hash)],
        trusted_sequencer_mode: bool,
    ) -> Result<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(batches.len());
        for &(batch_number, expected_hash) in batches {
            out.push(
                self.fetch_batch_data(batch_number, expected_hash, trusted_sequencer_mode)
                    .await?,
            );
        }
        Ok(out)
    }

    async fn from_local_store(
        &self,
        batch_number: u64,
        expected_hash: Hash,
    ) -> Result<Option<Vec<u8>>> {
        let Some(data) = self.store.get_batch_l2_data_by_number(batch_number).await? else {
            return Ok(None);
        };
        match verify(data, expected_hash) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(batch_number, error = %e, "local batch data rejected");
                Ok(None)
            }
        }
    }

    async fn from_trusted_sequencer(
        &self,
        batch_number: u64,
        expected_hash: Hash,
    ) -> std::result::Result<Vec<u8>, AttemptError> {
        let Some(client) = &self.trusted_sequencer else {
            return Err(AttemptError::Transport(dac_core::ClientError::Transport(
                "no trusted sequencer client configured".to_string(),
            )));
        };
        let batch = bounded(self.config.fetch_timeout, client.batch_by_number(batch_number)).await?;
        verify(batch.batch_l2_data, expected_hash)
    }

    /// Rotate through the committee starting at the current cursor.
    ///
    /// Stops after one full cycle. On success the cursor stays on the member
    /// that answered so the next read starts there.
    async fn from_committee(
        &mut self,
        batch_number: u64,
        expected_hash: Hash,
    ) -> Option<Vec<u8>> {
        let start = self.selector.cursor()?;
        loop {
            let member = self.snapshot.members[self.selector.cursor()?].clone();
            info!(member = %member.address, endpoint = %member.endpoint, "trying to get data");

            match self.from_member(&member, expected_hash).await {
                Ok(data) => return Some(data),
                Err(e) => warn!(
                    batch_number,
                    member = %member.address,
                    endpoint = %member.endpoint,
                    error = %e,
                    "error getting data from DAC node"
                ),
            }

            self.selector = self.selector.advance();
            if self.selector.cursor() == Some(start) {
                return None;
            }
        }
    }

    async fn from_member(
        &self,
        member: &CommitteeMember,
        expected_hash: Hash,
    ) -> std::result::Result<Vec<u8>, AttemptError> {
        let client = self.clients.client(&member.endpoint);
        let data = bounded(
            self.config.fetch_timeout,
            client.get_off_chain_data(expected_hash),
        )
        .await?;
        verify(data, expected_hash)
    }

    /// Membership may have changed; reload it before giving up
    async fn reload_committee(&mut self) {
        match self.directory.refresh().await {
            Ok(snapshot) => self.install(snapshot),
            Err(e) => error!(error = %e, "error loading data committee"),
        }
    }
}

async fn bounded<T, F>(limit: Duration, call: F) -> std::result::Result<T, AttemptError>
where
    F: std::future::Future<Output = std::result::Result<T, dac_core::ClientError>>,
{
    timeout(limit, call)
        .await
        .map_err(|_| AttemptError::Timeout(limit))?
        .map_err(AttemptError::from)
}

fn verify(data: Vec<u8>, expected: Hash) -> std::result::Result<Vec<u8>, AttemptError> {
    let actual = keccak256(&data);
    if actual != expected {
        return Err(AttemptError::HashMismatch { expected, actual });
    }
    Ok(data)
}
