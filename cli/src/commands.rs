use crate::config::Config;
use anyhow::{Context, Result};
use dac_committee::{CommitteeDirectory, DataFetcher, SignatureCollector};
use dac_core::{SequenceBatch, StoredBatch, TrustedSequencerClient};
use dac_crypto::{hex, Hash};
use dac_network::{
    http_client, HttpMemberClientFactory, JsonRpcClient, L1CommitteeRegistry,
    TrustedSequencerRpcClient,
};
use dac_storage::SledBatchStore;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Network collaborators built from the config file
struct Services {
    directory: CommitteeDirectory,
    clients: Arc<HttpMemberClientFactory>,
    http: reqwest::Client,
}

impl Services {
    fn new(config: &Config) -> Result<Self> {
        let http = http_client(config.request_timeout())?;
        let registry = L1CommitteeRegistry::new(
            JsonRpcClient::new(http.clone(), &config.l1.rpc_url),
            config.l1.committee_address,
        );
        Ok(Self {
            directory: CommitteeDirectory::new(Arc::new(registry)),
            clients: Arc::new(HttpMemberClientFactory::new(http.clone())),
            http,
        })
    }

    fn trusted_sequencer(&self, config: &Config) -> Option<Arc<dyn TrustedSequencerClient>> {
        let url = config.sequencer.trusted_rpc_url.as_ref()?;
        Some(Arc::new(TrustedSequencerRpcClient::new(JsonRpcClient::new(
            self.http.clone(),
            url,
        ))))
    }
}

fn open_store(config: &Config) -> Result<Arc<SledBatchStore>> {
    let path = config.storage_path();
    let store = SledBatchStore::open(&path)
        .with_context(|| format!("failed to open batch store at {}", path.display()))?;
    Ok(Arc::new(store))
}

pub async fn committee(config: &Config) -> Result<()> {
    let services = Services::new(config)?;
    let snapshot = services.directory.refresh().await?;

    println!("Committee hash:      {}", snapshot.addresses_hash);
    println!("Hash matches:        {}", snapshot.addresses_hash_matches());
    println!("Required signatures: {}", snapshot.required_signatures);
    println!("Members:             {}", snapshot.len());
    for (i, member) in snapshot.members.iter().enumerate() {
        println!("  {}. {} {}", i, member.address, member.endpoint);
    }
    Ok(())
}

pub async fn fetch(
    config: &Config,
    batch_number: u64,
    expected_hash: Hash,
    trusted_sequencer_mode: bool,
) -> Result<()> {
    let services = Services::new(config)?;
    let mut fetcher = DataFetcher::new(
        services.directory.clone(),
        open_store(config)?,
        services.trusted_sequencer(config),
        services.clients.clone(),
        config.data_committee()?,
    );
    fetcher.init().await?;

    let data = fetcher
        .fetch_batch_data(batch_number, expected_hash, trusted_sequencer_mode)
        .await?;
    info!(batch_number, bytes = data.len(), "batch data resolved");
    println!("{}", hex::encode_prefixed(&data));
    Ok(())
}

pub async fn sign(config: &Config, sequence_file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(sequence_file)
        .with_context(|| format!("failed to read {}", sequence_file.display()))?;
    let batches: Vec<SequenceBatch> =
        serde_json::from_str(&contents).context("invalid sequence file")?;

    let services = Services::new(config)?;
    let collector = SignatureCollector::new(
        services.directory.clone(),
        open_store(config)?,
        services.clients.clone(),
        config.sequencer_key()?,
        config.data_committee()?,
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling signature collection");
            interrupt.cancel();
        }
    });

    let blob = collector.post_sequence(&cancel, &batches).await?;
    info!(batches = batches.len(), bytes = blob.len(), "sequence signed by the committee");
    println!("{}", hex::encode_prefixed(&blob));
    Ok(())
}

pub fn import(config: &Config, batches_file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(batches_file)
        .with_context(|| format!("failed to read {}", batches_file.display()))?;
    let batches: Vec<StoredBatch> =
        serde_json::from_str(&contents).context("invalid batches file")?;

    let store = open_store(config)?;
    for batch in &batches {
        store.put_batch(batch)?;
    }
    info!(count = batches.len(), path = %store.path().display(), "imported batches");
    Ok(())
}
