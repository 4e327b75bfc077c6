use crate::jsonrpc::JsonRpcClient;
use async_trait::async_trait;
use dac_core::{ClientError, TrustedBatch, TrustedSequencerClient};

/// zkEVM RPC of the trusted sequencer
pub struct TrustedSequencerRpcClient {
    rpc: JsonRpcClient,
}

impl TrustedSequencerRpcClient {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl TrustedSequencerClient for TrustedSequencerRpcClient {
    async fn batch_by_number(&self, batch_number: u64) -> Result<TrustedBatch, ClientError> {
        // `false`: only transaction hashes, the raw batch data is all we need
        self.rpc
            .call::<_, TrustedBatch>(
                "zkevm_getBatchByNumber",
                (format!("{:#x}", batch_number), false),
            )
            .await
    }
}
