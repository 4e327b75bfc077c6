//! HTTP clients for committee member nodes

use crate::jsonrpc::JsonRpcClient;
use async_trait::async_trait;
use dac_core::{hex_serde, ClientError, MemberClient, MemberClientFactory, SignedSequence};
use dac_crypto::Hash;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
struct HexBytes(#[serde(with = "hex_serde::bytes")] Vec<u8>);

/// JSON-RPC client for one committee member
pub struct HttpMemberClient {
    rpc: JsonRpcClient,
}

impl HttpMemberClient {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl MemberClient for HttpMemberClient {
    async fn get_off_chain_data(&self, hash: Hash) -> Result<Vec<u8>, ClientError> {
        let HexBytes(data) = self
            .rpc
            .call::<_, HexBytes>("sync_getOffChainData", [hash])
            .await?;
        Ok(data)
    }

    async fn sign_sequence(
        &self,
        signed_sequence: &SignedSequence,
    ) -> Result<Vec<u8>, ClientError> {
        let HexBytes(signature) = self
            .rpc
            .call::<_, HexBytes>("datacom_signSequence", [signed_sequence])
            .await?;
        Ok(signature)
    }
}

/// Opens member clients that share one connection pool
#[derive(Clone)]
pub struct HttpMemberClientFactory {
    client: reqwest::Client,
}

impl HttpMemberClientFactory {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl MemberClientFactory for HttpMemberClientFactory {
    fn client(&self, endpoint: &str) -> Arc<dyn MemberClient> {
        Arc::new(HttpMemberClient::new(JsonRpcClient::new(
            self.client.clone(),
            endpoint,
        )))
    }
}
