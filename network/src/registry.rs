//! Committee registry contract read over L1 `eth_call`

use crate::jsonrpc::JsonRpcClient;
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use dac_core::{CommitteeRegistry, RegistryError};
use dac_crypto::{Address, Hash};
use serde::Serialize;

sol! {
    /// Getters of the data availability committee registry
    interface ICommitteeRegistry {
        function committeeHash() external view returns (bytes32);
        function requiredAmountOfSignatures() external view returns (uint256);
        function getAmountOfMembers() external view returns (uint256);
        function members(uint256 index) external view returns (string url, address addr);
    }
}

#[derive(Serialize)]
struct CallRequest {
    to: Address,
    data: Bytes,
}

pub struct L1CommitteeRegistry {
    rpc: JsonRpcClient,
    contract: Address,
}

impl L1CommitteeRegistry {
    pub fn new(rpc: JsonRpcClient, contract: Address) -> Self {
        Self { rpc, contract }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Run `call` against the registry at the latest block and decode its return data
    async fn eth_call<C: SolCall>(&self, call: C) -> Result<C::Return, RegistryError> {
        let request = CallRequest {
            to: self.contract,
            data: call.abi_encode().into(),
        };
        let data = self
            .rpc
            .call::<_, Bytes>("eth_call", (request, "latest"))
            .await
            .map_err(|e| RegistryError::CallFailed {
                call: C::SIGNATURE.to_string(),
                message: e.to_string(),
            })?;
        C::abi_decode_returns(&data).map_err(|e| decode_error(C::SIGNATURE, e.to_string()))
    }
}

fn decode_error(signature: &str, message: String) -> RegistryError {
    RegistryError::Decode {
        call: signature.to_string(),
        message,
    }
}

/// Narrow a `uint256` return to `u64`
fn to_u64(signature: &str, value: U256) -> Result<u64, RegistryError> {
    u64::try_from(value)
        .map_err(|_| decode_error(signature, format!("{} does not fit in 64 bits", value)))
}

#[async_trait]
impl CommitteeRegistry for L1CommitteeRegistry {
    async fn committee_hash(&self) -> Result<Hash, RegistryError> {
        self.eth_call(ICommitteeRegistry::committeeHashCall {}).await
    }

    async fn required_amount_of_signatures(&self) -> Result<u64, RegistryError> {
        let required = self
            .eth_call(ICommitteeRegistry::requiredAmountOfSignaturesCall {})
            .await?;
        to_u64(
            ICommitteeRegistry::requiredAmountOfSignaturesCall::SIGNATURE,
            required,
        )
    }

    async fn get_amount_of_members(&self) -> Result<u64, RegistryError> {
        let amount = self
            .eth_call(ICommitteeRegistry::getAmountOfMembersCall {})
            .await?;
        to_u64(ICommitteeRegistry::getAmountOfMembersCall::SIGNATURE, amount)
    }

    async fn members(&self, index: u64) -> Result<(String, Address), RegistryError> {
        let member = self
            .eth_call(ICommitteeRegistry::membersCall {
                index: U256::from(index),
            })
            .await?;
        Ok((member.url, member.addr))
    }
}
