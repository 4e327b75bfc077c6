//! HTTP implementations of the committee client's external interfaces
//!
//! Everything speaks JSON-RPC 2.0: committee members, the trusted
//! sequencer and the L1 node hosting the committee registry contract.

pub mod jsonrpc;
pub mod member;
pub mod registry;
pub mod sequencer;

pub use jsonrpc::{http_client, JsonRpcClient};
pub use member::{HttpMemberClient, HttpMemberClientFactory};
pub use registry::L1CommitteeRegistry;
pub use sequencer::TrustedSequencerRpcClient;
