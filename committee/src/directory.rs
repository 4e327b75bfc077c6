//! Committee snapshots read from the L1 registry contract

use crate::error::{DataCommitteeError, Result};
use dac_core::{CommitteeMember, CommitteeRegistry, CommitteeSnapshot};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the currently registered committee.
///
/// Every refresh returns a complete new snapshot or an error; nothing is
/// cached here and failed reads are not retried.
#[derive(Clone)]
pub struct CommitteeDirectory {
    registry: Arc<dyn CommitteeRegistry>,
}

impl CommitteeDirectory {
    pub fn new(registry: Arc<dyn CommitteeRegistry>) -> Self {
        Self { registry }
    }

    pub async fn refresh(&self) -> Result<CommitteeSnapshot> {
        let addresses_hash = self
            .registry
            .committee_hash()
            .await
            .map_err(|source| DataCommitteeError::ContractRead {
                call: "CommitteeHash",
                source,
            })?;

        let required_signatures = self
            .registry
            .required_amount_of_signatures()
            .await
            .map_err(|source| DataCommitteeError::ContractRead {
                call: "RequiredAmountOfSignatures",
                source,
            })?;

        let members = self.members().await?;

        let snapshot = CommitteeSnapshot {
            addresses_hash,
            members,
            required_signatures,
        };

        if !snapshot.addresses_hash_matches() {
            warn!(
                expected = %snapshot.addresses_hash,
                computed = %snapshot.computed_addresses_hash(),
                "committee hash does not match registered member addresses"
            );
        }

        debug!(
            members = snapshot.len(),
            required = snapshot.required_signatures,
            "loaded data committee"
        );
        Ok(snapshot)
    }

    async fn members(&self) -> Result<Vec<CommitteeMember>> {
        let count = self
            .registry
            .get_amount_of_members()
            .await
            .map_err(|source| DataCommitteeError::ContractRead {
                call: "GetAmountOfMembers",
                source,
            })?;

        let mut members = Vec::new();
        for index in 0..count {
            let (endpoint, address) = self.registry.members(index).await.map_err(|source| {
                DataCommitteeError::ContractRead {
                    call: "Members",
                    source,
                }
            })?;
            members.push(CommitteeMember { address, endpoint });
        }
        Ok(members)
    }
}
