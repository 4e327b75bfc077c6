//! Committee membership as registered on L1

use dac_crypto::{keccak256_concat, Address, Hash};
use serde::{Deserialize, Serialize};

/// Member of the Data Availability Committee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub address: Address,
    pub endpoint: String,
}

/// Committee as read from the registry at one point in time.
///
/// Never mutated in place: a refresh produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitteeSnapshot {
    pub addresses_hash: Hash,
    /// In registration order
    pub members: Vec<CommitteeMember>,
    pub required_signatures: u64,
}

impl CommitteeSnapshot {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// keccak256 over the packed member addresses, as the registry commits to them
    pub fn computed_addresses_hash(&self) -> Hash {
        keccak256_concat(self.members.iter().map(|m| m.address.as_slice()))
    }

    /// Whether the registry's committed hash matches the member list
    pub fn addresses_hash_matches(&self) -> bool {
        self.computed_addresses_hash() == self.addresses_hash
    }

    /// Whether enough members exist to ever reach the threshold
    pub fn quorum_possible(&self) -> bool {
        self.required_signatures <= self.members.len() as u64
    }
}
