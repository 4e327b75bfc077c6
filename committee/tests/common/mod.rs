#![allow(dead_code)]

use async_trait::async_trait;
use dac_committee::{CommitteeDirectory, DataCommitteeConfig};
use dac_core::{
    BatchStore, ClientError, CommitteeRegistry, MemberClient, MemberClientFactory, RegistryError,
    SignedSequence, StoreError, StoredBatch, TrustedBatch, TrustedSequencerClient,
};
use dac_crypto::{keccak256_concat, Address, Hash, KeyPair};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockRegistry {
    members: Mutex<Vec<(String, Address)>>,
    required: u64,
    pub refreshes: AtomicUsize,
}

impl MockRegistry {
    pub fn new(members: Vec<(String, Address)>, required: u64) -> Self {
        Self {
            members: Mutex::new(members),
            required,
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn registered(&self) -> Vec<(String, Address)> {
        self.members.lock().unwrap().clone()
    }

    pub fn set_members(&self, members: Vec<(String, Address)>) {
        *self.members.lock().unwrap() = members;
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommitteeRegistry for MockRegistry {
    async fn committee_hash(&self) -> Result<Hash, RegistryError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        let members = self.members.lock().unwrap();
        Ok(keccak256_concat(
            members.iter().map(|(_, a)| a.as_slice()),
        ))
    }

    async fn required_amount_of_signatures(&self) -> Result<u64, RegistryError> {
        Ok(self.required)
    }

    async fn get_amount_of_members(&self) -> Result<u64, RegistryError> {
        Ok(self.members.lock().unwrap().len() as u64)
    }

    async fn members(&self, index: u64) -> Result<(String, Address), RegistryError> {
        self.members
            .lock()
            .unwrap()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| RegistryError::CallFailed {
                call: "members(uint256)".to_string(),
                message: "index out of range".to_string(),
            })
    }
}

#[derive(Default)]
pub struct MockStore {
    pub l2_data: Mutex<HashMap<u64, Vec<u8>>>,
    pub batches: Mutex<HashMap<u64, StoredBatch>>,
    pub reads: AtomicUsize,
}

impl MockStore {
    pub fn with_l2_data(batch_number: u64, data: &[u8]) -> Self {
        let store = Self::default();
        store
            .l2_data
            .lock()
            .unwrap()
            .insert(batch_number, data.to_vec());
        store
    }

    pub fn with_batch(batch_number: u64, acc_input_hash: Hash) -> Self {
        let store = Self::default();
        store.batches.lock().unwrap().insert(
            batch_number,
            StoredBatch {
                batch_number,
                acc_input_hash,
                batch_l2_data: Vec::new(),
            },
        );
        store
    }
}

#[async_trait]
impl BatchStore for MockStore {
    async fn get_batch_l2_data_by_number(
        &self,
        batch_number: u64,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.l2_data.lock().unwrap().get(&batch_number).cloned())
    }

    async fn get_batch_by_number(
        &self,
        batch_number: u64,
    ) -> Result<Option<StoredBatch>, StoreError> {
        Ok(self.batches.lock().unwrap().get(&batch_number).cloned())
    }
}

pub struct MockTrustedSequencer {
    pub data: Option<Vec<u8>>,
    pub calls: AtomicUsize,
}

impl MockTrustedSequencer {
    pub fn new(data: Option<Vec<u8>>) -> Self {
        Self {
            data,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TrustedSequencerClient for MockTrustedSequencer {
    async fn batch_by_number(&self, batch_number: u64) -> Result<TrustedBatch, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.data {
            Some(data) => Ok(TrustedBatch {
                number: batch_number,
                batch_l2_data: data.clone(),
            }),
            None => Err(ClientError::Transport("connection refused".to_string())),
        }
    }
}

/// How a mock member answers
pub enum Behavior {
    /// Serves `data` and signs with the member's own key
    Honest { data: Vec<u8> },
    /// Serves `data` and signs with the member's own key after `delay`
    Slow { data: Vec<u8>, delay: Duration },
    /// Every call fails at the transport level
    Down,
    /// Signs with somebody else's key
    Impostor(KeyPair),
    /// Returns bytes that are not a signature
    Garbage,
    /// Never answers; flags `cancelled` when the pending call is dropped
    Hang { cancelled: Arc<AtomicBool> },
}

pub struct MockMember {
    pub keypair: KeyPair,
    pub behavior: Behavior,
    pub data_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl MockMember {
    pub fn new(keypair: KeyPair, behavior: Behavior) -> Self {
        Self {
            keypair,
            behavior,
            data_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
        }
    }

    fn data(&self) -> Option<&[u8]> {
        match &self.behavior {
            Behavior::Honest { data } | Behavior::Slow { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[async_trait]
impl MemberClient for MockMember {
    async fn get_off_chain_data(&self, _hash: Hash) -> Result<Vec<u8>, ClientError> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if let Behavior::Hang { cancelled } = &self.behavior {
            let _guard = DropFlag(cancelled.clone());
            std::future::pending::<()>().await;
        }
        self.data()
            .map(|d| d.to_vec())
            .ok_or_else(|| ClientError::Transport("member unavailable".to_string()))
    }

    async fn sign_sequence(&self, signed: &SignedSequence) -> Result<Vec<u8>, ClientError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let hash = signed.sequence.hash_to_sign();
        match &self.behavior {
            Behavior::Honest { .. } => Ok(self.keypair.sign_hash(&hash).unwrap()),
            Behavior::Slow { delay, .. } => {
                tokio::time::sleep(*delay).await;
                Ok(self.keypair.sign_hash(&hash).unwrap())
            }
            Behavior::Down => Err(ClientError::Transport("connection refused".to_string())),
            Behavior::Impostor(other) => Ok(other.sign_hash(&hash).unwrap()),
            Behavior::Garbage => Ok(vec![0xde, 0xad]),
            Behavior::Hang { cancelled } => {
                let _guard = DropFlag(cancelled.clone());
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

#[derive(Default)]
pub struct MockFactory {
    pub members: HashMap<String, Arc<MockMember>>,
}

impl MemberClientFactory for MockFactory {
    fn client(&self, endpoint: &str) -> Arc<dyn MemberClient> {
        self.members
            .get(endpoint)
            .cloned()
            .expect("unknown endpoint")
    }
}

/// Committee wired to mock members, in registration order
pub struct Harness {
    pub registry: Arc<MockRegistry>,
    pub factory: Arc<MockFactory>,
    pub members: Vec<Arc<MockMember>>,
}

impl Harness {
    pub fn new(behaviors: Vec<Behavior>, required: u64) -> Self {
        Self::with_keypairs(
            behaviors
                .into_iter()
                .map(|b| (KeyPair::generate(), b))
                .collect(),
            required,
        )
    }

    pub fn with_keypairs(setup: Vec<(KeyPair, Behavior)>, required: u64) -> Self {
        let mut factory = MockFactory::default();
        let mut registered = Vec::new();
        let mut members = Vec::new();
        for (i, (keypair, behavior)) in setup.into_iter().enumerate() {
            let endpoint = format!("http://dac-{}:8444", i);
            let member = Arc::new(MockMember::new(keypair, behavior));
            registered.push((endpoint.clone(), member.keypair.address()));
            factory.members.insert(endpoint, member.clone());
            members.push(member);
        }
        Self {
            registry: Arc::new(MockRegistry::new(registered, required)),
            factory: Arc::new(factory),
            members,
        }
    }

    pub fn directory(&self) -> CommitteeDirectory {
        CommitteeDirectory::new(self.registry.clone())
    }

    pub fn address(&self, index: usize) -> Address {
        self.members[index].keypair.address()
    }

    pub fn data_calls(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.data_calls.load(Ordering::SeqCst))
            .sum()
    }
}

pub fn config() -> DataCommitteeConfig {
    DataCommitteeConfig {
        fetch_timeout: Duration::from_secs(5),
        sign_timeout: Duration::from_secs(5),
        l2_coinbase: Address::new([0xcb; 20]),
    }
}
