//! Write path: quorum signature collection
//!
//! The signed sequence is sent to every committee member at once. Results
//! arrive on a single mailbox drained by the calling task, which is the only
//! place the success and failure counts are touched.

use crate::config::DataCommitteeConfig;
use crate::directory::CommitteeDirectory;
use crate::error::{AttemptError, DataCommitteeError, Result};
use dac_core::{
    BatchStore, CommitteeMember, MemberClient, MemberClientFactory, Sequence, SequenceBatch,
    SignedSequence,
};
use dac_crypto::{hex, Address, Hash, KeyPair, ADDRESS_LENGTH, SIGNATURE_LENGTH};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Outcome of asking one member to sign during one collection round
#[derive(Debug, Clone)]
pub struct MemberSignatureResult {
    pub member: CommitteeMember,
    pub outcome: std::result::Result<Vec<u8>, AttemptError>,
}

/// Valid signature attributed to its signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedSignature {
    pub signer: Address,
    pub signature: Vec<u8>,
}

/// Collects committee signatures over batch sequences
pub struct SignatureCollector {
    directory: CommitteeDirectory,
    store: Arc<dyn BatchStore>,
    clients: Arc<dyn MemberClientFactory>,
    keypair: KeyPair,
    config: DataCommitteeConfig,
}

impl SignatureCollector {
    pub fn new(
        directory: CommitteeDirectory,
        store: Arc<dyn BatchStore>,
        clients: Arc<dyn MemberClientFactory>,
        keypair: KeyPair,
        config: DataCommitteeConfig,
    ) -> Self {
        Self {
            directory,
            store,
            clients,
            keypair,
            config,
        }
    }

    /// Collect `required_signatures` member signatures over `batches`.
    ///
    /// Returns the blob the registry contract expects: the valid signatures
    /// sorted by signer address, followed by every member address in
    /// registration order. Cancelling `cancel` aborts collection.
    pub async fn post_sequence(
        &self,
        cancel: &CancellationToken,
        batches: &[SequenceBatch],
    ) -> Result<Vec<u8>> {
        let first = batches.first().ok_or(DataCommitteeError::EmptySequence)?;
        self.config.validate()?;

        let committee = self.directory.refresh().await?;
        let old_acc_input_hash = self.previous_acc_input_hash(first.batch_number).await?;

        // Authenticate as trusted sequencer by signing the sequence
        let signed = Arc::new(
            Sequence::new(batches, old_acc_input_hash, self.config.l2_coinbase)
                .sign(&self.keypair)?,
        );

        let members = committee.members.len();
        let required = committee.required_signatures as usize;
        if !committee.quorum_possible() {
            return Err(DataCommitteeError::QuorumUnreachable {
                members,
                failures: 0,
                required,
            });
        }
        if required == 0 {
            return Ok(build_signatures_and_addrs(Vec::new(), &committee.members));
        }

        let scope = cancel.child_token();
        let (tx, mut rx) = mpsc::channel(members);
        for member in committee.members.iter().cloned() {
            let client = self.clients.client(&member.endpoint);
            tokio::spawn(request_signature_from_member(
                scope.clone(),
                client,
                signed.clone(),
                member,
                self.config.sign_timeout,
                tx.clone(),
            ));
        }
        drop(tx);

        let collected = collect(cancel, &mut rx, members, required).await;

        // Stop outstanding requests whether or not quorum was reached
        scope.cancel();

        Ok(build_signatures_and_addrs(collected?, &committee.members))
    }

    async fn previous_acc_input_hash(&self, first_batch: u64) -> Result<Hash> {
        if first_batch == 0 {
            return Ok(Hash::ZERO);
        }
        let previous = first_batch - 1;
        self.store
            .get_batch_by_number(previous)
            .await?
            .map(|batch| batch.acc_input_hash)
            .ok_or(DataCommitteeError::MissingPreviousBatch(previous))
    }
}

async fn collect(
    cancel: &CancellationToken,
    rx: &mut mpsc::Receiver<MemberSignatureResult>,
    members: usize,
    required: usize,
) -> Result<Vec<CollectedSignature>> {
    let mut collected = Vec::with_capacity(required);
    let mut failures = 0usize;

    while collected.len() < required {
        let msg = tokio::select! {
            _ = cancel.cancelled() => return Err(DataCommitteeError::Cancelled),
            msg = rx.recv() => msg,
        };
        // Every task reports exactly once, so a closed mailbox means they are all accounted for
        let Some(msg) = msg else {
            return Err(DataCommitteeError::QuorumUnreachable {
                members,
                failures,
                required,
            });
        };

        match msg.outcome {
            Ok(signature) => {
                info!(member = %msg.member.address, "received signature");
                collected.push(CollectedSignature {
                    signer: msg.member.address,
                    signature,
                });
            }
            Err(e) => {
                error!(
                    member = %msg.member.address,
                    error = %e,
                    "error when trying to get signature"
                );
                failures += 1;
                if members - failures < required {
                    return Err(DataCommitteeError::QuorumUnreachable {
                        members,
                        failures,
                        required,
                    });
                }
            }
        }
    }
    Ok(collected)
}

async fn request_signature_from_member(
    scope: CancellationToken,
    client: Arc<dyn MemberClient>,
    signed: Arc<SignedSequence>,
    member: CommitteeMember,
    sign_timeout: Duration,
    tx: mpsc::Sender<MemberSignatureResult>,
) {
    info!(
        member = %member.address,
        endpoint = %member.endpoint,
        "sending request to sign the sequence"
    );
    let outcome = tokio::select! {
        _ = scope.cancelled() => {
            debug!(member = %member.address, "signature request cancelled");
            return;
        }
        outcome = sign_and_verify(client.as_ref(), &signed, &member, sign_timeout) => outcome,
    };
    // The mailbox holds one slot per member, so this never waits; the
    // receiver is gone once collection has finished
    let _ = tx.send(MemberSignatureResult { member, outcome }).await;
}

async fn sign_and_verify(
    client: &dyn MemberClient,
    signed: &SignedSequence,
    member: &CommitteeMember,
    sign_timeout: Duration,
) -> std::result::Result<Vec<u8>, AttemptError> {
    let signature = timeout(sign_timeout, client.sign_sequence(signed))
        .await
        .map_err(|_| AttemptError::Timeout(sign_timeout))??;

    let signer = signed
        .signer_of(&signature)
        .map_err(AttemptError::InvalidSignature)?;
    if signer != member.address {
        return Err(AttemptError::WrongSigner {
            expected: member.address,
            actual: signer,
        });
    }
    Ok(signature)
}

/// Signatures sorted by signer, then every member address in registration order
pub fn build_signatures_and_addrs(
    mut signatures: Vec<CollectedSignature>,
    members: &[CommitteeMember],
) -> Vec<u8> {
    signatures.sort_by_key(|s| s.signer);

    let mut res =
        Vec::with_capacity(signatures.len() * SIGNATURE_LENGTH + members.len() * ADDRESS_LENGTH);
    for sig in &signatures {
        debug!(
            signer = %sig.signer,
            signature = %hex::encode_prefixed(&sig.signature),
            "adding signature"
        );
        res.extend_from_slice(&sig.signature);
    }
    for member in members {
        debug!(address = %member.address, "adding addr");
        res.extend_from_slice(member.address.as_slice());
    }
    debug!(blob = %hex::encode_prefixed(&res), "full signatures and addresses");
    res
}
