//! Batch sequences and the signed payload sent to committee members

use crate::hex_serde;
use dac_crypto::{keccak256, keccak256_concat, recover_signer, Address, CryptoError, Hash, KeyPair};
use serde::{Deserialize, Serialize};

/// Batch as produced by the sequencer, before it is bound to a coinbase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceBatch {
    pub batch_number: u64,
    pub global_exit_root: Hash,
    pub timestamp: u64,
    #[serde(with = "hex_serde::bytes")]
    pub batch_l2_data: Vec<u8>,
}

/// Batch as committee members see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(with = "hex_serde::quantity")]
    pub number: u64,
    #[serde(rename = "globalExitRoot")]
    pub global_exit_root: Hash,
    #[serde(with = "hex_serde::quantity")]
    pub timestamp: u64,
    pub coinbase: Address,
    #[serde(rename = "L2Data", with = "hex_serde::bytes")]
    pub l2_data: Vec<u8>,
}

/// Ordered batches chained onto the previous accumulated input hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub batches: Vec<Batch>,
    #[serde(rename = "accInputHash")]
    pub old_acc_input_hash: Hash,
}

impl Sequence {
    pub fn new(batches: &[SequenceBatch], old_acc_input_hash: Hash, coinbase: Address) -> Self {
        Self {
            batches: batches
                .iter()
                .map(|b| Batch {
                    number: b.batch_number,
                    global_exit_root: b.global_exit_root,
                    timestamp: b.timestamp,
                    coinbase,
                    l2_data: b.batch_l2_data.clone(),
                })
                .collect(),
            old_acc_input_hash,
        }
    }

    /// Accumulated input hash after the last batch.
    ///
    /// Each step is `keccak256(acc || keccak256(l2_data) || ger || timestamp_be64 || coinbase)`,
    /// the same packing the registry contract uses, so this is the digest every
    /// signature in the blob commits to.
    pub fn hash_to_sign(&self) -> Hash {
        self.batches
            .iter()
            .fold(self.old_acc_input_hash, |acc, batch| {
                let data_hash = keccak256(&batch.l2_data);
                let timestamp = batch.timestamp.to_be_bytes();
                keccak256_concat([
                    acc.as_slice(),
                    data_hash.as_slice(),
                    batch.global_exit_root.as_slice(),
                    timestamp.as_slice(),
                    batch.coinbase.as_slice(),
                ])
            })
    }

    /// Authenticate the sequence with the trusted sequencer key
    pub fn sign(self, keypair: &KeyPair) -> Result<SignedSequence, CryptoError> {
        let signature = keypair.sign_hash(&self.hash_to_sign())?;
        Ok(SignedSequence {
            sequence: self,
            signature,
        })
    }
}

/// Sequence plus the signature of whoever produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedSequence {
    pub sequence: Sequence,
    #[serde(with = "hex_serde::bytes")]
    pub signature: Vec<u8>,
}

impl SignedSequence {
    /// Address that produced [`Self::signature`]
    pub fn signer(&self) -> Result<Address, CryptoError> {
        recover_signer(&self.sequence.hash_to_sign(), &self.signature)
    }

    /// Address that produced `signature` over this sequence
    pub fn signer_of(&self, signature: &[u8]) -> Result<Address, CryptoError> {
        recover_signer(&self.sequence.hash_to_sign(), signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(number: u64, data: &[u8]) -> SequenceBatch {
        SequenceBatch {
            batch_number: number,
            global_exit_root: Hash::new([number as u8; 32]),
            timestamp: 1_700_000_000 + number,
            batch_l2_data: data.to_vec(),
        }
    }

    #[test]
    fn test_empty_sequence_hash_is_previous_accumulator() {
        let prev = keccak256(b"prev");
        let sequence = Sequence::new(&[], prev, Address::ZERO);
        assert_eq!(sequence.hash_to_sign(), prev);
    }

    #[test]
    fn test_accumulator_matches_manual_packing() {
        let coinbase = Address::new([0xcb; 20]);
        let b = batch(1, b"txs");
        let sequence = Sequence::new(std::slice::from_ref(&b), Hash::ZERO, coinbase);

        let mut packed = Vec::new();
        packed.extend_from_slice(Hash::ZERO.as_slice());
        packed.extend_from_slice(keccak256(b"txs").as_slice());
        packed.extend_from_slice(b.global_exit_root.as_slice());
        packed.extend_from_slice(&b.timestamp.to_be_bytes());
        packed.extend_from_slice(coinbase.as_slice());
        assert_eq!(packed.len(), 32 + 32 + 32 + 8 + 20);

        assert_eq!(sequence.hash_to_sign(), keccak256(&packed));
    }

    #[test]
    fn test_accumulator_depends_on_order() {
        let a = batch(1, b"a");
        let b = batch(2, b"b");
        let forward = Sequence::new(&[a.clone(), b.clone()], Hash::ZERO, Address::ZERO);
        let backward = Sequence::new(&[b, a], Hash::ZERO, Address::ZERO);
        assert_ne!(forward.hash_to_sign(), backward.hash_to_sign());
    }

    #[test]
    fn test_signed_sequence_signer() {
        let keypair = KeyPair::generate();
        let signed = Sequence::new(&[batch(5, b"data")], Hash::ZERO, Address::ZERO)
            .sign(&keypair)
            .unwrap();
        assert_eq!(signed.signer().unwrap(), keypair.address());

        let member = KeyPair::generate();
        let member_sig = member.sign_hash(&signed.sequence.hash_to_sign()).unwrap();
        assert_eq!(signed.signer_of(&member_sig).unwrap(), member.address());
    }

    #[test]
    fn test_json_field_names() {
        let sequence = Sequence::new(&[batch(26, &[0xab])], Hash::ZERO, Address::ZERO);
        let json = serde_json::to_value(&sequence).unwrap();
        let first = &json["batches"][0];
        assert_eq!(first["number"], "0x1a");
        assert_eq!(first["L2Data"], "0xab");
        assert!(first.get("globalExitRoot").is_some());
        assert!(json.get("accInputHash").is_some());
    }
}
