//! DAC Cryptography
//!
//! Keccak hashing, secp256k1 signing and signer recovery in the
//! 65-byte `r || s || v` layout the committee registry contract verifies.

use alloy_primitives::Keccak256;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use thiserror::Error;

pub use alloy_primitives::{hex, keccak256, Address, B256};

/// 32-byte keccak digest
pub type Hash = B256;

/// Length of an address as packed into the signatures blob
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a recoverable signature: r (32) || s (32) || v (1)
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id in the `v` byte
const V_OFFSET: u8 = 27;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("Invalid private key")]
    InvalidPrivateKey,
}

/// secp256k1 key pair used to authenticate as the trusted sequencer
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl KeyPair {
    /// Generate new random keypair
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Create keypair from private key hex (with or without `0x`)
    pub fn from_private_key_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_of(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Get private key as hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode_prefixed(self.signing_key.to_bytes())
    }

    /// Sign an already hashed 32-byte message.
    ///
    /// The signature is low-s normalized and carries `v` in `{27, 28}`.
    pub fn sign_hash(&self, hash: &Hash) -> Result<Vec<u8>, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        let mut out = Vec::with_capacity(SIGNATURE_LENGTH);
        out.extend_from_slice(&signature.to_bytes());
        out.push(recovery_id.to_byte() + V_OFFSET);
        Ok(out)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Recover the address that produced `signature` over `hash`.
pub fn recover_signer(hash: &Hash, signature: &[u8]) -> Result<Address, CryptoError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignatureLength(signature.len()));
    }

    let v = signature[64];
    let recovery_id = v
        .checked_sub(V_OFFSET)
        .and_then(RecoveryId::from_byte)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("invalid recovery byte {}", v)))?;

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let verifying_key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    Ok(address_of(&verifying_key))
}

/// keccak256(uncompressed_pubkey[1..])[12..]
fn address_of(verifying_key: &VerifyingKey) -> Address {
    let encoded = verifying_key.to_encoded_point(false);
    Address::from_raw_public_key(&encoded.as_bytes()[1..])
}

/// Hash the concatenation of several byte slices
pub fn keccak256_concat<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}
