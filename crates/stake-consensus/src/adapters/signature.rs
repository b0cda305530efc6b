//! secp256k1 stake signature verification
//!
//! Recovers the signer from a (r, s, v) signature over the block hash and
//! compares it with the staked output's owner. High-S signatures are
//! rejected so a valid stake signature cannot be re-encoded.

use crate::ports::StakeSignatureVerifier;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use shared_types::{keccak256, Address, CompressedPublicKey, Hash, OutputOwner, StakeSignature};

/// k256-backed verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1StakeVerifier;

impl Secp256k1StakeVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Recover the signing key. `None` for malformed or high-S signatures.
    pub fn recover(&self, message: &Hash, signature: &StakeSignature) -> Option<VerifyingKey> {
        let recovery_id = parse_recovery_id(signature.v)?;

        let mut sig_bytes = [0u8; 64];
        sig_bytes[..32].copy_from_slice(&signature.r);
        sig_bytes[32..].copy_from_slice(&signature.s);
        let sig = Signature::from_slice(&sig_bytes).ok()?;

        if sig.normalize_s().is_some() {
            return None;
        }

        VerifyingKey::recover_from_prehash(message, &sig, recovery_id).ok()
    }
}

impl StakeSignatureVerifier for Secp256k1StakeVerifier {
    fn verify(&self, owner: &OutputOwner, message: &Hash, signature: &StakeSignature) -> bool {
        let Some(key) = self.recover(message, signature) else {
            return false;
        };
        match owner {
            OutputOwner::PubKey(expected) => compressed_pubkey(&key) == *expected,
            OutputOwner::Address(expected) => address_from_pubkey(&key) == *expected,
        }
    }
}

/// Accepts 0, 1, 27 and 28.
fn parse_recovery_id(v: u8) -> Option<RecoveryId> {
    match v {
        0 | 1 => RecoveryId::from_byte(v),
        27 | 28 => RecoveryId::from_byte(v - 27),
        _ => None,
    }
}

/// SEC1 compressed encoding.
pub fn compressed_pubkey(key: &VerifyingKey) -> CompressedPublicKey {
    let encoded = key.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    out
}

/// Last 20 bytes of Keccak-256 over the uncompressed key, without the
/// 0x04 prefix.
pub fn address_from_pubkey(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Signing helpers for tests and local tooling. Block signing proper
/// belongs to the wallet.
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Deterministic key from a seed byte (seed must be non-zero).
    pub fn signing_key(seed: u8) -> SigningKey {
        let mut bytes = [0u8; 32];
        bytes[31] = seed.max(1);
        bytes[0] = 0x42;
        SigningKey::from_slice(&bytes).expect("valid secret scalar")
    }

    /// Sign a block hash, normalizing to low-S.
    pub fn sign(message: &Hash, key: &SigningKey) -> StakeSignature {
        let (sig, recid) = key
            .sign_prehash_recoverable(message)
            .expect("signing failed");
        let (sig, recid) = match sig.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced()),
            ),
            None => (sig, recid),
        };

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        StakeSignature {
            r,
            s,
            v: recid.to_byte() + 27,
        }
    }

    pub fn address_owner(key: &SigningKey) -> OutputOwner {
        OutputOwner::Address(address_from_pubkey(key.verifying_key()))
    }

    pub fn pubkey_owner(key: &SigningKey) -> OutputOwner {
        OutputOwner::PubKey(compressed_pubkey(key.verifying_key()))
    }
}
