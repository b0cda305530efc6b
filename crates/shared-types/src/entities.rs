//! # Core Chain Entities
//!
//! Defines the UTXO chain entities that the consensus core reads but never
//! owns: outputs, transactions, headers and blocks.
//!
//! ## Clusters
//!
//! - **Outputs**: `OutPoint`, `TxOut`, `OutputOwner`
//! - **Chain**: `Transaction`, `BlockHeader`, `Block`
//! - **Stake**: `StakeSignature`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha3::{Digest, Keccak256};

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte address derived from a secp256k1 public key.
pub type Address = [u8; 20];

/// A compressed secp256k1 public key (SEC1, 33 bytes).
pub type CompressedPublicKey = [u8; 33];

/// The all-zero hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Keccak-256 over arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// CLUSTER A: OUTPUTS
// =============================================================================

/// Reference to a single transaction output.
///
/// A proof-of-stake block uses one of these as its stake reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction that created the output.
    pub txid: Hash,
    /// Index of the output within that transaction.
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Hash, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// The marker prevout carried by a coinbase input.
    pub fn null() -> Self {
        Self {
            txid: ZERO_HASH,
            vout: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.txid == ZERO_HASH && self.vout == u32::MAX
    }
}

/// The party controlling an output.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputOwner {
    /// Pay-to-pubkey: the compressed key itself.
    PubKey(#[serde_as(as = "Bytes")] CompressedPublicKey),
    /// Pay-to-address: last 20 bytes of Keccak-256 over the uncompressed key
    /// (without the 0x04 prefix).
    Address(Address),
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in base units.
    pub value: u64,
    /// Who can spend it.
    pub owner: OutputOwner,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// The output being spent.
    pub prevout: OutPoint,
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// A UTXO transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    /// Full block height for coinbases.
    pub lock_time: u64,
}

impl Transaction {
    /// Build a coinbase paying `outputs`. The full `height` is committed
    /// through the lock time so coinbases at different heights have
    /// distinct ids.
    pub fn coinbase(height: u64, outputs: Vec<TxOut>) -> Self {
        Self {
            version: 1,
            inputs: vec![TxIn {
                prevout: OutPoint::null(),
            }],
            outputs,
            lock_time: height,
        }
    }

    /// Compute the transaction id.
    pub fn txid(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update((self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.prevout.txid);
            hasher.update(input.prevout.vout.to_le_bytes());
        }
        hasher.update((self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            hasher.update(output.value.to_le_bytes());
            match &output.owner {
                OutputOwner::PubKey(key) => {
                    hasher.update([0u8]);
                    hasher.update(key);
                }
                OutputOwner::Address(address) => {
                    hasher.update([1u8]);
                    hasher.update(address);
                }
            }
        }
        hasher.update(self.lock_time.to_le_bytes());
        hasher.finalize().into()
    }

    /// A coinbase has exactly one input and it spends the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

}

/// Block header.
///
/// The stake reference is part of the header so a block's identity commits
/// to the output it stakes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    /// Hash of the parent block.
    pub parent_hash: Hash,
    /// Keccak-256 over the transaction ids, in order.
    pub merkle_root: Hash,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    /// Compact difficulty target (PoW blocks).
    pub bits: u32,
    /// PoW nonce. Zero for PoS blocks.
    pub nonce: u64,
    /// Output staked by a proof-of-stake block. `None` for proof-of-work.
    pub stake_reference: Option<OutPoint>,
}

impl BlockHeader {
    /// Compute the block hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.merkle_root);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.bits.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        match &self.stake_reference {
            Some(stake) => {
                hasher.update([1u8]);
                hasher.update(stake.txid);
                hasher.update(stake.vout.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.finalize().into()
    }
}

/// A candidate block as received from the network or built locally.
///
/// `transactions[0]` is the coinbase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    /// Signature over `hash()` by the owner of the staked output.
    pub stake_signature: Option<StakeSignature>,
}

impl Block {
    /// Block identity. The stake signature is not covered.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn is_proof_of_stake(&self) -> bool {
        self.header.stake_reference.is_some()
    }

    pub fn is_proof_of_work(&self) -> bool {
        !self.is_proof_of_stake()
    }

    /// The first transaction, if it is a coinbase.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    /// Merkle commitment over the current transaction list.
    pub fn compute_merkle_root(&self) -> Hash {
        let mut hasher = Keccak256::new();
        for tx in &self.transactions {
            hasher.update(tx.txid());
        }
        hasher.finalize().into()
    }
}

// =============================================================================
// CLUSTER C: STAKE
// =============================================================================

/// Recoverable secp256k1 signature (r, s, v).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}
