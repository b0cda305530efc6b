//! Read-only chain views consumed by the validators

use serde::{Deserialize, Serialize};
use shared_types::{Hash, TxOut};

/// What the chain index knows about a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndexEntry {
    pub hash: Hash,
    pub height: u64,
    pub parent_hash: Hash,
    /// Block data received and connected to the active chain. Header-only
    /// entries are known but not connected.
    pub is_connected: bool,
}

/// A confirmed transaction, as seen by the UTXO view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMeta {
    pub txid: Hash,
    /// Height of the block that confirmed it.
    pub height: u64,
    pub is_coinbase: bool,
    pub outputs: Vec<TxOut>,
}
