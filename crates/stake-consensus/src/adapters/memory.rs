//! In-memory chain, UTXO, mempool and configuration adapters
//!
//! Used by tests and by tooling that replays blocks without a database.

use crate::domain::{BlockIndexEntry, TxMeta};
use crate::ports::{ActivationSignal, ChainIndex, MempoolView, UtxoView};
use parking_lot::RwLock;
use shared_types::{Block, Hash, OutPoint, Transaction, TxOut};
use std::collections::{HashMap, HashSet};

/// Block index keyed by block hash.
#[derive(Default)]
pub struct InMemoryChainIndex {
    entries: RwLock<HashMap<Hash, BlockIndexEntry>>,
}

impl InMemoryChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entry: BlockIndexEntry) {
        self.entries.write().insert(entry.hash, entry);
    }

    /// Record `block` as connected at `height`.
    pub fn connect(&self, block: &Block, height: u64) -> BlockIndexEntry {
        let entry = BlockIndexEntry {
            hash: block.hash(),
            height,
            parent_hash: block.header.parent_hash,
            is_connected: true,
        };
        self.insert(entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ChainIndex for InMemoryChainIndex {
    fn resolve(&self, block_hash: &Hash) -> Option<BlockIndexEntry> {
        self.entries.read().get(block_hash).cloned()
    }
}

/// Confirmed transactions plus the unspent output set.
#[derive(Default)]
pub struct InMemoryUtxoSet {
    confirmed: RwLock<HashMap<Hash, TxMeta>>,
    unspent: RwLock<HashSet<OutPoint>>,
}

impl InMemoryUtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirm `tx` at `height`, making all its outputs unspent.
    pub fn confirm(&self, tx: &Transaction, height: u64) {
        let txid = tx.txid();
        let mut unspent = self.unspent.write();
        for vout in 0..tx.outputs.len() as u32 {
            unspent.insert(OutPoint::new(txid, vout));
        }
        self.confirmed.write().insert(
            txid,
            TxMeta {
                txid,
                height,
                is_coinbase: tx.is_coinbase(),
                outputs: tx.outputs.clone(),
            },
        );
    }

    pub fn spend(&self, outpoint: &OutPoint) -> bool {
        self.unspent.write().remove(outpoint)
    }

    /// Apply a connected block: consume the staked output, spend inputs,
    /// then confirm outputs. The coinbase returns the stake as a new output.
    pub fn connect_block(&self, block: &Block, height: u64) {
        if let Some(stake) = &block.header.stake_reference {
            self.spend(stake);
        }
        for tx in &block.transactions {
            if !tx.is_coinbase() {
                for input in &tx.inputs {
                    self.spend(&input.prevout);
                }
            }
            self.confirm(tx, height);
        }
    }
}

impl UtxoView for InMemoryUtxoSet {
    fn confirmed_transaction(&self, txid: &Hash) -> Option<TxMeta> {
        self.confirmed.read().get(txid).cloned()
    }

    fn unspent_output(&self, outpoint: &OutPoint) -> Option<TxOut> {
        if !self.unspent.read().contains(outpoint) {
            return None;
        }
        self.confirmed
            .read()
            .get(&outpoint.txid)
            .and_then(|meta| meta.outputs.get(outpoint.vout as usize).cloned())
    }
}

/// Set of pending transaction ids.
#[derive(Default)]
pub struct InMemoryMempool {
    pending: RwLock<HashSet<Hash>>,
}

impl InMemoryMempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, txid: Hash) -> bool {
        self.pending.write().insert(txid)
    }

    pub fn remove(&self, txid: &Hash) -> bool {
        self.pending.write().remove(txid)
    }
}

impl MempoolView for InMemoryMempool {
    fn contains(&self, txid: &Hash) -> bool {
        self.pending.read().contains(txid)
    }
}

/// Configuration channel stand-in holding the current reported value.
#[derive(Default)]
pub struct InMemoryActivationSignal {
    value: RwLock<Option<u64>>,
}

impl InMemoryActivationSignal {
    pub fn new(value: Option<u64>) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Broadcast a new value.
    pub fn update(&self, value: Option<u64>) {
        *self.value.write() = value;
    }
}

impl ActivationSignal for InMemoryActivationSignal {
    fn first_mandatory_stake_height(&self) -> Option<u64> {
        *self.value.read()
    }
}
