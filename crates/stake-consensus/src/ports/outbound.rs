//! Driven ports (Outbound dependencies)
//!
//! Everything the validators read is supplied through these capability
//! traits, so the core can be exercised against in-memory fakes. Callers
//! must hand in views that reflect one consistent instant.

use crate::domain::{BlockIndexEntry, TxMeta};
use crate::events::ConsensusEvent;
use async_trait::async_trait;
use shared_types::{Block, Hash, OutPoint, OutputOwner, StakeSignature, TxOut};

/// Authenticated network configuration channel.
pub trait ActivationSignal: Send + Sync {
    /// Current candidate for the first height at which PoS is mandatory.
    /// `None` while the network has not reported one.
    fn first_mandatory_stake_height(&self) -> Option<u64>;
}

/// Block index lookups.
pub trait ChainIndex: Send + Sync {
    fn resolve(&self, block_hash: &Hash) -> Option<BlockIndexEntry>;
}

/// Confirmed transactions and the unspent output set.
pub trait UtxoView: Send + Sync {
    /// A transaction confirmed in the active chain.
    fn confirmed_transaction(&self, txid: &Hash) -> Option<TxMeta>;

    /// The output, if it is confirmed and still unspent.
    fn unspent_output(&self, outpoint: &OutPoint) -> Option<TxOut>;
}

/// Pending transaction membership.
pub trait MempoolView: Send + Sync {
    fn contains(&self, txid: &Hash) -> bool;
}

/// Signature verification, shared with the script subsystem.
pub trait StakeSignatureVerifier: Send + Sync {
    /// True if `signature` over `message` was made by `owner`.
    fn verify(&self, owner: &OutputOwner, message: &Hash, signature: &StakeSignature) -> bool;
}

/// Stake weight / difficulty rule.
///
/// The kernel target function belongs to the network's PoS weight model and
/// is supplied by the node.
pub trait StakeKernelTarget: Send + Sync {
    fn meets_target(
        &self,
        block: &Block,
        parent: &BlockIndexEntry,
        staked: &TxOut,
        stake_tx: &TxMeta,
    ) -> bool;
}

/// Outbound consensus notifications.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: ConsensusEvent) -> Result<(), String>;
}
