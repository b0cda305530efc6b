//! Published events (Outgoing)

use crate::domain::RejectReason;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Identifier of the peer a block was received from.
pub type PeerId = [u8; 32];

/// Published when a block is permanently rejected.
///
/// Peer discipline subscribes and applies `ban_weight` to `source_peer`.
/// Transient rejections are never published.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRejectedEvent {
    pub block_hash: Hash,
    pub reason: RejectReason,
    pub ban_weight: u32,
    /// `None` for locally produced blocks.
    pub source_peer: Option<PeerId>,
}

/// Outbound consensus notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusEvent {
    /// The activation height was latched for the first time.
    ActivationLatched { height: u64 },
    BlockRejected(BlockRejectedEvent),
}
