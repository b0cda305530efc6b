//! Kernel target adapters

use crate::domain::{BlockIndexEntry, TxMeta};
use crate::ports::StakeKernelTarget;
use shared_types::{Block, TxOut};

/// Accepts every kernel. For networks whose stake weight rule is enforced
/// elsewhere, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllKernels;

impl StakeKernelTarget for AcceptAllKernels {
    fn meets_target(
        &self,
        _block: &Block,
        _parent: &BlockIndexEntry,
        _staked: &TxOut,
        _stake_tx: &TxMeta,
    ) -> bool {
        true
    }
}
