//! Driving ports (Inbound API)

use crate::domain::{BlockDisposition, ConsensusResult, ConsensusRule, ValidationOutcome};
use crate::events::PeerId;
use async_trait::async_trait;
use shared_types::Block;

/// Primary stake consensus API, called by the block validity pipeline.
#[async_trait]
pub trait StakeConsensusApi: Send + Sync {
    /// Rule required for a block at `height`. Latches the activation height
    /// on first observation.
    fn required_rule(&self, height: u64) -> ConsensusRule;

    /// Stake kernel check only. `Valid` proves entitlement to stake, not a
    /// correct payout.
    fn check_proof_of_stake(&self, block: &Block) -> ValidationOutcome;

    /// Dispatch on the rule required at the block's height.
    fn check_block_consensus(&self, block: &Block) -> ValidationOutcome;

    /// Consensus dispatch plus the merkle root and coinbase payout rules.
    fn check_block_validity(&self, block: &Block) -> ValidationOutcome;

    /// Validate and classify a block received from `source_peer`, publishing
    /// permanent rejections for peer discipline.
    async fn process_block(
        &self,
        block: &Block,
        source_peer: Option<PeerId>,
    ) -> ConsensusResult<BlockDisposition>;
}
