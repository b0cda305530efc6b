//! Stake Consensus Service
//!
//! Wires the activation gate, linkage checker and kernel validator to the
//! chain views, and classifies outcomes for the caller.
//!
//! # Architecture
//! - Validation is read-only against the supplied views
//! - The activation latch and the announced activation height are the
//!   only shared mutable state
//! - Permanent rejections are published for peer discipline; transient
//!   ones are handed back for requeueing without penalty

use crate::adapters::AcceptAllKernels;
use crate::config::ConsensusParams;
use crate::domain::{
    check_coinbase_payout, check_merkle_root, ActivationGate, BlockDisposition, ChainSnapshot,
    ConsensusError, ConsensusResult, ConsensusRule, RejectReason, StakeKernelValidator,
    ValidationOutcome,
};
use crate::events::{BlockRejectedEvent, ConsensusEvent, PeerId};
use crate::metrics;
use crate::ports::{
    ChainIndex, EventBus, MempoolView, StakeConsensusApi, StakeKernelTarget,
    StakeSignatureVerifier, UtxoView,
};
use async_trait::async_trait;
use shared_types::Block;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// `announced_height` value before any activation height was published.
const NOT_ANNOUNCED: u64 = u64::MAX;

/// Stake Consensus Service
pub struct StakeConsensusService<C, U, M, S, E>
where
    C: ChainIndex,
    U: UtxoView,
    M: MempoolView,
    S: StakeSignatureVerifier,
    E: EventBus,
{
    chain: Arc<C>,
    utxos: Arc<U>,
    mempool: Arc<M>,
    sig_verifier: Arc<S>,
    event_bus: Arc<E>,
    gate: Arc<ActivationGate>,
    params: ConsensusParams,
    kernel_target: Box<dyn StakeKernelTarget>,
    /// Last activation height published on the event bus.
    announced_height: AtomicU64,
}

/// Dependencies for StakeConsensusService
pub struct StakeConsensusDependencies<C, U, M, S, E> {
    pub chain: Arc<C>,
    pub utxos: Arc<U>,
    pub mempool: Arc<M>,
    pub sig_verifier: Arc<S>,
    pub event_bus: Arc<E>,
    pub gate: Arc<ActivationGate>,
    pub params: ConsensusParams,
}

impl<C, U, M, S, E> StakeConsensusService<C, U, M, S, E>
where
    C: ChainIndex,
    U: UtxoView,
    M: MempoolView,
    S: StakeSignatureVerifier,
    E: EventBus,
{
    /// Create a new StakeConsensusService
    pub fn new(deps: StakeConsensusDependencies<C, U, M, S, E>) -> ConsensusResult<Self> {
        deps.params.validate()?;
        Ok(Self {
            chain: deps.chain,
            utxos: deps.utxos,
            mempool: deps.mempool,
            sig_verifier: deps.sig_verifier,
            event_bus: deps.event_bus,
            gate: deps.gate,
            params: deps.params,
            kernel_target: Box::new(AcceptAllKernels),
            announced_height: AtomicU64::new(NOT_ANNOUNCED),
        })
    }

    /// Set the network's kernel target rule
    pub fn with_kernel_target(mut self, kernel_target: Box<dyn StakeKernelTarget>) -> Self {
        self.kernel_target = kernel_target;
        self
    }

    pub fn gate(&self) -> &ActivationGate {
        &self.gate
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    fn snapshot(&self) -> ChainSnapshot<'_> {
        ChainSnapshot {
            chain: self.chain.as_ref(),
            utxos: self.utxos.as_ref(),
            mempool: self.mempool.as_ref(),
        }
    }

    fn kernel_validator(&self) -> StakeKernelValidator<'_> {
        StakeKernelValidator::new(
            &self.gate,
            &self.params,
            self.sig_verifier.as_ref(),
            self.kernel_target.as_ref(),
        )
    }

    async fn publish(&self, event: ConsensusEvent) -> ConsensusResult<()> {
        self.event_bus
            .publish(event)
            .await
            .map_err(ConsensusError::EventBus)
    }

    /// Publish the latched activation height once, whichever check latched
    /// it. A failed publish is retried on the next call.
    async fn announce_activation(&self) -> ConsensusResult<()> {
        let Some(height) = self.gate.resolve() else {
            return Ok(());
        };
        let previous = self.announced_height.swap(height, Ordering::AcqRel);
        if previous == height {
            return Ok(());
        }
        if let Err(err) = self
            .publish(ConsensusEvent::ActivationLatched { height })
            .await
        {
            let _ = self.announced_height.compare_exchange(
                height,
                previous,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl<C, U, M, S, E> StakeConsensusApi for StakeConsensusService<C, U, M, S, E>
where
    C: ChainIndex,
    U: UtxoView,
    M: MempoolView,
    S: StakeSignatureVerifier,
    E: EventBus,
{
    fn required_rule(&self, height: u64) -> ConsensusRule {
        self.gate.required_rule(height)
    }

    fn check_proof_of_stake(&self, block: &Block) -> ValidationOutcome {
        let started = Instant::now();
        metrics::record_stake_checked();

        let outcome = self
            .kernel_validator()
            .check_proof_of_stake(block, &self.snapshot());

        metrics::record_validation_latency(started.elapsed().as_secs_f64());
        outcome
    }

    fn check_block_consensus(&self, block: &Block) -> ValidationOutcome {
        let parent = self
            .chain
            .resolve(&block.header.parent_hash)
            .filter(|entry| entry.is_connected);

        // Without a parent the height is unknown; PoS claims still go through
        // the kernel so stake conclusions come back in their transient form.
        let Some(parent) = parent else {
            if block.is_proof_of_stake() {
                return self.check_proof_of_stake(block);
            }
            return ValidationOutcome::invalid(RejectReason::BadPrevHeader);
        };

        let height = parent.height + 1;
        match (self.gate.required_rule(height), block.is_proof_of_stake()) {
            (_, true) => self.check_proof_of_stake(block),
            (ConsensusRule::ProofOfWork, false) => ValidationOutcome::Valid,
            (ConsensusRule::ProofOfStake, false) => {
                tracing::debug!(
                    block = %hex::encode(block.hash()),
                    height,
                    "[stake] proof-of-work block after activation"
                );
                ValidationOutcome::invalid(RejectReason::PowAfterActivation)
            }
        }
    }

    fn check_block_validity(&self, block: &Block) -> ValidationOutcome {
        let outcome = self.check_block_consensus(block);
        if !outcome.is_valid() {
            return outcome;
        }
        let outcome = check_merkle_root(block);
        if !outcome.is_valid() {
            return outcome;
        }
        check_coinbase_payout(block, self.utxos.as_ref())
    }

    async fn process_block(
        &self,
        block: &Block,
        source_peer: Option<PeerId>,
    ) -> ConsensusResult<BlockDisposition> {
        self.announce_activation().await?;

        let outcome = self.check_block_validity(block);
        let disposition = BlockDisposition::from(outcome);

        match disposition {
            BlockDisposition::Accept => {}
            BlockDisposition::Requeue(reason) => {
                metrics::record_block_rejected(reason.as_str());
                tracing::debug!(
                    block = %hex::encode(block.hash()),
                    reason = %reason,
                    "[stake] block requeued until chain context arrives"
                );
            }
            BlockDisposition::Reject { reason, ban_weight } => {
                metrics::record_block_rejected(reason.as_str());
                tracing::warn!(
                    block = %hex::encode(block.hash()),
                    reason = %reason,
                    ban_weight,
                    peer = ?source_peer.map(hex::encode),
                    "[stake] block rejected"
                );
                self.publish(ConsensusEvent::BlockRejected(BlockRejectedEvent {
                    block_hash: block.hash(),
                    reason,
                    ban_weight,
                    source_peer,
                }))
                .await?;
            }
        }

        Ok(disposition)
    }
}
