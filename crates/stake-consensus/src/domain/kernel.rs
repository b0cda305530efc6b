//! Stake kernel validation
//!
//! Proves that the party behind a PoS block is entitled to stake on top of
//! its parent. It does not prove the reward was paid out correctly; the
//! coinbase payout rule runs later in the block validity pipeline.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. linkage (fork point is permanent, missing parent is held as pending)
//! 2. stake reference resolves to a confirmed, unspent output
//! 3. pending linkage is reported
//! 4. coinbase maturity
//! 5. stake signature
//! 6. kernel target
//!
//! Stake conclusions are only permanent when the chain context needed to
//! reach them is fully known. While the parent is missing, every stake
//! rejection is reported through its transient `tmp-` variant.

use super::{
    ActivationGate, BlockIndexEntry, ChainLinkageChecker, LinkageStatus, RejectReason, TxMeta,
    ValidationOutcome,
};
use crate::config::ConsensusParams;
use crate::ports::{ChainIndex, MempoolView, StakeKernelTarget, StakeSignatureVerifier, UtxoView};
use shared_types::{Block, TxOut};

/// Read-only views of chain state, taken at a single instant.
#[derive(Clone, Copy)]
pub struct ChainSnapshot<'a> {
    pub chain: &'a dyn ChainIndex,
    pub utxos: &'a dyn UtxoView,
    pub mempool: &'a dyn MempoolView,
}

/// The output a block stakes, resolved against the UTXO view.
struct ResolvedStake {
    output: TxOut,
    meta: TxMeta,
}

/// Central proof-of-stake check.
///
/// Holds no mutable state; safe to call repeatedly and concurrently.
pub struct StakeKernelValidator<'a> {
    gate: &'a ActivationGate,
    params: &'a ConsensusParams,
    verifier: &'a dyn StakeSignatureVerifier,
    target: &'a dyn StakeKernelTarget,
}

impl<'a> StakeKernelValidator<'a> {
    pub fn new(
        gate: &'a ActivationGate,
        params: &'a ConsensusParams,
        verifier: &'a dyn StakeSignatureVerifier,
        target: &'a dyn StakeKernelTarget,
    ) -> Self {
        Self {
            gate,
            params,
            verifier,
            target,
        }
    }

    pub fn check_proof_of_stake(&self, block: &Block, snapshot: &ChainSnapshot<'_>) -> ValidationOutcome {
        let parent = match ChainLinkageChecker::new(self.gate).inspect(block, snapshot.chain) {
            LinkageStatus::Linked(parent) => Some(parent),
            LinkageStatus::Missing => None,
            LinkageStatus::Violation(reason) => return self.reject(block, reason),
        };

        let stake = match self.resolve_stake(block, snapshot) {
            Ok(stake) => stake,
            Err(reason) if parent.is_none() => return self.reject(block, reason.downgraded()),
            Err(reason) => return self.reject(block, reason),
        };

        let Some(parent) = parent else {
            return self.reject(block, RejectReason::BadPrevHeader);
        };

        if let Err(reason) = self.check_maturity(&parent, &stake) {
            return self.reject(block, reason);
        }

        if let Err(reason) = self.check_signature(block, &stake) {
            return self.reject(block, reason);
        }

        if !self
            .target
            .meets_target(block, &parent, &stake.output, &stake.meta)
        {
            return self.reject(block, RejectReason::StakeKernel);
        }

        tracing::trace!(
            block = %hex::encode(block.hash()),
            height = parent.height + 1,
            stake_value = stake.output.value,
            "[stake] stake claim accepted"
        );
        ValidationOutcome::Valid
    }

    /// The stake must be a confirmed, unspent output. Pending transactions
    /// are told apart from fabricated references.
    fn resolve_stake(
        &self,
        block: &Block,
        snapshot: &ChainSnapshot<'_>,
    ) -> Result<ResolvedStake, RejectReason> {
        let reference = block
            .header
            .stake_reference
            .ok_or(RejectReason::UnknownStake)?;

        let confirmed = snapshot.utxos.unspent_output(&reference).and_then(|output| {
            snapshot
                .utxos
                .confirmed_transaction(&reference.txid)
                .map(|meta| ResolvedStake { output, meta })
        });

        match confirmed {
            Some(stake) => Ok(stake),
            None if snapshot.mempool.contains(&reference.txid) => {
                Err(RejectReason::StakeInMempool)
            }
            None => Err(RejectReason::UnknownStake),
        }
    }

    /// Coinbase outputs must be `coinbase_maturity` blocks deep, counted
    /// from the parent of the staking block.
    fn check_maturity(
        &self,
        parent: &BlockIndexEntry,
        stake: &ResolvedStake,
    ) -> Result<(), RejectReason> {
        if !stake.meta.is_coinbase {
            return Ok(());
        }
        let age = parent.height.saturating_sub(stake.meta.height);
        if age < self.params.coinbase_maturity {
            return Err(RejectReason::StakeCoinbaseMaturity);
        }
        Ok(())
    }

    fn check_signature(&self, block: &Block, stake: &ResolvedStake) -> Result<(), RejectReason> {
        let signature = block
            .stake_signature
            .as_ref()
            .ok_or(RejectReason::StakeSignature)?;
        if !self
            .verifier
            .verify(&stake.output.owner, &block.hash(), signature)
        {
            return Err(RejectReason::StakeSignature);
        }
        Ok(())
    }

    fn reject(&self, block: &Block, reason: RejectReason) -> ValidationOutcome {
        tracing::debug!(
            block = %hex::encode(block.hash()),
            reason = %reason,
            transient = reason.is_transient(),
            ban_weight = reason.ban_weight(),
            "[stake] proof of stake rejected"
        );
        ValidationOutcome::invalid(reason)
    }
}
