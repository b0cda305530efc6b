//! Block body rules for the block validity pipeline
//!
//! Run after the kernel check. The header and its stake signature commit to
//! the body only through the merkle root, so the root is checked first. The
//! payout rule then proves the staked value went back to its owner.

use super::{RejectReason, ValidationOutcome};
use crate::ports::UtxoView;
use shared_types::Block;

/// The header's merkle root must commit to the transactions carried.
pub fn check_merkle_root(block: &Block) -> ValidationOutcome {
    if block.header.merkle_root == block.compute_merkle_root() {
        return ValidationOutcome::Valid;
    }
    tracing::debug!(
        block = %hex::encode(block.hash()),
        transactions = block.transactions.len(),
        "[stake] merkle root does not match block body"
    );
    ValidationOutcome::invalid(RejectReason::MerkleRootMismatch)
}

/// Every block needs a coinbase; a PoS coinbase must pay the staked value
/// back to the staked output's owner in its first output.
pub fn check_coinbase_payout<U>(block: &Block, utxos: &U) -> ValidationOutcome
where
    U: UtxoView + ?Sized,
{
    let Some(coinbase) = block.coinbase() else {
        return ValidationOutcome::invalid(RejectReason::CoinbaseMissing);
    };

    let Some(reference) = block.header.stake_reference else {
        return ValidationOutcome::Valid;
    };

    let Some(staked) = utxos.unspent_output(&reference) else {
        return ValidationOutcome::invalid(RejectReason::UnknownStake);
    };

    match coinbase.outputs.first() {
        Some(payout) if payout.owner == staked.owner && payout.value >= staked.value => {
            ValidationOutcome::Valid
        }
        _ => {
            tracing::debug!(
                block = %hex::encode(block.hash()),
                "[stake] coinbase does not return stake to its owner"
            );
            ValidationOutcome::invalid(RejectReason::CoinbaseStakePayout)
        }
    }
}
