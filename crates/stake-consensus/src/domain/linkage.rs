//! Parent linkage checks
//!
//! An unknown parent is not the sender's fault: blocks routinely arrive out
//! of order, so the rejection is transient. A known parent that sits before
//! the point where PoS extension is permitted is a provable violation.

use super::{ActivationGate, BlockIndexEntry, ConsensusRule, RejectReason, ValidationOutcome};
use crate::ports::ChainIndex;
use shared_types::Block;

/// Where the candidate attaches to the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkageStatus {
    /// Parent known and connected; candidate height is `parent.height + 1`.
    Linked(BlockIndexEntry),
    /// Parent not received or not connected yet.
    Missing,
    /// Permanent violation.
    Violation(RejectReason),
}

impl LinkageStatus {
    pub fn to_outcome(&self) -> ValidationOutcome {
        match self {
            LinkageStatus::Linked(_) => ValidationOutcome::Valid,
            LinkageStatus::Missing => ValidationOutcome::invalid(RejectReason::BadPrevHeader),
            LinkageStatus::Violation(reason) => ValidationOutcome::invalid(*reason),
        }
    }
}

/// Validates that a block's declared parent is known, connected and
/// consistent with the PoS fork point.
pub struct ChainLinkageChecker<'a> {
    gate: &'a ActivationGate,
}

impl<'a> ChainLinkageChecker<'a> {
    pub fn new(gate: &'a ActivationGate) -> Self {
        Self { gate }
    }

    /// Resolve the parent and classify the linkage.
    pub fn inspect<C>(&self, block: &Block, chain: &C) -> LinkageStatus
    where
        C: ChainIndex + ?Sized,
    {
        let parent = match chain.resolve(&block.header.parent_hash) {
            Some(entry) if entry.is_connected => entry,
            _ => return LinkageStatus::Missing,
        };

        if block.is_proof_of_stake() {
            let height = parent.height + 1;
            if self.gate.required_rule(height) == ConsensusRule::ProofOfWork {
                return LinkageStatus::Violation(RejectReason::StakeAfterFork);
            }
        }

        LinkageStatus::Linked(parent)
    }

    pub fn check_linkage<C>(&self, block: &Block, chain: &C) -> ValidationOutcome
    where
        C: ChainIndex + ?Sized,
    {
        self.inspect(block, chain).to_outcome()
    }
}
