//! Validation outcome model
//!
//! Every consensus check returns a [`ValidationOutcome`]. Rejections carry a
//! [`RejectReason`] whose wire string, transience and ban weight are fixed by
//! the reason itself, so the ban-weight invariant holds by construction:
//! a transient rejection never penalizes the sender.

use super::ConsensusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ban weight applied to peers relaying a permanently invalid block.
pub const PERMANENT_BAN_WEIGHT: u32 = 100;

/// Closed set of reject reasons.
///
/// The string forms are observed by peers and test tooling and must not
/// change. (`bad-unkown-stake` is spelled that way on the wire.)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RejectReason {
    /// Parent block is not known or not connected yet.
    BadPrevHeader,
    /// Block claims PoS on top of a parent where PoS is not yet permitted.
    StakeAfterFork,
    /// Stake reference resolves to nothing.
    UnknownStake,
    /// `UnknownStake` while the chain context is incomplete.
    TmpUnknownStake,
    /// Stake reference points at an unconfirmed mempool transaction.
    StakeInMempool,
    /// `StakeInMempool` while the chain context is incomplete.
    TmpStakeInMempool,
    /// Staked coinbase output is not mature.
    StakeCoinbaseMaturity,
    /// Stake signature missing or not made by the staked output's owner.
    StakeSignature,
    /// Stake kernel does not meet the target.
    StakeKernel,
    /// Proof-of-work block at or after the activation height.
    PowAfterActivation,
    /// Block has no coinbase transaction.
    CoinbaseMissing,
    /// Coinbase does not return the stake to its owner.
    CoinbaseStakePayout,
    /// Header merkle root does not commit to the transactions carried.
    MerkleRootMismatch,
}

impl RejectReason {
    pub const ALL: [RejectReason; 13] = [
        RejectReason::BadPrevHeader,
        RejectReason::StakeAfterFork,
        RejectReason::UnknownStake,
        RejectReason::TmpUnknownStake,
        RejectReason::StakeInMempool,
        RejectReason::TmpStakeInMempool,
        RejectReason::StakeCoinbaseMaturity,
        RejectReason::StakeSignature,
        RejectReason::StakeKernel,
        RejectReason::PowAfterActivation,
        RejectReason::CoinbaseMissing,
        RejectReason::CoinbaseStakePayout,
        RejectReason::MerkleRootMismatch,
    ];

    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::BadPrevHeader => "bad-prev-header",
            RejectReason::StakeAfterFork => "bad-stake-after-fork",
            RejectReason::UnknownStake => "bad-unkown-stake",
            RejectReason::TmpUnknownStake => "tmp-bad-unkown-stake",
            RejectReason::StakeInMempool => "bad-stake-mempool",
            RejectReason::TmpStakeInMempool => "tmp-bad-stake-mempool",
            RejectReason::StakeCoinbaseMaturity => "bad-stake-coinbase-maturity",
            RejectReason::StakeSignature => "bad-stake-signature",
            RejectReason::StakeKernel => "bad-stake-kernel",
            RejectReason::PowAfterActivation => "bad-blk-pow-after-activation",
            RejectReason::CoinbaseMissing => "bad-cb-missing",
            RejectReason::CoinbaseStakePayout => "bad-cb-stake-payout",
            RejectReason::MerkleRootMismatch => "bad-txnmrklroot",
        }
    }

    /// Transient reasons may resolve once missing chain context arrives.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RejectReason::BadPrevHeader
                | RejectReason::TmpUnknownStake
                | RejectReason::TmpStakeInMempool
        )
    }

    pub fn ban_weight(&self) -> u32 {
        if self.is_transient() {
            0
        } else {
            PERMANENT_BAN_WEIGHT
        }
    }

    /// The variant to report when the chain context needed to reach this
    /// conclusion is incomplete. Reasons without a transient variant are
    /// returned unchanged.
    pub fn downgraded(self) -> Self {
        match self {
            RejectReason::UnknownStake => RejectReason::TmpUnknownStake,
            RejectReason::StakeInMempool => RejectReason::TmpStakeInMempool,
            other => other,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectReason {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RejectReason::ALL
            .iter()
            .copied()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| ConsensusError::UnknownRejectReason(s.to_string()))
    }
}

impl TryFrom<String> for RejectReason {
    type Error = ConsensusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RejectReason> for String {
    fn from(reason: RejectReason) -> Self {
        reason.as_str().to_string()
    }
}

/// A rejected block: reason plus the derived transience and ban weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rejection {
    reason: RejectReason,
}

impl Rejection {
    pub fn reason(&self) -> RejectReason {
        self.reason
    }

    pub fn is_transient(&self) -> bool {
        self.reason.is_transient()
    }

    pub fn ban_weight(&self) -> u32 {
        self.reason.ban_weight()
    }
}

/// Result of a consensus check. Built fresh per call, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum ValidationOutcome {
    Valid,
    Invalid(Rejection),
}

impl ValidationOutcome {
    pub fn invalid(reason: RejectReason) -> Self {
        ValidationOutcome::Invalid(Rejection { reason })
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(rejection) => Some(rejection),
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        self.rejection().map(Rejection::reason)
    }

    /// True only for permanent rejections.
    pub fn is_invalid(&self) -> bool {
        self.rejection().is_some_and(|r| !r.is_transient())
    }

    pub fn is_transient(&self) -> bool {
        self.rejection().is_some_and(Rejection::is_transient)
    }

    /// Ban weight to apply to the sender; zero when valid or transient.
    pub fn ban_weight(&self) -> u32 {
        self.rejection().map_or(0, Rejection::ban_weight)
    }
}

/// What the caller should do with a checked block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockDisposition {
    Accept,
    /// Keep as an orphan and retry once the missing context arrives.
    Requeue(RejectReason),
    /// Drop the block and penalize the sender.
    Reject { reason: RejectReason, ban_weight: u32 },
}

impl From<ValidationOutcome> for BlockDisposition {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid => BlockDisposition::Accept,
            ValidationOutcome::Invalid(rejection) if rejection.is_transient() => {
                BlockDisposition::Requeue(rejection.reason())
            }
            ValidationOutcome::Invalid(rejection) => BlockDisposition::Reject {
                reason: rejection.reason(),
                ban_weight: rejection.ban_weight(),
            },
        }
    }
}
