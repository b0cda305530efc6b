//! PoW to PoS activation gate
//!
//! The first concrete activation height reported by the configuration
//! channel is latched for the lifetime of the gate. Later reports, even ones
//! received before the next block, are ignored so every node that saw the
//! same first signal keeps agreeing on the transition height.

use crate::config::ConsensusParams;
use crate::metrics;
use crate::ports::ActivationSignal;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sentinel stored while no activation height has been latched ("never").
const UNSET: u64 = u64::MAX;

/// Block production rule required at a given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsensusRule {
    ProofOfWork,
    ProofOfStake,
}

impl fmt::Display for ConsensusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusRule::ProofOfWork => f.write_str("PoW"),
            ConsensusRule::ProofOfStake => f.write_str("PoS"),
        }
    }
}

/// What happened when the gate consulted the configuration channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatchObservation {
    /// No concrete height reported yet.
    Unset,
    /// This observation committed the height.
    Committed(u64),
    /// A height was already latched.
    Latched(u64),
}

impl LatchObservation {
    pub fn height(&self) -> Option<u64> {
        match self {
            LatchObservation::Unset => None,
            LatchObservation::Committed(h) | LatchObservation::Latched(h) => Some(*h),
        }
    }
}

/// Decides whether PoW or PoS is required at a height.
///
/// Single writer (the latch), many readers. Safe to share behind `Arc`.
pub struct ActivationGate {
    first_mandatory_stake_height: AtomicU64,
    signal: Option<Arc<dyn ActivationSignal>>,
}

impl ActivationGate {
    /// Gate fed by an external configuration channel, initially unset.
    pub fn new(signal: Arc<dyn ActivationSignal>) -> Self {
        Self {
            first_mandatory_stake_height: AtomicU64::new(UNSET),
            signal: Some(signal),
        }
    }

    /// Gate latched at `height` from the start.
    pub fn fixed(height: u64) -> Self {
        let gate = Self {
            first_mandatory_stake_height: AtomicU64::new(UNSET),
            signal: None,
        };
        gate.commit(height);
        gate
    }

    /// Hard-coded parameters win over the configuration channel.
    pub fn from_params(params: &ConsensusParams, signal: Arc<dyn ActivationSignal>) -> Self {
        match params.first_mandatory_stake_height {
            Some(height) => Self::fixed(height),
            None => Self::new(signal),
        }
    }

    /// The latched height, without consulting the configuration channel.
    pub fn latched_height(&self) -> Option<u64> {
        match self.first_mandatory_stake_height.load(Ordering::Acquire) {
            UNSET => None,
            height => Some(height),
        }
    }

    /// Consult the configuration channel if nothing is latched yet and latch
    /// the first concrete value it reports.
    pub fn observe(&self) -> LatchObservation {
        if let Some(height) = self.latched_height() {
            return LatchObservation::Latched(height);
        }

        let reported = self
            .signal
            .as_ref()
            .and_then(|signal| signal.first_mandatory_stake_height());

        match reported {
            Some(height) if height != UNSET => {
                if self.commit(height) {
                    LatchObservation::Committed(height)
                } else {
                    // Lost the race; report the winner.
                    self.latched_height()
                        .map_or(LatchObservation::Unset, LatchObservation::Latched)
                }
            }
            _ => LatchObservation::Unset,
        }
    }

    /// Activation height after consulting the channel.
    pub fn resolve(&self) -> Option<u64> {
        self.observe().height()
    }

    /// Rule required for a block at `height`.
    pub fn required_rule(&self, height: u64) -> ConsensusRule {
        match self.resolve() {
            Some(first) if height >= first => ConsensusRule::ProofOfStake,
            _ => ConsensusRule::ProofOfWork,
        }
    }

    /// Explicit node-level rule change: forget the latched height.
    pub fn reset(&self) {
        self.first_mandatory_stake_height
            .store(UNSET, Ordering::Release);
        tracing::info!("[stake] activation latch reset");
    }

    /// First successful commit wins; returns whether this call won.
    fn commit(&self, height: u64) -> bool {
        if height == UNSET {
            return false;
        }
        match self.first_mandatory_stake_height.compare_exchange(
            UNSET,
            height,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                tracing::info!(height, "[stake] activation height latched");
                metrics::record_activation_height(height);
                true
            }
            Err(existing) => {
                tracing::debug!(
                    height,
                    existing,
                    "[stake] activation height already latched, ignoring"
                );
                false
            }
        }
    }
}

impl fmt::Debug for ActivationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationGate")
            .field("first_mandatory_stake_height", &self.latched_height())
            .field("has_signal", &self.signal.is_some())
            .finish()
    }
}
