//! # stake-consensus
//!
//! Consensus validation core for a chain moving from Proof-of-Work to
//! Proof-of-Stake block production.
//!
//! ## Architecture
//!
//! ```text
//! ValidationOutcome ──→ ChainLinkageChecker ─┐
//!                       ActivationGate ──────┴──→ StakeKernelValidator
//!                                                        │
//!                                             StakeConsensusService
//!                                   (dispatch, coinbase payout, events)
//! ```
//!
//! ### Activation latch
//!
//! The first activation height reported by the configuration channel is
//! latched for the lifetime of the gate. Nodes that saw the same first
//! signal keep agreeing on the transition even if the signal changes.
//!
//! ### Permanent vs transient rejections
//!
//! Permanent rejections carry ban weight 100. Rejections that depend on
//! chain context the node does not have yet (a missing parent) are
//! transient, carry no ban weight, and downgrade every dependent stake
//! conclusion to its `tmp-` form.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stake_consensus::{StakeConsensusService, StakeConsensusDependencies};
//! use stake_consensus::ports::StakeConsensusApi;
//!
//! let service = StakeConsensusService::new(StakeConsensusDependencies {
//!     chain, utxos, mempool, sig_verifier, event_bus, gate,
//!     params: ConsensusParams::default(),
//! })?;
//!
//! match service.process_block(&block, Some(peer)).await? {
//!     BlockDisposition::Accept => connect(block),
//!     BlockDisposition::Requeue(_) => orphans.push(block),
//!     BlockDisposition::Reject { .. } => {}
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{InMemoryEventBus, Secp256k1StakeVerifier};
pub use config::{ConsensusParams, COINBASE_MATURITY};
pub use domain::{
    ActivationGate, BlockDisposition, BlockIndexEntry, ChainLinkageChecker, ChainSnapshot,
    ConsensusError, ConsensusResult, ConsensusRule, LatchObservation, LinkageStatus, RejectReason,
    Rejection, StakeKernelValidator, TxMeta, ValidationOutcome, PERMANENT_BAN_WEIGHT,
};
pub use events::{BlockRejectedEvent, ConsensusEvent, PeerId};
pub use ports::{
    ActivationSignal, ChainIndex, EventBus, MempoolView, StakeConsensusApi, StakeKernelTarget,
    StakeSignatureVerifier, UtxoView,
};
pub use service::{StakeConsensusDependencies, StakeConsensusService};
