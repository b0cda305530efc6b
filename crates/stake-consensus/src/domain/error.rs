//! Error types for the stake consensus core
//!
//! Validation never fails with an error: rejected blocks are described by
//! `ValidationOutcome`. These errors cover the boundary: parsing wire
//! identifiers, loading parameters and publishing events.

/// Consensus error types
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("Unknown reject reason: {0}")]
    UnknownRejectReason(String),

    #[error("Invalid consensus parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to parse consensus parameters: {0}")]
    ParamsParse(#[from] serde_json::Error),

    #[error("Event bus error: {0}")]
    EventBus(String),
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
