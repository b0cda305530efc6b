//! # Stake Consensus Metrics
//!
//! Prometheus metrics for monitoring stake validation.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! stake-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `stake_checks_total` - Counter of proof-of-stake checks performed
//! - `stake_rejections_total` - Counter of rejected blocks (by reason)
//! - `stake_validation_latency_seconds` - Histogram of validation times
//! - `stake_activation_height` - Latched first mandatory PoS height

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total proof-of-stake checks
    pub static ref STAKE_CHECKS: IntCounter = register_int_counter!(
        "stake_checks_total",
        "Total number of proof-of-stake checks performed"
    )
    .expect("Failed to create STAKE_CHECKS metric");

    /// Rejected blocks, labeled by reject reason
    pub static ref STAKE_REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "stake_rejections_total",
        "Total number of blocks rejected by the stake consensus core",
        &["reason"]
    )
    .expect("Failed to create STAKE_REJECTIONS metric");

    /// Histogram of validation latency
    pub static ref VALIDATION_LATENCY: Histogram = register_histogram!(
        "stake_validation_latency_seconds",
        "Time taken to check a block in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    )
    .expect("Failed to create VALIDATION_LATENCY metric");

    /// Latched activation height
    pub static ref ACTIVATION_HEIGHT: IntGauge = register_int_gauge!(
        "stake_activation_height",
        "First block height at which proof of stake is mandatory"
    )
    .expect("Failed to create ACTIVATION_HEIGHT metric");
}

/// Record a proof-of-stake check
#[cfg(feature = "metrics")]
pub fn record_stake_checked() {
    STAKE_CHECKS.inc();
}

/// Record a rejected block with reason
#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    STAKE_REJECTIONS.with_label_values(&[reason]).inc();
}

/// Record validation latency
#[cfg(feature = "metrics")]
pub fn record_validation_latency(seconds: f64) {
    VALIDATION_LATENCY.observe(seconds);
}

/// Record the latched activation height
#[cfg(feature = "metrics")]
pub fn record_activation_height(height: u64) {
    ACTIVATION_HEIGHT.set(i64::try_from(height).unwrap_or(i64::MAX));
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_stake_checked() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_validation_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_activation_height(_height: u64) {}
