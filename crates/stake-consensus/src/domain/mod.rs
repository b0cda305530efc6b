//! Domain layer for the stake consensus core
//!
//! - outcome: reject reasons and the validation outcome sum type
//! - activation: PoW to PoS gate with the one-time latch
//! - linkage: parent linkage and fork point checks
//! - kernel: stake kernel validation
//! - body: merkle root and PoS coinbase payout rules (block validity pipeline)

mod activation;
mod body;
mod chain;
mod error;
mod kernel;
mod linkage;
mod outcome;

pub use activation::*;
pub use body::*;
pub use chain::*;
pub use error::*;
pub use kernel::*;
pub use linkage::*;
pub use outcome::*;
