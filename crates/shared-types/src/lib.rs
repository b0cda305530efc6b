//! # Shared Types Crate
//!
//! Chain entities shared between the stake consensus core and the
//! collaborators that own chain storage, the mempool and the network
//! configuration channel.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Block, transaction and output types are
//!   defined here and nowhere else.
//! - **Identity Commits to Stake**: a block's hash covers its stake
//!   reference, so the stake signature binds the claim to the block.

pub mod entities;

pub use entities::*;
