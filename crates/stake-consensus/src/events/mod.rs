//! Events layer

mod published;

pub use published::*;
