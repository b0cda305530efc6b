//! Adapters layer (Hexagonal Architecture)

mod event_bus;
mod kernel_target;
mod memory;
mod signature;

pub use event_bus::*;
pub use kernel_target::*;
pub use memory::*;
pub use signature::*;
