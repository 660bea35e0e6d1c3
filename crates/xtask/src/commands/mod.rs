//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod simulate;
mod tags;

pub use check::Check;
pub use simulate::Simulate;
pub use tags::Tags;
