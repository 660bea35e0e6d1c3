//! Traits describing read-only host data.
//!
//! The engine never owns the database or the random source; queries reach
//! them through the oracles below so hosts can plug in their own storage.
mod database;
mod rng;
mod snapshot;

pub use database::{DatabaseOracle, require};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use snapshot::DatabaseSnapshot;
