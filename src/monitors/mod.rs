//! Snapshot decoding and threshold evaluation

pub mod resources;
pub mod snapshot;
