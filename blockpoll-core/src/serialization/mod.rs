//! Deterministic binary serialization.
//!
//! Protocol messages and block headers are encoded with bincode under a
//! fixed configuration so that identical values always produce identical
//! bytes, and therefore identical block hashes.

mod bincode_config;

pub use bincode_config::{deserialize, serialize};
