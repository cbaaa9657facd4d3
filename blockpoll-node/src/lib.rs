//! Block sync simulation node library.
//!
//! This library provides the components of the `blockpoll-node` binary: a
//! simulated remote peer serving a generated chain, and a node that syncs a
//! local chain from it through the sync driver. It is also used by the
//! integration tests.

pub mod cli;
pub mod config;
pub mod node;
pub mod shutdown;
pub mod sim;
