//! Block structure.
//!
//! The sync driver treats blocks as opaque: it only ever needs the identity
//! hash of the header.

#[allow(clippy::module_inception)]
mod block;
mod header;

pub use block::Block;
pub use header::BlockHeader;
