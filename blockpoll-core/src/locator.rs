//! Block locators.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::Hash;

/// A non-empty, most-recent-first list of block hashes.
///
/// Sent in get-blocks requests so the peer can find the most recent block
/// both sides share and continue from there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Hash>", into = "Vec<Hash>")]
pub struct BlockLocator {
    hashes: Vec<Hash>,
}

impl BlockLocator {
    /// Create a locator. Fails if `hashes` is empty.
    pub fn new(hashes: Vec<Hash>) -> Result<Self, CoreError> {
        if hashes.is_empty() {
            return Err(CoreError::EmptyLocator);
        }
        Ok(Self { hashes })
    }

    /// The most recent hash in the locator.
    pub fn front(&self) -> Hash {
        self.hashes[0]
    }

    /// The oldest hash in the locator (normally genesis).
    pub fn back(&self) -> Hash {
        self.hashes[self.hashes.len() - 1]
    }

    /// All hashes, most recent first.
    pub fn hashes(&self) -> &[Hash] {
        &self.hashes
    }

    /// Number of hashes.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Consume the locator, returning its hashes.
    pub fn into_hashes(self) -> Vec<Hash> {
        self.hashes
    }
}

impl TryFrom<Vec<Hash>> for BlockLocator {
    type Error = CoreError;

    fn try_from(hashes: Vec<Hash>) -> Result<Self, Self::Error> {
        Self::new(hashes)
    }
}

impl From<BlockLocator> for Vec<Hash> {
    fn from(locator: BlockLocator) -> Self {
        locator.hashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{deserialize, serialize};

    #[test]
    fn test_empty_locator_rejected() {
        assert_eq!(BlockLocator::new(Vec::new()), Err(CoreError::EmptyLocator));
    }

    #[test]
    fn test_front_and_back() {
        let locator = BlockLocator::new(vec![[3u8; 32], [2u8; 32], [0u8; 32]]).unwrap();
        assert_eq!(locator.front(), [3u8; 32]);
        assert_eq!(locator.back(), [0u8; 32]);
        assert_eq!(locator.len(), 3);
        assert!(!locator.is_empty());
    }

    #[test]
    fn test_decoding_enforces_non_empty() {
        let bytes = serialize(&Vec::<Hash>::new()).unwrap();
        let result: Result<BlockLocator, _> = deserialize(&bytes);
        assert!(result.is_err());

        let locator = BlockLocator::new(vec![[5u8; 32]]).unwrap();
        let bytes = serialize(&locator).unwrap();
        let decoded: BlockLocator = deserialize(&bytes).unwrap();
        assert_eq!(decoded, locator);
    }
}
