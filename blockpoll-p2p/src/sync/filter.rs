//! Inventory filtering.

use blockpoll_core::{Hash, InventoryItem};

/// Select the block items of an announcement worth requesting.
///
/// Non-block items are dropped, as is any item whose hash equals
/// `last_announced`. Peer order is preserved.
pub fn filter_block_inventory(
    items: &[InventoryItem],
    last_announced: Option<&Hash>,
) -> Vec<InventoryItem> {
    items
        .iter()
        .filter(|item| item.is_block())
        .filter(|item| Some(&item.hash) != last_announced)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpoll_core::InventoryKind;

    #[test]
    fn test_drops_non_block_items() {
        let items = vec![
            InventoryItem::transaction([1u8; 32]),
            InventoryItem::block([2u8; 32]),
            InventoryItem::new(InventoryKind::Error, [3u8; 32]),
            InventoryItem::new(InventoryKind::Unknown(7), [4u8; 32]),
        ];

        let filtered = filter_block_inventory(&items, None);
        assert_eq!(filtered, vec![InventoryItem::block([2u8; 32])]);
    }

    #[test]
    fn test_drops_last_announced() {
        let a = [0xaa; 32];
        let b = [0xbb; 32];
        let items = vec![InventoryItem::block(a), InventoryItem::block(b)];

        let filtered = filter_block_inventory(&items, Some(&a));
        assert_eq!(filtered, vec![InventoryItem::block(b)]);
    }

    #[test]
    fn test_transaction_with_announced_hash_still_dropped() {
        let a = [0xaa; 32];
        let items = vec![InventoryItem::transaction(a)];
        assert!(filter_block_inventory(&items, None).is_empty());
    }

    #[test]
    fn test_preserves_order() {
        let items: Vec<_> = (1u8..=5).map(|i| InventoryItem::block([i; 32])).collect();
        let filtered = filter_block_inventory(&items, Some(&[3u8; 32]));

        let hashes: Vec<u8> = filtered.iter().map(|i| i.hash[0]).collect();
        assert_eq!(hashes, vec![1, 2, 4, 5]);
    }
}
