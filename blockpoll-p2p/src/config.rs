//! Sync driver configuration.

/// Maximum number of items in one inventory announcement.
pub const MAX_INVENTORY_ITEMS: usize = 50_000;

/// Configuration for a sync driver.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Inventory announcements with more items than this are treated as
    /// malformed and ignored.
    pub max_inventory_items: usize,

    /// Subscribe to the session and issue the initial get-blocks request as
    /// soon as the driver is spawned.
    pub start_on_spawn: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_inventory_items: MAX_INVENTORY_ITEMS,
            start_on_spawn: false,
        }
    }
}

impl SyncConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inventory item cap.
    pub fn with_max_inventory_items(mut self, max: usize) -> Self {
        self.max_inventory_items = max;
        self
    }

    /// Start monitoring and querying on spawn.
    pub fn with_start_on_spawn(mut self, start: bool) -> Self {
        self.start_on_spawn = start;
        self
    }
}
