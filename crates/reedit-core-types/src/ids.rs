//! Identity types for tree items and edits
//!
//! Tree items live in an arena and are addressed by index plus generation.
//! A handle stays valid for as long as the slot it names still holds the
//! same generation; reclaiming a slot bumps the generation so every old
//! handle to it is detected as stale instead of silently resolving to a
//! different item.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generation-checked handle to a tree item in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    index: u32,
    generation: u32,
}

impl ItemId {
    /// Build a handle from its raw parts
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item#{}v{}", self.index, self.generation)
    }
}

/// Unique identifier for a registered edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditId(Uuid);

impl EditId {
    /// Generate a new EditId using UUIDv7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EditId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display() {
        let id = ItemId::new(3, 7);
        assert_eq!(id.to_string(), "item#3v7");
    }

    #[test]
    fn test_item_id_generation_distinguishes_handles() {
        let old = ItemId::new(4, 0);
        let new = ItemId::new(4, 1);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(old < new);
    }

    #[test]
    fn test_item_id_serde_round_trip() {
        let id = ItemId::new(12, 2);
        let json = serde_json::to_string(&id).unwrap();
        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_edit_id_generation() {
        let id1 = EditId::new();
        let id2 = EditId::new();
        assert_ne!(id1, id2);
        assert_eq!(id1.to_string(), id1.as_uuid().to_string());
    }
}
