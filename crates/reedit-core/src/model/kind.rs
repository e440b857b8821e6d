use serde::{Deserialize, Serialize};

/// Variant tag of a tree item
///
/// Kinds are a field of the item rather than distinct types, so changing the
/// kind of an item keeps its arena handle and every reference to it valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// The single root of a tree
    Root,
    /// Grouping node holding tasks and other categories
    Category,
    /// A task, optionally holding subtasks
    Task,
    /// Calendar entry that may reference a task
    ScheduledItem,
}

impl ItemKind {
    /// Attribute names only meaningful on this kind
    ///
    /// These are stripped when an item is retyped away from this kind.
    pub fn exclusive_attributes(&self) -> &'static [&'static str] {
        match self {
            ItemKind::Task => &["status", "task_type"],
            ItemKind::ScheduledItem => &["start", "end"],
            ItemKind::Root | ItemKind::Category => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Root => "root",
            ItemKind::Category => "category",
            ItemKind::Task => "task",
            ItemKind::ScheduledItem => "scheduled_item",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
