use reedit_core_types::ItemId;

use crate::errors::{EditError, Result};
use crate::model::{AttrValue, ItemKind, TreeItem};

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    generation: u32,
    item: Option<TreeItem>,
}

/// Arena of tree items addressed by generation-checked handles
///
/// Items are never copied or moved between slots. Removing an item from its
/// parent only detaches it; the slot stays occupied so an undo can reinsert
/// the very same instance. Slots are freed only by `reclaim`, which bumps the
/// generation so every outstanding handle is detected as stale.
///
/// Not thread-safe - designed for single-threaded use.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: ItemId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only its root item
    pub fn new() -> Self {
        let root = ItemId::new(0, 0);
        Self {
            slots: vec![Slot {
                generation: 0,
                item: Some(TreeItem::new(root, ItemKind::Root, "root".to_string())),
            }],
            free: Vec::new(),
            root,
        }
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    /// Allocate a new detached item
    ///
    /// # Errors
    ///
    /// Returns `InvalidKind` for `ItemKind::Root`: a tree has exactly one root.
    pub fn create_item(&mut self, kind: ItemKind, name: impl Into<String>) -> Result<ItemId> {
        if kind == ItemKind::Root {
            return Err(EditError::InvalidKind {
                item: self.root,
                kind: kind.to_string(),
                reason: "a tree has exactly one root".to_string(),
            });
        }

        let name = name.into();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let id = ItemId::new(index, slot.generation);
                slot.item = Some(TreeItem::new(id, kind, name));
                id
            }
            None => {
                let id = ItemId::new(self.slots.len() as u32, 0);
                self.slots.push(Slot {
                    generation: 0,
                    item: Some(TreeItem::new(id, kind, name)),
                });
                id
            }
        };
        Ok(id)
    }

    /// Resolve a handle
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the slot was reclaimed since the handle was
    /// issued, or `ItemNotFound` if no item lives under the handle.
    pub fn get(&self, id: ItemId) -> Result<&TreeItem> {
        let slot = self
            .slots
            .get(id.index() as usize)
            .ok_or(EditError::ItemNotFound { item: id })?;

        if slot.generation != id.generation() {
            return Err(EditError::StaleHandle {
                item: id,
                current: slot.generation,
            });
        }

        slot.item.as_ref().ok_or(EditError::ItemNotFound { item: id })
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut TreeItem> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .ok_or(EditError::ItemNotFound { item: id })?;

        if slot.generation != id.generation() {
            return Err(EditError::StaleHandle {
                item: id,
                current: slot.generation,
            });
        }

        slot.item.as_mut().ok_or(EditError::ItemNotFound { item: id })
    }

    /// Check whether a handle resolves to a live item
    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live items, detached ones included
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every live item in slot order
    pub fn iter(&self) -> impl Iterator<Item = &TreeItem> {
        self.slots.iter().filter_map(|s| s.item.as_ref())
    }

    /// Check whether `ancestor` is `id` itself or lies on its parent chain
    ///
    /// # Errors
    ///
    /// Returns an error if either handle does not resolve.
    pub fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> Result<bool> {
        self.get(ancestor)?;
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.get(node)?.parent();
        }
        Ok(false)
    }

    /// Check whether the item's parent chain reaches the root
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve.
    pub fn is_attached(&self, id: ItemId) -> Result<bool> {
        self.is_ancestor_or_self(self.root, id)
    }

    /// Item and all of its descendants, pre-order
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve.
    pub fn subtree(&self, id: ItemId) -> Result<Vec<ItemId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let item = self.get(node)?;
            out.push(node);
            stack.extend(item.children().iter().rev().copied());
        }
        Ok(out)
    }

    /// Items that have no parent, other than the root
    pub fn detached_roots(&self) -> Vec<ItemId> {
        self.iter()
            .filter(|item| item.parent().is_none() && item.id() != self.root)
            .map(TreeItem::id)
            .collect()
    }

    /// Insert a detached item as a child of `parent` at `index`
    ///
    /// # Errors
    ///
    /// Returns `AlreadyAttached` if the item has a parent, `CycleDetected` if
    /// `parent` lies inside the item's subtree, or `IndexOutOfRange` if
    /// `index` exceeds the current child count.
    pub fn add_child(&mut self, parent: ItemId, item: ItemId, index: usize) -> Result<()> {
        let len = self.get(parent)?.children().len();
        let child = self.get(item)?;
        if child.is_root() {
            return Err(EditError::RootImmutable {
                op: "add_child".to_string(),
            });
        }
        if let Some(existing) = child.parent() {
            return Err(EditError::AlreadyAttached {
                item,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(item, parent)? {
            return Err(EditError::CycleDetected {
                item,
                new_parent: parent,
            });
        }
        if index > len {
            return Err(EditError::IndexOutOfRange { parent, index, len });
        }

        self.get_mut(parent)?.insert_child(index, item);
        self.get_mut(item)?.set_parent(Some(parent));
        Ok(())
    }

    /// Detach the child of `parent` at `index`, returning its handle
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if there is no child at `index`.
    pub fn remove_child(&mut self, parent: ItemId, index: usize) -> Result<ItemId> {
        let len = self.get(parent)?.children().len();
        if index >= len {
            return Err(EditError::IndexOutOfRange { parent, index, len });
        }

        let child = self.get_mut(parent)?.remove_child_at(index);
        self.get_mut(child)?.set_parent(None);
        Ok(child)
    }

    /// Move an attached item under `new_parent` at `index`
    ///
    /// `index` is interpreted after the item has left its old parent.
    /// Returns the old parent and index.
    ///
    /// # Errors
    ///
    /// Returns `RootImmutable`, `NotAttached`, `CycleDetected` or
    /// `IndexOutOfRange` without mutating anything.
    pub fn reparent(
        &mut self,
        item: ItemId,
        new_parent: ItemId,
        index: usize,
    ) -> Result<(ItemId, usize)> {
        let (old_parent, old_index) = self.position(item)?;
        if self.is_ancestor_or_self(item, new_parent)? {
            return Err(EditError::CycleDetected { item, new_parent });
        }
        let mut len = self.get(new_parent)?.children().len();
        if new_parent == old_parent {
            len -= 1;
        }
        if index > len {
            return Err(EditError::IndexOutOfRange {
                parent: new_parent,
                index,
                len,
            });
        }

        self.get_mut(old_parent)?.remove_child_at(old_index);
        self.get_mut(new_parent)?.insert_child(index, item);
        self.get_mut(item)?.set_parent(Some(new_parent));
        Ok((old_parent, old_index))
    }

    /// Parent and index of an attached item
    ///
    /// # Errors
    ///
    /// Returns `RootImmutable` for the root and `NotAttached` for an item
    /// without a parent.
    pub fn position(&self, item: ItemId) -> Result<(ItemId, usize)> {
        let node = self.get(item)?;
        if node.is_root() {
            return Err(EditError::RootImmutable {
                op: "position".to_string(),
            });
        }
        let parent = node.parent().ok_or(EditError::NotAttached { item })?;
        let index = self
            .get(parent)?
            .child_index(item)
            .ok_or(EditError::NotAttached { item })?;
        Ok((parent, index))
    }

    /// Write or clear a raw attribute, returning the previous value
    ///
    /// Does not touch the cascade registry; use
    /// `Document::write_attribute` for reference-aware writes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAttributeName` for an empty name.
    pub fn set_attribute(
        &mut self,
        item: ItemId,
        name: &str,
        value: Option<AttrValue>,
    ) -> Result<Option<AttrValue>> {
        if name.is_empty() {
            return Err(EditError::InvalidAttributeName { item });
        }
        Ok(self.get_mut(item)?.set_attribute(name, value))
    }

    /// Swap an item's kind tag, returning the previous kind
    ///
    /// # Errors
    ///
    /// Returns `RootImmutable` if the item is the root or `kind` is `Root`.
    pub fn set_kind(&mut self, item: ItemId, kind: ItemKind) -> Result<ItemKind> {
        if item == self.root || kind == ItemKind::Root {
            return Err(EditError::RootImmutable {
                op: "set_kind".to_string(),
            });
        }
        Ok(self.get_mut(item)?.set_kind(kind))
    }

    /// Free a detached item and its whole subtree
    ///
    /// Returns the freed handles, all of which become stale.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyAttached` if the item still has a parent.
    pub fn reclaim(&mut self, item: ItemId) -> Result<Vec<ItemId>> {
        if let Some(parent) = self.get(item)?.parent() {
            return Err(EditError::AlreadyAttached { item, parent });
        }
        if item == self.root {
            return Err(EditError::RootImmutable {
                op: "reclaim".to_string(),
            });
        }

        let freed = self.subtree(item)?;
        for id in &freed {
            let slot = &mut self.slots[id.index() as usize];
            slot.item = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index());
        }
        Ok(freed)
    }
}
