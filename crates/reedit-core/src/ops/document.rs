use std::collections::BTreeMap;

use reedit_core_types::ItemId;

use crate::cascade::CascadeRegistry;
use crate::errors::{EditError, Result};
use crate::model::{AttrValue, ItemKind};
use crate::ops::Tree;

/// Everything SubEdits mutate: the item tree, the cascade registry and the
/// UI-only state (tabs, filters, scroll positions).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    tree: Tree,
    cascades: CascadeRegistry,
    ui_state: BTreeMap<String, AttrValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Direct tree access for loading a document
    ///
    /// Mutations made here are not recorded anywhere and cannot be undone.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn cascades(&self) -> &CascadeRegistry {
        &self.cascades
    }

    /// Direct registry access for domain code that maintains references
    /// outside the edit engine
    pub fn cascades_mut(&mut self) -> &mut CascadeRegistry {
        &mut self.cascades
    }

    pub fn ui_state(&self) -> &BTreeMap<String, AttrValue> {
        &self.ui_state
    }

    pub fn ui_value(&self, key: &str) -> Option<&AttrValue> {
        self.ui_state.get(key)
    }

    /// Allocate a detached item; see `Tree::create_item`
    ///
    /// # Errors
    ///
    /// Returns `InvalidKind` for `ItemKind::Root`.
    pub fn create_item(&mut self, kind: ItemKind, name: impl Into<String>) -> Result<ItemId> {
        self.tree.create_item(kind, name)
    }

    /// Current value of an attribute
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve.
    pub fn attribute(&self, item: ItemId, name: &str) -> Result<Option<&AttrValue>> {
        Ok(self.tree.get(item)?.attribute(name))
    }

    /// Reference-aware attribute write, returning the previous value
    ///
    /// Any `Ref` being overwritten is deregistered and any `Ref` being
    /// written is registered, so the cascade registry always mirrors the
    /// references held in the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the item or a referenced host does not resolve,
    /// or the name is empty. Nothing is mutated on error.
    pub fn write_attribute(
        &mut self,
        item: ItemId,
        name: &str,
        value: Option<AttrValue>,
    ) -> Result<Option<AttrValue>> {
        if let Some(host) = value.as_ref().and_then(AttrValue::as_ref_target) {
            self.tree.get(host)?;
        }

        let previous = self.tree.set_attribute(item, name, value.clone())?;

        if let Some(old_host) = previous.as_ref().and_then(AttrValue::as_ref_target) {
            self.cascades.deregister(item, old_host, name);
        }
        if let Some(host) = value.as_ref().and_then(AttrValue::as_ref_target) {
            self.cascades.register(item, host, name);
        }
        Ok(previous)
    }

    /// Write or clear a UI-state value, returning the previous value
    ///
    /// # Errors
    ///
    /// Returns `InvalidUiStateKey` for an empty key.
    pub fn write_ui_state(
        &mut self,
        key: &str,
        value: Option<AttrValue>,
    ) -> Result<Option<AttrValue>> {
        if key.is_empty() {
            return Err(EditError::InvalidUiStateKey);
        }
        Ok(match value {
            Some(value) => self.ui_state.insert(key.to_string(), value),
            None => self.ui_state.remove(key),
        })
    }

    /// Free a detached subtree and drop its cascade links
    ///
    /// # Errors
    ///
    /// Returns an error if the item is attached or does not resolve.
    pub fn reclaim(&mut self, item: ItemId) -> Result<Vec<ItemId>> {
        let freed = self.tree.reclaim(item)?;
        for id in &freed {
            self.cascades.forget_item(*id);
        }
        Ok(freed)
    }
}
