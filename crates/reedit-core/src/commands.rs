//! Edit requests as data
//!
//! Each command maps onto one builder in `ops`. `EditSession::execute`
//! builds and registers in one call; `build` is exposed for callers that
//! want to inspect or compose the edit first.

use serde::{Deserialize, Serialize};

use reedit_core_types::ItemId;

use crate::edit::Edit;
use crate::errors::{EditError, Result};
use crate::model::{AttrValue, ItemKind};
use crate::ops::{attribute_ops, item_ops, ui_ops, Document};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Allocate a new item and insert it in one step
    InsertNewItem {
        parent: ItemId,
        index: usize,
        kind: ItemKind,
        name: String,
    },

    /// Insert an existing detached item
    AddItem {
        parent: ItemId,
        item: ItemId,
        index: usize,
    },

    RemoveItem {
        item: ItemId,
    },

    MoveItem {
        item: ItemId,
        new_parent: ItemId,
        new_index: usize,
    },

    RetypeItem {
        item: ItemId,
        kind: ItemKind,
    },

    /// `None` clears the attribute
    SetAttributes {
        item: ItemId,
        attrs: Vec<(String, Option<AttrValue>)>,
    },

    LinkReference {
        dependent: ItemId,
        ref_name: String,
        host: ItemId,
    },

    UnlinkReference {
        dependent: ItemId,
        ref_name: String,
    },

    /// UI-only; registered in the pending UI-state log
    SetUiState {
        key: String,
        value: Option<AttrValue>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertNewItem { .. } => "insert_new_item",
            Command::AddItem { .. } => item_ops::ADD_ITEM,
            Command::RemoveItem { .. } => item_ops::REMOVE_ITEM,
            Command::MoveItem { .. } => item_ops::MOVE_ITEM,
            Command::RetypeItem { .. } => item_ops::RETYPE_ITEM,
            Command::SetAttributes { .. } => attribute_ops::SET_ATTRIBUTES,
            Command::LinkReference { .. } => attribute_ops::LINK_REFERENCE,
            Command::UnlinkReference { .. } => attribute_ops::UNLINK_REFERENCE,
            Command::SetUiState { .. } => ui_ops::SET_UI_STATE,
        }
    }

    pub fn is_ui_state(&self) -> bool {
        matches!(self, Command::SetUiState { .. })
    }

    /// Build the edit for this command against `doc`
    ///
    /// `InsertNewItem` needs to allocate and so cannot be built from a
    /// shared borrow; `new_item` supplies the already-allocated handle.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation error.
    pub fn build(&self, doc: &Document, new_item: Option<ItemId>) -> Result<Edit> {
        match self {
            Command::InsertNewItem { parent, index, .. } => {
                let item = new_item.ok_or_else(|| EditError::InvalidEditState {
                    op: self.name().to_string(),
                    state: "item not allocated".to_string(),
                })?;
                item_ops::add_item(doc, *parent, item, *index)
            }
            Command::AddItem {
                parent,
                item,
                index,
            } => item_ops::add_item(doc, *parent, *item, *index),
            Command::RemoveItem { item } => item_ops::remove_item(doc, *item),
            Command::MoveItem {
                item,
                new_parent,
                new_index,
            } => item_ops::move_item(doc, *item, *new_parent, *new_index),
            Command::RetypeItem { item, kind } => item_ops::retype_item(doc, *item, *kind),
            Command::SetAttributes { item, attrs } => {
                attribute_ops::set_attributes(doc, *item, attrs.iter().cloned())
            }
            Command::LinkReference {
                dependent,
                ref_name,
                host,
            } => attribute_ops::link_reference(doc, *dependent, ref_name, *host),
            Command::UnlinkReference {
                dependent,
                ref_name,
            } => attribute_ops::unlink_reference(doc, *dependent, ref_name),
            Command::SetUiState { key, value } => ui_ops::set_ui_state(doc, key, value.clone()),
        }
    }
}
