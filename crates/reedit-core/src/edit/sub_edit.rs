//! Reversible primitives
//!
//! Each SubEdit names its targets explicitly and captures, the first time it
//! is applied, exactly what `revert` needs. Captured handles double as
//! identity checks on later replays: if the item found at a captured
//! position is not the one captured, the replay stops with
//! `IdentityViolation` instead of mutating the wrong instance.

use std::collections::BTreeSet;

use reedit_core_types::ItemId;

use crate::errors::{EditError, Result};
use crate::model::{AttrValue, ItemKind};
use crate::ops::Document;

/// Smallest reversible mutation
///
/// Fields named `previous`, `removed`, `origin`, `cleared` and `stripped`
/// are the undo payload; they are filled in by `apply`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubEdit {
    /// Insert a detached item under `parent` at `index`
    AddChild {
        parent: ItemId,
        item: ItemId,
        index: usize,
    },

    /// Detach the child of `parent` at `index`
    ///
    /// `removed` may be pre-filled with the expected child; it is checked
    /// on every apply.
    RemoveChild {
        parent: ItemId,
        index: usize,
        removed: Option<ItemId>,
    },

    /// Write (`Some`) or clear (`None`) a named attribute
    SetAttribute {
        item: ItemId,
        name: String,
        value: Option<AttrValue>,
        previous: Option<Option<AttrValue>>,
    },

    /// Move an attached item under `new_parent` at `new_index`
    Move {
        item: ItemId,
        new_parent: ItemId,
        new_index: usize,
        origin: Option<(ItemId, usize)>,
    },

    /// Clear a dependent's reference to a host
    RemoveFromHost {
        dependent: ItemId,
        host: ItemId,
        ref_name: String,
        cleared: Option<AttrValue>,
    },

    /// Swap an item's kind tag, stripping attributes exclusive to the old kind
    Retype {
        item: ItemId,
        kind: ItemKind,
        previous: Option<ItemKind>,
        stripped: Vec<(String, AttrValue)>,
    },

    /// Write (`Some`) or clear (`None`) a UI-only state value
    SetUiState {
        key: String,
        value: Option<AttrValue>,
        previous: Option<Option<AttrValue>>,
    },
}

impl SubEdit {
    pub fn add_child(parent: ItemId, item: ItemId, index: usize) -> Self {
        SubEdit::AddChild {
            parent,
            item,
            index,
        }
    }

    pub fn remove_child(parent: ItemId, index: usize, expected: Option<ItemId>) -> Self {
        SubEdit::RemoveChild {
            parent,
            index,
            removed: expected,
        }
    }

    pub fn set_attribute(item: ItemId, name: impl Into<String>, value: Option<AttrValue>) -> Self {
        SubEdit::SetAttribute {
            item,
            name: name.into(),
            value,
            previous: None,
        }
    }

    pub fn move_item(item: ItemId, new_parent: ItemId, new_index: usize) -> Self {
        SubEdit::Move {
            item,
            new_parent,
            new_index,
            origin: None,
        }
    }

    pub fn remove_from_host(dependent: ItemId, host: ItemId, ref_name: impl Into<String>) -> Self {
        SubEdit::RemoveFromHost {
            dependent,
            host,
            ref_name: ref_name.into(),
            cleared: None,
        }
    }

    pub fn retype(item: ItemId, kind: ItemKind) -> Self {
        SubEdit::Retype {
            item,
            kind,
            previous: None,
            stripped: Vec::new(),
        }
    }

    pub fn set_ui_state(key: impl Into<String>, value: Option<AttrValue>) -> Self {
        SubEdit::SetUiState {
            key: key.into(),
            value,
            previous: None,
        }
    }

    /// Stable operation name used in logs and errors
    pub fn op_name(&self) -> &'static str {
        match self {
            SubEdit::AddChild { .. } => "add_child",
            SubEdit::RemoveChild { .. } => "remove_child",
            SubEdit::SetAttribute { .. } => "set_attribute",
            SubEdit::Move { .. } => "move",
            SubEdit::RemoveFromHost { .. } => "remove_from_host",
            SubEdit::Retype { .. } => "retype",
            SubEdit::SetUiState { .. } => "set_ui_state",
        }
    }

    /// Apply the mutation, capturing the undo payload
    ///
    /// # Errors
    ///
    /// Returns a structural error if a precondition fails, or
    /// `IdentityViolation` if a captured handle no longer matches. The
    /// document is untouched on error.
    pub fn apply(&mut self, doc: &mut Document) -> Result<()> {
        match self {
            SubEdit::AddChild {
                parent,
                item,
                index,
            } => doc.tree_mut().add_child(*parent, *item, *index),

            SubEdit::RemoveChild {
                parent,
                index,
                removed,
            } => {
                let found = doc.tree().get(*parent)?.children().get(*index).copied();
                if let Some(expected) = *removed {
                    if found != Some(expected) {
                        return Err(EditError::IdentityViolation {
                            op: "remove_child".to_string(),
                            expected,
                            found,
                        });
                    }
                }
                *removed = Some(doc.tree_mut().remove_child(*parent, *index)?);
                Ok(())
            }

            SubEdit::SetAttribute {
                item,
                name,
                value,
                previous,
            } => {
                *previous = Some(doc.write_attribute(*item, name, value.clone())?);
                Ok(())
            }

            SubEdit::Move {
                item,
                new_parent,
                new_index,
                origin,
            } => {
                if let Some(expected) = *origin {
                    let actual = doc.tree().position(*item)?;
                    if actual != expected {
                        let found = doc
                            .tree()
                            .get(expected.0)
                            .ok()
                            .and_then(|parent| parent.children().get(expected.1).copied());
                        return Err(EditError::IdentityViolation {
                            op: "move".to_string(),
                            expected: *item,
                            found,
                        });
                    }
                }
                *origin = Some(doc.tree_mut().reparent(*item, *new_parent, *new_index)?);
                Ok(())
            }

            SubEdit::RemoveFromHost {
                dependent,
                host,
                ref_name,
                cleared,
            } => {
                let current = doc.attribute(*dependent, ref_name)?;
                if current.and_then(AttrValue::as_ref_target) != Some(*host) {
                    return Err(EditError::CascadeLookup {
                        dependent: *dependent,
                        host: *host,
                        ref_name: ref_name.clone(),
                    });
                }
                *cleared = doc.write_attribute(*dependent, ref_name, None)?;
                Ok(())
            }

            SubEdit::Retype {
                item,
                kind,
                previous,
                stripped,
            } => {
                let old_kind = doc.tree().get(*item)?.kind();
                if *kind == ItemKind::Root || old_kind == ItemKind::Root {
                    return Err(EditError::RootImmutable {
                        op: "retype".to_string(),
                    });
                }

                let names: Vec<&'static str> = if old_kind == *kind {
                    Vec::new()
                } else {
                    old_kind.exclusive_attributes().to_vec()
                };

                stripped.clear();
                for name in names {
                    if let Some(value) = doc.write_attribute(*item, name, None)? {
                        stripped.push((name.to_string(), value));
                    }
                }
                *previous = Some(doc.tree_mut().set_kind(*item, *kind)?);
                Ok(())
            }

            SubEdit::SetUiState {
                key,
                value,
                previous,
            } => {
                *previous = Some(doc.write_ui_state(key, value.clone())?);
                Ok(())
            }
        }
    }

    /// Undo a previous `apply` using the captured payload
    ///
    /// # Errors
    ///
    /// Returns `InvalidEditState` if nothing was captured yet, or the
    /// underlying structural/identity error if the document no longer has
    /// the shape this SubEdit produced.
    pub fn revert(&mut self, doc: &mut Document) -> Result<()> {
        match self {
            SubEdit::AddChild {
                parent,
                item,
                index,
            } => {
                let found = doc.tree().get(*parent)?.children().get(*index).copied();
                if found != Some(*item) {
                    return Err(EditError::IdentityViolation {
                        op: "add_child".to_string(),
                        expected: *item,
                        found,
                    });
                }
                doc.tree_mut().remove_child(*parent, *index)?;
                Ok(())
            }

            SubEdit::RemoveChild {
                parent,
                index,
                removed,
            } => {
                let item = removed.ok_or_else(|| not_applied("remove_child"))?;
                doc.tree_mut().add_child(*parent, item, *index)
            }

            SubEdit::SetAttribute {
                item,
                name,
                previous,
                ..
            } => {
                let prior = previous.clone().ok_or_else(|| not_applied("set_attribute"))?;
                doc.write_attribute(*item, name, prior)?;
                Ok(())
            }

            SubEdit::Move { item, origin, .. } => {
                let (old_parent, old_index) = origin.ok_or_else(|| not_applied("move"))?;
                doc.tree_mut().reparent(*item, old_parent, old_index)?;
                Ok(())
            }

            SubEdit::RemoveFromHost {
                dependent,
                ref_name,
                cleared,
                ..
            } => {
                let value = cleared
                    .clone()
                    .ok_or_else(|| not_applied("remove_from_host"))?;
                doc.write_attribute(*dependent, ref_name, Some(value))?;
                Ok(())
            }

            SubEdit::Retype {
                item,
                previous,
                stripped,
                ..
            } => {
                let old_kind = previous.ok_or_else(|| not_applied("retype"))?;
                doc.tree_mut().set_kind(*item, old_kind)?;
                for (name, value) in stripped.iter() {
                    doc.write_attribute(*item, name, Some(value.clone()))?;
                }
                Ok(())
            }

            SubEdit::SetUiState { key, previous, .. } => {
                let prior = previous.clone().ok_or_else(|| not_applied("set_ui_state"))?;
                doc.write_ui_state(key, prior)?;
                Ok(())
            }
        }
    }

    /// Collect every item handle this SubEdit holds
    pub fn referenced_items(&self, out: &mut BTreeSet<ItemId>) {
        match self {
            SubEdit::AddChild { parent, item, .. } => {
                out.insert(*parent);
                out.insert(*item);
            }
            SubEdit::RemoveChild {
                parent, removed, ..
            } => {
                out.insert(*parent);
                out.extend(*removed);
            }
            SubEdit::SetAttribute {
                item,
                value,
                previous,
                ..
            } => {
                out.insert(*item);
                out.extend(value.as_ref().and_then(AttrValue::as_ref_target));
                out.extend(previous.iter().flatten().filter_map(AttrValue::as_ref_target));
            }
            SubEdit::Move {
                item,
                new_parent,
                origin,
                ..
            } => {
                out.insert(*item);
                out.insert(*new_parent);
                out.extend(origin.map(|(parent, _)| parent));
            }
            SubEdit::RemoveFromHost {
                dependent, host, ..
            } => {
                out.insert(*dependent);
                out.insert(*host);
            }
            SubEdit::Retype { item, stripped, .. } => {
                out.insert(*item);
                out.extend(stripped.iter().filter_map(|(_, v)| v.as_ref_target()));
            }
            SubEdit::SetUiState {
                value, previous, ..
            } => {
                out.extend(value.as_ref().and_then(AttrValue::as_ref_target));
                out.extend(previous.iter().flatten().filter_map(AttrValue::as_ref_target));
            }
        }
    }

    /// Check whether applying this SubEdit would leave the document unchanged
    pub fn is_noop(&self, doc: &Document) -> bool {
        match self {
            SubEdit::SetAttribute {
                item, name, value, ..
            } => doc
                .attribute(*item, name)
                .map(|current| current == value.as_ref())
                .unwrap_or(false),
            SubEdit::SetUiState { key, value, .. } => doc.ui_value(key) == value.as_ref(),
            SubEdit::Retype { item, kind, .. } => doc
                .tree()
                .get(*item)
                .map(|i| i.kind() == *kind)
                .unwrap_or(false),
            _ => false,
        }
    }
}

fn not_applied(op: &str) -> EditError {
    EditError::InvalidEditState {
        op: op.to_string(),
        state: "reverted before apply".to_string(),
    }
}
