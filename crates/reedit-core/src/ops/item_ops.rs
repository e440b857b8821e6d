//! Structural edit builders
//!
//! Each builder validates against the current document and returns an
//! `Edit` ready to register. Nothing is mutated here; a builder error
//! means the request is rejected before any SubEdit could run.

use std::collections::BTreeSet;

use reedit_core_types::schema::EVENT_CASCADE_SKIPPED;
use reedit_core_types::ItemId;

use crate::edit::{Edit, SubEdit};
use crate::errors::{EditError, Result};
use crate::model::{AttrValue, ItemKind};
use crate::ops::Document;

pub const ADD_ITEM: &str = "add_item";
pub const REMOVE_ITEM: &str = "remove_item";
pub const MOVE_ITEM: &str = "move_item";
pub const RETYPE_ITEM: &str = "retype_item";

/// Insert a detached item under `parent` at `index`
///
/// # Errors
///
/// Returns `AlreadyAttached`, `RootImmutable`, `CycleDetected` or
/// `IndexOutOfRange` if the insertion could not apply.
pub fn add_item(doc: &Document, parent: ItemId, item: ItemId, index: usize) -> Result<Edit> {
    let tree = doc.tree();
    let parent_node = tree.get(parent)?;
    let node = tree.get(item)?;

    if node.is_root() {
        return Err(EditError::RootImmutable {
            op: ADD_ITEM.to_string(),
        });
    }
    if let Some(existing) = node.parent() {
        return Err(EditError::AlreadyAttached {
            item,
            parent: existing,
        });
    }
    if tree.is_ancestor_or_self(item, parent)? {
        return Err(EditError::CycleDetected {
            item,
            new_parent: parent,
        });
    }
    let len = parent_node.children().len();
    if index > len {
        return Err(EditError::IndexOutOfRange { parent, index, len });
    }

    Ok(Edit::new(ADD_ITEM, format!("Add {}", node.kind()))
        .with_description(format!(
            "Add {} '{}' under '{}' at {}",
            node.kind(),
            node.name(),
            parent_node.name(),
            index
        ))
        .with_sub_edit(SubEdit::add_child(parent, item, index)))
}

/// Detach an item and its subtree, clearing every outside reference to
/// anything being removed
///
/// Dependents are found through the cascade registry for the item and
/// each descendant. Their `RemoveFromHost` SubEdits come first so undo
/// restores the host before the references to it. References held inside
/// the removed subtree travel with it and are left alone. Registry entries
/// that no longer match the dependent's attribute are skipped.
///
/// # Errors
///
/// Returns `RootImmutable` for the root or `NotAttached` for an item that
/// is already detached.
pub fn remove_item(doc: &Document, item: ItemId) -> Result<Edit> {
    let tree = doc.tree();
    let (parent, index) = tree.position(item)?;
    let node = tree.get(item)?;
    let subtree = tree.subtree(item)?;
    let removed: BTreeSet<ItemId> = subtree.iter().copied().collect();

    let mut edit = Edit::new(REMOVE_ITEM, format!("Remove {}", node.kind()));
    let mut cascaded = 0usize;

    for host in &subtree {
        for link in doc.cascades().dependents_of(*host) {
            if removed.contains(&link.dependent) {
                continue;
            }
            let current = doc
                .attribute(link.dependent, &link.ref_name)
                .ok()
                .flatten()
                .and_then(AttrValue::as_ref_target);
            if current != Some(*host) {
                tracing::warn!(
                    event = EVENT_CASCADE_SKIPPED,
                    dependent = %link.dependent,
                    host = %host,
                    ref_name = %link.ref_name,
                    "cascade entry no longer matches dependent, skipping"
                );
                continue;
            }
            edit.push(SubEdit::remove_from_host(
                link.dependent,
                *host,
                link.ref_name.clone(),
            ));
            cascaded += 1;
        }
    }

    edit.push(SubEdit::remove_child(parent, index, Some(item)));

    let mut description = format!("Remove {} '{}'", node.kind(), node.name());
    if cascaded > 0 {
        description.push_str(&format!(" and clear {} reference(s) to it", cascaded));
    }
    Ok(edit.with_description(description))
}

/// Move an attached item under `new_parent` at `new_index`
///
/// `new_index` is the position after the item has left its old parent.
///
/// # Errors
///
/// Returns `RootImmutable`, `NotAttached`, `CycleDetected` or
/// `IndexOutOfRange`, or `EmptyEdit` if the item is already there.
pub fn move_item(
    doc: &Document,
    item: ItemId,
    new_parent: ItemId,
    new_index: usize,
) -> Result<Edit> {
    let tree = doc.tree();
    let (old_parent, old_index) = tree.position(item)?;
    if tree.is_ancestor_or_self(item, new_parent)? {
        return Err(EditError::CycleDetected { item, new_parent });
    }

    let target = tree.get(new_parent)?;
    let mut len = target.children().len();
    if new_parent == old_parent {
        len -= 1;
    }
    if new_index > len {
        return Err(EditError::IndexOutOfRange {
            parent: new_parent,
            index: new_index,
            len,
        });
    }

    let node = tree.get(item)?;
    let name = format!("Move {}", node.kind());
    if (new_parent, new_index) == (old_parent, old_index) {
        return Err(EditError::EmptyEdit { name });
    }

    Ok(Edit::new(MOVE_ITEM, name)
        .with_description(format!(
            "Move '{}' to '{}' at {}",
            node.name(),
            target.name(),
            new_index
        ))
        .with_sub_edit(SubEdit::move_item(item, new_parent, new_index)))
}

/// Change an item's kind in place
///
/// The handle is unchanged, so every reference to the item stays valid.
/// Attributes exclusive to the old kind are stripped and restored on undo.
///
/// # Errors
///
/// Returns `RootImmutable` if the root is involved on either side, or
/// `EmptyEdit` if the item already has `kind`.
pub fn retype_item(doc: &Document, item: ItemId, kind: ItemKind) -> Result<Edit> {
    let node = doc.tree().get(item)?;
    if node.is_root() || kind == ItemKind::Root {
        return Err(EditError::RootImmutable {
            op: RETYPE_ITEM.to_string(),
        });
    }

    let name = format!("Convert to {}", kind);
    if node.kind() == kind {
        return Err(EditError::EmptyEdit { name });
    }

    Ok(Edit::new(RETYPE_ITEM, name)
        .with_description(format!(
            "Convert '{}' from {} to {}",
            node.name(),
            node.kind(),
            kind
        ))
        .with_sub_edit(SubEdit::retype(item, kind)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct Fixture {
        doc: Document,
        root: ItemId,
        cat: ItemId,
        task: ItemId,
        slot: ItemId,
    }

    // Root -> [Cat -> [Task], Slot(task = Task)]
    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let root = doc.tree().root();
        let cat = doc.create_item(ItemKind::Category, "Cat").unwrap();
        let task = doc.create_item(ItemKind::Task, "Task").unwrap();
        let slot = doc.create_item(ItemKind::ScheduledItem, "Slot").unwrap();
        doc.tree_mut().add_child(root, cat, 0).unwrap();
        doc.tree_mut().add_child(cat, task, 0).unwrap();
        doc.tree_mut().add_child(root, slot, 1).unwrap();
        doc.write_attribute(slot, "task", Some(task.into())).unwrap();
        Fixture {
            doc,
            root,
            cat,
            task,
            slot,
        }
    }

    #[test]
    fn test_add_item_rejects_attached() {
        let f = fixture();
        let result = add_item(&f.doc, f.root, f.task, 0);
        assert!(matches!(result, Err(EditError::AlreadyAttached { .. })));
    }

    #[test]
    fn test_add_item_checks_index() {
        let mut f = fixture();
        let fresh = f.doc.create_item(ItemKind::Task, "Fresh").unwrap();
        assert!(matches!(
            add_item(&f.doc, f.cat, fresh, 2),
            Err(EditError::IndexOutOfRange { .. })
        ));
        let edit = add_item(&f.doc, f.cat, fresh, 1).unwrap();
        assert_eq!(edit.len(), 1);
    }

    #[test]
    fn test_remove_item_expands_descendant_cascades() {
        let f = fixture();
        let edit = remove_item(&f.doc, f.cat).unwrap();

        assert_eq!(edit.len(), 2);
        assert!(matches!(
            edit.sub_edits()[0],
            SubEdit::RemoveFromHost { dependent, host, .. } if dependent == f.slot && host == f.task
        ));
        assert!(matches!(edit.sub_edits()[1], SubEdit::RemoveChild { .. }));
    }

    #[test]
    fn test_remove_item_leaves_internal_references() {
        let mut f = fixture();
        // Slot moves under Cat, so its reference stays inside the removed subtree
        f.doc.tree_mut().remove_child(f.root, 1).unwrap();
        f.doc.tree_mut().add_child(f.cat, f.slot, 1).unwrap();

        let edit = remove_item(&f.doc, f.cat).unwrap();
        assert_eq!(edit.len(), 1);
    }

    #[test]
    fn test_remove_item_skips_stale_cascade() {
        let mut f = fixture();
        // Reference cleared behind the registry's back
        f.doc.tree_mut().set_attribute(f.slot, "task", None).unwrap();

        let edit = remove_item(&f.doc, f.task).unwrap();
        assert_eq!(edit.len(), 1);
    }

    #[test]
    fn test_remove_root_rejected() {
        let f = fixture();
        assert!(matches!(
            remove_item(&f.doc, f.root),
            Err(EditError::RootImmutable { .. })
        ));
    }

    #[test]
    fn test_move_item_validation() {
        let f = fixture();
        assert!(matches!(
            move_item(&f.doc, f.cat, f.task, 0),
            Err(EditError::CycleDetected { .. })
        ));
        assert!(matches!(
            move_item(&f.doc, f.cat, f.root, 0),
            Err(EditError::EmptyEdit { .. })
        ));
        assert!(matches!(
            move_item(&f.doc, f.task, f.root, 3),
            Err(EditError::IndexOutOfRange { .. })
        ));
        assert!(move_item(&f.doc, f.task, f.root, 2).is_ok());
    }

    #[test]
    fn test_retype_item() {
        let f = fixture();
        assert!(matches!(
            retype_item(&f.doc, f.task, ItemKind::Task),
            Err(EditError::EmptyEdit { .. })
        ));
        assert!(matches!(
            retype_item(&f.doc, f.task, ItemKind::Root),
            Err(EditError::RootImmutable { .. })
        ));
        let edit = retype_item(&f.doc, f.task, ItemKind::Category).unwrap();
        assert_eq!(edit.info().kind(), RETYPE_ITEM);
    }
}
