//! Shadow log of UI-only state changes
//!
//! UI-state edits (switching tab, changing a filter) are not undo steps of
//! their own. They ride along with a main edit: undoing that edit first
//! reverts the UI changes made after it, so the user sees the view they
//! had when they made the edit.

use std::collections::BTreeSet;

use reedit_core_types::ItemId;

use crate::edit::callbacks::CallbackRegistry;
use crate::edit::{Edit, EditInfo, EditState};
use crate::errors::Result;
use crate::ops::Document;

/// Ordered UI-state edits attached to one main edit (or pending at the
/// log head)
///
/// Each entry's own `EditState` doubles as its applied flag.
#[derive(Debug, Default)]
pub struct UiStateLog {
    entries: Vec<Edit>,
}

impl UiStateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metadata of every entry, oldest first
    pub fn infos(&self) -> impl Iterator<Item = &EditInfo> {
        self.entries.iter().map(Edit::info)
    }

    /// Number of entries whose effect is currently in the document
    pub fn applied_count(&self) -> usize {
        self.count(EditState::Applied)
    }

    /// Number of entries reverted by an undo and awaiting a redo
    pub fn undone_count(&self) -> usize {
        self.count(EditState::Undone)
    }

    fn count(&self, state: EditState) -> usize {
        self.entries.iter().filter(|e| e.state() == state).count()
    }

    pub(crate) fn push(&mut self, edit: Edit) {
        self.entries.push(edit);
    }

    /// Move every entry of `other` into this log
    ///
    /// Entries land after the applied ones and before any awaiting a redo,
    /// keeping list order equal to the order effects reached the document.
    pub(crate) fn transplant_from(&mut self, other: &mut UiStateLog) {
        let at = self
            .entries
            .iter()
            .position(|e| e.state() != EditState::Applied)
            .unwrap_or(self.entries.len());
        self.entries.splice(at..at, other.entries.drain(..));
    }

    /// Drop entries whose redo was lost to a new registration
    pub(crate) fn discard_undone(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.state() == EditState::Applied);
        before - self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Revert applied entries, newest first
    ///
    /// # Errors
    ///
    /// Returns the first revert failure; entries reverted before it stay
    /// reverted.
    pub(crate) fn revert_applied(
        &mut self,
        doc: &mut Document,
        callbacks: &mut CallbackRegistry,
    ) -> Result<usize> {
        let mut reverted = 0;
        for entry in self.entries.iter_mut().rev() {
            if entry.state() == EditState::Applied {
                entry.revert_with(doc, callbacks)?;
                reverted += 1;
            }
        }
        Ok(reverted)
    }

    /// Re-apply entries an undo reverted, oldest first
    ///
    /// # Errors
    ///
    /// Returns the first apply failure.
    pub(crate) fn reapply_undone(
        &mut self,
        doc: &mut Document,
        callbacks: &mut CallbackRegistry,
    ) -> Result<usize> {
        self.apply_matching(doc, callbacks, |state| state == EditState::Undone)
    }

    /// Apply every entry not currently applied, oldest first
    ///
    /// # Errors
    ///
    /// Returns the first apply failure.
    pub(crate) fn apply_unapplied(
        &mut self,
        doc: &mut Document,
        callbacks: &mut CallbackRegistry,
    ) -> Result<usize> {
        self.apply_matching(doc, callbacks, |state| state != EditState::Applied)
    }

    fn apply_matching(
        &mut self,
        doc: &mut Document,
        callbacks: &mut CallbackRegistry,
        wanted: impl Fn(EditState) -> bool,
    ) -> Result<usize> {
        let mut applied = 0;
        for entry in self.entries.iter_mut() {
            if wanted(entry.state()) {
                entry.apply_with(doc, callbacks)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    pub(crate) fn referenced_items(&self, out: &mut BTreeSet<ItemId>) {
        for entry in &self.entries {
            entry.referenced_items(out);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::edit::SubEdit;
    use crate::model::AttrValue;

    fn tab_edit(tab: &str) -> Edit {
        Edit::new("set_ui_state", format!("Show {}", tab))
            .with_sub_edit(SubEdit::set_ui_state("tab", Some(tab.into())))
    }

    #[test]
    fn test_revert_then_reapply_restores_order() {
        let mut doc = Document::new();
        let mut callbacks = CallbackRegistry::new();
        let mut log = UiStateLog::new();

        for tab in ["calendar", "tasks"] {
            let mut edit = tab_edit(tab);
            edit.apply(&mut doc).unwrap();
            log.push(edit);
        }

        assert_eq!(log.revert_applied(&mut doc, &mut callbacks).unwrap(), 2);
        assert_eq!(doc.ui_value("tab"), None);
        assert_eq!(log.undone_count(), 2);

        assert_eq!(log.reapply_undone(&mut doc, &mut callbacks).unwrap(), 2);
        assert_eq!(doc.ui_value("tab"), Some(&AttrValue::from("tasks")));
        assert_eq!(log.applied_count(), 2);
    }

    #[test]
    fn test_transplant_moves_entries() {
        let mut doc = Document::new();
        let mut applied = tab_edit("tasks");
        applied.apply(&mut doc).unwrap();
        let mut target = UiStateLog::new();
        target.push(applied);

        let mut pending = UiStateLog::new();
        pending.push(tab_edit("calendar"));

        target.transplant_from(&mut pending);

        assert!(pending.is_empty());
        let names: Vec<_> = target.infos().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["Show tasks", "Show calendar"]);
    }

    #[test]
    fn test_transplant_lands_before_undone_entries() {
        let mut doc = Document::new();
        let mut callbacks = CallbackRegistry::new();

        let mut target = UiStateLog::new();
        let mut undone = tab_edit("calendar");
        undone.apply(&mut doc).unwrap();
        target.push(undone);
        target.revert_applied(&mut doc, &mut callbacks).unwrap();

        let mut pending = UiStateLog::new();
        let mut fresh = tab_edit("tasks");
        fresh.apply(&mut doc).unwrap();
        pending.push(fresh);

        target.transplant_from(&mut pending);
        let names: Vec<_> = target.infos().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["Show tasks", "Show calendar"]);

        assert_eq!(target.discard_undone(), 1);
        assert_eq!(target.len(), 1);
        assert_eq!(target.applied_count(), 1);
    }
}
