//! Edit log
//!
//! Ordered history of committed edits plus a cursor. Edits below the cursor
//! are applied; edits at or above it are undone and can be redone until a
//! new edit is registered. The log also owns the pending UI-state log and
//! the per-kind callback registry.

use std::collections::BTreeSet;
use std::time::Instant;

use reedit_core_types::ItemId;

use crate::config::EngineConfig;
use crate::edit::callbacks::{CallbackPhase, CallbackRegistry};
use crate::edit::{Edit, EditInfo, UiStateLog};
use crate::errors::{EditError, Result};
use crate::ops::Document;
use crate::{log_op_end, log_op_error, log_op_start};

/// Result of an `undo` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    Applied,
    NothingToUndo,
}

/// Result of a `redo` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedoOutcome {
    Applied,
    NothingToRedo,
}

#[derive(Debug)]
pub struct EditLog {
    edits: Vec<Edit>,
    cursor: usize,
    pending_ui: UiStateLog,
    callbacks: CallbackRegistry,
    open: bool,
    stack_edits: bool,
}

impl Default for EditLog {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl EditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            edits: Vec::new(),
            cursor: 0,
            pending_ui: UiStateLog::new(),
            callbacks: CallbackRegistry::new(),
            open: config.open_on_start,
            stack_edits: config.stack_edits,
        }
    }

    // ===== Registry gate =====

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Allow registrations again
    pub fn open_registry(&mut self) {
        self.open = true;
    }

    /// Refuse registrations until reopened, e.g. while a document loads
    pub fn close_registry(&mut self) {
        self.open = false;
    }

    pub fn set_stacking(&mut self, enabled: bool) {
        self.stack_edits = enabled;
    }

    // ===== Registration =====

    /// Apply `edit` and commit it at the cursor
    ///
    /// The redo tail is discarded only once the edit has applied, so a
    /// rejected registration leaves both the document and the log as they
    /// were. UI-state edits pending since the previous commit are settled
    /// onto that previous edit.
    ///
    /// # Errors
    ///
    /// Returns `RegistryClosed` while the gate is closed, `EmptyEdit` for
    /// an edit with no SubEdits, or the apply failure.
    pub fn register(&mut self, doc: &mut Document, edit: Edit) -> Result<()> {
        log_op_start!(
            "register",
            edit_id = %edit.id(),
            edit_kind = edit.info().kind(),
            cursor = self.cursor
        );
        let start = Instant::now();

        self.register_impl(doc, edit).map_err(|e| {
            log_op_error!(
                "register",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "register",
            duration_ms = start.elapsed().as_millis() as u64,
            cursor = self.cursor,
            log_len = self.edits.len()
        );
        Ok(())
    }

    fn register_impl(&mut self, doc: &mut Document, mut edit: Edit) -> Result<()> {
        self.check_accepting(&edit)?;
        edit.apply_with(doc, &mut self.callbacks)?;

        let discarded = self.edits.len() - self.cursor;
        if discarded > 0 {
            self.edits.truncate(self.cursor);
            tracing::debug!(discarded, "redo tail discarded");
        }
        if let Some(previous) = self.edits.last_mut() {
            previous.ui_log_mut().discard_undone();
        }

        let stacked = self.stack_edits
            && match (edit.info().stack_key(), self.edits.last()) {
                (Some(key), Some(previous)) => previous.info().stack_key() == Some(key),
                _ => false,
            };
        edit.info_mut().set_stacked(stacked);

        self.edits.push(edit);
        self.cursor += 1;

        if self.cursor >= 2 {
            let settled = &mut self.edits[self.cursor - 2];
            settled.ui_log_mut().transplant_from(&mut self.pending_ui);
        } else {
            self.pending_ui.clear();
        }
        Ok(())
    }

    /// Apply a UI-only edit and hold it in the pending UI-state log
    ///
    /// It does not move the cursor; it is settled onto the current edit
    /// when the next edit is registered.
    ///
    /// # Errors
    ///
    /// Same as `register`.
    pub fn register_ui_state_edit(&mut self, doc: &mut Document, mut edit: Edit) -> Result<()> {
        self.check_accepting(&edit)?;
        edit.apply_with(doc, &mut self.callbacks)?;
        tracing::debug!(
            edit_id = %edit.id(),
            pending = self.pending_ui.len() + 1,
            "ui state edit pending"
        );
        self.pending_ui.push(edit);
        Ok(())
    }

    fn check_accepting(&self, edit: &Edit) -> Result<()> {
        if !self.open {
            return Err(EditError::RegistryClosed);
        }
        if edit.is_empty() {
            return Err(EditError::EmptyEdit {
                name: edit.name().to_string(),
            });
        }
        Ok(())
    }

    // ===== Undo / redo =====

    /// Undo the edit before the cursor, and any edits stacked beneath it
    ///
    /// # Errors
    ///
    /// Only fails if replay finds the document in a shape the log did not
    /// produce (an identity violation); this is logged at error level.
    pub fn undo(&mut self, doc: &mut Document) -> Result<UndoOutcome> {
        log_op_start!("undo", cursor = self.cursor);
        let start = Instant::now();

        let outcome = self.undo_impl(doc).map_err(|e| {
            log_op_error!(
                "undo",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                cursor = self.cursor
            );
            e
        })?;

        log_op_end!(
            "undo",
            duration_ms = start.elapsed().as_millis() as u64,
            cursor = self.cursor,
            outcome = ?outcome
        );
        Ok(outcome)
    }

    fn undo_impl(&mut self, doc: &mut Document) -> Result<UndoOutcome> {
        if self.cursor == 0 {
            return Ok(UndoOutcome::NothingToUndo);
        }
        loop {
            self.undo_step(doc)?;
            let linked = self.edits[self.cursor].info().is_stacked();
            if !linked || self.cursor == 0 {
                break;
            }
        }
        Ok(UndoOutcome::Applied)
    }

    fn undo_step(&mut self, doc: &mut Document) -> Result<()> {
        let index = self.cursor - 1;

        self.pending_ui.revert_applied(doc, &mut self.callbacks)?;
        self.pending_ui.clear();

        let edit = &mut self.edits[index];
        edit.ui_log_mut().revert_applied(doc, &mut self.callbacks)?;
        edit.revert_with(doc, &mut self.callbacks)?;

        self.cursor = index;
        Ok(())
    }

    /// Redo the edit at the cursor, and any edits stacked on top of it
    ///
    /// # Errors
    ///
    /// Same as `undo`.
    pub fn redo(&mut self, doc: &mut Document) -> Result<RedoOutcome> {
        log_op_start!("redo", cursor = self.cursor);
        let start = Instant::now();

        let outcome = self.redo_impl(doc).map_err(|e| {
            log_op_error!(
                "redo",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                cursor = self.cursor
            );
            e
        })?;

        log_op_end!(
            "redo",
            duration_ms = start.elapsed().as_millis() as u64,
            cursor = self.cursor,
            outcome = ?outcome
        );
        Ok(outcome)
    }

    fn redo_impl(&mut self, doc: &mut Document) -> Result<RedoOutcome> {
        if self.cursor == self.edits.len() {
            return Ok(RedoOutcome::NothingToRedo);
        }
        loop {
            self.redo_step(doc)?;
            let next_linked = self
                .edits
                .get(self.cursor)
                .is_some_and(|next| next.info().is_stacked());
            if !next_linked {
                break;
            }
        }
        Ok(RedoOutcome::Applied)
    }

    fn redo_step(&mut self, doc: &mut Document) -> Result<()> {
        let index = self.cursor;

        self.pending_ui.apply_unapplied(doc, &mut self.callbacks)?;
        match index.checked_sub(1) {
            Some(previous) => {
                let settled = &mut self.edits[previous];
                settled.ui_log_mut().transplant_from(&mut self.pending_ui);
                settled
                    .ui_log_mut()
                    .reapply_undone(doc, &mut self.callbacks)?;
            }
            None => self.pending_ui.clear(),
        }

        self.edits[index].apply_with(doc, &mut self.callbacks)?;
        self.cursor = index + 1;
        Ok(())
    }

    // ===== Queries =====

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.edits.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of undone edits still available to redo
    pub fn redo_len(&self) -> usize {
        self.edits.len() - self.cursor
    }

    pub fn edit(&self, index: usize) -> Option<&Edit> {
        self.edits.get(index)
    }

    /// Metadata of every retained edit, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &EditInfo> {
        self.edits.iter().map(Edit::info)
    }

    /// Name of the edit `undo` would revert
    pub fn undo_name(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.edits.get(i))
            .map(Edit::name)
    }

    /// Name of the edit `redo` would apply
    pub fn redo_name(&self) -> Option<&str> {
        self.edits.get(self.cursor).map(Edit::name)
    }

    pub fn pending_ui(&self) -> &UiStateLog {
        &self.pending_ui
    }

    /// Every item handle held by a retained edit or UI-state entry
    pub fn referenced_items(&self) -> BTreeSet<ItemId> {
        let mut out = BTreeSet::new();
        for edit in &self.edits {
            edit.referenced_items(&mut out);
        }
        self.pending_ui.referenced_items(&mut out);
        out
    }

    // ===== Callbacks =====

    /// Run `callback` at `phase` for every edit of `kind`
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCallback` if `id` is taken for this phase and kind.
    pub fn register_callback<F>(
        &mut self,
        phase: CallbackPhase,
        kind: &'static str,
        id: impl Into<String>,
        callback: F,
    ) -> Result<()>
    where
        F: FnMut(&EditInfo, &Document) + 'static,
    {
        self.callbacks.register(phase, kind, id, Box::new(callback))
    }

    /// Drop every callback registered under `id`
    pub fn remove_callbacks(&mut self, id: &str) -> usize {
        self.callbacks.remove(id)
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    // ===== Presentation =====

    /// Applied edits as text, one block per edit or stack of linked edits
    ///
    /// A stack is titled by its first edit's name. With `long`, every
    /// edit's description follows on an indented line.
    pub fn render_text(&self, long: bool) -> String {
        let rule = "--------";
        let mut out = format!("\n{rule}\nEDIT LOG\n{rule}\n\n");

        let applied = &self.edits[..self.cursor];
        if applied.is_empty() {
            out.push_str("[EMPTY]\n\n");
            return out;
        }

        let mut blocks: Vec<String> = Vec::new();
        for edit in applied {
            let info = edit.info();
            if !info.is_stacked() || blocks.is_empty() {
                blocks.push(info.name().to_string());
            }
            if long {
                if let Some(block) = blocks.last_mut() {
                    block.push_str(&format!("\n\t{}", info.description()));
                }
            }
        }

        out.push_str(&blocks.join("\n\n"));
        out.push_str(&format!("\n\n{rule}\n\n"));
        out
    }
}
