use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use reedit_core_types::{EditId, ItemId};

use crate::edit::callbacks::{CallbackPhase, CallbackRegistry, EditCallback};
use crate::edit::{SubEdit, UiStateLog};
use crate::errors::{EditError, Result};
use crate::ops::Document;

/// Lifecycle of an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// Constructed, never applied
    Pending,
    /// Applied; SubEdit payloads are captured
    Applied,
    /// Reverted; can be applied again
    Undone,
}

impl EditState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditState::Pending => "pending",
            EditState::Applied => "applied",
            EditState::Undone => "undone",
        }
    }
}

/// Presentation metadata of an edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditInfo {
    id: EditId,
    kind: &'static str,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    stack_key: Option<String>,
    stacked: bool,
}

impl EditInfo {
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            id: EditId::new(),
            kind,
            name: name.into(),
            description: String::new(),
            created_at: Utc::now(),
            stack_key: None,
            stacked: false,
        }
    }

    pub fn id(&self) -> EditId {
        self.id
    }

    /// Static tag callbacks are keyed by, e.g. `"add_item"`
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn stack_key(&self) -> Option<&str> {
        self.stack_key.as_deref()
    }

    /// Whether this edit is linked to the one before it in the log
    pub fn is_stacked(&self) -> bool {
        self.stacked
    }

    pub(crate) fn set_stacked(&mut self, stacked: bool) {
        self.stacked = stacked;
    }
}

/// Edit - one user-visible action, the unit of undo/redo
///
/// An ordered sequence of SubEdits. `apply` runs them in order and `revert`
/// runs them in reverse. Both are all-or-nothing: if a SubEdit fails, the
/// ones already run are rolled back before the error is returned, so the
/// document is never left half-edited.
pub struct Edit {
    info: EditInfo,
    sub_edits: Vec<SubEdit>,
    callback: Option<EditCallback>,
    ui_log: UiStateLog,
    state: EditState,
}

impl Edit {
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            info: EditInfo::new(kind, name),
            sub_edits: Vec::new(),
            callback: None,
            ui_log: UiStateLog::new(),
            state: EditState::Pending,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info.description = description.into();
        self
    }

    /// Edits registered back to back with the same stack key undo and
    /// redo together
    pub fn with_stack_key(mut self, key: impl Into<String>) -> Self {
        self.info.stack_key = Some(key.into());
        self
    }

    /// Attach a callback run after every apply and every revert
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(CallbackPhase, &EditInfo, &Document) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn with_sub_edit(mut self, sub_edit: SubEdit) -> Self {
        self.sub_edits.push(sub_edit);
        self
    }

    pub fn push(&mut self, sub_edit: SubEdit) {
        self.sub_edits.push(sub_edit);
    }

    /// Append another pending edit's SubEdits after this one's
    ///
    /// The other edit's callback and metadata are dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEditState` if either edit has already been applied.
    pub fn append(&mut self, other: Edit) -> Result<()> {
        for state in [self.state, other.state] {
            if state != EditState::Pending {
                return Err(EditError::InvalidEditState {
                    op: "append".to_string(),
                    state: state.as_str().to_string(),
                });
            }
        }
        self.sub_edits.extend(other.sub_edits);
        Ok(())
    }

    pub fn info(&self) -> &EditInfo {
        &self.info
    }

    pub(crate) fn info_mut(&mut self) -> &mut EditInfo {
        &mut self.info
    }

    pub fn id(&self) -> EditId {
        self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn description(&self) -> &str {
        &self.info.description
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn sub_edits(&self) -> &[SubEdit] {
        &self.sub_edits
    }

    pub fn len(&self) -> usize {
        self.sub_edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_edits.is_empty()
    }

    /// UI-state edits settled onto this edit
    pub fn ui_log(&self) -> &UiStateLog {
        &self.ui_log
    }

    pub(crate) fn ui_log_mut(&mut self) -> &mut UiStateLog {
        &mut self.ui_log
    }

    /// Apply every SubEdit in order, then the post-apply callback
    ///
    /// # Errors
    ///
    /// Returns `InvalidEditState` if already applied, or the first SubEdit
    /// failure after rolling back the SubEdits that had run.
    pub fn apply(&mut self, doc: &mut Document) -> Result<()> {
        if self.state == EditState::Applied {
            return Err(EditError::InvalidEditState {
                op: "apply".to_string(),
                state: self.state.as_str().to_string(),
            });
        }

        for index in 0..self.sub_edits.len() {
            if let Err(err) = self.sub_edits[index].apply(doc) {
                for done in self.sub_edits[..index].iter_mut().rev() {
                    if let Err(rollback_err) = done.revert(doc) {
                        tracing::error!(
                            component = module_path!(),
                            op = done.op_name(),
                            edit_id = %self.info.id,
                            error = %rollback_err,
                            "rollback of partially applied edit failed"
                        );
                    }
                }
                return Err(err);
            }
        }

        self.state = EditState::Applied;
        if let Some(callback) = self.callback.as_mut() {
            callback(CallbackPhase::PostApply, &self.info, doc);
        }
        Ok(())
    }

    /// Revert every SubEdit in reverse order, then the post-revert callback
    ///
    /// # Errors
    ///
    /// Returns `InvalidEditState` unless applied, or the first SubEdit
    /// failure after re-applying the SubEdits already reverted.
    pub fn revert(&mut self, doc: &mut Document) -> Result<()> {
        if self.state != EditState::Applied {
            return Err(EditError::InvalidEditState {
                op: "revert".to_string(),
                state: self.state.as_str().to_string(),
            });
        }

        for index in (0..self.sub_edits.len()).rev() {
            if let Err(err) = self.sub_edits[index].revert(doc) {
                for done in self.sub_edits[index + 1..].iter_mut() {
                    if let Err(rollforward_err) = done.apply(doc) {
                        tracing::error!(
                            component = module_path!(),
                            op = done.op_name(),
                            edit_id = %self.info.id,
                            error = %rollforward_err,
                            "roll-forward of partially reverted edit failed"
                        );
                    }
                }
                return Err(err);
            }
        }

        self.state = EditState::Undone;
        if let Some(callback) = self.callback.as_mut() {
            callback(CallbackPhase::PostRevert, &self.info, doc);
        }
        Ok(())
    }

    /// `apply` wrapped in the log-level callbacks for this edit's kind
    pub(crate) fn apply_with(
        &mut self,
        doc: &mut Document,
        callbacks: &mut CallbackRegistry,
    ) -> Result<()> {
        callbacks.run(CallbackPhase::PreApply, &self.info, doc);
        self.apply(doc)?;
        callbacks.run(CallbackPhase::PostApply, &self.info, doc);
        Ok(())
    }

    /// `revert` wrapped in the log-level callbacks for this edit's kind
    pub(crate) fn revert_with(
        &mut self,
        doc: &mut Document,
        callbacks: &mut CallbackRegistry,
    ) -> Result<()> {
        callbacks.run(CallbackPhase::PreRevert, &self.info, doc);
        self.revert(doc)?;
        callbacks.run(CallbackPhase::PostRevert, &self.info, doc);
        Ok(())
    }

    /// Collect every item handle held by this edit and its UI-state log
    pub fn referenced_items(&self, out: &mut BTreeSet<ItemId>) {
        for sub_edit in &self.sub_edits {
            sub_edit.referenced_items(out);
        }
        self.ui_log.referenced_items(out);
    }
}

impl std::fmt::Debug for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edit")
            .field("info", &self.info)
            .field("state", &self.state)
            .field("sub_edits", &self.sub_edits)
            .field("has_callback", &self.callback.is_some())
            .field("ui_log", &self.ui_log)
            .finish()
    }
}
