//! Edit session
//!
//! Owns the document and its edit log for the lifetime of one editing
//! session. Components that register edits are handed the session (or a
//! borrow of it); there is no process-wide log.

use std::collections::BTreeSet;
use std::time::Instant;

use reedit_core_types::ItemId;

use crate::commands::Command;
use crate::config::EngineConfig;
use crate::edit::{Edit, EditLog, RedoOutcome, UndoOutcome};
use crate::errors::Result;
use crate::model::{AttrValue, ItemKind};
use crate::ops::Document;
use crate::{log_op_end, log_op_error, log_op_start};

#[derive(Debug)]
pub struct EditSession {
    document: Document,
    log: EditLog,
    config: EngineConfig,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EditSession {
    /// Start a session on an empty document
    ///
    /// Logging is not initialized here; call
    /// `logging_facility::init(config.profile)` once at startup.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    /// Start a session on an already-loaded document with an empty log
    pub fn with_document(document: Document, config: EngineConfig) -> Self {
        Self {
            document,
            log: EditLog::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Unrecorded document access, for loading only
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn log(&self) -> &EditLog {
        &self.log
    }

    /// Log access for the registry gate and callback registration
    pub fn log_mut(&mut self) -> &mut EditLog {
        &mut self.log
    }

    /// Allocate a detached item for a later `add_item` edit
    ///
    /// # Errors
    ///
    /// Returns `InvalidKind` for `ItemKind::Root`.
    pub fn create_item(&mut self, kind: ItemKind, name: impl Into<String>) -> Result<ItemId> {
        self.document.create_item(kind, name)
    }

    /// Register an edit, reclaiming items only the discarded redo tail held
    ///
    /// # Errors
    ///
    /// See `EditLog::register`.
    pub fn register(&mut self, edit: Edit) -> Result<()> {
        if self.log.redo_len() == 0 {
            return self.log.register(&mut self.document, edit);
        }

        let before = self.log.referenced_items();
        self.log.register(&mut self.document, edit)?;
        let after = self.log.referenced_items();

        let released: BTreeSet<ItemId> = before.difference(&after).copied().collect();
        self.reclaim_released(&released, &after);
        Ok(())
    }

    /// # Errors
    ///
    /// See `EditLog::register_ui_state_edit`.
    pub fn register_ui_state_edit(&mut self, edit: Edit) -> Result<()> {
        self.log.register_ui_state_edit(&mut self.document, edit)
    }

    /// Build and register the edit for `command`
    ///
    /// Returns the new item's handle for `InsertNewItem`. If that command
    /// is rejected, the item it allocated is freed again.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation error or the registration error.
    pub fn execute(&mut self, command: Command) -> Result<Option<ItemId>> {
        log_op_start!("execute", command = command.name());
        let start = Instant::now();

        let result = self.execute_impl(&command).map_err(|e| {
            log_op_error!(
                "execute",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                command = command.name()
            );
            e
        })?;

        log_op_end!(
            "execute",
            duration_ms = start.elapsed().as_millis() as u64,
            command = command.name()
        );
        Ok(result)
    }

    fn execute_impl(&mut self, command: &Command) -> Result<Option<ItemId>> {
        let new_item = match command {
            Command::InsertNewItem { kind, name, .. } => {
                Some(self.document.create_item(*kind, name.clone())?)
            }
            _ => None,
        };

        let registered = command.build(&self.document, new_item).and_then(|edit| {
            if command.is_ui_state() {
                self.register_ui_state_edit(edit)
            } else {
                self.register(edit)
            }
        });

        if let Err(err) = registered {
            if let Some(item) = new_item {
                if let Err(reclaim_err) = self.document.reclaim(item) {
                    tracing::warn!(
                        item_id = %item,
                        error = %reclaim_err,
                        "failed to free rejected item"
                    );
                }
            }
            return Err(err);
        }
        Ok(new_item)
    }

    /// # Errors
    ///
    /// See `EditLog::undo`.
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        self.log.undo(&mut self.document)
    }

    /// # Errors
    ///
    /// See `EditLog::redo`.
    pub fn redo(&mut self) -> Result<RedoOutcome> {
        self.log.redo(&mut self.document)
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Free every detached subtree that no retained edit, cascade link or
    /// UI-state value refers to
    ///
    /// Items allocated with `create_item` and not yet inserted are detached
    /// and unreferenced too, so call this only when none are in flight.
    pub fn reclaim_detached(&mut self) -> usize {
        let referenced = self.log.referenced_items();
        let candidates: BTreeSet<ItemId> =
            self.document.tree().detached_roots().into_iter().collect();
        self.reclaim_released(&candidates, &referenced)
    }

    fn reclaim_released(
        &mut self,
        released: &BTreeSet<ItemId>,
        referenced: &BTreeSet<ItemId>,
    ) -> usize {
        log_op_start!("reclaim", candidates = released.len());
        let start = Instant::now();

        let mut freed = 0;
        for root in self.document.tree().detached_roots() {
            let Ok(subtree) = self.document.tree().subtree(root) else {
                continue;
            };
            if !subtree.iter().any(|id| released.contains(id))
                || subtree.iter().any(|id| referenced.contains(id))
                || self.linked_from_outside(&subtree)
                || self.held_by_ui_state(&subtree)
            {
                continue;
            }
            match self.document.reclaim(root) {
                Ok(ids) => freed += ids.len(),
                Err(err) => {
                    tracing::warn!(
                        item_id = %root,
                        error = %err,
                        "detached subtree not reclaimed"
                    );
                }
            }
        }

        log_op_end!(
            "reclaim",
            duration_ms = start.elapsed().as_millis() as u64,
            freed = freed
        );
        freed
    }

    fn linked_from_outside(&self, subtree: &[ItemId]) -> bool {
        subtree.iter().any(|host| {
            self.document
                .cascades()
                .dependents_of(*host)
                .iter()
                .any(|link| !subtree.contains(&link.dependent))
        })
    }

    // UI-state refs never enter the cascade registry
    fn held_by_ui_state(&self, subtree: &[ItemId]) -> bool {
        self.document
            .ui_state()
            .values()
            .filter_map(AttrValue::as_ref_target)
            .any(|target| subtree.contains(&target))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::EditError;
    use crate::model::AttrValue;

    #[test]
    fn test_insert_new_item_round_trip() {
        let mut session = EditSession::default();
        let root = session.document().tree().root();

        let task = session
            .execute(Command::InsertNewItem {
                parent: root,
                index: 0,
                kind: ItemKind::Task,
                name: "Task".to_string(),
            })
            .unwrap()
            .unwrap();
        assert!(session.document().tree().is_attached(task).unwrap());

        session.undo().unwrap();
        assert!(!session.document().tree().is_attached(task).unwrap());
        session.redo().unwrap();
        assert_eq!(session.document().tree().position(task).unwrap(), (root, 0));
    }

    #[test]
    fn test_rejected_insert_frees_item() {
        let mut session = EditSession::default();
        let root = session.document().tree().root();
        let before = session.document().tree().len();

        let result = session.execute(Command::InsertNewItem {
            parent: root,
            index: 5,
            kind: ItemKind::Task,
            name: "Task".to_string(),
        });
        assert!(matches!(result, Err(EditError::IndexOutOfRange { .. })));
        assert_eq!(session.document().tree().len(), before);
    }

    #[test]
    fn test_truncation_reclaims_discarded_items() {
        let mut session = EditSession::default();
        let root = session.document().tree().root();

        let task = session
            .execute(Command::InsertNewItem {
                parent: root,
                index: 0,
                kind: ItemKind::Task,
                name: "Discarded".to_string(),
            })
            .unwrap()
            .unwrap();
        session.undo().unwrap();

        session
            .execute(Command::SetUiState {
                key: "tab".to_string(),
                value: Some(AttrValue::from("calendar")),
            })
            .unwrap();
        assert!(session.document().tree().contains(task));

        session
            .execute(Command::InsertNewItem {
                parent: root,
                index: 0,
                kind: ItemKind::Task,
                name: "Kept".to_string(),
            })
            .unwrap();

        assert!(matches!(
            session.document().tree().get(task),
            Err(EditError::StaleHandle { .. })
        ));
    }

    #[test]
    fn test_pending_created_item_survives_truncation() {
        let mut session = EditSession::default();
        let root = session.document().tree().root();

        session
            .execute(Command::InsertNewItem {
                parent: root,
                index: 0,
                kind: ItemKind::Category,
                name: "Cat".to_string(),
            })
            .unwrap();
        session.undo().unwrap();

        let staged = session.create_item(ItemKind::Task, "Staged").unwrap();
        session
            .execute(Command::InsertNewItem {
                parent: root,
                index: 0,
                kind: ItemKind::Task,
                name: "Other".to_string(),
            })
            .unwrap();

        assert!(session.document().tree().contains(staged));
        session
            .execute(Command::AddItem {
                parent: root,
                item: staged,
                index: 1,
            })
            .unwrap();
    }
}
