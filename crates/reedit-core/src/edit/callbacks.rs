//! Edit callbacks
//!
//! Presentation code subscribes to edits of a given kind and is told when
//! they are applied or reverted. Callbacks only ever see shared borrows of
//! the document and the edit's metadata, so they cannot re-enter the edit
//! log while it is mid-transition.

use std::collections::BTreeMap;

use crate::edit::EditInfo;
use crate::errors::{EditError, Result};
use crate::ops::Document;

/// Point in an edit's transition at which a callback runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallbackPhase {
    PreApply,
    PostApply,
    PreRevert,
    PostRevert,
}

impl CallbackPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackPhase::PreApply => "pre_apply",
            CallbackPhase::PostApply => "post_apply",
            CallbackPhase::PreRevert => "pre_revert",
            CallbackPhase::PostRevert => "post_revert",
        }
    }
}

impl std::fmt::Display for CallbackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback carried by a single edit, run after it is applied or reverted
pub type EditCallback = Box<dyn FnMut(CallbackPhase, &EditInfo, &Document)>;

/// Callback registered on the log for every edit of one kind
pub type LogCallback = Box<dyn FnMut(&EditInfo, &Document)>;

/// Callbacks keyed by phase and edit kind, each under a caller-chosen id
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: BTreeMap<(CallbackPhase, &'static str), Vec<(String, LogCallback)>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to run at `phase` for edits of `kind`
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCallback` if `id` is already registered for this
    /// phase and kind.
    pub fn register(
        &mut self,
        phase: CallbackPhase,
        kind: &'static str,
        id: impl Into<String>,
        callback: LogCallback,
    ) -> Result<()> {
        let id = id.into();
        let entries = self.callbacks.entry((phase, kind)).or_default();
        if entries.iter().any(|(existing, _)| *existing == id) {
            return Err(EditError::DuplicateCallback {
                id,
                phase: phase.to_string(),
                kind: kind.to_string(),
            });
        }
        entries.push((id, callback));
        Ok(())
    }

    /// Drop every callback registered under `id`, returning how many went
    pub fn remove(&mut self, id: &str) -> usize {
        let mut removed = 0;
        self.callbacks.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|(existing, _)| existing != id);
            removed += before - entries.len();
            !entries.is_empty()
        });
        removed
    }

    /// Run the callbacks for `phase` matching the edit's kind, in
    /// registration order
    pub fn run(&mut self, phase: CallbackPhase, info: &EditInfo, doc: &Document) {
        if let Some(entries) = self.callbacks.get_mut(&(phase, info.kind())) {
            for (_, callback) in entries.iter_mut() {
                callback(info, doc);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<_> = self
            .callbacks
            .iter()
            .map(|((phase, kind), entries)| {
                let ids: Vec<&str> = entries.iter().map(|(id, _)| id.as_str()).collect();
                format!("{}:{}={:?}", phase, kind, ids)
            })
            .collect();
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &keys)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = CallbackRegistry::new();
        registry
            .register(CallbackPhase::PostApply, "add_item", "view", Box::new(|_, _| {}))
            .unwrap();
        let result =
            registry.register(CallbackPhase::PostApply, "add_item", "view", Box::new(|_, _| {}));
        assert!(matches!(result, Err(EditError::DuplicateCallback { .. })));

        // Same id on another phase is fine
        registry
            .register(CallbackPhase::PostRevert, "add_item", "view", Box::new(|_, _| {}))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_by_id() {
        let mut registry = CallbackRegistry::new();
        registry
            .register(CallbackPhase::PostApply, "add_item", "view", Box::new(|_, _| {}))
            .unwrap();
        registry
            .register(CallbackPhase::PostApply, "move_item", "view", Box::new(|_, _| {}))
            .unwrap();
        registry
            .register(CallbackPhase::PostApply, "move_item", "other", Box::new(|_, _| {}))
            .unwrap();

        assert_eq!(registry.remove("view"), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_run_matches_kind() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallbackRegistry::new();
        let sink = calls.clone();
        registry
            .register(
                CallbackPhase::PostApply,
                "add_item",
                "view",
                Box::new(move |info, _| sink.borrow_mut().push(info.name().to_string())),
            )
            .unwrap();

        let doc = Document::new();
        let matching = EditInfo::new("add_item", "Add Task");
        let other = EditInfo::new("move_item", "Move Task");
        registry.run(CallbackPhase::PostApply, &matching, &doc);
        registry.run(CallbackPhase::PostApply, &other, &doc);
        registry.run(CallbackPhase::PreApply, &matching, &doc);

        assert_eq!(*calls.borrow(), vec!["Add Task".to_string()]);
    }
}
