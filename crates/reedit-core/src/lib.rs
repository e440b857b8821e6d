//! Reedit Core - reversible edit engine for an item tree
//!
//! This crate provides:
//! - An arena of identity-stable tree items addressed by generation-checked handles
//! - Reversible SubEdit primitives that capture their own undo payload
//! - Edits composed of SubEdits, applied and reverted all-or-nothing
//! - An edit log with cursor-based undo/redo, edit stacking and callbacks
//! - Per-edit shadow logs of UI-only state changes
//! - A host → dependents cascade registry so removals clear references atomically
//!
//! # Example
//!
//! ```
//! use reedit_core::{AttrValue, Command, EditSession, ItemKind};
//!
//! let mut session = EditSession::default();
//! let root = session.document().tree().root();
//! let task = session
//!     .execute(Command::InsertNewItem {
//!         parent: root,
//!         index: 0,
//!         kind: ItemKind::Task,
//!         name: "Write report".to_string(),
//!     })?
//!     .expect("insert returns the new item");
//!
//! session.execute(Command::SetAttributes {
//!     item: task,
//!     attrs: vec![("status".to_string(), Some(AttrValue::from("Done")))],
//! })?;
//! session.undo()?;
//! assert_eq!(session.document().attribute(task, "status")?, None);
//! # Ok::<(), reedit_core::EditError>(())
//! ```

pub mod cascade;
pub mod commands;
pub mod config;
pub mod edit;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod session;

// Re-export commonly used types
pub use cascade::{CascadeRegistry, DependentRef};
pub use commands::Command;
pub use config::EngineConfig;
pub use edit::{
    CallbackPhase, Edit, EditInfo, EditLog, EditState, RedoOutcome, SubEdit, UiStateLog,
    UndoOutcome,
};
pub use errors::{EditError, EditErrorKind, ExError, Result};
pub use model::{AttrValue, ItemKind, TreeItem};
pub use ops::{Document, Tree};
pub use reedit_core_types::{EditId, ItemId};
pub use session::EditSession;
