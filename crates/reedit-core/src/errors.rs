use reedit_core_types::ItemId;
use thiserror::Error;

/// Result type alias using EditError
pub type Result<T> = std::result::Result<T, EditError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every `EditError` variant falls into exactly one kind. The kind decides
/// how the failure is handled: structural and cascade errors reject an edit
/// before anything is mutated, identity violations mean a captured handle no
/// longer names the instance it was captured from and must be surfaced loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditErrorKind {
    /// A SubEdit precondition does not hold (stale index, missing target, ...)
    Structural,
    /// A captured reference resolves to a different instance than the one captured
    IdentityViolation,
    /// A cascade entry no longer points at the host it was registered for
    CascadeLookup,
    /// The edit log refused the request (closed registry, duplicate callback)
    Registry,
    /// Engine configuration could not be read
    Config,
}

impl EditErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            EditErrorKind::Structural => "ERR_STRUCTURAL",
            EditErrorKind::IdentityViolation => "ERR_IDENTITY_VIOLATION",
            EditErrorKind::CascadeLookup => "ERR_CASCADE_LOOKUP",
            EditErrorKind::Registry => "ERR_REGISTRY",
            EditErrorKind::Config => "ERR_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// Flattened view of an `EditError` carrying classification fields for
/// structured logging and programmatic handling.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: EditErrorKind,
    op: Option<String>,
    item_id: Option<ItemId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: EditErrorKind) -> Self {
        Self {
            kind,
            op: None,
            item_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add item context
    pub fn with_item_id(mut self, item: ItemId) -> Self {
        self.item_id = Some(item);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> EditErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn item_id(&self) -> Option<ItemId> {
        self.item_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(item_id) = self.item_id {
            write!(f, " (item: {})", item_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for edit construction, registration and replay
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    // ===== Structural Errors =====
    /// No item was ever allocated under this handle, or its slot is empty
    #[error("Item not found: {item}")]
    ItemNotFound { item: ItemId },

    /// Handle was issued for a slot generation that has since been reclaimed
    #[error("Stale item handle {item}: slot now holds generation {current}")]
    StaleHandle { item: ItemId, current: u32 },

    /// Child index outside the parent's current child range
    #[error("Index {index} out of range for {parent} with {len} children")]
    IndexOutOfRange {
        parent: ItemId,
        index: usize,
        len: usize,
    },

    /// Item already has a parent and cannot be added again
    #[error("Item {item} is already a child of {parent}")]
    AlreadyAttached { item: ItemId, parent: ItemId },

    /// Item has no parent, so it cannot be removed or moved
    #[error("Item {item} is not attached to a parent")]
    NotAttached { item: ItemId },

    /// Placing the item under the new parent would make it its own ancestor
    #[error("Cycle detected: cannot place {item} under {new_parent}")]
    CycleDetected { item: ItemId, new_parent: ItemId },

    /// The root item cannot be removed, moved or retyped
    #[error("Root item cannot be used in '{op}'")]
    RootImmutable { op: String },

    /// Requested item kind is not allowed for this operation
    #[error("Invalid kind {kind} for {item}: {reason}")]
    InvalidKind {
        item: ItemId,
        kind: String,
        reason: String,
    },

    /// Attribute or UI-state key is empty
    #[error("Invalid attribute name on {item}: names must be non-empty")]
    InvalidAttributeName { item: ItemId },

    /// Invalid UI-state key
    #[error("Invalid UI-state key: keys must be non-empty")]
    InvalidUiStateKey,

    /// Attribute expected to hold a reference holds something else
    #[error("Attribute '{name}' on {item} is not a reference")]
    NotAReference { item: ItemId, name: String },

    /// Edit has no SubEdits, or every requested change is a no-op
    #[error("Edit '{name}' contains no changes")]
    EmptyEdit { name: String },

    /// Edit or SubEdit asked to revert/re-apply from the wrong state
    #[error("'{op}' called in invalid state: {state}")]
    InvalidEditState { op: String, state: String },

    // ===== Identity Errors =====
    /// A captured handle no longer names the instance originally captured
    #[error("Identity violation in '{op}': expected {expected}, found {found:?}")]
    IdentityViolation {
        op: String,
        expected: ItemId,
        found: Option<ItemId>,
    },

    // ===== Cascade Errors =====
    /// Dependent's reference no longer points at the expected host
    #[error("Cascade lookup failed: {dependent}.{ref_name} no longer references {host}")]
    CascadeLookup {
        dependent: ItemId,
        host: ItemId,
        ref_name: String,
    },

    // ===== Registry Errors =====
    /// The edit registry is closed (e.g. while a document is loading)
    #[error("Edit registry is closed")]
    RegistryClosed,

    /// A callback with this id is already registered for the phase and kind
    #[error("Callback '{id}' already registered for {phase} on edit kind '{kind}'")]
    DuplicateCallback {
        id: String,
        phase: String,
        kind: String,
    },

    // ===== Config Errors =====
    /// Engine configuration could not be parsed
    #[error("Invalid engine configuration: {reason}")]
    Config { reason: String },
}

impl EditError {
    /// Classify this error
    pub fn kind(&self) -> EditErrorKind {
        match self {
            EditError::IdentityViolation { .. } => EditErrorKind::IdentityViolation,
            EditError::CascadeLookup { .. } => EditErrorKind::CascadeLookup,
            EditError::RegistryClosed | EditError::DuplicateCallback { .. } => {
                EditErrorKind::Registry
            }
            EditError::Config { .. } => EditErrorKind::Config,
            _ => EditErrorKind::Structural,
        }
    }

    /// Item most relevant to this error, if any
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            EditError::ItemNotFound { item }
            | EditError::StaleHandle { item, .. }
            | EditError::AlreadyAttached { item, .. }
            | EditError::NotAttached { item }
            | EditError::CycleDetected { item, .. }
            | EditError::InvalidKind { item, .. }
            | EditError::InvalidAttributeName { item }
            | EditError::NotAReference { item, .. } => Some(*item),
            EditError::IndexOutOfRange { parent, .. } => Some(*parent),
            EditError::IdentityViolation { expected, .. } => Some(*expected),
            EditError::CascadeLookup { dependent, .. } => Some(*dependent),
            _ => None,
        }
    }
}

/// Conversion from EditError to ExError
impl From<EditError> for ExError {
    fn from(err: EditError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(item) = err.item_id() {
            ex = ex.with_item_id(item);
        }
        match &err {
            EditError::IdentityViolation { op, .. }
            | EditError::RootImmutable { op }
            | EditError::InvalidEditState { op, .. } => ex.with_op(op.clone()),
            _ => ex,
        }
    }
}

impl From<serde_json::Error> for EditError {
    fn from(err: serde_json::Error) -> Self {
        EditError::Config {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(EditErrorKind::Structural.code(), "ERR_STRUCTURAL");
        assert_eq!(
            EditErrorKind::IdentityViolation.code(),
            "ERR_IDENTITY_VIOLATION"
        );
        assert_eq!(EditErrorKind::CascadeLookup.code(), "ERR_CASCADE_LOOKUP");
        assert_eq!(EditErrorKind::Registry.code(), "ERR_REGISTRY");
        assert_eq!(EditErrorKind::Config.code(), "ERR_CONFIG");
    }

    #[test]
    fn test_structural_classification() {
        let err = EditError::IndexOutOfRange {
            parent: ItemId::new(0, 0),
            index: 5,
            len: 2,
        };
        assert_eq!(err.kind(), EditErrorKind::Structural);
        assert_eq!(err.item_id(), Some(ItemId::new(0, 0)));
    }

    #[test]
    fn test_identity_violation_carries_op() {
        let err = EditError::IdentityViolation {
            op: "remove_child".to_string(),
            expected: ItemId::new(3, 1),
            found: Some(ItemId::new(4, 0)),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), EditErrorKind::IdentityViolation);
        assert_eq!(ex.op(), Some("remove_child"));
        assert_eq!(ex.item_id(), Some(ItemId::new(3, 1)));
        assert!(ex.to_string().starts_with("[ERR_IDENTITY_VIOLATION]"));
    }

    #[test]
    fn test_registry_errors_share_kind() {
        assert_eq!(EditError::RegistryClosed.kind(), EditErrorKind::Registry);
        let dup = EditError::DuplicateCallback {
            id: "view".to_string(),
            phase: "post_apply".to_string(),
            kind: "add_item".to_string(),
        };
        assert_eq!(dup.kind(), EditErrorKind::Registry);
    }

    #[test]
    fn test_serde_error_maps_to_config() {
        let err: EditError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), EditErrorKind::Config);
    }
}
