//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_EDIT_ID: &str = "edit_id";
pub const FIELD_EDIT_KIND: &str = "edit_kind";
pub const FIELD_ITEM_ID: &str = "item_id";

// Log position
pub const FIELD_CURSOR: &str = "cursor";
pub const FIELD_LOG_LEN: &str = "log_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_CASCADE_SKIPPED: &str = "cascade_skipped";
