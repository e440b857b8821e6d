//! Operation boundary macros
//!
//! `execute`, `register`, `undo`, `redo` and `reclaim` each log one `start`
//! event and exactly one of `end` / `end_error`. Extra fields (`edit_id`,
//! `cursor`, `log_len`, ...) follow the fixed ones using the keys in
//! `reedit_core_types::schema`.

/// Log the start of an engine operation
///
/// ```
/// # use reedit_core::log_op_start;
/// log_op_start!("undo");
/// log_op_start!("register", edit_kind = "move_item", cursor = 3usize);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = reedit_core_types::schema::EVENT_START,
            $($($field)*)?
        );
    };
}

/// Log the successful end of an engine operation
///
/// `duration_ms` is mandatory; the log state after the operation usually
/// rides along.
///
/// ```
/// # use reedit_core::log_op_end;
/// log_op_end!("redo", duration_ms = 0, cursor = 2usize);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = reedit_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    };
}

/// Log a failed engine operation
///
/// The error goes through `ExError`, so the event carries the stable
/// `err_kind` / `err_code` pair a test or dashboard can match on.
///
/// ```
/// # use reedit_core::{log_op_error, errors::EditError};
/// log_op_error!("register", EditError::RegistryClosed, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = reedit_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err,
            $($($field)*)?
        );
    }};
}
