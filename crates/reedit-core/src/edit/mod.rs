pub mod callbacks;
pub mod composite;
pub mod log;
pub mod sub_edit;
pub mod ui_state;

pub use callbacks::{CallbackPhase, CallbackRegistry, EditCallback, LogCallback};
pub use composite::{Edit, EditInfo, EditState};
pub use log::{EditLog, RedoOutcome, UndoOutcome};
pub use sub_edit::SubEdit;
pub use ui_state::UiStateLog;
