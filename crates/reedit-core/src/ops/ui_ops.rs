use crate::edit::{Edit, SubEdit};
use crate::errors::{EditError, Result};
use crate::model::AttrValue;
use crate::ops::Document;

pub const SET_UI_STATE: &str = "set_ui_state";

/// Build a UI-only edit for `EditLog::register_ui_state_edit`
///
/// # Errors
///
/// Returns `InvalidUiStateKey` for an empty key, or `EmptyEdit` if the
/// value is unchanged.
pub fn set_ui_state(doc: &Document, key: &str, value: Option<AttrValue>) -> Result<Edit> {
    if key.is_empty() {
        return Err(EditError::InvalidUiStateKey);
    }

    let sub_edit = SubEdit::set_ui_state(key, value.clone());
    let name = format!("Change {}", key);
    if sub_edit.is_noop(doc) {
        return Err(EditError::EmptyEdit { name });
    }

    let description = match &value {
        Some(value) => format!("{} = {}", key, value),
        None => format!("{} cleared", key),
    };
    Ok(Edit::new(SET_UI_STATE, name)
        .with_description(description)
        .with_sub_edit(sub_edit))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_ui_state() {
        let mut doc = Document::new();
        let mut edit = set_ui_state(&doc, "tab", Some("calendar".into())).unwrap();
        assert_eq!(edit.description(), "tab = \"calendar\"");
        edit.apply(&mut doc).unwrap();

        assert!(matches!(
            set_ui_state(&doc, "tab", Some("calendar".into())),
            Err(EditError::EmptyEdit { .. })
        ));
        assert!(matches!(
            set_ui_state(&doc, "", None),
            Err(EditError::InvalidUiStateKey)
        ));
    }
}
