use reedit_core_types::ItemId;

use crate::edit::{Edit, SubEdit};
use crate::errors::{EditError, Result};
use crate::model::AttrValue;
use crate::ops::Document;

pub const SET_ATTRIBUTES: &str = "set_attributes";
pub const LINK_REFERENCE: &str = "link_reference";
pub const UNLINK_REFERENCE: &str = "unlink_reference";

/// Write several attributes of one item as a single edit
///
/// `None` clears an attribute. Writes that would not change the current
/// value are left out of the edit.
///
/// # Errors
///
/// Returns `InvalidAttributeName` for an empty name, a lookup error if the
/// item or a `Ref` target does not resolve, or `EmptyEdit` if every write
/// is a no-op.
pub fn set_attributes<I, K>(doc: &Document, item: ItemId, attrs: I) -> Result<Edit>
where
    I: IntoIterator<Item = (K, Option<AttrValue>)>,
    K: Into<String>,
{
    let node = doc.tree().get(item)?;
    let mut edit = Edit::new(SET_ATTRIBUTES, format!("Edit {}", node.name()));
    let mut changed = Vec::new();

    for (name, value) in attrs {
        let name = name.into();
        if name.is_empty() {
            return Err(EditError::InvalidAttributeName { item });
        }
        if let Some(host) = value.as_ref().and_then(AttrValue::as_ref_target) {
            doc.tree().get(host)?;
        }

        let sub_edit = SubEdit::set_attribute(item, name.clone(), value);
        if sub_edit.is_noop(doc) {
            continue;
        }
        edit.push(sub_edit);
        changed.push(name);
    }

    if edit.is_empty() {
        return Err(EditError::EmptyEdit {
            name: edit.name().to_string(),
        });
    }

    let description = format!("Set {} on '{}'", changed.join(", "), node.name());
    Ok(edit.with_description(description))
}

/// Point `dependent.ref_name` at `host`
///
/// The cascade registry picks the link up when the edit applies, so a
/// later removal of `host` clears it.
///
/// # Errors
///
/// Returns a lookup error if either item does not resolve, or `EmptyEdit`
/// if the reference is already in place.
pub fn link_reference(
    doc: &Document,
    dependent: ItemId,
    ref_name: &str,
    host: ItemId,
) -> Result<Edit> {
    let host_node = doc.tree().get(host)?;
    let dependent_node = doc.tree().get(dependent)?;

    let sub_edit = SubEdit::set_attribute(dependent, ref_name, Some(AttrValue::Ref(host)));
    let name = format!("Link to {}", host_node.name());
    if sub_edit.is_noop(doc) {
        return Err(EditError::EmptyEdit { name });
    }

    Ok(Edit::new(LINK_REFERENCE, name)
        .with_description(format!(
            "Set '{}'.{} to '{}'",
            dependent_node.name(),
            ref_name,
            host_node.name()
        ))
        .with_sub_edit(sub_edit))
}

/// Clear the reference held in `dependent.ref_name`
///
/// # Errors
///
/// Returns `NotAReference` if the attribute is absent or not a `Ref`.
pub fn unlink_reference(doc: &Document, dependent: ItemId, ref_name: &str) -> Result<Edit> {
    let dependent_node = doc.tree().get(dependent)?;
    let host = dependent_node
        .attribute(ref_name)
        .and_then(AttrValue::as_ref_target)
        .ok_or_else(|| EditError::NotAReference {
            item: dependent,
            name: ref_name.to_string(),
        })?;

    Ok(
        Edit::new(UNLINK_REFERENCE, format!("Unlink {}", ref_name))
            .with_description(format!(
                "Clear '{}'.{} (was {})",
                dependent_node.name(),
                ref_name,
                host
            ))
            .with_sub_edit(SubEdit::remove_from_host(dependent, host, ref_name)),
    )
}
