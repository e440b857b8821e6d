use std::collections::BTreeMap;

use reedit_core_types::ItemId;

use super::kind::ItemKind;
use super::value::AttrValue;

/// Attribute holding an item's display name
pub const NAME_ATTRIBUTE: &str = "name";

/// TreeItem - a node in the domain tree
///
/// A TreeItem lives in exactly one arena slot for its whole life. Children
/// are owned through the arena and listed here in order; the parent link is
/// a plain handle and never owns anything. Every mutation happens in place,
/// so handles held elsewhere keep resolving to this instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    id: ItemId,
    kind: ItemKind,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    attributes: BTreeMap<String, AttrValue>,
}

impl TreeItem {
    pub(crate) fn new(id: ItemId, kind: ItemKind, name: String) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(NAME_ATTRIBUTE.to_string(), AttrValue::Text(name));
        Self {
            id,
            kind,
            parent: None,
            children: Vec::new(),
            attributes,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Display name, empty if the name attribute was removed or retyped
    pub fn name(&self) -> &str {
        self.attributes
            .get(NAME_ATTRIBUTE)
            .and_then(AttrValue::as_text)
            .unwrap_or("")
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.kind == ItemKind::Root
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Position of `child` among this item's children
    pub fn child_index(&self, child: ItemId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    // Raw primitives below. None of them is undoable on its own; SubEdits
    // wrap them and capture what is needed to revert.

    pub(crate) fn insert_child(&mut self, index: usize, child: ItemId) {
        self.children.insert(index, child);
    }

    pub(crate) fn remove_child_at(&mut self, index: usize) -> ItemId {
        self.children.remove(index)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ItemId>) {
        self.parent = parent;
    }

    /// Write or clear an attribute, returning the previous value
    pub(crate) fn set_attribute(
        &mut self,
        name: &str,
        value: Option<AttrValue>,
    ) -> Option<AttrValue> {
        match value {
            Some(value) => self.attributes.insert(name.to_string(), value),
            None => self.attributes.remove(name),
        }
    }

    pub(crate) fn set_kind(&mut self, kind: ItemKind) -> ItemKind {
        std::mem::replace(&mut self.kind, kind)
    }
}
