use reedit_core_types::ItemId;
use serde::{Deserialize, Serialize};

/// Value stored under a named attribute of a tree item or in UI state
///
/// `Ref` is the only variant that points at another item; those are the
/// host/dependent links tracked by the cascade registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Ref(ItemId),
}

impl AttrValue {
    /// Item referenced by this value, if it is a reference
    pub fn as_ref_target(&self) -> Option<ItemId> {
        match self {
            AttrValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, AttrValue::Ref(_))
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Text(s) => write!(f, "{:?}", s),
            AttrValue::Ref(id) => write!(f, "->{}", id),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<ItemId> for AttrValue {
    fn from(value: ItemId) -> Self {
        AttrValue::Ref(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_target() {
        let id = ItemId::new(2, 0);
        assert_eq!(AttrValue::from(id).as_ref_target(), Some(id));
        assert_eq!(AttrValue::from("Done").as_ref_target(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AttrValue::from("Done").to_string(), "\"Done\"");
        assert_eq!(AttrValue::Ref(ItemId::new(1, 2)).to_string(), "->item#1v2");
        assert_eq!(AttrValue::Null.to_string(), "null");
    }
}
