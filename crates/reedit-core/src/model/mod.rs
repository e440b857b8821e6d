pub mod item;
pub mod kind;
pub mod value;

pub use item::TreeItem;
pub use kind::ItemKind;
pub use value::AttrValue;
