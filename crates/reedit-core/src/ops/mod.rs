pub mod attribute_ops;
pub mod document;
pub mod item_ops;
pub mod tree;
pub mod ui_ops;

pub use document::Document;
pub use tree::Tree;
