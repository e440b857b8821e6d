//! Core types shared across reedit facilities
//!
//! This crate provides foundational types used by the edit engine,
//! its error facility and its logging facility:
//!
//! - **Identity types**: ItemId (generation-checked arena handle), EditId
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{EditId, ItemId};
