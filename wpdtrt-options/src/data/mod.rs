//! Option records and their reconciliation.
//!
//! - [`record`] - A single option: metadata attributes plus an optional value
//! - [`store`] - Ordered option store with config/value merging
//! - [`persist`] - JSON/TOML snapshot files standing in for the options table

/// Individual option record and field type resolution.
pub mod record;

/// Option store and merge rules.
pub mod store;

/// Snapshot persistence.
pub mod persist;

pub use record::{Attributes, FieldType, OptionRecord};
pub use store::OptionStore;
