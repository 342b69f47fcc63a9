//! Shared value types: identifiers and small wrappers used across modules.

mod ids;

pub use ids::{EntityId, FieldSpecId, IdError, MaterialId};
