//! Boundary error taxonomy.
//!
//! The kernel never errors during `tick`; every fatal condition arises
//! at a boundary operation (spawning against a missing material,
//! restoring against an incomplete registry, parsing a snapshot) and
//! is surfaced synchronously to the caller.

use thiserror::Error;

use crate::entity::EntityBuildError;
use crate::types::{EntityId, FieldSpecId, MaterialId};

/// Errors surfaced by world boundary operations.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A material id was not found in the registry.
    #[error("unknown material '{0}'")]
    UnknownMaterial(MaterialId),

    /// A field spec id was not found in the registry.
    #[error("unknown field spec '{0}'")]
    UnknownFieldSpec(FieldSpecId),

    /// An entity id was not found in the world.
    #[error("unknown entity '{0}'")]
    UnknownEntity(EntityId),

    /// A snapshot was written by a newer format version.
    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u32),

    /// A snapshot document failed to serialize or parse.
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Entity construction failed during restore.
    #[error(transparent)]
    Build(#[from] EntityBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_missing_key() {
        let err = WorldError::UnknownMaterial(MaterialId::new("mat.gone").unwrap());
        assert!(err.to_string().contains("mat.gone"));

        let err = WorldError::UnknownFieldSpec(FieldSpecId::new("field.gone").unwrap());
        assert!(err.to_string().contains("field.gone"));
    }

    #[test]
    fn build_error_converts() {
        let err: WorldError = EntityBuildError::MissingId.into();
        assert!(matches!(err, WorldError::Build(_)));
    }
}
