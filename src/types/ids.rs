//! Type-safe identifier wrappers for registry keys.
//!
//! Each ID type is a newtype wrapper around String, providing type safety
//! to prevent mixing different kinds of identifiers. Entity IDs are
//! UUIDv4 strings drawn from the world's seeded PRNG so that identical
//! seeds produce identical populations.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an ID cannot be created from invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdError {
    /// The type of ID that failed to create.
    pub id_type: &'static str,
    /// Description of why the ID is invalid.
    pub reason: String,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for IdError {}

/// Macro to generate ID newtypes with common functionality.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $type_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is empty.
            pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(IdError {
                        id_type: $type_name,
                        reason: "ID cannot be empty".to_string(),
                    });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID and returns the inner String.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an entity.
    ///
    /// Entities are the living agents of a world. Their IDs are UUIDv4
    /// strings and persist across save/load.
    ///
    /// # Examples
    ///
    /// ```
    /// use vivarium::types::EntityId;
    ///
    /// let id = EntityId::new("9b2f1a60-0000-4000-8000-000000000001").unwrap();
    /// assert!(!id.as_str().is_empty());
    /// ```
    EntityId,
    "EntityId"
);

define_id!(
    /// Identifier of a material specification in the material registry.
    MaterialId,
    "MaterialId"
);

define_id!(
    /// Identifier of a field specification, e.g. `field.sync_moment`.
    FieldSpecId,
    "FieldSpecId"
);

impl EntityId {
    /// Creates an entity ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        EntityId(uuid.to_string())
    }
}
