//! Identity newtypes shared by every entity.
//!
//! Identities are generated client-side so an entity staged with `add` is
//! addressable before the unit of work commits it.

use crate::domain::persistence::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for FieldValue {
            fn from(value: $name) -> Self {
                Self::Uuid(value.0)
            }
        }
    };
}

entity_id!(ArticleId);
entity_id!(CommentId);
entity_id!(TagId);
entity_id!(ProjectId);
entity_id!(MediaFileId);
entity_id!(
    /// Reference into the external identity table; never loaded by this crate.
    UserId
);

/// Opaque row version assigned by the store on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcurrencyToken(Uuid);

impl ConcurrencyToken {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Placeholder carried by entities that have not been persisted yet.
    pub const fn unsaved() -> Self {
        Self(Uuid::nil())
    }

    pub const fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ConcurrencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
