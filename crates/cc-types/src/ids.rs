//! Newtype ID types for type safety.
//!
//! Catalog ids (`TypeId`, `MoveId`, `AbilityId`, `NatureId`) wrap a `Box<str>`
//! since they are keys into the static tables of `cc-data`. Entity ids
//! (`AgentId`, `BattleId`, `SocialTokenId`) wrap a `Uuid` since they identify
//! persisted rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_str_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Box<str>);

        impl $name {
            pub fn new(s: impl Into<Box<str>>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into_boxed_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0.to_string())
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_str_id!(
    /// Elemental type identifier (one of the 18 canonical uppercase names).
    TypeId
);

define_str_id!(
    /// Move definition identifier (key into a type's four-move pool).
    MoveId
);

define_str_id!(
    /// Ability definition identifier.
    AbilityId
);

define_str_id!(
    /// Nature identifier (one of the 25 fixed stat-up/stat-down pairs).
    NatureId
);

define_uuid_id!(
    /// Agent identifier.
    AgentId
);

define_uuid_id!(
    /// Battle identifier.
    BattleId
);

define_uuid_id!(
    /// Social token identifier.
    SocialTokenId
);
