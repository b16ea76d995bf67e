//! Typed identifiers.
//!
//! Every entity is keyed by a UUID v7 so ids sort by creation time. The
//! newtypes keep a `QuestId` from ever being passed where a `RewardId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
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

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifies a registered user.
    UserId
);
entity_id!(
    /// Identifies a quest definition in the catalog.
    QuestId
);
entity_id!(
    /// Identifies a redeemable reward.
    RewardId
);
entity_id!(
    /// Identifies a manual-verification submission.
    SubmissionId
);
entity_id!(
    /// Identifies an activity log entry.
    ActivityId
);
