//! # Domain Models
//!
//! These structs represent the core entities of QuestHub. Catalog entities
//! (quests, rewards) are shared and read-mostly; everything keyed by a
//! `UserId` is owned by that user.

/// Declares a closed set of labelled values. The label is the wire/storage
/// form; parsing is case-insensitive.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        crate::errors::DomainError::Validation(format!(
                            "unknown {} `{}`",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

pub mod activity;
pub mod ids;
pub mod progress;
pub mod quest;
pub mod reward;
pub mod submission;
pub mod user;

pub use activity::*;
pub use ids::*;
pub use progress::*;
pub use quest::*;
pub use reward::*;
pub use submission::*;
pub use user::*;
