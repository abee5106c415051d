//! Shared API Types for the fleet admin backend
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing HTTP and
//! storage boundaries.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────┐
//! │  Rust Server     │  JSON   │  Admin UI        │
//! │  (Axum)          │ ◄─────► │  (browser)       │
//! └──────────────────┘         └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  FleetStore      │  text columns for every enum (as_str / FromStr)
//! └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. All API types live here - no inline struct definitions in handlers
//! 2. Tagged enums only: `#[serde(tag = "type")]`
//! 3. Enums persisted as text use the same spelling as their JSON form

/// Declares a unit-only enum stored as lowercase text.
///
/// Generates serde renames, `as_str`, `ALL`, `Display` and `FromStr` so the
/// JSON spelling and the database spelling can never drift apart.
#[macro_export]
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Text that does not name any variant of a [`text_enum!`] type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

pub mod dashboard;
pub mod fleet;
pub mod trip;

pub use dashboard::*;
pub use fleet::*;
pub use trip::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_enum_round_trips_through_text_and_json() {
        for status in TripStatus::ALL {
            let parsed: TripStatus = status.as_str().parse().unwrap();
            assert_eq!(&parsed, status);

            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_unknown_variant_is_reported() {
        let err = "teleported".parse::<TripStatus>().unwrap_err();
        assert_eq!(err.kind, "TripStatus");
        assert_eq!(err.to_string(), "unknown TripStatus 'teleported'");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
