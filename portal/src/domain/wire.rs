//! Closed enumerations exchanged with the backend as Spanish strings.
//!
//! `wire_enum!` generates the enum together with its canonical wire value,
//! case-insensitive parsing (including accepted synonyms), and serde support
//! through the same strings.

use thiserror::Error;

/// A backend string did not match any known value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value `{value}`")]
pub struct UnknownWireValue {
    kind: &'static str,
    value: String,
}

impl UnknownWireValue {
    /// Build the error for `kind` and the offending raw value.
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Offending raw value.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Canonical value sent to the backend.
            pub const fn as_wire(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )*
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::wire::UnknownWireValue;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                $(
                    if $crate::domain::wire::matches_wire(trimmed, $wire)
                        $( || $crate::domain::wire::matches_wire(trimmed, $alias) )*
                    {
                        return Ok(Self::$variant);
                    }
                )*
                Err($crate::domain::wire::UnknownWireValue::new(
                    stringify!($name),
                    trimmed,
                ))
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::wire::UnknownWireValue;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_wire()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_wire())
            }
        }
    };
}

pub(crate) use wire_enum;

/// Case-insensitive comparison that also folds Unicode letters such as `Ó`.
pub(crate) fn matches_wire(raw: &str, candidate: &str) -> bool {
    raw.eq_ignore_ascii_case(candidate) || raw.to_lowercase() == candidate.to_lowercase()
}
