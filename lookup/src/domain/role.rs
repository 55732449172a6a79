//! Closed wire enumerations used by directory records.
//!
//! Each enumeration is declared once through [`wire_enum!`]; the declaration
//! is the only mapping between variants and wire tokens, and both decoding
//! ([`Role::from_wire`]) and encoding ([`Role::as_wire`]) are generated from
//! it. Tokens outside the declared set are rejected with
//! [`UnknownEnumValue`]; there is no fallback variant.

use std::fmt;

use thiserror::Error;

/// Identifies which closed enumeration rejected a wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// The [`Role`] enumeration.
    Role,
    /// The [`RecordType`] enumeration.
    RecordType,
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role => f.write_str("Role"),
            Self::RecordType => f.write_str("RecordType"),
        }
    }
}

/// A wire token that is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownEnumValue {
    /// Enumeration that rejected the token.
    pub kind: EnumKind,
    /// Raw token as received.
    pub value: String,
}

impl UnknownEnumValue {
    /// Build the error for `kind` and the rejected raw `value`.
    #[must_use]
    pub fn new(kind: EnumKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident as $kind:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Decode a wire token.
            ///
            /// # Errors
            ///
            /// Returns [`UnknownEnumValue`] when `token` is not in the set.
            /// Matching is exact and case-sensitive.
            pub fn from_wire(token: &str) -> Result<Self, UnknownEnumValue> {
                match token {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownEnumValue::new(EnumKind::$kind, other)),
                }
            }

            /// Encode this value as its wire token.
            #[must_use]
            pub const fn as_wire(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human-readable member name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownEnumValue;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_wire(&value)
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_wire()
            }
        }
    };
}

wire_enum! {
    /// Permission a directory user may hold.
    ///
    /// Displays as the member name (`AppManager`); serialises as the wire
    /// token (`APP_MANAGER`).
    pub enum Role as Role {
        /// Access to sales and trend reports.
        AccessToReports => "ACCESS_TO_REPORTS",
        /// Legal account holder.
        AccountHolder => "ACCOUNT_HOLDER",
        /// Full administrative access.
        Admin => "ADMIN",
        /// App-level management.
        AppManager => "APP_MANAGER",
        /// Customer support tooling.
        CustomerSupport => "CUSTOMER_SUPPORT",
        /// Build and certificate management.
        Developer => "DEVELOPER",
        /// Payments and financial reports.
        Finance => "FINANCE",
        /// Marketing material and promo codes.
        Marketing => "MARKETING",
        /// Sales reports.
        Sales => "SALES",
    }
}

wire_enum! {
    /// Resource type tag carried by each listing entry.
    pub enum RecordType as RecordType {
        /// A directory user resource.
        Users => "users",
    }
}
