// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`] — `Display` impl mapping enum variants to string literals
//! - [`wire_enum!`] — numeric serde representation for fieldless wire enums

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// ```ignore
/// crate::simple_display! {
///     MyEnum {
///         Foo => "foo",
///         Bar => "bar",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $str, )+
                })
            }
        }
    };
}

/// Generate `u8` conversions for a fieldless enum whose variants are listed
/// in discriminant order in its `ALL` constant.
///
/// Pair with `#[serde(into = "u8", try_from = "u8")]` so the enum travels as
/// its number on the wire.
///
/// ```ignore
/// crate::wire_enum!(MyEnum, UnknownMyEnum);
/// ```
#[macro_export]
macro_rules! wire_enum {
    ($enum:ident, $err:ident) => {
        impl From<$enum> for u8 {
            fn from(value: $enum) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $enum {
            type Error = $err;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                $enum::ALL.get(usize::from(value)).copied().ok_or($err(value))
            }
        }
    };
}
