//! Strongly-typed record identifiers.
//!
//! Identifiers are generated by the store (integer sequences), so there is no
//! `new()` here: ids only come from persisted records or parsed input.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a client record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn from_i64(value: i64) -> Self {
                Self(value)
            }

            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| DomainError::validation("id", format!("invalid {}", $name)))?;
                if value <= 0 {
                    return Err(DomainError::validation("id", format!("invalid {}", $name)));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(UserId, "user id");
impl_int_newtype!(ClientId, "client id");
