//! Identifier value objects.

use super::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::{NoContext, Timestamp, Uuid};

/// Parses UUID text, mapping failures into the domain error.
fn parse_uuid(text: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(text.trim()).map_err(|_| DomainError::InvalidUuid(text.to_string()))
}

/// Macro to generate identifiers backed by a time-ordered UUIDv7.
macro_rules! uuid_v7_newtype {
    ($name:ident, $kind:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "Uuid", into = "Uuid")]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps a UUID, rejecting anything but version 7.
            pub fn new(uuid: Uuid) -> Result<Self, DomainError> {
                if uuid.get_version_num() != 7 {
                    return Err(DomainError::NotUuidV7 { kind: $kind });
                }
                Ok(Self(uuid))
            }

            /// Parses and validates UUID text.
            pub fn parse(text: &str) -> Result<Self, DomainError> {
                Self::new(parse_uuid(text)?)
            }

            /// Generates a fresh identifier stamped with the current time.
            pub fn new_random() -> Self {
                Self(Uuid::now_v7())
            }

            /// Generates a fresh identifier stamped with `instant`.
            pub fn new_at(instant: DateTime<Utc>) -> Self {
                let seconds = u64::try_from(instant.timestamp()).unwrap_or_default();
                let ts = Timestamp::from_unix(NoContext, seconds, instant.timestamp_subsec_nanos());
                Self(Uuid::new_v7(ts))
            }

            /// Creation instant encoded in the top 48 bits (Unix milliseconds).
            pub fn creation_instant(&self) -> DateTime<Utc> {
                let millis = (self.0.as_u128() >> 80) as i64;
                DateTime::from_timestamp_millis(millis).unwrap_or_default()
            }

            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<Uuid> for $name {
            type Error = DomainError;

            fn try_from(value: Uuid) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

uuid_v7_newtype!(OrderId, "order id", "Identifier of an order aggregate.");
uuid_v7_newtype!(LineId, "line id", "Identifier of a single order line.");

/// Identifier of a discount rule. Any UUID version is accepted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct DiscountId(Uuid);

impl DiscountId {
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(text: &str) -> Result<Self, DomainError> {
        parse_uuid(text).map(Self)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for DiscountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
