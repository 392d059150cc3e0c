//! Typed identifiers
//!
//! Each id is a UUID newtype displayed as `PREFIX-uuid`, so a service line id
//! cannot be passed where a submission id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Random (v4) id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Time-ordered (v7) id
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub const PREFIX: &'static str = $prefix;

            /// Last eight hex digits, upper case
            ///
            /// Used in human-readable reference numbers. The head of a v7 id
            /// is its timestamp, so ids minted together share it.
            pub fn short_code(&self) -> String {
                let hex = self.0.simple().to_string();
                hex[hex.len() - 8..].to_ascii_uppercase()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            /// Accepts the displayed form or a bare UUID
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .unwrap_or(s);
                Uuid::parse_str(bare).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// A submission sent, or queued to be sent, to the payer
    SubmissionId,
    "SUB"
);
define_id!(ServiceLineId, "SVL");
define_id!(
    /// A claim or authorization form being filled in
    FormId,
    "FRM"
);
define_id!(LicenseId, "LIC");
