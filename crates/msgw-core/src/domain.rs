use std::fmt;

use crate::{errors::Error, Result};

macro_rules! non_empty_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(Error::invalid_argument(concat!($what, " cannot be empty.")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

non_empty_id!(
    /// Destination chat, as the provider spells it (numeric id, `@channel`, etc).
    ChatId,
    "Chat id"
);

non_empty_id!(
    /// Provider-assigned id of a sent message. Integer ids are stored in decimal form.
    MessageId,
    "Message id"
);

non_empty_id!(
    /// Id of an inbound callback, used to acknowledge it.
    CallbackId,
    "Callback id"
);

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for MessageId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

/// Normalized provider key: trimmed, lower case, never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderName(String);

impl ProviderName {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument("Provider name cannot be empty."));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
