//! Type-safe ID wrappers for hookbot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate string ID newtypes with common functionality.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from an existing string.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(OrderId);

/// Key of a per-chat record: the Telegram chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatKey(pub i64);

impl ChatKey {
    /// Returns the raw chat id.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatKey {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_display() {
        let id = OrderId::from_string("O1");
        assert_eq!(id.to_string(), "O1");
        assert_eq!(id.as_str(), "O1");
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::from("ord-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ord-42\"");

        let parsed: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_chat_key_negative_ids() {
        // Group chats have negative ids.
        let key = ChatKey::from(-100123);
        assert_eq!(key.to_string(), "-100123");
        assert_eq!(key.get(), -100123);
    }
}
