//! Account identity used to scope cache entries and preferences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the requesting account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    /// Key used when no account is signed in.
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous() {
        assert!(AccountKey::anonymous().is_anonymous());
        assert!(!AccountKey::from("jdoe").is_anonymous());
        assert_eq!(AccountKey::from("jdoe").to_string(), "jdoe");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountKey::from("jdoe")).unwrap();
        assert_eq!(json, "\"jdoe\"");
    }
}
