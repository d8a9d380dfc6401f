//! Runtime configuration loaded from environment variables.

use crate::error::AppError;
use crate::models::AccountKey;
use crate::services::gerrit_client::GerritClientConfig;
use crate::services::preferences::DEFAULT_MAX_FETCHED_ITEMS;
use std::path::{Path, PathBuf};

/// Query used when the host does not supply one.
pub const DEFAULT_QUERY: &str = "status:open";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Gerrit server.
    pub gerrit_url: Option<String>,

    /// Account name; also the cache key.
    pub username: Option<String>,

    /// HTTP password. When absent the OS keychain is consulted.
    pub password: Option<String>,

    /// Path to the SQLite cache database.
    pub db_path: PathBuf,

    /// Trending query.
    pub query: String,

    /// Item limit for accounts without a stored preference.
    pub default_max_items: usize,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gerrit_url: None,
            username: None,
            password: None,
            db_path: crate::db::get_db_path(Path::new(".")),
            query: DEFAULT_QUERY.to_string(),
            default_max_items: DEFAULT_MAX_FETCHED_ITEMS,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup; unset or blank values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            gerrit_url: get("TRENDS_GERRIT_URL"),
            username: get("TRENDS_USERNAME"),
            password: get("TRENDS_PASSWORD"),
            db_path: get("TRENDS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            query: get("TRENDS_QUERY").unwrap_or(defaults.query),
            default_max_items: match get("TRENDS_MAX_ITEMS") {
                Some(v) => parse_positive(&v, "TRENDS_MAX_ITEMS")?,
                None => defaults.default_max_items,
            },
            timeout_secs: match get("TRENDS_TIMEOUT_SECS") {
                Some(v) => parse_positive(&v, "TRENDS_TIMEOUT_SECS")?,
                None => defaults.timeout_secs,
            },
        })
    }

    /// Account the cache and preferences are scoped to.
    pub fn account_key(&self) -> AccountKey {
        self.username
            .as_deref()
            .map(AccountKey::from)
            .unwrap_or_else(AccountKey::anonymous)
    }

    /// Base URL of the server, required to talk to it.
    pub fn require_gerrit_url(&self) -> Result<&str, AppError> {
        self.gerrit_url
            .as_deref()
            .ok_or_else(|| AppError::invalid_input_field("TRENDS_GERRIT_URL is not set", "gerrit_url"))
    }

    /// HTTP client settings using `password` for authentication.
    pub fn client_config(&self, password: Option<String>) -> Result<GerritClientConfig, AppError> {
        Ok(GerritClientConfig {
            base_url: self.require_gerrit_url()?.to_string(),
            username: self.username.clone(),
            password,
            timeout_secs: self.timeout_secs,
        })
    }
}

fn parse_positive<T>(value: &str, field: &str) -> Result<T, AppError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(AppError::invalid_input_field(
            format!("{} must be a positive integer, got {:?}", field, value),
            field,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.query, DEFAULT_QUERY);
        assert_eq!(config.default_max_items, DEFAULT_MAX_FETCHED_ITEMS);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.db_path, Path::new(".").join("change-trends.db"));
        assert!(config.account_key().is_anonymous());
        assert!(config.require_gerrit_url().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TRENDS_GERRIT_URL", "https://review.example.org"),
            ("TRENDS_USERNAME", "jdoe"),
            ("TRENDS_PASSWORD", "secret"),
            ("TRENDS_DB_PATH", "/tmp/trends.db"),
            ("TRENDS_QUERY", "status:open project:demo"),
            ("TRENDS_MAX_ITEMS", "40"),
            ("TRENDS_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.account_key().as_str(), "jdoe");
        assert_eq!(config.db_path, PathBuf::from("/tmp/trends.db"));
        assert_eq!(config.query, "status:open project:demo");
        assert_eq!(config.default_max_items, 40);

        let client = config.client_config(config.password.clone()).unwrap();
        assert_eq!(client.base_url, "https://review.example.org");
        assert_eq!(client.username.as_deref(), Some("jdoe"));
        assert_eq!(client.timeout_secs, 5);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("TRENDS_USERNAME", "  "), ("TRENDS_QUERY", "")]).unwrap();
        assert!(config.username.is_none());
        assert_eq!(config.query, DEFAULT_QUERY);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(matches!(
            load(&[("TRENDS_MAX_ITEMS", "0")]),
            Err(AppError::InvalidInput { .. })
        ));
        assert!(load(&[("TRENDS_TIMEOUT_SECS", "soon")]).is_err());
    }
}
