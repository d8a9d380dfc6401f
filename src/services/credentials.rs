//! Credential storage service using the OS keychain.
//!
//! Gerrit HTTP passwords are stored in the system's native credential
//! storage (Keychain on macOS, Credential Manager on Windows, Secret
//! Service on Linux), keyed by server URL and account name.

use crate::error::AppError;
use keyring::Entry;

/// Service name used in the keychain.
const SERVICE_NAME: &str = "change-trends";

/// Credential storage operations.
pub struct CredentialService;

impl CredentialService {
    /// Store the HTTP password of `username` on `server_url`.
    pub fn store_password(server_url: &str, username: &str, password: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(server_url, username)?;

        entry
            .set_password(password)
            .map_err(|e| AppError::credential_storage(format!("Failed to store password: {}", e)))
    }

    /// Retrieve the HTTP password of `username` on `server_url`.
    pub fn get_password(server_url: &str, username: &str) -> Result<String, AppError> {
        let entry = Self::get_entry(server_url, username)?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => {
                AppError::not_found_with_id("credential", keychain_account(server_url, username))
            }
            _ => AppError::credential_storage(format!("Failed to retrieve password: {}", e)),
        })
    }

    /// Delete a stored password. Deleting a missing entry is not an error.
    pub fn delete_password(server_url: &str, username: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(server_url, username)?;

        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to delete password: {}",
                e
            ))),
        }
    }

    fn get_entry(server_url: &str, username: &str) -> Result<Entry, AppError> {
        Entry::new(SERVICE_NAME, &keychain_account(server_url, username)).map_err(|e| {
            AppError::credential_storage(format!("Failed to create keyring entry: {}", e))
        })
    }
}

/// Keychain account name: `<username>@<normalized server URL>`.
fn keychain_account(server_url: &str, username: &str) -> String {
    format!("{}@{}", username, normalize_url(server_url))
}

/// Removes trailing slashes and converts to lowercase.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_lowercase()
}
