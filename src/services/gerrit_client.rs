//! Gerrit REST API client.
//!
//! Provides an HTTP client for the change query endpoint with optional
//! HTTP basic authentication and offset pagination.

use crate::error::AppError;
use crate::models::{AccountRef, ChangeRecord};
use crate::services::change_source::{ChangeOption, ChangeSource};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Prefix Gerrit puts in front of every JSON body to defeat XSSI.
const XSSI_PREFIX: &str = ")]}'";

/// Gerrit API client configuration.
#[derive(Debug, Clone)]
pub struct GerritClientConfig {
    /// Base URL of the Gerrit server (e.g., `https://review.example.org`).
    pub base_url: String,

    /// Account name for HTTP basic authentication.
    pub username: Option<String>,

    /// HTTP password generated in the Gerrit account settings.
    pub password: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GerritClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

impl GerritClientConfig {
    /// Credentials to send, if both halves are present.
    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Gerrit API client.
#[derive(Debug, Clone)]
pub struct GerritClient {
    client: Client,
    config: GerritClientConfig,
}

impl GerritClient {
    /// Create a new Gerrit client.
    pub fn new(config: GerritClientConfig) -> Result<Self, AppError> {
        if config.base_url.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "Gerrit base URL is required",
                "base_url",
            ));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Check if requests go to the authenticated (`/a`) API.
    pub fn is_authenticated(&self) -> bool {
        self.config.credentials().is_some()
    }

    /// Get the full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        let prefix = if self.is_authenticated() { "/a" } else { "" };
        format!(
            "{}{}{}",
            self.config.base_url.trim_end_matches('/'),
            prefix,
            path
        )
    }

    fn get(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(self.api_url(endpoint));
        match self.config.credentials() {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    /// Handle API response errors and decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            decode_body(&body)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(AppError::authentication(
                "Gerrit rejected the credentials. Check the HTTP password.",
            ))
        } else {
            // Gerrit answers errors with a plain text body
            let message = match status {
                StatusCode::FORBIDDEN => "Access denied".to_string(),
                StatusCode::NOT_FOUND => "Resource not found".to_string(),
                StatusCode::TOO_MANY_REQUESTS => "Rate limit exceeded".to_string(),
                _ if !body.trim().is_empty() => body.trim().to_string(),
                _ => format!("Request failed ({})", status.as_u16()),
            };

            Err(AppError::remote_source_full(
                message,
                status.as_u16(),
                endpoint,
            ))
        }
    }

    /// Query one page of changes.
    ///
    /// Calls `GET /changes/?q=<query>&n=<limit>&S=<offset>&o=<option>...`.
    pub async fn query_changes(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
        options: &[ChangeOption],
    ) -> Result<Vec<ChangeRecord>, AppError> {
        let endpoint = "/changes/";
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("n", limit.to_string()),
            ("S", offset.to_string()),
        ];
        params.extend(options.iter().map(|o| ("o", o.as_str().to_string())));

        log::debug!(
            "GET {} q={:?} n={} S={} options={}",
            endpoint,
            query,
            limit,
            offset,
            options.len()
        );

        let response = self.get(endpoint).query(&params).send().await?;
        self.handle_response(response, endpoint).await
    }

    /// Fetch the account the credentials belong to.
    pub async fn get_self_account(&self) -> Result<AccountRef, AppError> {
        if !self.is_authenticated() {
            return Err(AppError::authentication("No credentials configured"));
        }

        let endpoint = "/accounts/self";
        let response = self.get(endpoint).send().await?;
        self.handle_response(response, endpoint).await
    }
}

impl ChangeSource for GerritClient {
    async fn get_page(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
        options: &[ChangeOption],
    ) -> Result<Vec<ChangeRecord>, AppError> {
        self.query_changes(query, limit, offset, options).await
    }
}

/// Strip the anti-XSSI prefix (and the newline after it) from a body.
pub fn strip_xssi_prefix(body: &str) -> &str {
    match body.strip_prefix(XSSI_PREFIX) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => body,
    }
}

/// Decode a Gerrit JSON response body.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_json::from_str(strip_xssi_prefix(body))
        .map_err(|e| AppError::remote_source(format!("Failed to parse response: {}", e)))
}
