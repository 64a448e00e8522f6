//! Authenticated FOSSA REST client
//!
//! Thin wrapper over an [`HttpTransport`]: builds URLs, attaches the bearer
//! token, encodes/decodes JSON. Only HTTP 200 counts as success; anything else
//! is an [`InfraError::Http`] carrying the raw body.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::infrastructure::traits::{HttpMethod, HttpRequest, HttpTransport};
use crate::infrastructure::{InfraError, InfraResult};

/// Default FOSSA API base URL.
pub const DEFAULT_API_URL: &str = "https://app.fossa.com/api";

#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        http: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Absolute URL for an endpoint path such as `projects` or `/teams`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// `GET path` and decode the body as `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> InfraResult<T> {
        let body = self.execute(HttpMethod::Get, path, None)?;
        serde_json::from_str(&body).map_err(|e| InfraError::Json {
            context: format!("GET {}", self.url(path)),
            source: e,
        })
    }

    /// `POST path` with a JSON body. Returns the raw response body.
    pub fn post<B: Serialize>(&self, path: &str, body: &B) -> InfraResult<String> {
        let json = Self::encode(path, body)?;
        self.execute(HttpMethod::Post, path, Some(json))
    }

    /// `PUT path` with a JSON body. Returns the raw response body.
    pub fn put<B: Serialize>(&self, path: &str, body: &B) -> InfraResult<String> {
        let json = Self::encode(path, body)?;
        self.execute(HttpMethod::Put, path, Some(json))
    }

    fn encode<B: Serialize>(path: &str, body: &B) -> InfraResult<String> {
        serde_json::to_string(body).map_err(|e| InfraError::Json {
            context: format!("request body for {path}"),
            source: e,
        })
    }

    fn execute(&self, method: HttpMethod, path: &str, body: Option<String>) -> InfraResult<String> {
        let url = self.url(path);
        debug!("{method} {url}");
        if let Some(b) = &body {
            trace!("request body: {b}");
        }

        let request = HttpRequest {
            method,
            url: url.clone(),
            bearer_token: self.api_key.clone(),
            body,
        };
        let response = self
            .http
            .send(&request)
            .map_err(|e| InfraError::Transport {
                method,
                url: url.clone(),
                source: e,
            })?;

        debug!("{method} {url} -> {}", response.status);
        if response.status != 200 {
            return Err(InfraError::Http {
                method,
                url,
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}
