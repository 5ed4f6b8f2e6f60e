//! Session-bound transport for the batch API.
//!
//! Binds the [`HttpGate`] to a base bulk URL and a session identifier and
//! owns the shared headers every call carries. The shared header map is
//! immutable after construction; per-call additions travel on the request
//! as an overlay and are composed freshly for each request.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::gate::HttpGate;
use crate::request::RequestBuilder;
use crate::response::Response;

/// Transport bound to one bulk endpoint and session.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// ## Security
///
/// The session identifier is redacted in Debug output to prevent
/// accidental exposure in logs.
#[derive(Clone)]
pub struct BulkTransport {
    gate: HttpGate,
    base_url: String,
    session_id: String,
    headers: HashMap<String, String>,
}

impl std::fmt::Debug for BulkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkTransport")
            .field("base_url", &self.base_url)
            .field("session_id", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl BulkTransport {
    /// Create a new transport for the given base bulk URL and session id.
    pub fn new(base_url: impl Into<String>, session_id: impl Into<String>) -> Result<Self> {
        Self::with_config(base_url, session_id, ClientConfig::default())
    }

    /// Create a new transport with custom HTTP configuration.
    pub fn with_config(
        base_url: impl Into<String>,
        session_id: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::from_gate(HttpGate::new(config)?, base_url, session_id)
    }

    /// Create a transport from an existing gate.
    pub fn from_gate(
        gate: HttpGate,
        base_url: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;
        let base_url = format!("{}/", base_url.trim_end_matches('/'));
        let session_id = session_id.into();

        let headers = HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-SFDC-Session".to_string(), session_id.clone()),
            ("X-PrettyPrint".to_string(), "1".to_string()),
        ]);

        Ok(Self {
            gate,
            base_url,
            session_id,
            headers,
        })
    }

    /// Get the base bulk URL (always with a trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The shared headers attached to every call.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Build the full URL for a path.
    ///
    /// Relative paths are joined onto the base bulk URL; full URLs pass
    /// through unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Create a GET request builder for a path.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.gate.get(self.url(path))
    }

    /// Create a POST request builder for a path.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.gate.post(self.url(path))
    }

    /// Execute a request with the shared headers.
    pub async fn call(&self, request: RequestBuilder) -> Result<Response> {
        self.gate.execute(request, &self.headers).await
    }

    /// GET request with JSON response deserialization.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.call(self.get(path)).await?;
        response.json().await
    }

    /// POST request with JSON body and response.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.post(path).json(body)?;
        let response = self.call(request).await?;
        response.json().await
    }
}
