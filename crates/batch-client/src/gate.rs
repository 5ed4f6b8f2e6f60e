//! Core HTTP gate: one request in, one response (or classified fault) out.

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::fault::classify;
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;

/// HTTP gate for the batch API.
///
/// Issues a single request with the given shared headers and routes any
/// status of 300 or above through the fault classifier. A non-2xx status
/// never reaches the caller as a value.
#[derive(Debug, Clone)]
pub struct HttpGate {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl HttpGate {
    /// Create a new gate from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new gate with default configuration.
    pub fn default_gate() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the gate configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Issue the request with `shared_headers` plus the request's own
    /// overlay, composed freshly for this call. The overlay wins on
    /// conflict and is never written back anywhere.
    #[instrument(skip(self, request, shared_headers), fields(method = ?request.method, url = %request.url))]
    pub async fn execute(
        &self,
        request: RequestBuilder,
        shared_headers: &HashMap<String, String>,
    ) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), &request.url);

        let mut headers = shared_headers.clone();
        headers.extend(request.headers.clone());
        for (name, value) in &headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.body(serde_json::to_string(value)?),
                RequestBody::Raw(text) => req.body(text.clone()),
            };
        }

        if self.config.enable_tracing {
            debug!(method = ?request.method, url = %request.url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            if response.status().is_success() {
                debug!(status, "Response received");
            } else {
                info!(status, "Non-success response");
            }
        }

        if status >= 300 {
            let url = response.url().to_string();
            let resource = request.resource.as_deref().unwrap_or("");
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status, &url, resource, &body).into());
        }

        Ok(Response::new(response))
    }
}
