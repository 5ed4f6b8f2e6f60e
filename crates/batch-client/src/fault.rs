//! Classification of non-2xx responses into typed faults.
//!
//! Every response with status 300 or above is routed here by the gate and
//! becomes a [`Fault`]: a single tagged value carrying the request URL,
//! status code, resource name, and captured body. Message formatting is a
//! pure function of that data, keyed by [`FaultKind`].

use std::fmt;

use serde_json::Value;

/// The kind of remote fault, selected by exact HTTP status match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// 300: an external ID matched more than one record. The body contains
    /// the list of matching records.
    MoreThanOneRecord,
    /// 400: the request couldn't be understood, usually because the body
    /// contains an error.
    MalformedRequest,
    /// 401: the session ID or OAuth token has expired or is invalid.
    ExpiredSession,
    /// 403: the request has been refused; the logged-in user lacks
    /// appropriate permissions.
    RefusedRequest,
    /// 404: the requested resource couldn't be found.
    ResourceNotFound,
    /// Any other status >= 300.
    General,
}

impl FaultKind {
    /// Select the fault kind for an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            300 => FaultKind::MoreThanOneRecord,
            400 => FaultKind::MalformedRequest,
            401 => FaultKind::ExpiredSession,
            403 => FaultKind::RefusedRequest,
            404 => FaultKind::ResourceNotFound,
            _ => FaultKind::General,
        }
    }
}

/// Captured response body: structured if it parses as JSON, raw otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum FaultBody {
    Json(Value),
    Text(String),
}

impl fmt::Display for FaultBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultBody::Json(value) => write!(f, "{}", value),
            FaultBody::Text(text) => f.write_str(text),
        }
    }
}

/// A classified remote failure.
///
/// Carries everything the caller needs to act on the failure; rendering is
/// left to [`fmt::Display`], which formats per kind. `ResourceNotFound`
/// keys its message on the resource name rather than the URL.
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    /// URL of the failed request.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Name of the requested resource; may be empty when the caller did
    /// not supply one.
    pub resource: String,
    /// Response body, parsed if possible.
    pub body: FaultBody,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::MoreThanOneRecord => write!(
                f,
                "More than one record for {}. Response content: {}",
                self.url, self.body
            ),
            FaultKind::MalformedRequest => write!(
                f,
                "Malformed request {}. Response content: {}",
                self.url, self.body
            ),
            FaultKind::ExpiredSession => write!(
                f,
                "Expired session for {}. Response content: {}",
                self.url, self.body
            ),
            FaultKind::RefusedRequest => write!(
                f,
                "Request refused for {}. Response content: {}",
                self.url, self.body
            ),
            FaultKind::ResourceNotFound => write!(
                f,
                "Resource {} Not Found. Response content: {}",
                self.resource, self.body
            ),
            FaultKind::General => write!(
                f,
                "Error Code {}. Response content: {}",
                self.status, self.body
            ),
        }
    }
}

impl std::error::Error for Fault {}

/// Build a [`Fault`] from a failed response.
///
/// The body is kept structured when it parses as JSON and raw otherwise;
/// either way the original content is preserved verbatim.
pub fn classify(status: u16, url: &str, resource: &str, body: &str) -> Fault {
    let body = match serde_json::from_str::<Value>(body) {
        Ok(value) => FaultBody::Json(value),
        Err(_) => FaultBody::Text(body.to_string()),
    };

    Fault {
        kind: FaultKind::from_status(status),
        url: url.to_string(),
        status,
        resource: resource.to_string(),
        body,
    }
}
