//! # sf-batch-client
//!
//! HTTP transport infrastructure for the Salesforce Bulk job/batch API.
//!
//! This crate provides the foundational HTTP layer shared by the higher
//! level API crates:
//! - A thin request builder / response wrapper around `reqwest`
//! - Session-header handling (`X-SFDC-Session`) with per-call overlays
//! - Classification of non-2xx responses into typed faults
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │                      (sf-batch-bulk)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BulkTransport                           │
//! │  - Holds base bulk URL + session id                         │
//! │  - Composes shared headers with per-call overlays           │
//! │  - Provides typed JSON methods (get_json, post_json)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       HttpGate                              │
//! │  - Raw HTTP via reqwest                                     │
//! │  - Routes status >= 300 to the fault classifier             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sf_batch_client::BulkTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sf_batch_client::Error> {
//!     let transport = BulkTransport::new(
//!         "https://na1.salesforce.com/services/async/52.0/",
//!         "session-id",
//!     )?;
//!
//!     let job: serde_json::Value = transport
//!         .get_json("job/750x00000000001", None)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod fault;
mod gate;
mod request;
mod response;
mod transport;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use fault::{classify, Fault, FaultBody, FaultKind};
pub use gate::HttpGate;
pub use request::{RequestBuilder, RequestMethod};
pub use response::Response;
pub use transport::BulkTransport;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("sf-batch/", env!("CARGO_PKG_VERSION"));
