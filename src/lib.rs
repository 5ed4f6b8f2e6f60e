//! # sf-batch
//!
//! A Salesforce Bulk API (job/batch) client library for Rust.
//!
//! This library orchestrates asynchronous batch operations against the
//! bulk endpoint: it creates a job, uploads the data as a batch, closes
//! the job, polls the batch to a terminal state, and retrieves the
//! result payload, with typed faults for every remote failure and
//! repair of separator-damaged JSON result bodies.
//!
//! ## Security
//!
//! - The session identifier is redacted in Debug output
//! - Tracing spans skip credential parameters
//!
//! ## Crates
//!
//! - **sf-batch-client** - HTTP transport, shared session headers, fault
//!   classification
//! - **sf-batch-bulk** - Job/batch lifecycle orchestration, polling,
//!   result retrieval
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sf_batch::BulkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Session id and bulk URL come from your login flow
//!     let client = BulkClient::new(
//!         "https://na1.salesforce.com/services/async/52.0/",
//!         std::env::var("SFDC_SESSION_ID")?,
//!     )?;
//!
//!     let contacts = client.sobject("Contact");
//!
//!     let outcomes = contacts
//!         .upsert(
//!             &[json!({"Email__c": "ada@example.com", "LastName": "Lovelace"})],
//!             "Email__c",
//!         )
//!         .await?;
//!
//!     for outcome in outcomes {
//!         println!("{:?} success={}", outcome.id, outcome.success);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export the member crates for convenient access
#[cfg(feature = "bulk")]
pub use sf_batch_bulk as bulk;
#[cfg(feature = "client")]
pub use sf_batch_client as client;

// Re-export commonly used types at the top level
#[cfg(feature = "bulk")]
pub use sf_batch_bulk::{BatchResults, BulkClient, Operation, SObjectBulk};
#[cfg(feature = "client")]
pub use sf_batch_client::{BulkTransport, ClientConfig, Fault, FaultKind};
