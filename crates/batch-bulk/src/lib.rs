//! # sf-batch-bulk
//!
//! Client for the Salesforce Bulk job/batch API (JSON content).
//!
//! A bulk operation is a remote job carrying a single batch of records
//! (or a query). This crate orchestrates the whole lifecycle: create the
//! job, upload the batch, close the job, poll the batch to a terminal
//! state, and retrieve the result payload, including the query-specific
//! result-set indirection and repair of separator-damaged JSON result
//! bodies.
//!
//! ## Example - Bulk Insert
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sf_batch_bulk::BulkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sf_batch_bulk::Error> {
//!     let client = BulkClient::new(
//!         "https://na1.salesforce.com/services/async/52.0/",
//!         "session-id",
//!     )?;
//!
//!     let records = vec![
//!         json!({"LastName": "Nakamura", "Company": "Acme"}),
//!         json!({"LastName": "Osei", "Company": "Globex"}),
//!     ];
//!
//!     let outcomes = client.sobject("Lead").insert(&records).await?;
//!     for outcome in &outcomes {
//!         println!("{:?} -> success={}", outcome.id, outcome.success);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Bulk Query
//!
//! ```rust,ignore
//! let rows = client
//!     .sobject("Contact")
//!     .query("SELECT Id, Email FROM Contact WHERE AccountId != null")
//!     .await?;
//! ```

mod client;
mod error;
mod repair;
mod types;

pub use client::{BulkClient, SObjectBulk};
pub use error::{Error, ErrorKind, Result};
pub use repair::{DelimiterRepair, ResultDecoder};
pub use types::*;

// Re-export the fault types callers match on when a remote call fails.
pub use sf_batch_client::{Fault, FaultBody, FaultKind};
