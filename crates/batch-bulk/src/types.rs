//! Types for the bulk job/batch API.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Bulk operations a job can be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Insert new records
    Insert,
    /// Update existing records
    Update,
    /// Upsert based on an external ID field
    Upsert,
    /// Delete records (soft delete)
    Delete,
    /// Hard delete records (permanent)
    HardDelete,
    /// Bulk query
    Query,
}

impl Operation {
    /// Get the API string for this operation.
    pub fn api_name(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Upsert => "upsert",
            Operation::Delete => "delete",
            Operation::HardDelete => "hardDelete",
            Operation::Query => "query",
        }
    }

    /// Check if this is the query operation.
    ///
    /// Queries upload their batch body verbatim and retrieve results
    /// through the result-set indirection; everything else is an ingest.
    pub fn is_query(&self) -> bool {
        matches!(self, Operation::Query)
    }
}

/// Lifecycle states of a batch.
///
/// The remote system owns the authoritative state; this is the local view
/// refreshed by status polls. Unrecognized wire values land in `Other`
/// and are treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    Queued,
    InProgress,
    Completed,
    Failed,
    NotProcessed,
    Other(String),
}

impl BatchState {
    /// Parse a wire value. `NotProcessed` is spelled with a space on the
    /// wire; both spellings are accepted.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "Queued" => BatchState::Queued,
            "InProgress" => BatchState::InProgress,
            "Completed" => BatchState::Completed,
            "Failed" => BatchState::Failed,
            "Not Processed" | "NotProcessed" => BatchState::NotProcessed,
            other => BatchState::Other(other.to_string()),
        }
    }

    /// The wire spelling of this state.
    pub fn as_str(&self) -> &str {
        match self {
            BatchState::Queued => "Queued",
            BatchState::InProgress => "InProgress",
            BatchState::Completed => "Completed",
            BatchState::Failed => "Failed",
            BatchState::NotProcessed => "Not Processed",
            BatchState::Other(value) => value,
        }
    }

    /// Check if the batch is in a terminal state. Polling stops here.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Failed | BatchState::NotProcessed
        )
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BatchState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BatchState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(BatchState::from_wire(&value))
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Request to create a job.
///
/// The content type is fixed: this client only speaks JSON batches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    /// Operation the job will perform
    pub operation: Operation,
    /// SObject API name
    pub object: String,
    /// Content type; always "JSON"
    pub content_type: String,
    /// External ID field, present only for upsert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id_field_name: Option<String>,
}

impl CreateJobRequest {
    /// Create a new job request.
    pub fn new(object: impl Into<String>, operation: Operation) -> Self {
        Self {
            operation,
            object: object.into(),
            content_type: "JSON".to_string(),
            external_id_field_name: None,
        }
    }

    /// Set the external ID field for upsert operations.
    pub fn with_external_id_field(mut self, field: impl Into<String>) -> Self {
        self.external_id_field_name = Some(field.into());
        self
    }
}

/// Job state transition payload.
#[derive(Debug, Clone, Serialize)]
pub struct JobStateUpdate {
    pub state: String,
}

impl JobStateUpdate {
    /// Transition the job to Closed.
    pub fn closed() -> Self {
        Self {
            state: "Closed".to_string(),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Job descriptor as returned by the remote system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    /// Remote-assigned job ID
    pub id: String,
    /// Operation the job was created for
    pub operation: Operation,
    /// Bound SObject API name
    pub object: String,
    /// Current job state (Open, Closed, Aborted, Failed)
    pub state: String,
    /// Content type of the job's batches
    #[serde(default)]
    pub content_type: Option<String>,
    /// External ID field for upsert jobs
    #[serde(default)]
    pub external_id_field_name: Option<String>,
    /// Job creation time
    #[serde(default)]
    pub created_date: Option<String>,
    /// Last modification time
    #[serde(default)]
    pub system_modstamp: Option<String>,
    /// Number of batches submitted under this job
    #[serde(default)]
    pub number_batches_total: i64,
    /// Number of batches that completed
    #[serde(default)]
    pub number_batches_completed: i64,
    /// Number of records processed across batches
    #[serde(default)]
    pub number_records_processed: i64,
}

/// Batch descriptor as returned by the remote system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInfo {
    /// Remote-assigned batch ID
    pub id: String,
    /// Owning job ID
    pub job_id: String,
    /// Current batch state
    pub state: BatchState,
    /// Failure detail when the batch did not process
    #[serde(default)]
    pub state_message: Option<String>,
    /// Batch creation time
    #[serde(default)]
    pub created_date: Option<String>,
    /// Last modification time
    #[serde(default)]
    pub system_modstamp: Option<String>,
    /// Number of records processed so far
    #[serde(default)]
    pub number_records_processed: i64,
    /// Number of records that failed
    #[serde(default)]
    pub number_records_failed: i64,
}

// =============================================================================
// Result Types
// =============================================================================

/// Per-record outcome of an ingest batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// ID of the affected record; absent when the record failed
    #[serde(default)]
    pub id: Option<String>,
    /// Whether the record was processed successfully
    pub success: bool,
    /// Whether the record was newly created (insert/upsert)
    #[serde(default)]
    pub created: Option<bool>,
    /// Errors reported for this record
    #[serde(default)]
    pub errors: Vec<OutcomeError>,
}

/// One error message attached to a record outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeError {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Resolved result payload of a batch.
#[derive(Debug, Clone)]
pub enum BatchResults {
    /// Per-record outcomes of an ingest operation.
    Records(Vec<RecordOutcome>),
    /// Decoded rows of a query (the first result set, or an empty list
    /// for a zero-row query).
    Rows(Value),
}

impl BatchResults {
    /// The record outcomes, if this is an ingest result.
    pub fn records(&self) -> Option<&[RecordOutcome]> {
        match self {
            BatchResults::Records(outcomes) => Some(outcomes),
            BatchResults::Rows(_) => None,
        }
    }

    /// The query rows, if this is a query result.
    pub fn rows(&self) -> Option<&Value> {
        match self {
            BatchResults::Records(_) => None,
            BatchResults::Rows(rows) => Some(rows),
        }
    }
}

/// Data submitted as a batch.
#[derive(Debug, Clone, Copy)]
pub enum BatchData<'a> {
    /// Records to ingest; serialized to a JSON array before upload.
    Records(&'a [Value]),
    /// Query text; uploaded verbatim as the batch body.
    Query(&'a str),
}
