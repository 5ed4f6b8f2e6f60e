//! Bulk job/batch orchestration.
//!
//! The end-to-end flow for every operation is the same strictly ordered
//! sequence: create the job, submit one batch under it, close the job,
//! poll the batch to a terminal state, fetch the results. Each step
//! consumes the previous step's output, and a failed remote call ends
//! the flow immediately.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::instrument;

use sf_batch_client::{BulkTransport, ClientConfig};

use crate::error::{Error, ErrorKind, Result};
use crate::repair::{DelimiterRepair, ResultDecoder};
use crate::types::{
    BatchData, BatchInfo, BatchResults, BatchState, CreateJobRequest, JobInfo, JobStateUpdate,
    Operation, RecordOutcome,
};

/// Default delay between batch status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Bulk API client.
///
/// Wraps a [`BulkTransport`] with the job/batch lifecycle: job creation
/// and closing, batch submission, status polling, and result retrieval.
///
/// # Example
///
/// ```rust,ignore
/// use sf_batch_bulk::BulkClient;
///
/// let client = BulkClient::new(
///     "https://na1.salesforce.com/services/async/52.0/",
///     "session-id",
/// )?;
///
/// let leads = client.sobject("Lead");
/// let outcomes = leads.insert(&records).await?;
/// let rows = leads.query("SELECT Id, Email FROM Lead").await?;
/// ```
#[derive(Debug, Clone)]
pub struct BulkClient {
    transport: BulkTransport,
    poll_interval: Duration,
    max_wait: Option<Duration>,
    decoder: Arc<dyn ResultDecoder>,
}

impl BulkClient {
    /// Create a new bulk client for the given base bulk URL and session.
    pub fn new(bulk_url: impl Into<String>, session_id: impl Into<String>) -> Result<Self> {
        let transport = BulkTransport::new(bulk_url, session_id)?;
        Ok(Self::from_transport(transport))
    }

    /// Create a new bulk client with custom HTTP configuration.
    pub fn with_config(
        bulk_url: impl Into<String>,
        session_id: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = BulkTransport::with_config(bulk_url, session_id, config)?;
        Ok(Self::from_transport(transport))
    }

    /// Create a bulk client from an existing transport.
    pub fn from_transport(transport: BulkTransport) -> Self {
        Self {
            transport,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            decoder: Arc::new(DelimiterRepair),
        }
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &BulkTransport {
        &self.transport
    }

    /// Set the delay between batch status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound the polling loop. Unset by default: a batch is polled until
    /// the remote system reports a terminal state, however long that
    /// takes. Callers that need a bounded wait opt in here and receive
    /// `ErrorKind::Timeout` when the bound is exceeded; the remote job
    /// keeps running regardless.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Replace the result-body decoder.
    pub fn with_result_decoder(mut self, decoder: impl ResultDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Get a handle bound to one SObject type.
    pub fn sobject(&self, name: impl Into<String>) -> SObjectBulk {
        SObjectBulk {
            client: self.clone(),
            name: name.into(),
        }
    }

    // =========================================================================
    // Job Lifecycle
    // =========================================================================

    /// Create a job for `operation` against `object`.
    ///
    /// `external_id_field` is required for upsert and ignored for every
    /// other operation; the creation payload carries the key only for
    /// upsert.
    #[instrument(skip(self))]
    pub async fn create_job(
        &self,
        object: &str,
        operation: Operation,
        external_id_field: Option<&str>,
    ) -> Result<JobInfo> {
        let mut request = CreateJobRequest::new(object, operation);
        if operation == Operation::Upsert {
            let field = external_id_field.ok_or_else(|| {
                Error::new(ErrorKind::Job(
                    "upsert requires an external ID field".to_string(),
                ))
            })?;
            request = request.with_external_id_field(field);
        }

        let req = self.transport.post("job").resource(object).json(&request)?;
        let response = self.transport.call(req).await?;
        Ok(response.json().await?)
    }

    /// Close a job.
    ///
    /// Closing an already-closed job is remote-defined behavior; no
    /// special-casing happens here.
    #[instrument(skip(self))]
    pub async fn close_job(&self, job_id: &str) -> Result<JobInfo> {
        let path = format!("job/{}", job_id);
        let req = self.transport.post(&path).json(&JobStateUpdate::closed())?;
        let response = self.transport.call(req).await?;
        Ok(response.json().await?)
    }

    /// Fetch a job's current status.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> Result<JobInfo> {
        let path = format!("job/{}", job_id);
        Ok(self.transport.get_json(&path).await?)
    }

    // =========================================================================
    // Batch Submission and Polling
    // =========================================================================

    /// Submit `data` as a batch under an open job.
    ///
    /// Records are serialized to a JSON array; query text is the batch
    /// body itself and is sent verbatim.
    #[instrument(skip(self, data))]
    pub async fn add_batch(&self, job_id: &str, data: BatchData<'_>) -> Result<BatchInfo> {
        let path = format!("job/{}/batch", job_id);
        let request = match data {
            BatchData::Records(records) => self.transport.post(&path).json(&records)?,
            BatchData::Query(soql) => self.transport.post(&path).raw(soql),
        };
        let response = self.transport.call(request).await?;
        Ok(response.json().await?)
    }

    /// Fetch a batch's current status.
    #[instrument(skip(self))]
    pub async fn get_batch(&self, job_id: &str, batch_id: &str) -> Result<BatchInfo> {
        let path = format!("job/{}/batch/{}", job_id, batch_id);
        Ok(self.transport.get_json(&path).await?)
    }

    /// Poll a batch until it reaches a terminal state.
    ///
    /// Suspends `poll_interval` between polls. Remote-call failures end
    /// the loop immediately. The loop is unbounded unless a maximum wait
    /// was configured; the suspension is cooperative, so wrapping this
    /// future in a deadline (or dropping it) cancels the wait without
    /// further remote calls.
    #[instrument(skip(self))]
    pub async fn wait_for_batch(&self, job_id: &str, batch_id: &str) -> Result<BatchState> {
        let started = std::time::Instant::now();

        loop {
            let batch = self.get_batch(job_id, batch_id).await?;
            if batch.state.is_terminal() {
                return Ok(batch.state);
            }

            if let Some(max_wait) = self.max_wait {
                if started.elapsed() >= max_wait {
                    return Err(Error::new(ErrorKind::Timeout(format!(
                        "batch {} still {} after {:?}",
                        batch_id, batch.state, max_wait
                    ))));
                }
            }

            sleep(self.poll_interval).await;
        }
    }

    // =========================================================================
    // Result Retrieval
    // =========================================================================

    /// Fetch the result payload of a terminal batch.
    ///
    /// Queries resolve through the result-set indirection: the result
    /// resource lists result-set identifiers and only the first one is
    /// fetched (an empty list is a zero-row query and is returned as-is).
    /// Ingest results decode through the configured [`ResultDecoder`],
    /// which repairs separator-damaged payloads before decoding.
    #[instrument(skip(self))]
    pub async fn get_batch_results(
        &self,
        job_id: &str,
        batch_id: &str,
        operation: Operation,
    ) -> Result<BatchResults> {
        let path = format!("job/{}/batch/{}/result", job_id, batch_id);

        if operation.is_query() {
            let result_ids: Vec<String> = self.transport.get_json(&path).await?;
            let Some(first) = result_ids.first() else {
                return Ok(BatchResults::Rows(Value::Array(Vec::new())));
            };
            let rows: Value = self
                .transport
                .get_json(&format!("{}/{}", path, first))
                .await?;
            return Ok(BatchResults::Rows(rows));
        }

        let response = self.transport.call(self.transport.get(&path)).await?;
        let text = response.text().await?;
        let value = self
            .decoder
            .decode(&text)
            .map_err(|e| Error::with_source(ErrorKind::Decode(e.to_string()), e))?;
        let outcomes: Vec<RecordOutcome> = serde_json::from_value(value)?;
        Ok(BatchResults::Records(outcomes))
    }

    // =========================================================================
    // Orchestration
    // =========================================================================

    /// Run one complete batch operation end to end.
    ///
    /// Creates the job, submits `data` as its single batch, closes the
    /// job, polls the batch to a terminal state, and fetches the result
    /// payload.
    #[instrument(skip(self, data))]
    pub async fn execute(
        &self,
        object: &str,
        operation: Operation,
        data: BatchData<'_>,
        external_id_field: Option<&str>,
    ) -> Result<BatchResults> {
        let job = self.create_job(object, operation, external_id_field).await?;
        let batch = self.add_batch(&job.id, data).await?;
        self.close_job(&job.id).await?;
        self.wait_for_batch(&batch.job_id, &batch.id).await?;
        self.get_batch_results(&batch.job_id, &batch.id, operation)
            .await
    }
}

/// Handle bound to one SObject type.
///
/// Obtained from [`BulkClient::sobject`]; exposes the supported bulk
/// operations as thin operation-fixing wrappers over [`BulkClient::execute`].
#[derive(Debug, Clone)]
pub struct SObjectBulk {
    client: BulkClient,
    name: String,
}

impl SObjectBulk {
    /// The SObject API name this handle is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert records.
    pub async fn insert(&self, records: &[Value]) -> Result<Vec<RecordOutcome>> {
        self.run_records(Operation::Insert, records, None).await
    }

    /// Update existing records.
    pub async fn update(&self, records: &[Value]) -> Result<Vec<RecordOutcome>> {
        self.run_records(Operation::Update, records, None).await
    }

    /// Upsert records matched on `external_id_field`.
    pub async fn upsert(
        &self,
        records: &[Value],
        external_id_field: &str,
    ) -> Result<Vec<RecordOutcome>> {
        self.run_records(Operation::Upsert, records, Some(external_id_field))
            .await
    }

    /// Soft-delete records.
    pub async fn delete(&self, records: &[Value]) -> Result<Vec<RecordOutcome>> {
        self.run_records(Operation::Delete, records, None).await
    }

    /// Hard-delete records (permanent).
    pub async fn hard_delete(&self, records: &[Value]) -> Result<Vec<RecordOutcome>> {
        self.run_records(Operation::HardDelete, records, None).await
    }

    /// Run a bulk query and return the decoded rows of its first result
    /// set (an empty list when the query matched nothing).
    pub async fn query(&self, soql: &str) -> Result<Value> {
        let results = self
            .client
            .execute(&self.name, Operation::Query, BatchData::Query(soql), None)
            .await?;

        match results {
            BatchResults::Rows(rows) => Ok(rows),
            BatchResults::Records(_) => Err(Error::new(ErrorKind::Payload(
                "record outcomes returned for a query batch".to_string(),
            ))),
        }
    }

    async fn run_records(
        &self,
        operation: Operation,
        records: &[Value],
        external_id_field: Option<&str>,
    ) -> Result<Vec<RecordOutcome>> {
        let results = self
            .client
            .execute(
                &self.name,
                operation,
                BatchData::Records(records),
                external_id_field,
            )
            .await?;

        match results {
            BatchResults::Records(outcomes) => Ok(outcomes),
            BatchResults::Rows(_) => Err(Error::new(ErrorKind::Payload(
                "query rows returned for an ingest batch".to_string(),
            ))),
        }
    }
}
