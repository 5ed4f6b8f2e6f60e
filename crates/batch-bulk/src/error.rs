//! Error types for sf-batch-bulk.

use sf_batch_client::Fault;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The classified remote fault behind this error, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.source
            .as_deref()?
            .downcast_ref::<sf_batch_client::Error>()?
            .fault()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Transport or remote failure surfaced by the HTTP layer.
    #[error("Client error: {0}")]
    Client(String),
    /// Invalid job parameters.
    #[error("Job error: {0}")]
    Job(String),
    /// Result payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Result payload had an unexpected shape.
    #[error("Payload error: {0}")]
    Payload(String),
    /// Opt-in maximum wait exceeded while polling.
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("{0}")]
    Other(String),
}

impl From<sf_batch_client::Error> for Error {
    fn from(err: sf_batch_client::Error) -> Self {
        Error {
            kind: ErrorKind::Client(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Decode(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
