//! Error types for the deployment manager

use std::fmt;

use thiserror::Error;

/// Main error type for the deployment manager
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Template format error: {0}")]
    TemplateFormat(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Fanout(#[from] FanoutError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Deployment not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ManagerError {
    /// Whether retrying the same call later may succeed without remediation
    pub fn is_retryable(&self) -> bool {
        match self {
            ManagerError::Adapter(e) => e.is_transient(),
            ManagerError::Fanout(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Why a call to the orchestration adapter failed
#[derive(Error, Debug)]
pub enum RemoteFailure {
    #[error("request timed out")]
    Timeout,

    #[error("adapter unreachable: {0}")]
    Unreachable(String),

    #[error("adapter responded {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid adapter response: {0}")]
    Decode(String),
}

impl RemoteFailure {
    /// Timeouts, connection failures and gateway errors are transient; other
    /// explicit rejections are not
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteFailure::Timeout | RemoteFailure::Unreachable(_) => true,
            RemoteFailure::Rejected { status, .. } => matches!(status, 502..=504),
            RemoteFailure::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for RemoteFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteFailure::Timeout
        } else if err.is_decode() {
            RemoteFailure::Decode(err.to_string())
        } else {
            RemoteFailure::Unreachable(err.to_string())
        }
    }
}

/// Orchestration adapter errors, one per adapter operation
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Adapter create error: {0}")]
    Create(RemoteFailure),

    #[error("Adapter fetch error for service {id}: {source}")]
    Fetch { id: String, source: RemoteFailure },

    #[error("Adapter update error for service {id}: {source}")]
    Update { id: String, source: RemoteFailure },

    #[error("Adapter delete error for service {id}: {source}")]
    Delete { id: String, source: RemoteFailure },

    #[error("Adapter service not found: {0}")]
    NotFound(String),
}

impl AdapterError {
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Create(failure) => failure.is_transient(),
            AdapterError::Fetch { source, .. }
            | AdapterError::Update { source, .. }
            | AdapterError::Delete { source, .. } => source.is_transient(),
            AdapterError::NotFound(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound(_))
    }
}

/// Every per-service failure of one fan-out operation
#[derive(Debug)]
pub struct FanoutError {
    pub operation: &'static str,
    pub total: usize,
    pub failures: Vec<(String, AdapterError)>,
}

impl FanoutError {
    pub fn is_transient(&self) -> bool {
        !self.failures.is_empty() && self.failures.iter().all(|(_, e)| e.is_transient())
    }

    /// IDs of the services whose call failed, in service order
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|(id, _)| id.as_str()).collect()
    }
}

impl fmt::Display for FanoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} of {} services",
            self.operation,
            self.failures.len(),
            self.total
        )?;
        for (id, err) in &self.failures {
            write!(f, "; {}: {}", id, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for FanoutError {}

/// Deployment record storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}
