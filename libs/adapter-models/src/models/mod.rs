//! API models

mod service;
mod status;

pub use service::{PortMapping, RemoteService, ServiceDefinition, VolumeFrom, VolumeMapping};
pub use status::{DesiredState, RemoteServiceStatus, ServiceState, UpdateServiceRequest};

use serde::{Deserialize, Serialize};

/// Error response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Best human-readable summary of the error body
    pub fn summary(&self) -> Option<String> {
        match (&self.error, &self.message) {
            (Some(error), Some(message)) => Some(format!("{}: {}", error, message)),
            (Some(text), None) | (None, Some(text)) => Some(text.clone()),
            (None, None) => None,
        }
    }
}
