//! Orchestration adapter client
//!
//! The adapter owns the actual services; the manager only ever talks to it
//! through [`OrchestratorClient`]. Implementations must be safe to share
//! across tasks since lifecycle calls fan out concurrently.

pub mod http;

use adapter_models::{DesiredState, RemoteService, RemoteServiceStatus, ServiceDefinition};
use async_trait::async_trait;

use crate::errors::AdapterError;

pub use http::HttpAdapterClient;

#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    /// Create every service in one call. No partial success: on error no IDs are returned.
    async fn create_services(
        &self,
        services: &[ServiceDefinition],
    ) -> Result<Vec<RemoteService>, AdapterError>;

    async fn get_service(&self, id: &str) -> Result<RemoteServiceStatus, AdapterError>;

    async fn update_service(&self, id: &str, desired_state: DesiredState)
        -> Result<(), AdapterError>;

    /// Must be idempotent: deleting a missing service is not an error.
    async fn delete_service(&self, id: &str) -> Result<(), AdapterError>;
}
