//! HTTP implementation of the adapter client

use std::time::Duration;

use adapter_models::{
    DesiredState, ErrorResponse, RemoteService, RemoteServiceStatus, ServiceDefinition,
    UpdateServiceRequest,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error};
use url::Url;

use crate::adapter::OrchestratorClient;
use crate::errors::{AdapterError, ManagerError, RemoteFailure};

/// HTTP client for the orchestration adapter's `/services` API
#[derive(Debug, Clone)]
pub struct HttpAdapterClient {
    client: Client,
    base_url: Url,
}

impl HttpAdapterClient {
    /// Create a new adapter client; `timeout` bounds every request
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ManagerError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ManagerError::ConfigError(format!("Invalid adapter URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ManagerError::ConfigError(format!(
                "Adapter URL '{}' cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ManagerError::ConfigError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn services_url(&self) -> Url {
        self.url_with(&["services"])
    }

    fn service_url(&self, id: &str) -> Url {
        self.url_with(&["services", id])
    }

    fn url_with(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was ruled out in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl OrchestratorClient for HttpAdapterClient {
    async fn create_services(
        &self,
        services: &[ServiceDefinition],
    ) -> Result<Vec<RemoteService>, AdapterError> {
        let url = self.services_url();
        debug!("POST {} ({} services)", url, services.len());

        let response = self
            .client
            .post(url)
            .json(services)
            .send()
            .await
            .map_err(|e| AdapterError::Create(e.into()))?;

        if !response.status().is_success() {
            return Err(AdapterError::Create(rejection(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AdapterError::Create(RemoteFailure::Decode(e.to_string())))
    }

    async fn get_service(&self, id: &str) -> Result<RemoteServiceStatus, AdapterError> {
        let url = self.service_url(id);
        debug!("GET {}", url);

        let fetch_error = |source: RemoteFailure| AdapterError::Fetch {
            id: id.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(fetch_error(rejection(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| fetch_error(RemoteFailure::Decode(e.to_string())))
    }

    async fn update_service(
        &self,
        id: &str,
        desired_state: DesiredState,
    ) -> Result<(), AdapterError> {
        let url = self.service_url(id);
        debug!("PUT {} (desiredState={})", url, desired_state);

        let response = self
            .client
            .put(url)
            .json(&UpdateServiceRequest { desired_state })
            .send()
            .await
            .map_err(|e| AdapterError::Update {
                id: id.to_string(),
                source: e.into(),
            })?;

        if !response.status().is_success() {
            return Err(AdapterError::Update {
                id: id.to_string(),
                source: rejection(response).await,
            });
        }

        Ok(())
    }

    async fn delete_service(&self, id: &str) -> Result<(), AdapterError> {
        let url = self.service_url(id);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| AdapterError::Delete {
                id: id.to_string(),
                source: e.into(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Service {} already gone", id);
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(AdapterError::Delete {
                id: id.to_string(),
                source: rejection(response).await,
            });
        }

        Ok(())
    }
}

async fn rejection(response: Response) -> RemoteFailure {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.summary())
        .unwrap_or(body);

    error!("Adapter request failed: {} - {}", status, message);
    RemoteFailure::Rejected { status, message }
}
