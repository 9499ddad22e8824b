//! Deployment manager
//!
//! Turns a template into adapter services and manages those services as one
//! deployment. Removing a deployment is two explicit steps: [`teardown`]
//! deletes the services and hands back a [`TeardownReceipt`], and only that
//! receipt lets [`remove_record`] drop the persisted record.
//!
//! [`teardown`]: DeploymentManager::teardown
//! [`remove_record`]: DeploymentManager::remove_record

use std::sync::Arc;

use adapter_models::{DesiredState, RemoteService, ServiceDefinition};
use tracing::{debug, error, info, warn};

use crate::adapter::OrchestratorClient;
use crate::convert::convert_all;
use crate::deploy::fanout::{self, fan_out, FanoutOptions};
use crate::deploy::status::DeploymentStatus;
use crate::errors::{AdapterError, ManagerError, RemoteFailure};
use crate::models::deployment::Deployment;
use crate::storage::store::DeploymentStore;
use crate::template::parse_template;
use crate::utils::{generate_uuid, sha256_hash};

/// Proof that every service of a deployment was deleted
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the deployment record is only removed by passing this to remove_record"]
pub struct TeardownReceipt {
    deployment_id: String,
}

impl TeardownReceipt {
    pub fn deployment_id(&self) -> &str {
        &self.deployment_id
    }
}

/// Deploys templates and runs lifecycle operations on deployments
pub struct DeploymentManager {
    client: Arc<dyn OrchestratorClient>,
    store: Arc<dyn DeploymentStore>,
    options: FanoutOptions,
}

impl DeploymentManager {
    /// Create a new manager with default fan-out options
    pub fn new(client: Arc<dyn OrchestratorClient>, store: Arc<dyn DeploymentStore>) -> Self {
        Self {
            client,
            store,
            options: FanoutOptions::default(),
        }
    }

    /// Replace the fan-out options
    pub fn with_options(mut self, options: FanoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Deploy a template: create its services, then persist the deployment.
    ///
    /// Nothing is persisted unless every service was created. A failed create
    /// call returns no IDs, so services it may have created cannot be cleaned
    /// up from here.
    pub async fn deploy(&self, template: &str) -> Result<Deployment, ManagerError> {
        let parsed = parse_template(template)?;
        let services = convert_all(&parsed.images)?;

        info!(
            "Deploying {} services{}",
            services.len(),
            parsed
                .name
                .as_deref()
                .map(|n| format!(" from template '{}'", n))
                .unwrap_or_default()
        );

        let created = self.client.create_services(&services).await.map_err(|e| {
            error!("Service creation failed: {}", e);
            e
        })?;

        let service_ids = match extract_ids(&services, &created) {
            Ok(ids) => ids,
            Err((partial, reason)) => {
                error!("Adapter returned an unusable create response: {}", reason);
                self.cleanup(&partial).await;
                return Err(AdapterError::Create(RemoteFailure::Decode(reason)).into());
            }
        };

        let mut deployment = Deployment::new(generate_uuid(), service_ids);
        deployment.name = parsed.name;
        deployment.template_digest = Some(sha256_hash(template.as_bytes()));

        if let Err(e) = self.store.save(&deployment).await {
            error!("Failed to persist deployment {}: {}", deployment.id, e);
            self.cleanup(&deployment.service_ids).await;
            return Err(e.into());
        }

        info!(
            "Deployment {} created with services {:?}",
            deployment.id, deployment.service_ids
        );
        Ok(deployment)
    }

    /// Load a deployment record
    pub async fn get(&self, id: &str) -> Result<Deployment, ManagerError> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| ManagerError::NotFound(id.to_string()))
    }

    /// All deployment records
    pub async fn list(&self) -> Result<Vec<Deployment>, ManagerError> {
        Ok(self.store.list().await?)
    }

    /// Ask the adapter to start every service
    pub async fn start(&self, deployment: &Deployment) -> Result<(), ManagerError> {
        info!("Starting deployment {}", deployment.id);
        self.update_states(deployment, DesiredState::Started).await
    }

    /// Ask the adapter to stop every service
    pub async fn stop(&self, deployment: &Deployment) -> Result<(), ManagerError> {
        info!("Stopping deployment {}", deployment.id);
        self.update_states(deployment, DesiredState::Stopped).await
    }

    /// Query every service and aggregate an overall status
    pub async fn status(&self, deployment: &Deployment) -> Result<DeploymentStatus, ManagerError> {
        debug!("Querying status of deployment {}", deployment.id);
        let client = &self.client;
        let results = fan_out("status", &deployment.service_ids, &self.options, |id| {
            client.get_service(id)
        })
        .await;

        let services = fanout::collect("status", results)?;
        Ok(DeploymentStatus::from_services(services))
    }

    /// Delete every service of a deployment.
    ///
    /// Every deletion is attempted. Services the adapter no longer knows count
    /// as deleted. Any other failure is reported and no receipt is issued.
    pub async fn teardown(&self, deployment: &Deployment) -> Result<TeardownReceipt, ManagerError> {
        info!(
            "Tearing down deployment {} ({} services)",
            deployment.id,
            deployment.service_ids.len()
        );
        let results = self.delete_services(&deployment.service_ids).await;
        fanout::collect("teardown", results).map_err(|e| {
            error!("Teardown of deployment {} incomplete: {}", deployment.id, e);
            e
        })?;

        Ok(TeardownReceipt {
            deployment_id: deployment.id.clone(),
        })
    }

    /// Remove the persisted record of a torn-down deployment
    pub async fn remove_record(&self, receipt: TeardownReceipt) -> Result<(), ManagerError> {
        if !self.store.remove(&receipt.deployment_id).await? {
            warn!("Deployment record {} was already gone", receipt.deployment_id);
        }
        info!("Deployment {} removed", receipt.deployment_id);
        Ok(())
    }

    /// Tear down a deployment and remove its record
    pub async fn undeploy(&self, id: &str) -> Result<(), ManagerError> {
        let deployment = self.get(id).await?;
        let receipt = self.teardown(&deployment).await?;
        self.remove_record(receipt).await
    }

    async fn update_states(
        &self,
        deployment: &Deployment,
        desired_state: DesiredState,
    ) -> Result<(), ManagerError> {
        let operation = match desired_state {
            DesiredState::Started => "start",
            DesiredState::Stopped => "stop",
        };
        let client = &self.client;
        let results = fan_out(operation, &deployment.service_ids, &self.options, |id| {
            client.update_service(id, desired_state)
        })
        .await;

        fanout::collect(operation, results)?;
        Ok(())
    }

    async fn delete_services<'a>(
        &'a self,
        ids: &'a [String],
    ) -> Vec<(&'a str, Result<(), AdapterError>)> {
        let client = &self.client;
        fan_out("delete", ids, &self.options, |id| async move {
            match client.delete_service(id).await {
                Err(e) if e.is_not_found() => {
                    debug!("Service {} already deleted", id);
                    Ok(())
                }
                result => result,
            }
        })
        .await
    }

    // Best effort: failures are logged, the caller's error is what gets reported
    async fn cleanup(&self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        warn!("Cleaning up {} orphaned services", ids.len());
        let results = self.delete_services(ids).await;
        if let Err(e) = fanout::collect("cleanup", results) {
            error!(
                "Services may have leaked (ids {:?}): {}",
                e.failed_ids(),
                e
            );
        }
    }
}

/// Service IDs in request order; on a malformed response, the IDs that were
/// returned plus the reason
fn extract_ids(
    requested: &[ServiceDefinition],
    created: &[RemoteService],
) -> Result<Vec<String>, (Vec<String>, String)> {
    let ids: Vec<String> = created.iter().filter_map(|s| s.id.clone()).collect();

    if created.len() != requested.len() {
        let reason = format!(
            "requested {} services, adapter returned {}",
            requested.len(),
            created.len()
        );
        return Err((ids, reason));
    }
    if ids.len() != created.len() {
        let reason = format!("{} created services have no id", created.len() - ids.len());
        return Err((ids, reason));
    }

    Ok(ids)
}
