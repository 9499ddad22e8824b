//! In-memory deployment store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::models::deployment::Deployment;
use crate::storage::store::DeploymentStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, Deployment>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DeploymentStore for MemoryStore {
    async fn save(&self, deployment: &Deployment) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(deployment.id.clone(), deployment.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Deployment>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Deployment>, StoreError> {
        let records = self.records.read().await;
        let mut deployments: Vec<Deployment> = records.values().cloned().collect();
        deployments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(deployments)
    }

    async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(id).is_some())
    }
}
