//! Deployment record persistence

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::StoreError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::models::deployment::Deployment;

/// Persistence for deployment records
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Insert or replace a record
    async fn save(&self, deployment: &Deployment) -> Result<(), StoreError>;

    async fn load(&self, id: &str) -> Result<Option<Deployment>, StoreError>;

    /// All records, oldest first
    async fn list(&self) -> Result<Vec<Deployment>, StoreError>;

    /// Remove a record; returns whether it existed
    async fn remove(&self, id: &str) -> Result<bool, StoreError>;
}

/// One JSON file per deployment under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: Dir,
}

impl FileStore {
    pub fn new(dir: Dir) -> Self {
        Self { dir }
    }

    // IDs end up in file names, so anything outside [A-Za-z0-9_-] is refused
    fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

#[async_trait]
impl DeploymentStore for FileStore {
    async fn save(&self, deployment: &Deployment) -> Result<(), StoreError> {
        if !Self::is_valid_id(&deployment.id) {
            return Err(StoreError::Backend(format!(
                "Invalid deployment id: {}",
                deployment.id
            )));
        }
        let file = self.dir.file(&format!("{}.json", deployment.id));
        debug!("Writing deployment record {}", file.path().display());
        file.write_json(deployment).await
    }

    async fn load(&self, id: &str) -> Result<Option<Deployment>, StoreError> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }
        let file = self.dir.file(&format!("{}.json", id));
        if !file.exists().await {
            return Ok(None);
        }
        Ok(Some(file.read_json().await?))
    }

    async fn list(&self) -> Result<Vec<Deployment>, StoreError> {
        let mut deployments = Vec::new();
        for path in self.dir.list_files("json").await? {
            match File::new(&path).read_json::<Deployment>().await {
                Ok(deployment) => deployments.push(deployment),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }
        deployments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(deployments)
    }

    async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        if !Self::is_valid_id(id) {
            return Ok(false);
        }
        self.dir.file(&format!("{}.json", id)).delete().await
    }
}
