//! Deployment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A group of adapter services deployed together from one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique deployment ID
    pub id: String,

    /// Adapter service IDs, in creation order
    pub service_ids: Vec<String>,

    /// Template name, if the template declared one
    #[serde(default)]
    pub name: Option<String>,

    /// SHA-256 of the template text this deployment was created from
    #[serde(default)]
    pub template_digest: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Deployment {
    /// Create a new deployment record
    pub fn new(id: String, service_ids: Vec<String>) -> Self {
        Self {
            id,
            service_ids,
            name: None,
            template_digest: None,
            created_at: Utc::now(),
        }
    }
}
