//! Deployment status aggregation
//!
//! A deployment has no stored state. Its state is derived on every query
//! from what the adapter reports for each of its services:
//!
//! ```text
//! Started <-> Stopped      either can fall into Error when a service errors
//! * --teardown--> Deleted  (record removed, nothing left to query)
//! ```

use adapter_models::{RemoteServiceStatus, ServiceState};
use serde::{Deserialize, Serialize};

/// Overall state of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every service is running (or reports a state we do not model)
    Started,

    /// At least one service is stopped and none errored
    Stopped,

    /// At least one service errored
    Error,
}

impl OverallStatus {
    /// Aggregate per-service states. Precedence: error > stopped > started.
    pub fn aggregate<'a>(states: impl IntoIterator<Item = &'a ServiceState>) -> Self {
        let mut overall = OverallStatus::Started;
        for state in states {
            match state {
                ServiceState::Error => return OverallStatus::Error,
                ServiceState::Stopped => overall = OverallStatus::Stopped,
                ServiceState::Started | ServiceState::Other(_) => {}
            }
        }
        overall
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Started => "started",
            OverallStatus::Stopped => "stopped",
            OverallStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live status of a deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub overall: OverallStatus,

    /// Raw adapter responses, in service order
    pub services: Vec<RemoteServiceStatus>,
}

impl DeploymentStatus {
    pub fn from_services(services: Vec<RemoteServiceStatus>) -> Self {
        Self {
            overall: OverallStatus::aggregate(services.iter().map(|s| &s.actual_state)),
            services,
        }
    }
}
