use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Actual state reported by the adapter for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Started,
    Stopped,
    Error,
    /// Any state the adapter reports that we do not model
    Other(String),
}

impl ServiceState {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceState::Started => "started",
            ServiceState::Stopped => "stopped",
            ServiceState::Error => "error",
            ServiceState::Other(s) => s.as_str(),
        }
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        ServiceState::Other("unknown".to_string())
    }
}

impl From<&str> for ServiceState {
    fn from(s: &str) -> Self {
        match s {
            "started" => ServiceState::Started,
            "stopped" => ServiceState::Stopped,
            "error" => ServiceState::Error,
            other => ServiceState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServiceState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ServiceState::from(s.as_str()))
    }
}

/// Status of one service as returned by `GET /services/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteServiceStatus {
    pub id: String,

    #[serde(rename = "actualState", default)]
    pub actual_state: ServiceState,

    /// Remaining fields, kept as returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteServiceStatus {
    pub fn new(id: impl Into<String>, actual_state: ServiceState) -> Self {
        Self {
            id: id.into(),
            actual_state,
            extra: Map::new(),
        }
    }
}

/// State a service should be moved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    Started,
    Stopped,
}

impl std::fmt::Display for DesiredState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesiredState::Started => f.write_str("started"),
            DesiredState::Stopped => f.write_str("stopped"),
        }
    }
}

/// Body of `PUT /services/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub desired_state: DesiredState,
}
