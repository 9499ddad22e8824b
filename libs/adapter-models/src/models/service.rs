use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `volumesFrom` reference, forwarded to the adapter untouched
pub type VolumeFrom = Map<String, Value>;

/// Service definition accepted by `POST /services`
///
/// Every key is always serialized: absent pass-through fields become `null`
/// and absent collections become `[]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: Option<Value>,
    pub source: Option<Value>,
    pub categories: Option<Value>,
    pub command: Option<Value>,
    pub environment: Option<Value>,
    pub links: Option<Value>,
    pub expose: Option<Value>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default)]
    pub volumes: Vec<VolumeMapping>,
    #[serde(default)]
    pub volumes_from: Vec<VolumeFrom>,
    pub deployment: Option<Value>,
}

/// Container to host port binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: Option<u16>,
    pub protocol: Option<String>,
}

/// Host path mounted into the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMapping {
    pub container_path: String,
    pub host_path: Option<String>,
}

/// A service as returned by `POST /services`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteService {
    /// Adapter-assigned service ID
    #[serde(default)]
    pub id: Option<String>,

    /// Remaining fields, kept as returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
