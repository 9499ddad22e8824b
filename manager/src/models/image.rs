//! Image descriptors as they appear in a template

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of a template's `images` sequence
///
/// Port, volume and `volumes_from` entries are kept as raw values; their
/// shape is checked during conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub name: Option<Value>,

    #[serde(default)]
    pub source: Option<Value>,

    #[serde(default)]
    pub categories: Option<Value>,

    #[serde(default)]
    pub command: Option<Value>,

    #[serde(default)]
    pub environment: Option<Value>,

    #[serde(default)]
    pub links: Option<Value>,

    #[serde(default)]
    pub expose: Option<Value>,

    #[serde(default, deserialize_with = "nullable_seq")]
    pub ports: Vec<Value>,

    #[serde(default, deserialize_with = "nullable_seq")]
    pub volumes: Vec<Value>,

    #[serde(default, deserialize_with = "nullable_seq")]
    pub volumes_from: Vec<Value>,

    #[serde(default)]
    pub deployment: Option<Value>,
}

impl ImageDescriptor {
    /// The `name` as text, when it is a string or a number
    pub fn name_text(&self) -> Option<String> {
        match self.name.as_ref()? {
            Value::String(name) => Some(name.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Display name used in logs and errors
    pub fn label(&self, index: usize) -> String {
        match self.name_text() {
            Some(name) => format!("'{}'", name),
            None => format!("#{}", index),
        }
    }
}

// `ports: ~` in YAML means "none", same as leaving the key out
fn nullable_seq<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
