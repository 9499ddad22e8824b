//! Image descriptor to adapter service definition

use adapter_models::{PortMapping, ServiceDefinition, VolumeFrom, VolumeMapping};
use serde_json::Value;
use tracing::debug;

use crate::errors::ManagerError;
use crate::models::image::ImageDescriptor;

/// Convert one image descriptor into the service definition the adapter expects
pub fn image_to_service(image: &ImageDescriptor) -> Result<ServiceDefinition, ManagerError> {
    let name = image.name_text();
    let label = name.as_deref().unwrap_or("<unnamed>");

    let ports = image
        .ports
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            port_mapping(entry).map_err(|e| conversion_error(label, "port", i, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let volumes = image
        .volumes
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            volume_mapping(entry).map_err(|e| conversion_error(label, "volume", i, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let volumes_from = image
        .volumes_from
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::Object(map) => Ok(VolumeFrom::clone(map)),
            _ => Err(conversion_error(
                label,
                "volumes_from",
                i,
                "entry is not a mapping".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ServiceDefinition {
        name: image.name.clone(),
        source: image.source.clone(),
        categories: image.categories.clone(),
        command: image.command.clone(),
        environment: image.environment.clone(),
        links: image.links.clone(),
        expose: image.expose.clone(),
        ports,
        volumes,
        volumes_from,
        deployment: image.deployment.clone(),
    })
}

/// Convert every image of a template, failing on the first bad one
pub fn convert_all(images: &[ImageDescriptor]) -> Result<Vec<ServiceDefinition>, ManagerError> {
    let services = images
        .iter()
        .map(image_to_service)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Converted {} images to service definitions", services.len());
    Ok(services)
}

fn conversion_error(image: &str, kind: &str, index: usize, reason: String) -> ManagerError {
    ManagerError::Conversion(format!("image {}: {} #{}: {}", image, kind, index, reason))
}

fn port_mapping(entry: &Value) -> Result<PortMapping, String> {
    let map = entry
        .as_object()
        .ok_or_else(|| "entry is not a mapping".to_string())?;

    let container_port = match present(map.get("container_port")) {
        Some(value) => port_number(value)?,
        None => return Err("missing container_port".to_string()),
    };
    let host_port = present(map.get("host_port")).map(port_number).transpose()?;
    let protocol = present(map.get("proto"))
        .map(|value| scalar_string(value, "proto"))
        .transpose()?;

    Ok(PortMapping {
        container_port,
        host_port,
        protocol,
    })
}

fn volume_mapping(entry: &Value) -> Result<VolumeMapping, String> {
    let map = entry
        .as_object()
        .ok_or_else(|| "entry is not a mapping".to_string())?;

    let container_path = match present(map.get("container_path")) {
        Some(value) => scalar_string(value, "container_path")?,
        None => return Err("missing container_path".to_string()),
    };
    let host_path = present(map.get("host_path"))
        .map(|value| scalar_string(value, "host_path"))
        .transpose()?;

    Ok(VolumeMapping {
        container_path,
        host_path,
    })
}

// Templates often write unset fields as `~` or `""`
fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

fn port_number(value: &Value) -> Result<u16, String> {
    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if (1..=65535).contains(&n) => Ok(n as u16),
        _ => Err(format!("invalid port number {}", value)),
    }
}

fn scalar_string(value: &Value, field: &str) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(format!("{} must be a string, got {}", field, value)),
    }
}
