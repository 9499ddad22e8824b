//! Template document parsing
//!
//! Templates are YAML, loaded as plain data. Tagged nodes (`!foo`) are
//! rejected outright so no document can ask for anything but maps, lists
//! and scalars.

use std::collections::HashSet;

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::errors::ManagerError;
use crate::models::image::ImageDescriptor;

/// A parsed template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    /// Optional top-level template name
    pub name: Option<String>,

    /// Images in document order
    pub images: Vec<ImageDescriptor>,
}

/// Parse a template document
pub fn parse_template(text: &str) -> Result<Template, ManagerError> {
    let mut document: Value = serde_yaml::from_str(text)
        .map_err(|e| ManagerError::TemplateFormat(format!("Invalid YAML: {}", e)))?;

    if let Some(tag) = find_tag(&document) {
        return Err(ManagerError::TemplateFormat(format!(
            "Tagged values are not allowed: {}",
            tag
        )));
    }

    if let Some(path) = find_non_finite(&document, "") {
        return Err(ManagerError::TemplateFormat(format!(
            "Non-finite number at {}",
            path
        )));
    }

    document
        .apply_merge()
        .map_err(|e| ManagerError::TemplateFormat(format!("Invalid merge key: {}", e)))?;

    let Value::Mapping(mut root) = document else {
        return Err(ManagerError::TemplateFormat(
            "Template must be a mapping".to_string(),
        ));
    };

    let name = match root.remove("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name),
        Some(other) => {
            return Err(ManagerError::TemplateFormat(format!(
                "Template name must be a string, got {:?}",
                other
            )))
        }
    };

    let items = match root.remove("images") {
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            return Err(ManagerError::TemplateFormat(
                "'images' must be a sequence".to_string(),
            ))
        }
        None => {
            return Err(ManagerError::TemplateFormat(
                "Missing 'images' entry".to_string(),
            ))
        }
    };

    let images = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_yaml::from_value::<ImageDescriptor>(item).map_err(|e| {
                ManagerError::TemplateFormat(format!("Invalid image #{}: {}", index, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    warn_dangling_volumes_from(&images);
    debug!("Parsed template with {} images", images.len());

    Ok(Template { name, images })
}

/// Parse a template document and return its images
pub fn parse_images(text: &str) -> Result<Vec<ImageDescriptor>, ManagerError> {
    Ok(parse_template(text)?.images)
}

fn find_tag(value: &Value) -> Option<String> {
    match value {
        Value::Tagged(tagged) => Some(tagged.tag.to_string()),
        Value::Sequence(items) => items.iter().find_map(find_tag),
        Value::Mapping(map) => map
            .iter()
            .find_map(|(k, v)| find_tag(k).or_else(|| find_tag(v))),
        _ => None,
    }
}

// JSON has no NaN or infinity, so `.nan` and `.inf` cannot reach the adapter
fn find_non_finite(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Number(n) if n.is_nan() || n.is_infinite() => Some(path.to_string()),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| find_non_finite(item, &format!("{}[{}]", path, i))),
        Value::Mapping(map) => map.iter().find_map(|(k, v)| {
            let key = match k {
                Value::String(s) => s.clone(),
                other => format!("{:?}", other),
            };
            find_non_finite(v, &format!("{}/{}", path, key))
        }),
        _ => None,
    }
}

// Link resolution is the adapter's job; an unknown reference is only worth a warning
fn warn_dangling_volumes_from(images: &[ImageDescriptor]) {
    let names: HashSet<String> = images.iter().filter_map(ImageDescriptor::name_text).collect();

    for (index, image) in images.iter().enumerate() {
        for reference in &image.volumes_from {
            if let Some(service) = reference.get("service").and_then(|s| s.as_str()) {
                if !names.contains(service) {
                    warn!(
                        "Image {} mounts volumes from unknown service '{}'",
                        image.label(index),
                        service
                    );
                }
            }
        }
    }
}
