// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::*;
use crate::image::ImageRef;
use crate::unit::SourceUnit;

/// The repository a raw dependency resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
  #[serde(rename = "ToRepoCloneURL")]
  pub to_repo_clone_url: String,

  #[serde(rename = "ToUnit")]
  pub to_unit: String,

  #[serde(rename = "ToUnitType")]
  pub to_unit_type: String,

  #[serde(rename = "ToVersionString")]
  pub to_version_string: String,

  #[serde(rename = "ToRevSpec")]
  pub to_rev_spec: String
}

/// The outcome of resolving one raw dependency of a source unit.
///
/// Exactly one of `target` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
  #[serde(rename = "Raw", default, skip_serializing_if = "Value::is_null")]
  pub raw: Value,

  #[serde(rename = "Target", default, skip_serializing_if = "Option::is_none")]
  pub target: Option<ResolvedTarget>,

  #[serde(rename = "Error", default, skip_serializing_if = "String::is_empty")]
  pub error: String
}

/// Describes the JSON type of a value for error messages.
fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object"
  }
}

/// Narrows a raw dependency to the base image reference string it must be.
fn base_image(raw: &Value) -> Result<&str> {
  raw.as_str().ok_or_else(|| Error::UnexpectedDependency {
    value: raw.to_string(),
    kind: json_kind(raw).to_string()
  })
}

/// Resolves a single base image reference.
///
/// Image references can't yet be mapped to the VCS repository that builds
/// them, so a well-formed reference resolves to an explanatory error rather
/// than a target.
pub fn resolve_base_image(raw: &str) -> Resolution {
  let error = match ImageRef::resolve(raw) {
    Ok(image) => format!(
      "Don't know how to resolve Docker image hostname {:?} name {:?} repo {:?} tag {:?} to a VCS repository.",
      image.hostname, image.name, image.repo, image.tag
    ),
    Err(err) => err.to_string()
  };

  Resolution {
    raw: Value::String(raw.to_string()),
    target: None,
    error
  }
}

/// Resolves every dependency of `unit`, in order.
///
/// Fails if any dependency is not a string.
pub fn resolve_dependencies(unit: &SourceUnit) -> Result<Vec<Resolution>> {
  unit.dependencies
    .iter()
    .map(|raw| base_image(raw).map(resolve_base_image))
    .collect()
}
