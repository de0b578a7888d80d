// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The source unit type of every unit produced by this toolchain.
pub const DOCKERFILE_UNIT_TYPE: &str = "Dockerfile";

/// The operations the host should run on each Dockerfile source unit.
pub const UNIT_OPS: [&str; 2] = ["depresolve", "graph"];

/// A reference to a toolchain and one of its subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
  #[serde(rename = "Toolchain")]
  pub toolchain: String,

  #[serde(rename = "Subcmd")]
  pub subcmd: String
}

/// A source unit, the host's unit of analysis.
///
/// Each unit corresponds to exactly one Dockerfile. `dependencies` holds raw
/// base image references as produced by `scan`; the host round-trips it as
/// arbitrary JSON, so it is left untyped here and narrowed where it's consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
  #[serde(rename = "Name")]
  pub name: String,

  #[serde(rename = "Type")]
  pub unit_type: String,

  #[serde(rename = "Repo", default, skip_serializing_if = "String::is_empty")]
  pub repo: String,

  #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
  pub commit_id: String,

  #[serde(
    rename = "Globs", default,
    deserialize_with = "null_as_default",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub globs: Vec<String>,

  #[serde(
    rename = "Files", default,
    deserialize_with = "null_as_default"
  )]
  pub files: Vec<String>,

  #[serde(rename = "Dir", default)]
  pub dir: String,

  #[serde(
    rename = "Dependencies", default,
    deserialize_with = "null_as_default",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub dependencies: Vec<Value>,

  #[serde(rename = "Info", default, skip_serializing_if = "Value::is_null")]
  pub info: Value,

  #[serde(rename = "Data", default, skip_serializing_if = "Value::is_null")]
  pub data: Value,

  #[serde(
    rename = "Config", default,
    deserialize_with = "null_as_default",
    skip_serializing_if = "BTreeMap::is_empty"
  )]
  pub config: BTreeMap<String, Value>,

  #[serde(
    rename = "Ops", default,
    deserialize_with = "null_as_default"
  )]
  pub ops: BTreeMap<String, Option<ToolRef>>
}

impl SourceUnit {
  /// Creates a Dockerfile source unit for the Dockerfile at `path`.
  ///
  /// `path` must be relative to the scan root and use forward slashes. The
  /// unit's name and directory are both the Dockerfile's parent directory
  /// (`.` for a Dockerfile at the root).
  pub fn dockerfile(path: &str, data: String, base_images: Vec<String>) -> SourceUnit {
    let dir = parent_dir(path).to_string();

    SourceUnit {
      name: dir.clone(),
      unit_type: DOCKERFILE_UNIT_TYPE.to_string(),
      repo: String::new(),
      commit_id: String::new(),
      globs: Vec::new(),
      files: vec![path.to_string()],
      dir,
      dependencies: base_images.into_iter().map(Value::String).collect(),
      info: Value::Null,
      data: Value::String(data),
      config: BTreeMap::new(),
      ops: UNIT_OPS.iter().map(|op| (op.to_string(), None)).collect()
    }
  }
}

/// Decodes an explicit `null` the same as a missing field. The host writes
/// empty lists and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Returns the parent directory of a forward-slash relative path, or `.` if
/// the path has no directory component.
pub fn parent_dir(path: &str) -> &str {
  match path.rfind('/') {
    Some(0) => "/",
    Some(pos) => &path[..pos],
    None => "."
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_parent_dir() {
    assert_eq!(parent_dir("Dockerfile"), ".");
    assert_eq!(parent_dir("svc/Dockerfile"), "svc");
    assert_eq!(parent_dir("a/b/c/Dockerfile"), "a/b/c");
  }

  #[test]
  fn dockerfile_unit() {
    let unit = SourceUnit::dockerfile(
      "svc/Dockerfile", "FROM alpine\n".into(), vec!["alpine".into()]
    );

    assert_eq!(unit.name, "svc");
    assert_eq!(unit.dir, unit.name);
    assert_eq!(unit.unit_type, "Dockerfile");
    assert_eq!(unit.files, vec!["svc/Dockerfile".to_string()]);
    assert_eq!(unit.dependencies, vec![Value::String("alpine".into())]);
    assert_eq!(unit.ops.keys().collect::<Vec<_>>(), vec!["depresolve", "graph"]);
  }

  #[test]
  fn serialize_shape() {
    let unit = SourceUnit::dockerfile("Dockerfile", "x".into(), Vec::new());
    let json = serde_json::to_value(&unit).unwrap();

    assert_eq!(json, serde_json::json!({
      "Name": ".",
      "Type": "Dockerfile",
      "Files": ["Dockerfile"],
      "Dir": ".",
      "Data": "x",
      "Ops": { "depresolve": null, "graph": null }
    }));
  }

  #[test]
  fn deserialize_host_unit() {
    let unit: SourceUnit = serde_json::from_str(r#"{
      "Name": "svc",
      "Type": "Dockerfile",
      "Repo": "github.com/foo/bar",
      "Files": ["svc/Dockerfile"],
      "Dir": "svc",
      "Dependencies": ["alpine:3.18", 42],
      "Config": { "key": true },
      "Ops": { "graph": { "Toolchain": "sourcegraph.com/sourcegraph/srclib-docker", "Subcmd": "graph" } }
    }"#).unwrap();

    assert_eq!(unit.repo, "github.com/foo/bar");
    assert_eq!(unit.dependencies.len(), 2);
    assert_eq!(unit.data, Value::Null);
    assert_eq!(unit.ops["graph"].as_ref().map(|t| t.subcmd.as_str()), Some("graph"));
  }

  #[test]
  fn deserialize_null_collections() {
    let unit: SourceUnit = serde_json::from_str(r#"{
      "Name": ".",
      "Type": "Dockerfile",
      "Globs": null,
      "Files": null,
      "Dir": ".",
      "Dependencies": null,
      "Config": null,
      "Ops": null
    }"#).unwrap();

    assert!(unit.globs.is_empty());
    assert!(unit.files.is_empty());
    assert!(unit.dependencies.is_empty());
    assert!(unit.config.is_empty());
    assert!(unit.ops.is_empty());
  }
}
