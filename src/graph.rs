// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use tracing::warn;

use crate::dockerfile_parser::Dockerfile;
use crate::error::*;
use crate::image::ImageRef;
use crate::span::Span;
use crate::unit::SourceUnit;

/// The def path of a Dockerfile. There is one Dockerfile per source unit, so
/// each Dockerfile is at its unit's "." path.
pub const DOCKERFILE_DEF_PATH: &str = ".";

/// The annotation type of hyperlinks.
pub const LINK_ANN_TYPE: &str = "link";

const DOCKER_HUB_URL: &str = "https://registry.hub.docker.com/_/";
const SOURCEGRAPH_URL: &str = "https://sourcegraph.com/";
const INSTRUCTION_DOCS_URL: &str = "https://docs.docker.com/reference/builder/#";

lazy_static! {
  // both patterns only ever run against ASCII-lowercased file contents
  static ref REPO_URI: Regex = Regex::new(
    r"(?-u)(?:github\.com|sourcegraph\.com)/[\w.-]+/[\w.-]+"
  ).unwrap();

  static ref INSTRUCTION: Regex = Regex::new(
    r"(?m:^\x{FEFF}?(from|maintainer|run|cmd|expose|env|add|copy|entrypoint|volume|user|workdir|onbuild))"
  ).unwrap();
}

/// A definition: a named entity declared somewhere in a source unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Def {
  #[serde(rename = "Repo", default, skip_serializing_if = "String::is_empty")]
  pub repo: String,

  #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
  pub commit_id: String,

  #[serde(rename = "UnitType", default, skip_serializing_if = "String::is_empty")]
  pub unit_type: String,

  #[serde(rename = "Unit", default, skip_serializing_if = "String::is_empty")]
  pub unit: String,

  #[serde(rename = "Path")]
  pub path: String,

  #[serde(rename = "Name")]
  pub name: String,

  #[serde(rename = "File")]
  pub file: String,

  #[serde(rename = "DefStart")]
  pub def_start: usize,

  #[serde(rename = "DefEnd")]
  pub def_end: usize,

  #[serde(rename = "Exported", default, skip_serializing_if = "is_false")]
  pub exported: bool,

  #[serde(rename = "Data", default, skip_serializing_if = "Value::is_null")]
  pub data: Value,

  #[serde(rename = "TreePath", default, skip_serializing_if = "String::is_empty")]
  pub tree_path: String
}

/// An annotation attaching data (such as a hyperlink) to a byte span of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ann {
  #[serde(rename = "Repo", default, skip_serializing_if = "String::is_empty")]
  pub repo: String,

  #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
  pub commit_id: String,

  #[serde(rename = "UnitType", default, skip_serializing_if = "String::is_empty")]
  pub unit_type: String,

  #[serde(rename = "Unit", default, skip_serializing_if = "String::is_empty")]
  pub unit: String,

  #[serde(rename = "File", default, skip_serializing_if = "String::is_empty")]
  pub file: String,

  #[serde(rename = "Start")]
  pub start: usize,

  #[serde(rename = "End")]
  pub end: usize,

  #[serde(rename = "Type")]
  pub ann_type: String,

  #[serde(rename = "Data", default, skip_serializing_if = "Value::is_null")]
  pub data: Value
}

impl Ann {
  /// Returns the URL of a link annotation, or None for any other type.
  pub fn link_url(&self) -> Option<&str> {
    if self.ann_type == LINK_ANN_TYPE {
      self.data.as_str()
    } else {
      None
    }
  }

  pub fn span(&self) -> Span {
    Span::new(self.start, self.end)
  }
}

/// The output of `graph`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Output {
  #[serde(rename = "Defs", default, skip_serializing_if = "Vec::is_empty")]
  pub defs: Vec<Def>,

  #[serde(rename = "Anns", default, skip_serializing_if = "Vec::is_empty")]
  pub anns: Vec<Ann>
}

fn is_false(b: &bool) -> bool {
  !*b
}

/// Finds `needle` in the (already lowercased) `haystack`, ignoring ASCII case.
/// Returns the span of the first occurrence.
fn find_span(haystack: &[u8], needle: &str) -> Option<Span> {
  let needle = needle.to_ascii_lowercase();
  let needle = needle.as_bytes();

  if needle.is_empty() || needle.len() > haystack.len() {
    return None;
  }

  haystack
    .windows(needle.len())
    .position(|window| window == needle)
    .map(|start| Span::new(start, start + needle.len()))
}

/// Builds graph output for one Dockerfile.
struct Grapher<'a> {
  unit: &'a SourceUnit,
  file: &'a str,
  output: Output
}

impl<'a> Grapher<'a> {
  fn new(unit: &'a SourceUnit, file: &'a str) -> Grapher<'a> {
    Grapher { unit, file, output: Output::default() }
  }

  fn add_def(&mut self, data: &[u8]) {
    let encoded = BASE64_STANDARD.encode(data);

    self.output.defs.push(Def {
      repo: self.unit.repo.clone(),
      commit_id: self.unit.commit_id.clone(),
      unit_type: self.unit.unit_type.clone(),
      unit: self.unit.name.clone(),
      path: DOCKERFILE_DEF_PATH.to_string(),
      name: "Dockerfile".to_string(),
      file: self.file.to_string(),
      def_start: 0,
      def_end: data.len().saturating_sub(1),
      exported: true,
      data: Value::String(encoded),
      tree_path: DOCKERFILE_DEF_PATH.to_string()
    });
  }

  fn add_link(&mut self, span: Span, url: String) {
    self.output.anns.push(Ann {
      repo: self.unit.repo.clone(),
      commit_id: self.unit.commit_id.clone(),
      unit_type: self.unit.unit_type.clone(),
      unit: self.unit.name.clone(),
      file: self.file.to_string(),
      start: span.start,
      end: span.end,
      ann_type: LINK_ANN_TYPE.to_string(),
      data: Value::String(url)
    });
  }

  /// Links the base image named by `FROM` to its Docker Hub page.
  fn add_base_image_link(&mut self, lowercase: &[u8], from: &str) {
    if from.is_empty() {
      return;
    }

    let image = match ImageRef::resolve(from) {
      Ok(image) => image,
      Err(err) => {
        warn!(
          from, error = %err,
          "error parsing base image FROM link; skipping link"
        );
        return;
      }
    };

    if let Some(span) = find_span(lowercase, from) {
      self.add_link(span, format!("{}{}", DOCKER_HUB_URL, image.repo));
    }
  }

  /// Links anything that looks like a repository URI to Sourcegraph.
  fn add_repo_uri_links(&mut self, lowercase: &[u8]) {
    for m in REPO_URI.find_iter(lowercase) {
      let uri = String::from_utf8_lossy(m.as_bytes());
      let url = format!("{}{}", SOURCEGRAPH_URL, uri);
      self.add_link(m.range().into(), url);
    }
  }

  /// Links instruction keywords at the start of a line to their docs.
  fn add_instruction_links(&mut self, lowercase: &[u8]) {
    for caps in INSTRUCTION.captures_iter(lowercase) {
      let m = match caps.get(1) {
        Some(m) => m,
        None => continue
      };

      let instruction = String::from_utf8_lossy(m.as_bytes());
      let url = format!("{}{}", INSTRUCTION_DOCS_URL, instruction);
      self.add_link(m.range().into(), url);
    }
  }
}

/// Graphs a Dockerfile whose contents have already been read.
///
/// `file` is the Dockerfile's path as listed in the unit. Output always holds
/// exactly one def, for the Dockerfile itself. Link annotations follow when the
/// Dockerfile parses: the base image first, then repository URIs, then
/// instruction keywords, each group in file order.
pub fn graph_dockerfile(unit: &SourceUnit, file: &str, data: &[u8]) -> Output {
  let mut grapher = Grapher::new(unit, file);
  grapher.add_def(data);

  let dockerfile = match Dockerfile::from_bytes(data) {
    Ok(dockerfile) => dockerfile,
    Err(err) => {
      warn!(path = file, error = %err, "error parsing Dockerfile; skipping links");
      return grapher.output;
    }
  };

  // ASCII lowercasing keeps every byte offset identical to the original file
  let lowercase = data.to_ascii_lowercase();

  grapher.add_base_image_link(&lowercase, dockerfile.from());
  grapher.add_repo_uri_links(&lowercase);
  grapher.add_instruction_links(&lowercase);

  grapher.output
}

/// Graphs the Dockerfile of `unit`, reading `Files[0]` relative to `root`.
pub fn graph(root: &Path, unit: &SourceUnit) -> Result<Output> {
  let file = unit.files.first().ok_or_else(|| Error::MissingFile {
    unit: unit.name.clone()
  })?;

  let data = fs::read(root.join(file)).context(ReadFile { path: file.as_str() })?;

  Ok(graph_dockerfile(unit, file, &data))
}

#[cfg(test)]
mod tests {
  use super::*;
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  fn unit() -> SourceUnit {
    SourceUnit::dockerfile("Dockerfile", String::new(), Vec::new())
  }

  fn links(output: &Output) -> Vec<(usize, usize, &str)> {
    output.anns
      .iter()
      .map(|a| (a.start, a.end, a.link_url().unwrap()))
      .collect()
  }

  #[test]
  fn def_only_for_invalid_dockerfile() {
    let output = graph_dockerfile(&unit(), "Dockerfile", b"x");

    assert_eq!(output.defs.len(), 1);
    assert!(output.anns.is_empty());

    let def = &output.defs[0];
    assert_eq!(def.path, ".");
    assert_eq!(def.tree_path, ".");
    assert_eq!(def.name, "Dockerfile");
    assert_eq!(def.file, "Dockerfile");
    assert!(def.exported);
    assert_eq!((def.def_start, def.def_end), (0, 0));
    assert_eq!(def.data, Value::String("eA==".into()));
  }

  #[test]
  fn def_of_empty_file() {
    let output = graph_dockerfile(&unit(), "Dockerfile", b"");

    assert_eq!(output.defs.len(), 1);
    assert_eq!(output.defs[0].def_end, 0);
    assert_eq!(output.defs[0].data, Value::String(String::new()));
  }

  #[test]
  fn base_image_and_instruction_links() {
    let data = b"FROM alpine:3.18\n";
    let output = graph_dockerfile(&unit(), "Dockerfile", data);

    assert_eq!(output.defs[0].def_end, data.len() - 1);
    assert_eq!(links(&output), vec![
      (5, 16, "https://registry.hub.docker.com/_/alpine"),
      (0, 4, "https://docs.docker.com/reference/builder/#from"),
    ]);
  }

  #[test]
  fn repo_uri_links() {
    let data = b"FROM debian\nRUN git clone https://GitHub.com/foo/bar && echo sourcegraph.com/a/b.c\n";
    let output = graph_dockerfile(&unit(), "Dockerfile", data);

    let links = links(&output);
    assert_eq!(links[0], (5, 11, "https://registry.hub.docker.com/_/debian"));
    assert_eq!(links[1], (
      34, 52, "https://sourcegraph.com/github.com/foo/bar"
    ));
    assert_eq!(links[2], (
      61, 82, "https://sourcegraph.com/sourcegraph.com/a/b.c"
    ));
    assert_eq!(links[3], (0, 4, "https://docs.docker.com/reference/builder/#from"));
    assert_eq!(links[4], (12, 15, "https://docs.docker.com/reference/builder/#run"));
    assert_eq!(links.len(), 5);
  }

  #[test]
  fn instruction_links_are_case_insensitive_and_line_anchored() {
    let data = indoc!(r#"
      From ubuntu
      # run this
      Run apt-get update
        CMD indented
      WORKDIR /app
    "#).as_bytes();
    let output = graph_dockerfile(&unit(), "Dockerfile", data);

    let urls: Vec<_> = links(&output).into_iter().skip(1).map(|l| l.2).collect();
    assert_eq!(urls, vec![
      "https://docs.docker.com/reference/builder/#from",
      "https://docs.docker.com/reference/builder/#run",
      "https://docs.docker.com/reference/builder/#workdir",
    ]);
  }

  #[test]
  fn leading_byte_order_mark() {
    let data = "\u{feff}FROM alpine\n".as_bytes();
    let output = graph_dockerfile(&unit(), "Dockerfile", data);

    assert_eq!(links(&output), vec![
      (8, 14, "https://registry.hub.docker.com/_/alpine"),
      (3, 7, "https://docs.docker.com/reference/builder/#from"),
    ]);
  }

  #[test]
  fn invalid_base_image_skips_link() {
    let output = graph_dockerfile(&unit(), "Dockerfile", b"FROM Not/Valid\n");

    assert_eq!(links(&output), vec![
      (0, 4, "https://docs.docker.com/reference/builder/#from"),
    ]);
  }

  #[test]
  fn spans_within_file() {
    let data = b"FROM golang:1.21\nRUN go get github.com/x/y\nCOPY . /src\n";
    let output = graph_dockerfile(&unit(), "Dockerfile", data);

    assert!(output.anns.len() >= 3);
    for ann in &output.anns {
      assert!(!ann.span().is_empty());
      assert!(ann.end <= data.len());
    }
  }

  #[test]
  fn unit_key_is_filled() {
    let mut unit = SourceUnit::dockerfile("svc/Dockerfile", String::new(), Vec::new());
    unit.repo = "github.com/foo/bar".into();
    let output = graph_dockerfile(&unit, "svc/Dockerfile", b"FROM alpine\n");

    assert_eq!(output.defs[0].unit_type, "Dockerfile");
    assert_eq!(output.defs[0].unit, "svc");
    assert_eq!(output.defs[0].repo, "github.com/foo/bar");
    assert!(output.anns.iter().all(|a| a.unit == "svc" && a.file == "svc/Dockerfile"));
  }

  #[test]
  fn graph_missing_files() {
    let mut unit = unit();
    unit.files.clear();

    assert!(matches!(
      graph(Path::new("."), &unit),
      Err(Error::MissingFile { .. })
    ));
  }

  #[test]
  fn graph_reads_file() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Dockerfile"), "FROM alpine\n").unwrap();

    let output = graph(dir.path(), &unit())?;
    assert_eq!(output.defs.len(), 1);
    assert_eq!(output.anns.len(), 2);

    Ok(())
  }
}
