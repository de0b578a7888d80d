// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path};

use snafu::ResultExt;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::dockerfile_parser::Dockerfile;
use crate::error::*;
use crate::unit::SourceUnit;

/// The only file name collected by the scanner. Matching is case-sensitive.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Version control metadata directories. These are never traversed, and a
/// directory containing one is treated as the root of a nested repository.
const VCS_DIRS: [&str; 2] = [".git", ".hg"];

/// Options passed to `scan` by the host.
#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
  /// The repository URI, recorded on every emitted unit.
  pub repo: Option<String>,

  /// The subdirectory of the repository being scanned.
  pub subdir: Option<String>
}

fn is_vcs_dir(name: &OsStr) -> bool {
  VCS_DIRS.iter().any(|vcs| name == OsStr::new(vcs))
}

/// Permission and not-found errors are skipped during traversal; any other
/// I/O error aborts the scan.
fn is_ignorable(err: &io::Error) -> bool {
  matches!(err.kind(), io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound)
}

/// Returns true if `dir` directly contains a `.git` or `.hg` entry. Git
/// submodules have a `.git` file rather than a directory, so entries of any
/// type count.
fn is_nested_repository(dir: &Path) -> Result<bool> {
  let read_error = |source| Error::ReadFile {
    path: dir.display().to_string(),
    source
  };

  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(err) if is_ignorable(&err) => return Ok(false),
    Err(err) => return Err(read_error(err))
  };

  for entry in entries {
    match entry {
      Ok(entry) if is_vcs_dir(&entry.file_name()) => return Ok(true),
      Ok(_) => (),
      Err(err) if is_ignorable(&err) => (),
      Err(err) => return Err(read_error(err))
    }
  }

  Ok(false)
}

/// Converts `path` to a forward-slash path relative to `root`.
fn slash_path(root: &Path, path: &Path) -> String {
  path.strip_prefix(root)
    .unwrap_or(path)
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
      _ => None
    })
    .collect::<Vec<_>>()
    .join("/")
}

/// Walks the tree rooted at `root` depth-first in lexical order and returns
/// the root-relative path of every file named `Dockerfile`.
pub fn find_dockerfiles(root: &Path) -> Result<Vec<String>> {
  let mut dockerfiles = Vec::new();
  let mut walker = WalkDir::new(root)
    .follow_links(false)
    .sort_by_file_name()
    .into_iter();

  while let Some(entry) = walker.next() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) if err.io_error().map(is_ignorable).unwrap_or(false) => continue,
      Err(err) => return Err(err).context(WalkError)
    };

    let file_type = entry.file_type();
    if file_type.is_dir() {
      if is_vcs_dir(entry.file_name()) {
        walker.skip_current_dir();
      } else if entry.depth() > 0 && is_nested_repository(entry.path())? {
        debug!(dir = %entry.path().display(), "skipping nested repository");
        walker.skip_current_dir();
      }
    } else if file_type.is_file() && entry.file_name() == OsStr::new(DOCKERFILE_NAME) {
      dockerfiles.push(slash_path(root, entry.path()));
    }
  }

  Ok(dockerfiles)
}

/// Builds the source unit for a single Dockerfile at `path` (relative to
/// `root`).
///
/// A Dockerfile that fails to parse still produces a unit, just without any
/// dependencies.
pub fn scan_dockerfile(root: &Path, path: &str) -> Result<SourceUnit> {
  let data = fs::read(root.join(path)).context(ReadFile { path })?;

  let mut base_images = Vec::new();
  match Dockerfile::from_bytes(&data) {
    Ok(dockerfile) => {
      if !dockerfile.from().is_empty() {
        base_images.push(dockerfile.from().to_string());
      }
    },
    Err(err) => warn!(
      path, error = %err,
      "error parsing Dockerfile; adding without dependencies"
    )
  }

  Ok(SourceUnit::dockerfile(
    path,
    String::from_utf8_lossy(&data).into_owned(),
    base_images
  ))
}

/// Scans the tree rooted at `root` and returns one source unit per
/// Dockerfile, in traversal order.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Vec<SourceUnit>> {
  debug!(
    root = %root.display(),
    repo = ?options.repo,
    subdir = ?options.subdir,
    "scanning for Dockerfiles"
  );

  let dockerfiles = find_dockerfiles(root)?;
  if !dockerfiles.is_empty() {
    debug!(count = dockerfiles.len(), ?dockerfiles, "found Dockerfiles");
  }

  dockerfiles
    .iter()
    .map(|path| {
      let mut unit = scan_dockerfile(root, path)?;
      if let Some(repo) = &options.repo {
        unit.repo = repo.clone();
      }

      Ok(unit)
    })
    .collect()
}
