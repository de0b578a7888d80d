// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::*;

/// The hostname of the public (official) registry, used when an image
/// reference names no registry of its own.
pub const DEFAULT_HOSTNAME: &str = "docker.io";

/// The legacy hostname of the public registry; treated as `DEFAULT_HOSTNAME`.
const LEGACY_HOSTNAME: &str = "index.docker.io";

/// Namespace for official images on the public registry.
const OFFICIAL_NAMESPACE: &str = "library";

lazy_static! {
  static ref NAME_COMPONENT: Regex = Regex::new(r"^[a-z0-9_.-]+$").unwrap();
  static ref NAMESPACE: Regex = Regex::new(r"^[a-z0-9_-]+$").unwrap();
  static ref IMAGE_ID: Regex = Regex::new(r"^[a-f0-9]{64}$").unwrap();
}

/// A resolved docker image reference.
///
/// ```
/// use srclib_dockerfile::ImageRef;
///
/// let image = ImageRef::resolve("alpine:3.18").unwrap();
/// assert_eq!(image.hostname, "docker.io");
/// assert_eq!(image.name, "library/alpine");
/// assert_eq!(image.repo, "alpine");
/// assert_eq!(image.tag, "3.18");
/// assert_eq!(format!("{}", image), "alpine:3.18");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
  /// The registry hostname, `DEFAULT_HOSTNAME` if the reference names none
  pub hostname: String,

  /// The image name on its registry; official public images are prefixed with
  /// `library/`
  pub name: String,

  /// The reference with its tag (or digest) removed
  pub repo: String,

  /// The tag after the colon (or the digest after `@`), empty if absent
  pub tag: String
}

/// Determines if an image reference token refers to a registry hostname or not
///
/// Based on rules from https://stackoverflow.com/a/42116190
fn is_registry(token: &str) -> bool {
  token == "localhost" || token.contains('.') || token.contains(':')
}

/// Splits an image reference into its repository and tag.
///
/// A digest (`repo@sha256:...`) takes precedence; otherwise the reference is
/// split on its last `:` unless the suffix contains a `/` (in which case the
/// colon belonged to a registry port).
pub fn split_repository_tag(s: &str) -> (&str, &str) {
  if let Some(at_pos) = s.find('@') {
    return (&s[..at_pos], &s[at_pos + 1..]);
  }

  match s.rfind(':') {
    Some(pos) if !s[pos + 1..].contains('/') => (&s[..pos], &s[pos + 1..]),
    _ => (s, "")
  }
}

/// Splits a repository into its registry hostname and remote name.
fn split_repository_name(repo: &str) -> (&str, &str) {
  match repo.split_once('/') {
    Some((host, rest)) if is_registry(host) => (host, rest),
    _ => (DEFAULT_HOSTNAME, repo)
  }
}

/// Checks a namespace on the public registry.
fn validate_namespace(reference: &str, namespace: &str) -> Result<()> {
  if !NAMESPACE.is_match(namespace) {
    return Err(invalid_reference(reference, format!(
      "invalid namespace name ({}), only [a-z0-9-_] are allowed", namespace
    )));
  }

  if namespace.len() < 2 || namespace.len() > 255 {
    return Err(invalid_reference(reference, format!(
      "invalid namespace name ({}), cannot be fewer than 2 or more than 255 characters",
      namespace
    )));
  }

  if namespace.starts_with('-') || namespace.ends_with('-') {
    return Err(invalid_reference(reference, format!(
      "invalid namespace name ({}), cannot begin or end with a hyphen", namespace
    )));
  }

  if namespace.contains("--") {
    return Err(invalid_reference(reference, format!(
      "invalid namespace name ({}), cannot contain consecutive hyphens", namespace
    )));
  }

  Ok(())
}

/// Checks every `/`-separated component of an image name.
fn validate_name(reference: &str, name: &str) -> Result<()> {
  for component in name.split('/') {
    if !NAME_COMPONENT.is_match(component) {
      return Err(invalid_reference(reference, format!(
        "invalid repository name ({}), only [a-z0-9-_.] are allowed", name
      )));
    }
  }

  Ok(())
}

impl ImageRef {
  /// Resolves a raw base image reference (as written after `FROM`) into its
  /// hostname, name, repo, and tag.
  ///
  /// Fails with `Error::InvalidReference` for empty references, references
  /// containing whitespace or a URL scheme, and names that don't follow the
  /// registry naming rules.
  pub fn resolve(s: &str) -> Result<ImageRef> {
    if s.is_empty() {
      return Err(invalid_reference(s, "reference is empty"));
    }

    if s.chars().any(char::is_whitespace) {
      return Err(invalid_reference(s, "reference contains whitespace"));
    }

    if s.contains("://") {
      return Err(invalid_reference(
        s, "repository name must not include a URL scheme"
      ));
    }

    let (repo, tag) = split_repository_tag(s);
    let (hostname, remote) = split_repository_name(repo);

    let (hostname, name) = if hostname == DEFAULT_HOSTNAME || hostname == LEGACY_HOSTNAME {
      if IMAGE_ID.is_match(remote) {
        return Err(invalid_reference(s, format!(
          "invalid repository name ({}), cannot specify 64-byte hexadecimal strings",
          remote
        )));
      }

      let name = match remote.split_once('/') {
        Some((namespace, _)) => {
          validate_namespace(s, namespace)?;
          remote.to_string()
        },
        None => format!("{}/{}", OFFICIAL_NAMESPACE, remote)
      };

      (DEFAULT_HOSTNAME.to_string(), name)
    } else {
      (hostname.to_string(), remote.to_string())
    };

    validate_name(s, &name)?;

    Ok(ImageRef {
      hostname, name,
      repo: repo.to_string(),
      tag: tag.to_string()
    })
  }

  /// True if this image lives on the public registry.
  pub fn is_official_registry(&self) -> bool {
    self.hostname == DEFAULT_HOSTNAME
  }
}

impl fmt::Display for ImageRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.repo)?;

    if self.tag.is_empty() {
      Ok(())
    } else if self.tag.contains(':') {
      write!(f, "@{}", self.tag)
    } else {
      write!(f, ":{}", self.tag)
    }
  }
}
