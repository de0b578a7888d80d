// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use pest::iterators::Pair;
use snafu::Snafu;

use crate::parser::*;

/// An error raised while parsing Dockerfiles, resolving image references, or
/// running one of the toolchain commands.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
  #[snafu(display(
    "could not parse Dockerfile: {}", source
  ))]
  ParseError {
    source: pest::error::Error<Rule>
  },

  #[snafu(display(
    "unable to parse Dockerfile: {}", message
  ))]
  GenericParseError {
    message: String
  },

  #[snafu(display(
    "unable to parse Dockerfile"
  ))]
  UnknownParseError,

  #[snafu(display(
    "unable to parse Dockerfile: file with no instructions"
  ))]
  NoInstructions,

  #[snafu(display(
    "could not read Dockerfile: {}", source
  ))]
  ReadError {
    source: std::io::Error
  },

  #[snafu(display(
    "Dockerfile is not valid UTF-8: {}", source
  ))]
  EncodingError {
    source: std::str::Utf8Error
  },

  #[snafu(display(
    "could not convert instruction '{:?}' to desired type '{}'", from, to
  ))]
  ConversionError {
    from: String,
    to: String
  },

  #[snafu(display(
    "invalid image reference {:?}: {}", reference, reason
  ))]
  InvalidReference {
    reference: String,
    reason: String
  },

  #[snafu(display(
    "error walking directory tree: {}", source
  ))]
  WalkError {
    source: walkdir::Error
  },

  #[snafu(display(
    "could not read {}: {}", path, source
  ))]
  ReadFile {
    path: String,
    source: std::io::Error
  },

  #[snafu(display(
    "could not decode JSON input: {}", source
  ))]
  DecodeInput {
    source: serde_json::Error
  },

  #[snafu(display(
    "could not decode JSON input: unexpected end of input"
  ))]
  EmptyInput,

  #[snafu(display(
    "could not encode JSON output: {}", source
  ))]
  EncodeOutput {
    source: serde_json::Error
  },

  #[snafu(display(
    "could not write output: {}", source
  ))]
  WriteOutput {
    source: std::io::Error
  },

  #[snafu(display(
    "source unit {:?} lists no files", unit
  ))]
  MissingFile {
    unit: String
  },

  #[snafu(display(
    "Dockerfile raw dep is not a string base image: {} ({})", value, kind
  ))]
  UnexpectedDependency {
    value: String,
    kind: String
  }
}

/// A Dockerfile toolchain Result.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Helper to create an unexpected token error.
pub(crate) fn unexpected_token(record: Pair<Rule>) -> Error {
  Error::GenericParseError {
    message: format!("unexpected token {:?}", record.as_rule())
  }
}

/// Helper to create an invalid image reference error.
pub(crate) fn invalid_reference(reference: &str, reason: impl Into<String>) -> Error {
  Error::InvalidReference {
    reference: reference.to_string(),
    reason: reason.into()
  }
}
