// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use pest::Parser;
use snafu::ResultExt;

use crate::error::*;
use crate::parser::{DockerfileParser, Pair, Rule};

/// Parses `input` with a single grammar rule and hands the resulting record to
/// `func`, for per-instruction unit tests.
///
/// Individual rules have no `~ EOI` requirement, so trailing input that the
/// rule doesn't consume is silently ignored.
pub fn parse_direct<T, F>(input: &str, rule: Rule, func: F) -> Result<T>
where
  F: Fn(Pair) -> Result<T>
{
  let pair = DockerfileParser::parse(rule, input)
    .context(ParseError)?
    .next()
    .ok_or(Error::UnknownParseError)?;

  func(pair)
}
