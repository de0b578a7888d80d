// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::*;
use crate::parser::*;
use crate::span::Span;

lazy_static! {
  static ref ESCAPED_BREAK: Regex = Regex::new(
    r"\\[ \t]*(?:\r\n|\r|\n)(?:[ \t]*(?:#[^\r\n]*)?(?:\r\n|\r|\n))*"
  ).unwrap();
}

/// Removes escaped line breaks (\\\n) from a string, along with any blank or
/// comment lines swallowed by the continuation.
///
/// This should be used to clean any input from the `arguments` rule
pub(crate) fn clean_escaped_breaks(s: &str) -> String {
  ESCAPED_BREAK.replace_all(s, "").into_owned()
}

/// The pieces shared by every instruction record: the keyword as written, its
/// cleaned arguments, and the span of the raw (untrimmed) arguments.
pub(crate) struct InstructionParts {
  pub name: String,
  pub arguments: String,
  pub arguments_span: Span
}

/// Splits an `instruction` or `misc` record into its name and arguments.
pub(crate) fn instruction_parts(record: Pair) -> Result<InstructionParts> {
  let mut name = None;
  let mut arguments = None;

  for field in record.into_inner() {
    match field.as_rule() {
      Rule::keyword | Rule::misc_instruction => name = Some(field.as_str()),
      Rule::arguments => arguments = Some(field),
      _ => return Err(unexpected_token(field))
    }
  }

  let name = name.ok_or_else(|| Error::GenericParseError {
    message: "instructions require a name".into()
  })?.to_string();

  let arguments = arguments.ok_or_else(|| Error::GenericParseError {
    message: format!("{} is missing its arguments", name)
  })?;

  Ok(InstructionParts {
    arguments: clean_escaped_breaks(arguments.as_str()).trim().to_string(),
    arguments_span: Span::from_pair(&arguments),
    name
  })
}

/// Narrows a raw span to exclude leading and trailing whitespace of the text it
/// covers within `content`.
pub(crate) fn trim_span(content: &str, span: &Span) -> Span {
  let text = &content[span.as_range()];
  let leading = text.len() - text.trim_start().len();
  let trimmed_len = text.trim().len();

  Span::new(span.start + leading, span.start + leading + trimmed_len)
}
