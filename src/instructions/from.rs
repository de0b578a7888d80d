// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::convert::TryFrom;

use crate::dockerfile_parser::Instruction;
use crate::error::*;
use crate::parser::Pair;
use crate::span::Span;
use crate::util::*;

/// A Dockerfile [`FROM` instruction][from].
///
/// `image` is the instruction's original text with the leading keyword
/// stripped, line continuations joined, and surrounding whitespace trimmed. It
/// is not validated here; see `ImageRef::resolve()`. A bare `FROM` has an empty
/// image.
///
/// [from]: https://docs.docker.com/engine/reference/builder/#from
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FromInstruction {
  pub span: Span,
  pub image: String,
  pub image_span: Span,

  pub index: usize
}

impl FromInstruction {
  pub(crate) fn from_record(
    content: &str, record: Pair, index: usize
  ) -> Result<FromInstruction> {
    let span = Span::from_pair(&record);
    let parts = instruction_parts(record)?;

    Ok(FromInstruction {
      span, index,
      image: parts.arguments,
      image_span: trim_span(content, &parts.arguments_span)
    })
  }
}

impl<'a> TryFrom<&'a Instruction> for &'a FromInstruction {
  type Error = Error;

  fn try_from(instruction: &'a Instruction) -> std::result::Result<Self, Self::Error> {
    if let Instruction::From(f) = instruction {
      Ok(f)
    } else {
      Err(Error::ConversionError {
        from: format!("{:?}", instruction),
        to: "FromInstruction".into()
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parser::Rule;
  use crate::test_util::*;

  #[test]
  fn from_basic() -> Result<()> {
    let input = "from alpine:3.10";
    let from = parse_direct(
      input,
      Rule::instruction,
      |p| FromInstruction::from_record(input, p, 0)
    )?;

    assert_eq!(from, FromInstruction {
      span: Span { start: 0, end: 16 },
      index: 0,
      image: "alpine:3.10".into(),
      image_span: Span { start: 5, end: 16 }
    });

    Ok(())
  }

  #[test]
  fn from_padded() -> Result<()> {
    let input = "FROM    foo:bar   ";
    let from = parse_direct(
      input,
      Rule::instruction,
      |p| FromInstruction::from_record(input, p, 0)
    )?;

    assert_eq!(from.image, "foo:bar");
    assert_eq!(from.image_span, Span::new(8, 15));

    Ok(())
  }

  #[test]
  fn from_continuation() -> Result<()> {
    let input = "FROM \\\n  alpine";
    let from = parse_direct(
      input,
      Rule::instruction,
      |p| FromInstruction::from_record(input, p, 0)
    )?;

    assert_eq!(from.image, "alpine");

    Ok(())
  }

  #[test]
  fn from_missing_image() -> Result<()> {
    let input = "FROM   ";
    let from = parse_direct(
      input,
      Rule::instruction,
      |p| FromInstruction::from_record(input, p, 0)
    )?;

    assert_eq!(from.image, "");
    assert!(from.image_span.is_empty());

    Ok(())
  }
}
