// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::convert::TryFrom;

use crate::dockerfile_parser::Instruction;
use crate::error::*;
use crate::instructions::Keyword;
use crate::parser::Pair;
use crate::span::Span;
use crate::util::*;

/// Any Dockerfile instruction other than `FROM`.
///
/// Only `FROM` is inspected in detail. Recognized keywords (`RUN`, `COPY`,
/// `ONBUILD`, ...) carry their `Keyword`; anything else (`LABEL`, `ARG`,
/// `HEALTHCHECK`, typos, ...) is kept with `keyword: None` and does not count
/// as an instruction when deciding whether a Dockerfile is empty.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MiscInstruction {
  pub span: Span,
  pub keyword: Option<Keyword>,
  pub instruction: String,
  pub arguments: String
}

impl MiscInstruction {
  pub(crate) fn from_record(record: Pair) -> Result<MiscInstruction> {
    let span = Span::from_pair(&record);
    let parts = instruction_parts(record)?;
    let keyword = parts.name.parse::<Keyword>().ok();

    Ok(MiscInstruction {
      span, keyword,
      instruction: parts.name,
      arguments: parts.arguments
    })
  }

  /// True if this instruction uses one of the canonical keywords.
  pub fn is_recognized(&self) -> bool {
    self.keyword.is_some()
  }
}

impl<'a> TryFrom<&'a Instruction> for &'a MiscInstruction {
  type Error = Error;

  fn try_from(instruction: &'a Instruction) -> std::result::Result<Self, Self::Error> {
    if let Instruction::Misc(m) = instruction {
      Ok(m)
    } else {
      Err(Error::ConversionError {
        from: format!("{:?}", instruction),
        to: "MiscInstruction".into()
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
  fn misc_recognized() -> Result<()> {
    let misc = parse_direct(
      "run apk add --no-cache \\\n    curl",
      Rule::instruction,
      MiscInstruction::from_record
    )?;

    assert_eq!(misc, MiscInstruction {
      span: Span::new(0, 33),
      keyword: Some(Keyword::Run),
      instruction: "run".into(),
      arguments: "apk add --no-cache     curl".into()
    });
    assert!(misc.is_recognized());

    Ok(())
  }

  #[test]
  fn misc_unknown() -> Result<()> {
    let misc = parse_direct(
      "LABEL foo=bar",
      Rule::misc,
      MiscInstruction::from_record
    )?;

    assert_eq!(misc.keyword, None);
    assert_eq!(misc.instruction, "LABEL");
    assert_eq!(misc.arguments, "foo=bar");
    assert!(!misc.is_recognized());

    Ok(())
  }

  #[test]
  fn misc_recognized_without_arguments() -> Result<()> {
    let misc = parse_direct("EXPOSE", Rule::instruction, MiscInstruction::from_record)?;

    assert_eq!(misc.keyword, Some(Keyword::Expose));
    assert_eq!(misc.arguments, "");

    Ok(())
  }

  #[test]
  fn misc_stray_backslash() -> Result<()> {
    let misc = parse_direct("\\", Rule::misc, MiscInstruction::from_record)?;

    assert_eq!(misc.keyword, None);
    assert_eq!(misc.instruction, "\\");

    Ok(())
  }
}
