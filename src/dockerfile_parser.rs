// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::io::{Read, BufReader};
use std::str::FromStr;

use pest::Parser;
use snafu::ResultExt;

use crate::error::*;
use crate::instructions::*;
use crate::parser::*;

/// A single Dockerfile instruction.
///
/// # Example
///
/// ```
/// use std::convert::TryInto;
/// use srclib_dockerfile::*;
///
/// let dockerfile = Dockerfile::parse("FROM alpine:3.11").unwrap();
/// let from: &FromInstruction = dockerfile.instructions
///   .get(0).unwrap()
///   .try_into().unwrap();
///
/// assert_eq!(from.image, "alpine:3.11");
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Instruction {
  From(FromInstruction),
  Misc(MiscInstruction)
}

impl Instruction {
  /// The canonical keyword of this instruction, if it has one.
  pub fn keyword(&self) -> Option<Keyword> {
    match self {
      Instruction::From(_) => Some(Keyword::From),
      Instruction::Misc(m) => m.keyword
    }
  }
}

impl From<FromInstruction> for Instruction {
  fn from(ins: FromInstruction) -> Self {
    Instruction::From(ins)
  }
}

impl From<MiscInstruction> for Instruction {
  fn from(ins: MiscInstruction) -> Self {
    Instruction::Misc(ins)
  }
}

/// A parsed Dockerfile.
///
/// Only the salient parts of the file are modeled: every instruction is kept
/// in order, and `from()` returns the base image named by the last `FROM`.
///
/// # Example
/// ```
/// use srclib_dockerfile::Dockerfile;
///
/// let s = r#"
///   FROM alpine:3.11
///   RUN echo "hello world"
/// "#;
///
/// assert_eq!(Dockerfile::parse(&s).unwrap().from(), "alpine:3.11");
/// assert_eq!(
///   Dockerfile::parse(&s).unwrap(),
///   Dockerfile::from_reader(s.as_bytes()).unwrap()
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dockerfile {
  /// The raw content of the Dockerfile
  pub content: String,

  /// An ordered list of all parsed instructions
  pub instructions: Vec<Instruction>
}

fn parse_dockerfile(input: &str) -> Result<Dockerfile> {
  let dockerfile = DockerfileParser::parse(Rule::dockerfile, input)
    .context(ParseError)?
    .next()
    .ok_or(Error::UnknownParseError)?;

  let mut instructions = Vec::new();
  let mut from_index = 0;

  for record in dockerfile.into_inner() {
    let instruction: Instruction = match record.as_rule() {
      Rule::EOI => continue,
      Rule::instruction if is_from(&record) => {
        let from = FromInstruction::from_record(input, record, from_index)?;
        from_index += 1;
        from.into()
      },
      Rule::instruction | Rule::misc => MiscInstruction::from_record(record)?.into(),
      _ => return Err(unexpected_token(record))
    };

    instructions.push(instruction);
  }

  if !instructions.iter().any(|i| i.keyword().is_some()) {
    return Err(Error::NoInstructions);
  }

  Ok(Dockerfile {
    content: input.into(),
    instructions
  })
}

fn is_from(record: &Pair) -> bool {
  record.clone()
    .into_inner()
    .next()
    .map(|keyword| keyword.as_str().eq_ignore_ascii_case("from"))
    .unwrap_or(false)
}

impl Dockerfile {
  /// Parses a Dockerfile from a string.
  pub fn parse(input: &str) -> Result<Dockerfile> {
    parse_dockerfile(input)
  }

  /// Parses a Dockerfile from a reader.
  pub fn from_reader<R>(reader: R) -> Result<Dockerfile>
  where
    R: Read
  {
    let mut buf = String::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader.read_to_string(&mut buf).context(ReadError)?;

    Dockerfile::parse(&buf)
  }

  /// Parses a Dockerfile from raw file bytes, which must be valid UTF-8.
  pub fn from_bytes(data: &[u8]) -> Result<Dockerfile> {
    let s = std::str::from_utf8(data).context(EncodingError)?;

    Dockerfile::parse(s)
  }

  /// Returns an iterator over all `FROM` instructions, in order.
  pub fn iter_from(&self) -> impl Iterator<Item = &FromInstruction> {
    self.instructions.iter().filter_map(|ins| match ins {
      Instruction::From(f) => Some(f),
      _ => None
    })
  }

  /// The base image of this Dockerfile: the trimmed argument of the last
  /// `FROM` instruction, or an empty string if there is none.
  pub fn from(&self) -> &str {
    self.iter_from()
      .last()
      .map(|f| f.image.as_str())
      .unwrap_or("")
  }
}

impl FromStr for Dockerfile {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Dockerfile::parse(s)
  }
}
