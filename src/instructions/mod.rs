// (C) Copyright 2019 Hewlett Packard Enterprise Development LP

use std::fmt;
use std::str::FromStr;

use crate::error::*;

mod from;
pub use from::*;

mod misc;
pub use misc::*;

/// A canonical Dockerfile instruction keyword.
///
/// Keywords are matched case-insensitively; `as_str()` always returns the
/// lowercase form used for documentation anchors.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Keyword {
  From,
  Maintainer,
  Run,
  Cmd,
  Expose,
  Env,
  Add,
  Copy,
  Entrypoint,
  Volume,
  User,
  Workdir,
  Onbuild
}

impl Keyword {
  /// Every recognized keyword, in documentation order.
  pub const ALL: [Keyword; 13] = [
    Keyword::From,
    Keyword::Maintainer,
    Keyword::Run,
    Keyword::Cmd,
    Keyword::Expose,
    Keyword::Env,
    Keyword::Add,
    Keyword::Copy,
    Keyword::Entrypoint,
    Keyword::Volume,
    Keyword::User,
    Keyword::Workdir,
    Keyword::Onbuild,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Keyword::From => "from",
      Keyword::Maintainer => "maintainer",
      Keyword::Run => "run",
      Keyword::Cmd => "cmd",
      Keyword::Expose => "expose",
      Keyword::Env => "env",
      Keyword::Add => "add",
      Keyword::Copy => "copy",
      Keyword::Entrypoint => "entrypoint",
      Keyword::Volume => "volume",
      Keyword::User => "user",
      Keyword::Workdir => "workdir",
      Keyword::Onbuild => "onbuild"
    }
  }
}

impl FromStr for Keyword {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();

    Keyword::ALL
      .iter()
      .find(|k| k.as_str() == lower)
      .copied()
      .ok_or_else(|| Error::GenericParseError {
        message: format!("unknown instruction {:?}", s)
      })
  }
}

impl fmt::Display for Keyword {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str().to_ascii_uppercase())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keyword_case_insensitive() {
    assert_eq!("fRoM".parse::<Keyword>().unwrap(), Keyword::From);
    assert_eq!("ENTRYPOINT".parse::<Keyword>().unwrap(), Keyword::Entrypoint);
    assert_eq!("onbuild".parse::<Keyword>().unwrap(), Keyword::Onbuild);
  }

  #[test]
  fn keyword_unknown() {
    assert!("label".parse::<Keyword>().is_err());
    assert!("runner".parse::<Keyword>().is_err());
  }

  #[test]
  fn keyword_display() {
    assert_eq!(Keyword::Workdir.to_string(), "WORKDIR");
    assert_eq!(Keyword::Workdir.as_str(), "workdir");
  }
}
