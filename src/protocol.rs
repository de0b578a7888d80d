// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

//! The stdin/stdout JSON envelope shared by every toolchain command.
//!
//! Each command reads a single JSON value and writes a single pretty-printed
//! JSON document terminated by a newline.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

use crate::error::*;

/// Reads all of `reader` and decodes the first JSON value in it.
///
/// Returns `Ok(None)` if the input holds no JSON value at all (empty or
/// whitespace-only). Anything after the first value is ignored.
pub fn decode_input<T, R>(mut reader: R) -> Result<Option<T>>
where
  T: DeserializeOwned,
  R: Read
{
  let mut buf = Vec::new();
  reader.read_to_end(&mut buf).context(ReadError)?;
  drop(reader);

  serde_json::Deserializer::from_slice(&buf)
    .into_iter::<T>()
    .next()
    .transpose()
    .context(DecodeInput)
}

/// Like `decode_input()`, but empty input is an error.
pub fn decode_required<T, R>(reader: R) -> Result<T>
where
  T: DeserializeOwned,
  R: Read
{
  decode_input(reader)?.ok_or(Error::EmptyInput)
}

/// Serializes `value` as JSON indented with two spaces.
///
/// `<`, `>`, `&`, U+2028, and U+2029 are escaped the way the host's own JSON
/// encoder escapes them so output is byte-for-byte what it expects. These
/// characters can only occur inside JSON strings, so replacing them in the
/// serialized text is safe.
pub fn to_json_string<T>(value: &T) -> Result<String>
where
  T: Serialize + ?Sized
{
  let json = serde_json::to_string_pretty(value).context(EncodeOutput)?;

  let mut escaped = String::with_capacity(json.len());
  for c in json.chars() {
    match c {
      '<' => escaped.push_str("\\u003c"),
      '>' => escaped.push_str("\\u003e"),
      '&' => escaped.push_str("\\u0026"),
      '\u{2028}' => escaped.push_str("\\u2028"),
      '\u{2029}' => escaped.push_str("\\u2029"),
      c => escaped.push(c)
    }
  }

  Ok(escaped)
}

/// Writes `value` to `writer` as a pretty-printed JSON document followed by a
/// single newline.
pub fn encode_output<T, W>(value: &T, mut writer: W) -> Result<()>
where
  T: Serialize + ?Sized,
  W: Write
{
  let json = to_json_string(value)?;

  writer.write_all(json.as_bytes()).context(WriteOutput)?;
  writer.write_all(b"\n").context(WriteOutput)?;
  writer.flush().context(WriteOutput)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{json, Value};

  #[test]
  fn decode_empty() -> Result<()> {
    assert_eq!(decode_input::<Value, _>(&b""[..])?, None);
    assert_eq!(decode_input::<Value, _>(&b"  \n"[..])?, None);
    assert!(matches!(
      decode_required::<Value, _>(&b""[..]),
      Err(Error::EmptyInput)
    ));

    Ok(())
  }

  #[test]
  fn decode_first_value() -> Result<()> {
    assert_eq!(decode_input::<Value, _>(&b"{} trailing"[..])?, Some(json!({})));
    assert_eq!(decode_input::<Value, _>(&b"42"[..])?, Some(json!(42)));

    Ok(())
  }

  #[test]
  fn decode_malformed() {
    assert!(matches!(
      decode_input::<Value, _>(&b"{\"a\":"[..]),
      Err(Error::DecodeInput { .. })
    ));
  }

  #[test]
  fn encode_pretty_with_newline() -> Result<()> {
    let mut out = Vec::new();
    encode_output(&json!({ "A": [1] }), &mut out)?;

    assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"A\": [\n    1\n  ]\n}\n");

    Ok(())
  }

  #[test]
  fn encode_empty_list() -> Result<()> {
    let mut out = Vec::new();
    encode_output::<[u8], _>(&[], &mut out)?;

    assert_eq!(String::from_utf8(out).unwrap(), "[]\n");

    Ok(())
  }

  #[test]
  fn encode_escapes_html() -> Result<()> {
    assert_eq!(
      to_json_string(&json!("a && b > c < d"))?,
      "\"a \\u0026\\u0026 b \\u003e c \\u003c d\""
    );

    Ok(())
  }
}
