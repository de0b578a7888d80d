// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::ops::Range;

use crate::parser::Pair;

/// A byte-index tuple representing a span of characters in a string
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
  pub start: usize,
  pub end: usize
}

impl Span {
  pub fn new(start: usize, end: usize) -> Span {
    Span { start, end }
  }

  pub(crate) fn from_pair(record: &Pair) -> Span {
    let pest_span = record.as_span();

    Span {
      start: pest_span.start(),
      end: pest_span.end()
    }
  }

  /// The number of bytes covered by this span.
  pub fn len(&self) -> usize {
    self.end.saturating_sub(self.start)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn as_range(&self) -> Range<usize> {
    self.start..self.end
  }
}

impl From<Range<usize>> for Span {
  fn from(range: Range<usize>) -> Self {
    Span::new(range.start, range.end)
  }
}
