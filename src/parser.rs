// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use pest;

/// The internal Pest parser.
///
/// The grammar only splits a Dockerfile into logical lines (joining escaped
/// line breaks and dropping comments) and tags each line as either a
/// recognized `instruction` or some other `misc` instruction.
#[derive(Parser)]
#[grammar = "dockerfile.pest"]
pub(crate) struct DockerfileParser;

/// A Pest Pair for Dockerfile rules.
pub(crate) type Pair<'a> = pest::iterators::Pair<'a, Rule>;
