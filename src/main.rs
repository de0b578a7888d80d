// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

use std::io::{self, IsTerminal};
use std::path::Path;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use srclib_dockerfile::depresolve::resolve_dependencies;
use srclib_dockerfile::graph::graph;
use srclib_dockerfile::protocol::{decode_input, decode_required, encode_output};
use srclib_dockerfile::scan::{scan, ScanOptions};
use srclib_dockerfile::unit::SourceUnit;
use srclib_dockerfile::Result;

const LONG_ABOUT: &str = "srclib-dockerfile is a srclib toolchain that scans and analyzes Dockerfiles in a repository or tree.\n\nEach command reads one JSON document on stdin and writes one JSON document on stdout.";

#[derive(Debug, Parser)]
#[command(
  name = "srclib-dockerfile",
  version,
  about = "Scan and analyze Dockerfiles",
  long_about = LONG_ABOUT
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Show verbose output
  #[arg(short = 'v', long = "verbose", global = true)]
  verbose: bool
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Scan the directory tree rooted at the current directory for Dockerfiles
  Scan(ScanArgs),

  /// Resolve a Dockerfile's FROM dependencies to their repository clone URLs
  Depresolve,

  /// Graph a Dockerfile
  Graph
}

#[derive(Debug, Args)]
struct ScanArgs {
  /// Repository URI
  #[arg(long, value_name = "URI")]
  repo: Option<String>,

  /// Subdirectory in repository
  #[arg(long, value_name = "DIR")]
  subdir: Option<String>
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_ansi(io::stderr().is_terminal())
    .with_target(false)
    .without_time()
    .init();
}

fn execute(command: Command) -> Result<()> {
  let root = Path::new(".");

  match command {
    Command::Scan(args) => {
      // the config isn't used yet, but it's decoded anyway so malformed JSON
      // is rejected rather than silently accepted
      let _config: Option<Value> = decode_input(io::stdin())?;

      let options = ScanOptions { repo: args.repo, subdir: args.subdir };
      let units = scan(root, &options)?;
      encode_output(&units, io::stdout().lock())
    },
    Command::Depresolve => {
      let unit: SourceUnit = decode_required(io::stdin())?;
      let resolutions = resolve_dependencies(&unit)?;
      encode_output(&resolutions, io::stdout().lock())
    },
    Command::Graph => {
      let unit: SourceUnit = decode_required(io::stdin())?;
      let output = graph(root, &unit)?;
      encode_output(&output, io::stdout().lock())
    }
  }
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  if let Err(err) = execute(cli.command) {
    eprintln!("{}", err);
    std::process::exit(1);
  }
}
