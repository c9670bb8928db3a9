use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// The TLV Schema compiler: parses, resolves, and validates TLV schema
/// source files against the rule suite in spec §4.5, and prints a
/// pretty-printed AST summary for inspection (spec §6.4).
#[derive(Parser)]
#[command(
    name = "tlv-schema",
    version,
    about = "TLV Schema compiler: validate and inspect TLV schema source files",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to every subcommand.
#[derive(Args, Debug, Default)]
pub struct GlobalOpts {
    /// Increase verbosity (-v, -vv); affects `tracing` output only.
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, resolve, and validate schema files (spec §6.4 "validate").
    ///
    /// Exit code equals the number of errors found, counting both parse
    /// errors and semantic diagnostics.
    Validate(ValidateArgs),

    /// Print a pretty-printed AST summary of schema files (spec §6.4 "dump").
    Dump(DumpArgs),

    /// Run the embedded scenario checks from spec §8 (spec §6.4 "unittest").
    Unittest(UnittestArgs),
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Schema source files to load.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Suppress diagnostic output; only the exit code reflects the result.
    #[arg(short = 's', long = "silent")]
    pub silent: bool,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Schema source files to load and dump.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct UnittestArgs {
    /// Verbosity level for the scenario report (repeat for more detail).
    #[arg(short = 'v', long = "verbosity", default_value_t = 0)]
    pub verbosity: u8,

    /// Scenario names to run; runs every scenario when omitted.
    pub names: Vec<String>,
}
