mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let result: Result<i32, CliError> = match &cli.command {
        Commands::Validate(args) => commands::validate::run(args).map(|count| count as i32),
        Commands::Dump(args) => commands::dump::run(args).map(|summary| {
            print!("{summary}");
            0
        }),
        Commands::Unittest(args) => commands::unittest::run(args),
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}

/// `-v` bumps the default filter from warnings-only up through full debug
/// tracing; `RUST_LOG` always wins when set.
fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
