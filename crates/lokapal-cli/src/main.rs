//! # lokapal CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers on a
//! current-thread Tokio runtime.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lokapal_cli::tally::{run_tally, TallyArgs};
use lokapal_cli::validate::{run_validate, ValidateArgs};

/// Lokapal chapter poll tooling.
///
/// Validates poll definitions and tallies vote ledgers without going
/// through the HTTP service.
#[derive(Parser, Debug)]
#[command(name = "lokapal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check every poll definition under a content root.
    Validate(ValidateArgs),

    /// Print the full vote aggregate for one poll.
    Tally(TallyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("cannot start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let mut stdout = std::io::stdout().lock();
    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &mut stdout).await,
            Commands::Tally(args) => run_tally(args, &mut stdout).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_validate_with_default_root() {
        let cli = Cli::try_parse_from(["lokapal", "validate"]).unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.content_dir, std::path::PathBuf::from(lokapal_cli::DEFAULT_CONTENT_DIR));
        assert_eq!(args.timeout_ms, 5000);
    }

    #[test]
    fn parse_tally_with_flags() {
        let cli = Cli::try_parse_from([
            "lokapal",
            "-vv",
            "tally",
            "--votes-dir",
            "/srv/votes",
            "--json",
            "poll_book-0_shard-3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Tally(args) = cli.command else {
            panic!("expected tally");
        };
        assert_eq!(args.poll_id, "poll_book-0_shard-3");
        assert_eq!(args.votes_dir, std::path::PathBuf::from("/srv/votes"));
        assert!(args.json);
    }

    #[test]
    fn tally_requires_poll_id() {
        assert!(Cli::try_parse_from(["lokapal", "tally"]).is_err());
    }
}
