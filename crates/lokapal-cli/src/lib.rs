//! # lokapal-cli — Operator Tooling for Chapter Polls
//!
//! Provides the `lokapal` command-line interface over the same catalog and
//! ledger the HTTP service uses.
//!
//! ## Subcommands
//!
//! - `lokapal validate` — Check every poll definition under a content root.
//! - `lokapal tally` — Print the full aggregate for one poll, regardless of
//!   whether any reader has voted.
//!
//! ```bash
//! lokapal validate --content-dir contents/fmao/polls
//! lokapal tally --votes-dir data/votes poll_book-0_shard-3
//! ```
//!
//! Handlers return the process exit code; errors that prevent the command
//! from running at all surface as `anyhow::Error`.

pub mod tally;
pub mod validate;

use std::time::Duration;

/// Default poll definition root, shared with the HTTP service.
pub const DEFAULT_CONTENT_DIR: &str = "contents/fmao/polls";

/// Default file ledger root, shared with the HTTP service.
pub const DEFAULT_VOTES_DIR: &str = "data/votes";

/// Bound on each storage call made by the CLI.
pub fn io_timeout(millis: u64) -> Duration {
    Duration::from_millis(millis.max(1))
}
