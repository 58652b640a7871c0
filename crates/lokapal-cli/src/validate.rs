//! # Validate Subcommand
//!
//! Walks every `<book>/<chapter>.json` under the content root and reports
//! each definition as ok or corrupt. Exits 1 when anything is corrupt, so
//! the command can gate a content deploy.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lokapal_polls::PollCatalog;

/// Arguments for `lokapal validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Poll definition root.
    #[arg(long, default_value = crate::DEFAULT_CONTENT_DIR)]
    pub content_dir: PathBuf,

    /// Per-call storage timeout in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

/// Run the validation, writing one line per definition to `out`.
pub async fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> Result<u8> {
    let catalog = PollCatalog::new(&args.content_dir, crate::io_timeout(args.timeout_ms));
    let entries = catalog
        .scan()
        .await
        .with_context(|| format!("cannot read content root {}", args.content_dir.display()))?;

    let mut corrupt = 0usize;
    for entry in &entries {
        match &entry.result {
            Ok(poll) => {
                writeln!(
                    out,
                    "ok       {}  {} options, {}{}",
                    poll.id,
                    poll.options.len(),
                    if poll.active { "active" } else { "closed" },
                    if poll.requires_token { ", token-gated" } else { "" },
                )?;
            }
            Err(err) => {
                corrupt += 1;
                tracing::debug!(path = %entry.path.display(), "definition rejected: {err}");
                writeln!(out, "corrupt  {}  {err}", entry.path.display())?;
            }
        }
    }

    writeln!(out, "{} definitions, {corrupt} corrupt", entries.len())?;
    Ok(if corrupt == 0 { 0 } else { 1 })
}
