//! # Tally Subcommand
//!
//! Prints the complete aggregate for a poll straight from the ledger. Unlike
//! the HTTP service, results are not withheld from callers who have not
//! voted.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use lokapal_core::{compute_results, PollId};
use lokapal_polls::{FileLedger, PollCatalog};

/// Arguments for `lokapal tally`.
#[derive(Args, Debug)]
pub struct TallyArgs {
    /// Poll identifier, `poll_<bookId>_<chapterId>`.
    pub poll_id: String,

    /// Poll definition root.
    #[arg(long, default_value = crate::DEFAULT_CONTENT_DIR)]
    pub content_dir: PathBuf,

    /// File ledger root.
    #[arg(long, default_value = crate::DEFAULT_VOTES_DIR)]
    pub votes_dir: PathBuf,

    /// Emit the aggregate as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Per-call storage timeout in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

/// Load the poll and its ledger, then write the aggregate to `out`.
pub async fn run_tally(args: &TallyArgs, out: &mut impl Write) -> Result<u8> {
    let poll_id = PollId::parse(&args.poll_id)
        .map_err(|e| anyhow!("invalid poll id {:?}: {e}", args.poll_id))?;
    let timeout = crate::io_timeout(args.timeout_ms);

    let catalog = PollCatalog::new(&args.content_dir, timeout);
    let poll = catalog
        .poll_by_id(&poll_id)
        .await
        .with_context(|| format!("cannot load definition for {poll_id}"))?
        .ok_or_else(|| anyhow!("no poll definition for {poll_id} under {}", args.content_dir.display()))?;

    let ledger = FileLedger::new(&args.votes_dir, timeout);
    let votes = ledger
        .list_votes(&poll_id)
        .await
        .with_context(|| format!("cannot read vote ledger for {poll_id}"))?;

    let results = compute_results(&votes, &poll.options);
    let uncounted = votes.len() as u64 - results.total_votes;
    if uncounted > 0 {
        tracing::warn!(%poll_id, uncounted, "ledger holds votes for options the poll no longer offers");
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &results)?;
        writeln!(out)?;
        return Ok(0);
    }

    let question = poll.question.get("en").unwrap_or_default();
    writeln!(out, "{poll_id}  {question}")?;
    for tally in &results.options {
        let label = poll
            .option(tally.option_id.as_str())
            .and_then(|o| o.text.get("en"))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:<10} {:>6} {:>6.1}%  {label}",
            tally.option_id.as_str(),
            tally.count,
            tally.percentage
        )?;
    }
    writeln!(out, "  total      {:>6}", results.total_votes)?;
    if uncounted > 0 {
        writeln!(out, "  uncounted  {uncounted:>6}")?;
    }
    Ok(0)
}
