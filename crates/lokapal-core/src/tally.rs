//! # Result Aggregation
//!
//! Turns a poll's vote ledger into per-option counts and percentages.
//!
//! Each percentage is rounded to one decimal place on its own:
//! `round(count / total * 1000) / 10`. The rounded values are not adjusted to
//! sum to exactly 100.0, so three equal options read 33.3 each.
//!
//! Votes naming an option the poll no longer defines are skipped, and `total`
//! counts only the votes that were attributed to an option.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::{OptionId, WalletAddress};
use crate::poll::PollOption;
use crate::vote::Vote;

/// Count and share for one option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    /// The option.
    pub option_id: OptionId,
    /// Votes for the option.
    pub count: u64,
    /// Share of `total_votes`, one decimal place.
    pub percentage: f64,
}

/// Aggregate result for a poll, options in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    /// One entry per defined option.
    pub options: Vec<OptionTally>,
    /// Votes attributed to a defined option.
    pub total_votes: u64,
}

/// Percentage of `count` in `total`, rounded to one decimal. Zero when
/// `total` is zero.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Aggregate `votes` over `options`.
pub fn compute_results(votes: &[Vote], options: &[PollOption]) -> PollResults {
    let mut counts: HashMap<&OptionId, u64> =
        options.iter().map(|o| (&o.id, 0)).collect();

    let mut total = 0u64;
    for vote in votes {
        if let Some(count) = counts.get_mut(&vote.option_id) {
            *count += 1;
            total += 1;
        }
    }

    let options = options
        .iter()
        .map(|o| {
            let count = counts.get(&o.id).copied().unwrap_or(0);
            OptionTally {
                option_id: o.id.clone(),
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();

    PollResults {
        options,
        total_votes: total,
    }
}

/// The vote cast by `wallet`, if any.
pub fn find_vote<'a>(votes: &'a [Vote], wallet: &WalletAddress) -> Option<&'a Vote> {
    votes.iter().find(|v| &v.wallet_address == wallet)
}
