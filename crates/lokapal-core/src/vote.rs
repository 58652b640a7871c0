//! # Votes
//!
//! A [`Vote`] is one wallet's immutable choice on a poll. Stored ledgers use
//! the same camelCase JSON shape the site has always written, with the
//! timestamp as Unix milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{OptionId, PollId, WalletAddress};

/// A single recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// The poll voted on.
    pub poll_id: PollId,
    /// The chosen option. May name an option a later poll revision removed.
    pub option_id: OptionId,
    /// The voter, lowercase.
    pub wallet_address: WalletAddress,
    /// When the vote was accepted.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Vote {
    /// Stamp a new vote with the current time.
    pub fn new(poll_id: PollId, option_id: OptionId, wallet_address: WalletAddress) -> Self {
        Self {
            poll_id,
            option_id,
            wallet_address,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_ledger_entry() {
        let json = serde_json::json!({
            "pollId": "poll_book-0_shard-3",
            "optionId": "opt-a",
            "walletAddress": "0x1111111111111111111111111111111111111111",
            "timestamp": 1_735_689_600_000_i64
        });
        let vote: Vote = serde_json::from_value(json).unwrap();
        assert_eq!(vote.poll_id.to_string(), "poll_book-0_shard-3");
        assert_eq!(vote.option_id, "opt-a");
        assert_eq!(vote.timestamp.timestamp_millis(), 1_735_689_600_000);
    }

    #[test]
    fn writes_millisecond_timestamp() {
        let vote = Vote::new(
            PollId::parse("poll_book-1_shard-1").unwrap(),
            OptionId::new("opt-b").unwrap(),
            WalletAddress::new("0x2222222222222222222222222222222222222222").unwrap(),
        );
        let value = serde_json::to_value(&vote).unwrap();
        assert_eq!(value["timestamp"], vote.timestamp.timestamp_millis());
        assert_eq!(value["walletAddress"], "0x2222222222222222222222222222222222222222");
    }
}
