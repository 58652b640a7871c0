#![deny(missing_docs)]

//! # lokapal-core — Foundational Types for Lokapal Chapter Polls
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies — only `serde`, `serde_json`, `thiserror`, and `chrono`
//! from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A [`BookId`] cannot be passed where
//!    a [`ChapterId`] is expected, and a [`WalletAddress`] is always lowercase.
//!
//! 2. **[`PollId`] is a typed composite key.** The `poll_<book>_<chapter>` wire
//!    format is parsed once at the boundary; callers never re-parse strings.
//!
//! 3. **Aggregation is pure.** [`compute_results`] takes votes and options and
//!    returns counts and one-decimal percentages with no I/O.
//!
//! 4. **[`ValidationError`] hierarchy.** Structured errors with `thiserror` — no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod poll;
pub mod tally;
pub mod vote;

pub use error::ValidationError;
pub use identity::{BookId, ChapterId, OptionId, PollId, WalletAddress};
pub use poll::{LocalizedText, Poll, PollCategory, PollOption, REQUIRED_LOCALES};
pub use tally::{compute_results, find_vote, percentage, OptionTally, PollResults};
pub use vote::Vote;
