//! # lokapal-polls — Poll Catalog and Vote Ledger
//!
//! Storage for the chapter poll subsystem:
//!
//! - [`PollCatalog`] resolves `(bookId, chapterId)` or a [`PollId`] to the
//!   poll definition stored at `<content_root>/<bookId>/<chapterId>.json`.
//!   A missing definition is `Ok(None)`; a malformed one is
//!   [`CatalogError::Corrupt`].
//! - [`FileLedger`] keeps one JSON array of votes per poll under
//!   `<votes_root>/<pollId>.json` and enforces at most one vote per wallet.
//!
//! ## Concurrency
//!
//! `FileLedger` serializes writers per poll with an async mutex held across
//! the whole read → check → append → write sequence. Ledgers are replaced by
//! write-to-temp then rename, so readers never take the lock and never see a
//! half-written file. The lock is in-process: one server process owns a
//! votes directory.
//!
//! Every filesystem call is bounded by the configured I/O timeout.
//!
//! [`PollId`]: lokapal_core::PollId

pub mod catalog;
pub mod error;
pub mod ledger;

pub use catalog::{CatalogEntry, PollCatalog};
pub use error::{CatalogError, LedgerError};
pub use ledger::{FileLedger, Recorded};
