//! # Error Hierarchy
//!
//! Validation errors for identifiers and poll definitions, built with
//! `thiserror`. Each variant carries the rejected input so operators can
//! find the offending file or request without guesswork.

use thiserror::Error;

/// Validation errors for domain newtypes and poll definitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Book or chapter identifier is empty, too long, or contains characters
    /// other than ASCII letters, digits and hyphens.
    #[error("invalid content identifier: \"{0}\" (expected 1-64 ASCII letters, digits or hyphens)")]
    InvalidContentId(String),

    /// Poll identifier does not follow `poll_<bookId>_<chapterId>`.
    #[error("invalid poll identifier: \"{0}\" (expected poll_<bookId>_<chapterId>)")]
    InvalidPollId(String),

    /// Option identifier is empty or longer than 64 characters.
    #[error("invalid option identifier: \"{0}\"")]
    InvalidOptionId(String),

    /// Wallet address is not `0x` followed by 40 hex digits.
    #[error("invalid wallet address: \"{0}\" (expected 0x followed by 40 hex digits)")]
    InvalidWalletAddress(String),

    /// A localized text field lacks a required locale.
    #[error("{field} is missing required locale \"{locale}\"")]
    MissingLocale {
        /// Which text field (e.g. `question`, `options[opt-a].text`).
        field: String,
        /// The missing locale tag.
        locale: String,
    },

    /// The poll defines no options.
    #[error("poll defines no options")]
    NoOptions,

    /// Two options share the same identifier.
    #[error("duplicate option identifier: \"{0}\"")]
    DuplicateOption(String),

    /// The poll's embedded identity disagrees with where it was loaded from.
    #[error("poll identity mismatch: expected {expected}, found {found}")]
    IdentityMismatch {
        /// The identity implied by the definition's location.
        expected: String,
        /// The identity written inside the definition.
        found: String,
    },
}
