//! # Identity Newtypes
//!
//! Identifiers for content, polls, options and voters. Each identifier is a
//! distinct type and validates its format at construction time. All of them
//! serialize as plain strings and re-validate on deserialization, so a value
//! read from disk or from a request body is as trustworthy as one built in code.
//!
//! ## Formats
//!
//! - [`BookId`], [`ChapterId`]: 1-64 ASCII letters, digits or hyphens
//!   (e.g. `book-0`, `shard-3`). Underscores are excluded so that
//!   [`PollId`] can use them as separators.
//! - [`PollId`]: `poll_<bookId>_<chapterId>`.
//! - [`OptionId`]: 1-64 characters, no surrounding whitespace.
//! - [`WalletAddress`]: `0x` + 40 hex digits, stored lowercase.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MAX_ID_LEN: usize = 64;
const POLL_ID_PREFIX: &str = "poll_";

fn is_content_slug(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_ID_LEN
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// ---------------------------------------------------------------------------
// Content identifiers
// ---------------------------------------------------------------------------

/// Identifier of a book in the content tree (e.g. `book-0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookId(String);

impl BookId {
    /// Create a book identifier, validating the content-slug format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidContentId`] for empty, overlong, or
    /// non-slug input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_content_slug(&s) {
            return Err(ValidationError::InvalidContentId(s));
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The on-chain token id for this book: the decimal suffix after an
    /// optional `book` / `book-` prefix. `book-0` → 0, `book3` → 3, `7` → 7.
    ///
    /// Returns `None` when the identifier carries no decimal number.
    pub fn token_id(&self) -> Option<u64> {
        let rest = self.0.strip_prefix("book").unwrap_or(&self.0);
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok()
    }
}

/// Identifier of a chapter within a book (e.g. `shard-3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChapterId(String);

impl ChapterId {
    /// Create a chapter identifier, validating the content-slug format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidContentId`] for empty, overlong, or
    /// non-slug input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_content_slug(&s) {
            return Err(ValidationError::InvalidContentId(s));
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Poll identifier (typed composite key)
// ---------------------------------------------------------------------------

/// Identifier of the poll attached to one chapter.
///
/// Wire format `poll_<bookId>_<chapterId>`. The string form is derived from
/// the pair and parsed back exactly once, so the mapping is a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PollId {
    book: BookId,
    chapter: ChapterId,
}

impl PollId {
    /// Derive the poll identifier for a chapter.
    pub fn for_chapter(book: BookId, chapter: ChapterId) -> Self {
        Self { book, chapter }
    }

    /// Parse the `poll_<bookId>_<chapterId>` wire format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPollId`] when the prefix is missing,
    /// the separator count is wrong, or either half is not a content slug.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPollId(s.to_string());
        let rest = s.strip_prefix(POLL_ID_PREFIX).ok_or_else(invalid)?;
        let (book, chapter) = rest.split_once('_').ok_or_else(invalid)?;
        Ok(Self {
            book: BookId::new(book).map_err(|_| invalid())?,
            chapter: ChapterId::new(chapter).map_err(|_| invalid())?,
        })
    }

    /// The owning book.
    pub fn book(&self) -> &BookId {
        &self.book
    }

    /// The owning chapter.
    pub fn chapter(&self) -> &ChapterId {
        &self.chapter
    }
}

impl FromStr for PollId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{POLL_ID_PREFIX}{}_{}", self.book, self.chapter)
    }
}

impl TryFrom<String> for PollId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PollId> for String {
    fn from(id: PollId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Option identifier
// ---------------------------------------------------------------------------

/// Identifier of one answer option within a poll (e.g. `opt-a`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionId(String);

impl OptionId {
    /// Create an option identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidOptionId`] if the value is empty,
    /// longer than 64 characters, or has surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.len() > MAX_ID_LEN || s.trim() != s {
            return Err(ValidationError::InvalidOptionId(s));
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for OptionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Wallet address
// ---------------------------------------------------------------------------

/// An EVM wallet address, the sole voter identity.
///
/// Normalized to lowercase at construction, so equality is case-insensitive
/// with respect to the input. Only the syntax is checked; control of the
/// wallet is not proven.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and normalize a wallet address.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidWalletAddress`] unless the input is
    /// `0x` (or `0X`) followed by exactly 40 hex digits. Surrounding
    /// whitespace is not stripped.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let lower = raw.to_ascii_lowercase();
        let valid = lower
            .strip_prefix("0x")
            .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(ValidationError::InvalidWalletAddress(raw));
        }
        Ok(Self(lower))
    }

    /// Access the lowercase address string, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }
}

// Shared string plumbing for the plain newtypes.
macro_rules! string_newtype_impls {
    ($($ty:ident),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    )*};
}

string_newtype_impls!(BookId, ChapterId, OptionId, WalletAddress);
