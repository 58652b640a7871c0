//! # Poll Definitions
//!
//! A [`Poll`] is a reader-facing question attached to one chapter. Polls are
//! authored as static JSON next to the chapter content and are read-only to
//! this system.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "id": "poll_book-0_shard-3",
//!   "bookId": "book-0",
//!   "chapterId": "shard-3",
//!   "active": true,
//!   "requiresBookToken": false,
//!   "pollType": "conflict",
//!   "question": { "en": "…", "es": "…" },
//!   "options": [ { "id": "opt-a", "text": { "en": "…", "es": "…" } } ]
//! }
//! ```
//!
//! `requiresToken` and `category` are accepted as input aliases of
//! `requiresBookToken` and `pollType`.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{BookId, ChapterId, OptionId, PollId};

/// Locales every question and option text must provide.
pub const REQUIRED_LOCALES: [&str; 2] = ["en", "es"];

/// Informational poll category. Not used in any decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PollCategory {
    /// A choice between opposing sides of a story conflict.
    Conflict,
    /// An open philosophical question raised by the chapter.
    Philosophical,
    /// Which guardian the reader identifies with.
    GuardianAffinity,
    /// A question about the setting.
    Worldbuilding,
}

impl PollCategory {
    /// Return the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Philosophical => "philosophical",
            Self::GuardianAffinity => "guardian-affinity",
            Self::Worldbuilding => "worldbuilding",
        }
    }
}

impl std::fmt::Display for PollCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text keyed by locale tag (`en`, `es`, …).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Build from `(locale, text)` pairs.
    pub fn from_pairs<I, L, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        )
    }

    /// Text for a locale, if present.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    fn require_locales(&self, field: &str) -> Result<(), ValidationError> {
        for locale in REQUIRED_LOCALES {
            match self.get(locale) {
                Some(text) if !text.trim().is_empty() => {}
                _ => {
                    return Err(ValidationError::MissingLocale {
                        field: field.to_string(),
                        locale: locale.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// One answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    /// Identifier, unique within the poll.
    pub id: OptionId,
    /// Option label per locale.
    pub text: LocalizedText,
}

/// A poll definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    /// Derived from `book_id` and `chapter_id`.
    pub id: PollId,
    /// Owning book.
    pub book_id: BookId,
    /// Owning chapter.
    pub chapter_id: ChapterId,
    /// Inactive polls reject new votes but still serve results.
    pub active: bool,
    /// Voting requires owning the book token for `book_id`.
    #[serde(rename = "requiresBookToken", alias = "requiresToken", default)]
    pub requires_token: bool,
    /// Informational category.
    #[serde(rename = "pollType", alias = "category")]
    pub category: PollCategory,
    /// The question per locale.
    pub question: LocalizedText,
    /// Answer options in display order.
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Check the definition's internal consistency.
    ///
    /// - `id` equals the identifier derived from `book_id` and `chapter_id`;
    /// - question and every option text carry the [`REQUIRED_LOCALES`];
    /// - at least one option exists and option IDs are unique.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a [`ValidationError`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        let derived = PollId::for_chapter(self.book_id.clone(), self.chapter_id.clone());
        if self.id != derived {
            return Err(ValidationError::IdentityMismatch {
                expected: derived.to_string(),
                found: self.id.to_string(),
            });
        }

        self.question.require_locales("question")?;

        if self.options.is_empty() {
            return Err(ValidationError::NoOptions);
        }
        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            if !seen.insert(&option.id) {
                return Err(ValidationError::DuplicateOption(option.id.to_string()));
            }
            option
                .text
                .require_locales(&format!("options[{}].text", option.id))?;
        }
        Ok(())
    }

    /// Look up an option by identifier.
    pub fn option(&self, id: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id.as_str() == id)
    }
}
