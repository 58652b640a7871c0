//! # Poll Catalog
//!
//! Read-only resolution of poll definitions from the content tree:
//!
//! ```text
//! <content_root>/
//!   book-0/
//!     shard-1.json
//!     shard-3.json
//!   book-1/
//!     shard-1.json
//! ```
//!
//! Lookups never mutate anything, so two reads with no edit in between return
//! identical polls.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lokapal_core::{BookId, ChapterId, Poll, PollId};

use crate::error::CatalogError;

const DEFINITION_EXT: &str = "json";

/// File-backed poll definition lookup.
#[derive(Debug, Clone)]
pub struct PollCatalog {
    root: PathBuf,
    io_timeout: Duration,
}

/// One definition found by [`PollCatalog::scan`].
#[derive(Debug)]
pub struct CatalogEntry {
    /// Location of the definition file.
    pub path: PathBuf,
    /// The poll the location addresses, when the names are valid.
    pub poll_id: Option<PollId>,
    /// The loaded definition or why it could not be loaded.
    pub result: Result<Poll, CatalogError>,
}

impl PollCatalog {
    /// Create a catalog rooted at `root`. Every read is bounded by `io_timeout`.
    pub fn new(root: impl Into<PathBuf>, io_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            io_timeout,
        }
    }

    /// The content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the definition for a chapter lives.
    pub fn definition_path(&self, book: &BookId, chapter: &ChapterId) -> PathBuf {
        self.root
            .join(book.as_str())
            .join(format!("{}.{DEFINITION_EXT}", chapter.as_str()))
    }

    /// The poll for a chapter, or `None` if the chapter has no poll.
    pub async fn poll_for_chapter(
        &self,
        book: &BookId,
        chapter: &ChapterId,
    ) -> Result<Option<Poll>, CatalogError> {
        let expected = PollId::for_chapter(book.clone(), chapter.clone());
        let path = self.definition_path(book, chapter);

        let bytes = match tokio::time::timeout(self.io_timeout, tokio::fs::read(&path)).await {
            Err(_) => return Err(CatalogError::Timeout(self.io_timeout)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Ok(Err(e)) => return Err(CatalogError::Unavailable(e)),
            Ok(Ok(bytes)) => bytes,
        };

        parse_definition(&bytes, expected).map(Some)
    }

    /// The poll with this identifier, or `None` if it has no definition.
    pub async fn poll_by_id(&self, id: &PollId) -> Result<Option<Poll>, CatalogError> {
        self.poll_for_chapter(id.book(), id.chapter()).await
    }

    /// Whether the content root is a readable directory.
    pub async fn is_available(&self) -> bool {
        matches!(
            tokio::time::timeout(self.io_timeout, tokio::fs::metadata(&self.root)).await,
            Ok(Ok(meta)) if meta.is_dir()
        )
    }

    /// Load every definition under the root, in path order.
    ///
    /// Files without the `.json` extension are skipped. Files whose book or
    /// chapter name is not a content address are reported as
    /// [`CatalogError::Unaddressable`].
    pub async fn scan(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut entries = Vec::new();
        for book_dir in self.sorted_children(&self.root).await? {
            if !tokio::fs::metadata(&book_dir).await?.is_dir() {
                continue;
            }
            for file in self.sorted_children(&book_dir).await? {
                if file.extension().and_then(|e| e.to_str()) != Some(DEFINITION_EXT) {
                    continue;
                }
                entries.push(self.load_entry(&book_dir, file).await);
            }
        }
        Ok(entries)
    }

    async fn load_entry(&self, book_dir: &Path, path: PathBuf) -> CatalogEntry {
        let book = file_name(book_dir).and_then(|s| BookId::new(s).ok());
        let chapter = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| ChapterId::new(s).ok());

        let (Some(book), Some(chapter)) = (book, chapter) else {
            let result = Err(CatalogError::Unaddressable(path.display().to_string()));
            return CatalogEntry {
                path,
                poll_id: None,
                result,
            };
        };

        let poll_id = PollId::for_chapter(book.clone(), chapter.clone());
        let result = self
            .poll_for_chapter(&book, &chapter)
            .await
            .and_then(|found| {
                found.ok_or_else(|| {
                    CatalogError::Unavailable(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "definition disappeared during scan",
                    ))
                })
            });

        CatalogEntry {
            path,
            poll_id: Some(poll_id),
            result,
        }
    }

    async fn sorted_children(&self, dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
        let listing = async {
            let mut read = tokio::fs::read_dir(dir).await?;
            let mut out = Vec::new();
            while let Some(entry) = read.next_entry().await? {
                out.push(entry.path());
            }
            out.sort();
            Ok::<_, std::io::Error>(out)
        };
        tokio::time::timeout(self.io_timeout, listing)
            .await
            .map_err(|_| CatalogError::Timeout(self.io_timeout))?
            .map_err(CatalogError::from)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

/// Parse and validate a definition that was found at `expected`'s location.
fn parse_definition(bytes: &[u8], expected: PollId) -> Result<Poll, CatalogError> {
    let corrupt = |reason: String| CatalogError::Corrupt {
        poll_id: expected.clone(),
        reason,
    };

    let poll: Poll = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
    if poll.id != expected {
        return Err(corrupt(format!(
            "definition declares {} but is stored at {expected}",
            poll.id
        )));
    }
    poll.validate().map_err(|e| corrupt(e.to_string()))?;
    Ok(poll)
}
