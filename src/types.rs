//! Core types for music-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque identifier (source URL) for one downloadable item
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemHandle(pub String);

impl ItemHandle {
    /// Create a new ItemHandle
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the inner URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemHandle {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for ItemHandle {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl PartialEq<&str> for ItemHandle {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ItemHandle> for &str {
    fn eq(&self, other: &ItemHandle) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for ItemHandle {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ItemHandle {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ItemHandle {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let url = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(url))
    }
}

/// Descriptive metadata for one item
///
/// Produced by a tag source, consumed read-only by the post-processor and the
/// catalog writer. Values are written to the output container verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Track title
    pub title: Option<String>,

    /// Track artist
    pub artist: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Track number within the album (1-based; None for singles)
    pub track_num: Option<u32>,

    /// Release year, passed through as supplied (e.g. "2019")
    pub release_year: Option<String>,
}

/// One item moving through the download pipeline
///
/// Owned exclusively by the task executing it; dropped when the pipeline for
/// the item terminates.
#[derive(Clone, Debug)]
pub struct DownloadJob {
    /// Source identifier for the item
    pub item: ItemHandle,

    /// Destination path for the converted output file
    pub destination: PathBuf,

    /// Tags to embed in the output file and record in the catalog
    pub tags: TagRecord,
}

impl DownloadJob {
    /// Create a new DownloadJob
    pub fn new(item: ItemHandle, destination: PathBuf, tags: TagRecord) -> Self {
        Self {
            item,
            destination,
            tags,
        }
    }
}

/// Terminal result of one job's pipeline
#[derive(Debug)]
pub struct JobOutcome {
    /// The item this outcome belongs to
    pub item: ItemHandle,

    /// The converted output path on success, or the error that ended the job
    pub result: crate::Result<PathBuf>,
}

impl JobOutcome {
    /// Whether the job's pipeline completed successfully.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Event emitted during batch and job lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch of jobs was accepted and its catalog pass is starting
    BatchStarted {
        /// Number of jobs in the batch
        total: usize,
        /// Whether pipelines will overlap
        concurrent: bool,
    },

    /// An item's tags were written to the catalog
    CatalogRecorded {
        /// Source identifier for the item
        url: ItemHandle,
    },

    /// A job's pipeline started downloading
    JobStarted {
        /// Source identifier for the item
        url: ItemHandle,
    },

    /// A job's pipeline finished successfully
    JobCompleted {
        /// Source identifier for the item
        url: ItemHandle,
        /// Final converted output path
        path: PathBuf,
    },

    /// A job's pipeline ended in failure
    JobFailed {
        /// Source identifier for the item
        url: ItemHandle,
        /// Error message
        error: String,
    },

    /// All jobs in a batch reached a terminal state
    BatchCompleted {
        /// Number of jobs that succeeded
        succeeded: usize,
        /// Number of jobs that failed
        failed: usize,
    },
}
