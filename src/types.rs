use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Mode constants
// ---------------------------------------------------------------------------

pub const MODE_BLOB: u32 = 0o100644;
pub const MODE_BLOB_EXEC: u32 = 0o100755;
pub const MODE_LINK: u32 = 0o120000;
pub const MODE_TREE: u32 = 0o040000;
pub const MODE_COMMIT: u32 = 0o160000;

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// The kind of a git tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Blob,
    Executable,
    Link,
    Tree,
    Submodule,
}

impl EntryKind {
    /// Convert a raw git mode to an `EntryKind`.
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode {
            MODE_BLOB => Some(Self::Blob),
            MODE_BLOB_EXEC => Some(Self::Executable),
            MODE_LINK => Some(Self::Link),
            MODE_TREE => Some(Self::Tree),
            MODE_COMMIT => Some(Self::Submodule),
            _ => None,
        }
    }

    /// Convert to a raw git mode.
    pub fn to_mode(self) -> u32 {
        match self {
            Self::Blob => MODE_BLOB,
            Self::Executable => MODE_BLOB_EXEC,
            Self::Link => MODE_LINK,
            Self::Tree => MODE_TREE,
            Self::Submodule => MODE_COMMIT,
        }
    }

    /// Whether this kind holds readable blob content (blob or executable).
    pub fn is_file(self) -> bool {
        matches!(self, Self::Blob | Self::Executable)
    }

    /// Whether this kind represents a directory.
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Tree)
    }
}

// ---------------------------------------------------------------------------
// RefKind
// ---------------------------------------------------------------------------

/// Which rung of the resolution ladder matched a revision spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// Empty spec or `HEAD`: the checked-out revision.
    Head,
    Branch,
    Tag,
    /// A full 40-hex commit identifier.
    CommitId,
    /// An unambiguous commit-identifier prefix.
    AbbreviatedId,
}

// ---------------------------------------------------------------------------
// TreeEntry
// ---------------------------------------------------------------------------

/// An entry yielded when listing a tree.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub name: String,
    pub oid: gix::ObjectId,
    pub mode: u32,
}

impl TreeEntry {
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::from_mode(self.mode)
    }
}

// ---------------------------------------------------------------------------
// CommitRecord / RefRecord
// ---------------------------------------------------------------------------

/// One row of commit history, read once from the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: gix::ObjectId,
    pub parent_ids: Vec<gix::ObjectId>,
    pub author_name: String,
    pub author_email: String,
    /// Author timestamp, seconds since the Unix epoch.
    pub author_time: i64,
    pub committer_name: String,
    pub committer_email: String,
    /// Committer timestamp, seconds since the Unix epoch.
    pub commit_time: i64,
    pub message: String,
    pub tree_id: gix::ObjectId,
}

/// A branch or tag row: short name plus the commit it points at.
///
/// Annotated tags are peeled, so `target` is always a commit id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRecord {
    pub name: String,
    pub target: gix::ObjectId,
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag, checked at row-yield and hunk-emission
/// boundaries. Cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Return [`Error::Cancelled`](crate::Error::Cancelled) if cancellation
    /// was requested.
    pub fn check(&self) -> crate::error::Result<()> {
        if self.is_cancelled() {
            Err(crate::error::Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
