//! A git-aware virtual filesystem and diff engine.
//!
//! `revfs` resolves `git://repo/path@revision` locations against local
//! repositories, reads blobs straight out of the object database (no
//! checkout), transparently materializes large-object pointers from a
//! sharded payload store, and diffs any pair of versioned or plain-file
//! endpoints as line-oriented hunks.
//!
//! # Key pieces
//!
//! - [`VirtualPath`] — a parsed `git://` location: repository root,
//!   optional revision, path inside the tree.
//! - [`Repo`] — a cheaply clonable handle to an opened repository.
//! - [`revision`] — turns a revision spec into a commit id via a fixed
//!   resolution ladder (exact id, branch, tag, abbreviated id).
//! - [`tree`] — tree walks and blob reads against a resolved commit.
//! - [`lfs`] — large-object pointer parsing and payload resolution.
//! - [`diff`] / [`endpoint`] — the diff engine and the dispatcher that
//!   pairs up endpoint kinds.
//! - [`history`] — lazy commit walks plus branch and tag listings.
//!
//! # Quick example
//!
//! ```rust,no_run
//! use revfs::{Repo, VirtualPath};
//!
//! let location = VirtualPath::parse("git://./repo/src/main.rs@v1.2.0").unwrap();
//! let repo = Repo::open(&location.repo).unwrap();
//! let resolved = revfs::revision::resolve(&repo, location.revision_or_default()).unwrap();
//! let handle = revfs::tree::lookup(&repo, resolved.commit_id, &location.path).unwrap();
//! let bytes = revfs::tree::read_bytes(&repo, &handle).unwrap();
//! assert!(!bytes.is_empty());
//! ```

pub mod diff;
pub mod endpoint;
pub mod error;
pub mod history;
pub mod lfs;
pub mod repo;
pub mod revision;
pub mod tree;
pub mod types;
pub mod uri;

// Re-export primary public types at crate root.
pub use diff::{BinaryDelta, DiffOptions, DiffResult, DiffStats, Hunk, LineTag};
pub use endpoint::{ByteSource, DiffEndpoint, DiffReport, EndpointInfo, LocalSource};
pub use error::{Error, Result};
pub use history::{Commits, HistoryOptions};
pub use repo::Repo;
pub use revision::ResolvedRevision;
pub use tree::BlobHandle;
pub use types::*;
pub use uri::VirtualPath;
