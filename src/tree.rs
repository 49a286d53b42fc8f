//! Object store access: commit -> tree walk -> blob bytes.
//!
//! The walk is iterative, one path segment at a time, so traversal depth
//! never couples to call-stack depth. Blob content is returned whole; the
//! underlying store hands out objects as complete decompressed units, and
//! [`BlobReader`] wraps the buffer in a plain `std::io::Read` so callers
//! never see that.

use std::io;

use crate::error::{Error, Result};
use crate::lfs;
use crate::repo::Repo;
use crate::types::{EntryKind, TreeEntry, MODE_TREE};
use crate::uri::{is_root_path, normalize_path};

/// A content-addressed handle on one blob.
///
/// Two handles with equal `id` are guaranteed to have identical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub id: gix::ObjectId,
    pub len: u64,
    /// Whether the blob's content is a large-object pointer record rather
    /// than the payload itself.
    pub is_pointer: bool,
    /// Tree entry mode the blob was reached through.
    pub mode: u32,
}

impl BlobHandle {
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::from_mode(self.mode)
    }
}

/// Walk from `commit_id`'s root tree to the blob at `rel_path`.
///
/// Every intermediate segment must resolve to a tree and the final segment
/// to a blob (or symlink). The root path is rejected here; use
/// [`list_root`] for directory listings.
///
/// # Errors
/// * [`Error::PathNotFound`] if any segment is absent.
/// * [`Error::NotADirectory`] if an intermediate segment is not a tree.
/// * [`Error::NotAFile`] if the final segment is a tree or submodule.
pub fn lookup(repo: &Repo, commit_id: gix::ObjectId, rel_path: &str) -> Result<BlobHandle> {
    let path = normalize_path(rel_path)?;
    if path.is_empty() {
        return Err(Error::not_a_file("the tree root is not a file"));
    }

    let guard = repo.lock()?;
    let mut current = commit_tree_id(&guard, commit_id)?;

    let segments: Vec<&str> = path.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        let entry = find_entry(&guard, current, segment)?
            .ok_or_else(|| Error::path_not_found(segments[..=i].join("/")))?;

        if i < segments.len() - 1 {
            if entry.mode != MODE_TREE {
                return Err(Error::not_a_directory(segments[..=i].join("/")));
            }
            current = entry.oid;
            continue;
        }

        // Final segment.
        let kind = entry.kind();
        if matches!(kind, Some(EntryKind::Tree) | Some(EntryKind::Submodule)) {
            return Err(Error::not_a_file(path));
        }

        let obj = guard.find_object(entry.oid).map_err(Error::git)?;
        let is_pointer = lfs::looks_like_pointer(&obj.data);
        return Ok(BlobHandle {
            id: entry.oid,
            len: obj.data.len() as u64,
            is_pointer,
            mode: entry.mode,
        });
    }

    Err(Error::path_not_found(path))
}

/// Read the full content of a blob.
pub fn read_bytes(repo: &Repo, handle: &BlobHandle) -> Result<Vec<u8>> {
    let guard = repo.lock()?;
    let obj = guard.find_object(handle.id).map_err(Error::git)?;
    Ok(obj.data.to_vec())
}

/// Read a blob through a sequential [`std::io::Read`] interface.
pub fn reader(repo: &Repo, handle: &BlobHandle) -> Result<BlobReader> {
    Ok(BlobReader::new(read_bytes(repo, handle)?))
}

/// List the immediate entries of the root tree of `commit_id`.
///
/// This is the synthetic "directory listing" used by the history
/// enumerator's path filtering; diffing never goes through it.
pub fn list_root(repo: &Repo, commit_id: gix::ObjectId) -> Result<Vec<TreeEntry>> {
    list_tree(repo, commit_id, "")
}

/// List the immediate entries of the tree at `rel_path` under `commit_id`.
pub fn list_tree(repo: &Repo, commit_id: gix::ObjectId, rel_path: &str) -> Result<Vec<TreeEntry>> {
    let guard = repo.lock()?;
    let root = commit_tree_id(&guard, commit_id)?;

    let tree_oid = if is_root_path(rel_path) {
        root
    } else {
        let path = normalize_path(rel_path)?;
        let mut current = root;
        let segments: Vec<&str> = path.split('/').collect();
        for (i, segment) in segments.iter().enumerate() {
            let entry = find_entry(&guard, current, segment)?
                .ok_or_else(|| Error::path_not_found(segments[..=i].join("/")))?;
            if entry.mode != MODE_TREE {
                return Err(Error::not_a_directory(segments[..=i].join("/")));
            }
            current = entry.oid;
        }
        current
    };

    let data = guard.find_object(tree_oid).map_err(Error::git)?;
    let tree_ref = gix::objs::TreeRef::from_bytes(&data.data).map_err(Error::git)?;
    Ok(tree_ref
        .entries
        .iter()
        .map(|e| TreeEntry {
            name: String::from_utf8_lossy(e.filename).into_owned(),
            oid: e.oid.to_owned(),
            mode: e.mode.0 as u32,
        })
        .collect())
}

/// Object id of the entry at `rel_path`, or `None` when absent.
///
/// Used by the history enumerator to decide whether a commit changed a
/// path relative to its parent; never errors on missing segments.
pub fn entry_id(
    repo: &Repo,
    commit_id: gix::ObjectId,
    rel_path: &str,
) -> Result<Option<gix::ObjectId>> {
    let path = normalize_path(rel_path)?;
    let guard = repo.lock()?;
    let mut current = commit_tree_id(&guard, commit_id)?;
    if path.is_empty() {
        return Ok(Some(current));
    }

    let segments: Vec<&str> = path.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        match find_entry(&guard, current, segment)? {
            Some(entry) => {
                if i == segments.len() - 1 {
                    return Ok(Some(entry.oid));
                }
                if entry.mode != MODE_TREE {
                    return Ok(None);
                }
                current = entry.oid;
            }
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// Root tree id of a commit.
pub(crate) fn commit_tree_id(
    repo: &gix::Repository,
    commit_id: gix::ObjectId,
) -> Result<gix::ObjectId> {
    let obj = repo.find_object(commit_id).map_err(Error::git)?;
    if obj.kind != gix::object::Kind::Commit {
        return Err(Error::git_msg(format!("{} is not a commit", commit_id)));
    }
    let commit = gix::objs::CommitRef::from_bytes(&obj.data).map_err(Error::git)?;
    Ok(commit.tree())
}

/// Find one named entry in a tree object.
fn find_entry(
    repo: &gix::Repository,
    tree_oid: gix::ObjectId,
    name: &str,
) -> Result<Option<TreeEntry>> {
    let data = repo.find_object(tree_oid).map_err(Error::git)?;
    let tree_ref = gix::objs::TreeRef::from_bytes(&data.data).map_err(Error::git)?;

    Ok(tree_ref
        .entries
        .iter()
        .find(|e| e.filename == name.as_bytes())
        .map(|e| TreeEntry {
            name: name.to_string(),
            oid: e.oid.to_owned(),
            mode: e.mode.0 as u32,
        }))
}

/// Sequential reader over a fully-materialized blob.
///
/// The object store exposes whole decompressed objects, not seekable
/// streams; this adapter presents the ordinary read-to-completion interface
/// without the caller needing to know that.
pub struct BlobReader {
    content: Vec<u8>,
    position: usize,
}

impl BlobReader {
    pub(crate) fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            position: 0,
        }
    }

    /// Total blob length in bytes.
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Consume the reader, returning the remaining unread bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        if self.position == 0 {
            self.content
        } else {
            self.content[self.position..].to_vec()
        }
    }
}

impl io::Read for BlobReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.content.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.content.len() - self.position);
        buf[..n].copy_from_slice(&self.content[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}
