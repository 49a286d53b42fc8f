//! Commit ancestry and reference enumeration.
//!
//! [`Commits`] walks ancestry lazily with an explicit frontier (a priority
//! queue ordered by commit timestamp, descending) — each pull reads one
//! commit, so callers that stop early never pay for the full history. Every
//! call re-walks; nothing is memoized across requests.

use std::collections::{BinaryHeap, HashSet};

use crate::error::{Error, Result};
use crate::repo::Repo;
use crate::revision::{self, peel_to_commit};
use crate::tree;
use crate::types::{CancelToken, CommitRecord, RefRecord};

/// Options for a commit walk.
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Follow only the first parent of each commit.
    pub first_parent: bool,
    /// Keep only commits that changed the blob at this path relative to
    /// their first parent.
    pub path: Option<String>,
    /// Cooperative cancellation, checked at each row yield.
    pub cancel: CancelToken,
}

/// Start a commit walk from `spec` (empty spec = current revision).
pub fn commits(repo: &Repo, spec: &str, options: HistoryOptions) -> Result<Commits> {
    let resolved = revision::resolve(repo, spec)?;
    Commits::new(repo.clone(), resolved.commit_id, options)
}

/// Commit walk against the current working location.
///
/// Identical to `commits(&Repo::open_current()?, spec, options)`.
pub fn commits_in_current(spec: &str, options: HistoryOptions) -> Result<Commits> {
    commits(&Repo::open_current()?, spec, options)
}

/// All branches, sorted by name, annotated tags peeled to commits.
pub fn branches(repo: &Repo) -> Result<Vec<RefRecord>> {
    list_refs(repo, "refs/heads/")
}

/// All tags, sorted by name, peeled to commits.
pub fn tags(repo: &Repo) -> Result<Vec<RefRecord>> {
    list_refs(repo, "refs/tags/")
}

/// Branches of the current working location.
pub fn branches_in_current() -> Result<Vec<RefRecord>> {
    branches(&Repo::open_current()?)
}

/// Tags of the current working location.
pub fn tags_in_current() -> Result<Vec<RefRecord>> {
    tags(&Repo::open_current()?)
}

fn list_refs(repo: &Repo, prefix: &str) -> Result<Vec<RefRecord>> {
    let guard = repo.lock()?;
    let platform = guard.references().map_err(Error::git)?;

    let mut records = Vec::new();
    for r in platform.prefixed(prefix).map_err(Error::git)? {
        // A ref that fails to decode aborts the listing; skipping it would
        // silently misreport the repository.
        let reference = r.map_err(|e| Error::git_msg(e.to_string()))?;
        let full_name = reference.name().as_bstr().to_string();
        if let Some(short) = full_name.strip_prefix(prefix) {
            let oid = reference.id().detach();
            let target = peel_to_commit(&guard, oid)?;
            records.push(RefRecord {
                name: short.to_string(),
                target,
            });
        }
    }
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

/// Frontier entry ordered by commit time, then id for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier {
    time: i64,
    id: gix::ObjectId,
}

/// Lazy, finite walk over commit ancestry, newest commit time first.
///
/// Yields `Result<CommitRecord>`; any read failure ends the walk with that
/// error rather than skipping the bad element.
pub struct Commits {
    repo: Repo,
    heap: BinaryHeap<Frontier>,
    seen: HashSet<gix::ObjectId>,
    options: HistoryOptions,
    done: bool,
}

impl Commits {
    pub(crate) fn new(repo: Repo, start: gix::ObjectId, options: HistoryOptions) -> Result<Self> {
        let time = commit_time(&repo, start)?;
        let mut heap = BinaryHeap::new();
        let mut seen = HashSet::new();
        heap.push(Frontier { time, id: start });
        seen.insert(start);
        Ok(Self {
            repo,
            heap,
            seen,
            options,
            done: false,
        })
    }

    fn pull(&mut self) -> Result<Option<CommitRecord>> {
        loop {
            self.options.cancel.check()?;

            let Some(Frontier { id, .. }) = self.heap.pop() else {
                return Ok(None);
            };

            let record = read_commit(&self.repo, id)?;

            let parents: &[gix::ObjectId] = if self.options.first_parent {
                &record.parent_ids[..record.parent_ids.len().min(1)]
            } else {
                &record.parent_ids
            };
            for &parent in parents {
                if self.seen.insert(parent) {
                    let time = commit_time(&self.repo, parent)?;
                    self.heap.push(Frontier { time, id: parent });
                }
            }

            if let Some(path) = &self.options.path {
                if !changed_at_path(&self.repo, &record, path)? {
                    continue;
                }
            }

            return Ok(Some(record));
        }
    }
}

impl Iterator for Commits {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.pull() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Whether `record` changed the object at `path` relative to its first
/// parent (for root commits: whether the path exists at all).
fn changed_at_path(repo: &Repo, record: &CommitRecord, path: &str) -> Result<bool> {
    let current = tree::entry_id(repo, record.id, path)?;
    match record.parent_ids.first() {
        Some(&parent) => {
            let previous = tree::entry_id(repo, parent, path)?;
            Ok(current != previous)
        }
        None => Ok(current.is_some()),
    }
}

/// Read one commit into a record.
fn read_commit(repo: &Repo, id: gix::ObjectId) -> Result<CommitRecord> {
    let guard = repo.lock()?;
    let obj = guard.find_object(id).map_err(Error::git)?;
    if obj.kind != gix::object::Kind::Commit {
        return Err(Error::git_msg(format!("{} is not a commit", id)));
    }
    let commit = gix::objs::CommitRef::from_bytes(&obj.data).map_err(Error::git)?;

    Ok(CommitRecord {
        id,
        parent_ids: commit.parents().collect(),
        author_name: commit.author.name.to_string(),
        author_email: commit.author.email.to_string(),
        author_time: commit.author.time.seconds,
        committer_name: commit.committer.name.to_string(),
        committer_email: commit.committer.email.to_string(),
        commit_time: commit.committer.time.seconds,
        message: commit.message.to_string(),
        tree_id: commit.tree(),
    })
}

/// Committer timestamp of a commit, for frontier ordering.
fn commit_time(repo: &Repo, id: gix::ObjectId) -> Result<i64> {
    let guard = repo.lock()?;
    let obj = guard.find_object(id).map_err(Error::git)?;
    let commit = gix::objs::CommitRef::from_bytes(&obj.data).map_err(Error::git)?;
    Ok(commit.committer.time.seconds)
}
