//! Revision resolution: spec string to commit identifier.
//!
//! The ladder is fixed: exact commit id -> branch -> tag -> abbreviated
//! commit id. A name carried by both a branch and a tag is surfaced as
//! [`Error::AmbiguousRevision`] rather than silently preferring one kind.

use crate::error::{Error, Result};
use crate::repo::Repo;
use crate::types::RefKind;

/// A revision spec resolved to a concrete commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRevision {
    pub commit_id: gix::ObjectId,
    pub ref_kind: RefKind,
}

/// Resolve `spec` against `repo`.
///
/// An empty spec or `"HEAD"` resolves the checked-out revision (symbolic
/// HEAD followed to its branch, detached HEAD honored directly). Purely
/// read-only: no refs, objects, or locks are created.
///
/// # Errors
/// * [`Error::RefNotFound`] when no ladder rung matches.
/// * [`Error::AmbiguousRevision`] when both a branch and a tag carry the
///   name, or an abbreviated id has several candidates.
pub fn resolve(repo: &Repo, spec: &str) -> Result<ResolvedRevision> {
    log::trace!("resolving revision '{}' in {}", spec, repo.path().display());

    if spec.is_empty() || spec == "HEAD" {
        let commit_id = resolve_head(repo)?;
        return Ok(ResolvedRevision {
            commit_id,
            ref_kind: RefKind::Head,
        });
    }

    // Exact commit id: 40 hex characters.
    if spec.len() == 40 && is_hex(spec) {
        if let Ok(oid) = gix::ObjectId::from_hex(spec.as_bytes()) {
            let guard = repo.lock()?;
            if let Ok(commit_id) = peel_to_commit(&guard, oid) {
                return Ok(ResolvedRevision {
                    commit_id,
                    ref_kind: RefKind::CommitId,
                });
            }
        }
    }

    let branch = ref_target(repo, &format!("refs/heads/{}", spec))?;
    let tag = ref_target(repo, &format!("refs/tags/{}", spec))?;

    match (branch, tag) {
        (Some(_), Some(_)) => {
            return Err(Error::ambiguous_revision(format!(
                "'{}' names both a branch and a tag",
                spec,
            )));
        }
        (Some(oid), None) => {
            let guard = repo.lock()?;
            let commit_id = peel_to_commit(&guard, oid)?;
            return Ok(ResolvedRevision {
                commit_id,
                ref_kind: RefKind::Branch,
            });
        }
        (None, Some(oid)) => {
            let guard = repo.lock()?;
            let commit_id = peel_to_commit(&guard, oid)?;
            return Ok(ResolvedRevision {
                commit_id,
                ref_kind: RefKind::Tag,
            });
        }
        (None, None) => {}
    }

    // Abbreviated commit id; must be unambiguous.
    if spec.len() >= 4 && spec.len() < 40 && is_hex(spec) {
        let guard = repo.lock()?;
        match guard.rev_parse_single(spec) {
            Ok(id) => {
                let oid = id.detach();
                let commit_id = peel_to_commit(&guard, oid)?;
                return Ok(ResolvedRevision {
                    commit_id,
                    ref_kind: RefKind::AbbreviatedId,
                });
            }
            Err(e) => {
                if e.to_string().to_lowercase().contains("ambiguous") {
                    return Err(Error::ambiguous_revision(spec.to_string()));
                }
            }
        }
    }

    Err(Error::ref_not_found(spec.to_string()))
}

/// Resolve the checked-out revision: follow symbolic HEAD to its branch, or
/// take the direct target when HEAD is detached.
fn resolve_head(repo: &Repo) -> Result<gix::ObjectId> {
    let guard = repo.lock()?;
    let head = guard
        .find_reference("HEAD")
        .map_err(|_| Error::ref_not_found("HEAD"))?;

    match head.target().try_name() {
        Some(name) => {
            let name = name.as_bstr().to_string();
            let branch = guard
                .find_reference(name.as_str())
                .map_err(|_| Error::ref_not_found(format!("HEAD -> {}", name)))?;
            let oid = branch.id().detach();
            peel_to_commit(&guard, oid)
        }
        None => {
            let oid = head
                .target()
                .try_id()
                .map(|id| id.to_owned())
                .ok_or_else(|| Error::ref_not_found("HEAD"))?;
            peel_to_commit(&guard, oid)
        }
    }
}

/// Target oid of a fully-qualified ref, or `None` if the ref does not exist.
fn ref_target(repo: &Repo, refname: &str) -> Result<Option<gix::ObjectId>> {
    let guard = repo.lock()?;
    match guard.find_reference(refname) {
        Ok(reference) => Ok(Some(reference.id().detach())),
        Err(_) => Ok(None),
    }
}

/// Follow tag objects until a commit is reached.
///
/// Annotated tags may nest; the chain is bounded to guard against cyclic
/// object data.
pub(crate) fn peel_to_commit(
    repo: &gix::Repository,
    mut oid: gix::ObjectId,
) -> Result<gix::ObjectId> {
    for _ in 0..16 {
        let obj = repo.find_object(oid).map_err(Error::git)?;
        match obj.kind {
            gix::object::Kind::Commit => return Ok(oid),
            gix::object::Kind::Tag => {
                let tag = gix::objs::TagRef::from_bytes(&obj.data).map_err(Error::git)?;
                oid = tag.target();
            }
            other => {
                return Err(Error::ref_not_found(format!(
                    "{} is a {}, not a commit",
                    oid, other,
                )));
            }
        }
    }
    Err(Error::ref_not_found(format!("tag chain too deep at {}", oid)))
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}
