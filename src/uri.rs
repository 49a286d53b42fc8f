//! Virtual path syntax: `git://<repository>/<relative-path>[@<revision>]`.
//!
//! A parsed [`VirtualPath`] names one byte stream inside repository history:
//! the repository holding it, the revision to read at, and the path within
//! that revision's tree. Parsing splits the URI body into repository and
//! relative path by *discovery*: the longest leading prefix that holds
//! repository metadata on disk wins.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const GIT_SCHEME: &str = "git://";

/// An immutable, parsed virtual path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    /// Repository location on disk.
    pub repo: PathBuf,
    /// Revision spec as written in the URI; `None` defaults to the
    /// checked-out revision at resolution time.
    pub revision: Option<String>,
    /// Normalized forward-slash path relative to the tree root. Empty
    /// string addresses the root tree itself.
    pub path: String,
}

impl VirtualPath {
    /// Parse a `git://` URI into its components.
    ///
    /// The revision is everything after the last `@`; its absence defaults
    /// to the current revision. The remainder is split into repository
    /// location and relative path by walking prefixes from longest to
    /// shortest until one contains repository metadata.
    ///
    /// # Errors
    /// * [`Error::UnsupportedEndpoint`] if the URI carries a non-`git` scheme.
    /// * [`Error::NotARepository`] if no prefix holds repository metadata.
    /// * [`Error::InvalidPath`] if the relative path contains `..` segments.
    pub fn parse(uri: &str) -> Result<Self> {
        let body = match uri.strip_prefix(GIT_SCHEME) {
            Some(rest) => rest,
            None => {
                if let Some(scheme_end) = uri.find("://") {
                    return Err(Error::unsupported_endpoint(format!(
                        "scheme '{}' is not supported",
                        &uri[..scheme_end],
                    )));
                }
                uri
            }
        };

        let (body, revision) = match body.rfind('@') {
            Some(at) => {
                let rev = &body[at + 1..];
                let rev = if rev.is_empty() { None } else { Some(rev.to_string()) };
                (&body[..at], rev)
            }
            None => (body, None),
        };

        let (repo, rel) = split_repository(body)?;
        Ok(VirtualPath {
            repo,
            revision,
            path: normalize_path(&rel)?,
        })
    }

    /// Serialize back to canonical `git://` form, normalizing duplicate
    /// slashes between the repository and relative components.
    pub fn to_uri(&self) -> String {
        let mut repo = self.repo.to_string_lossy().into_owned();
        while repo.ends_with('/') {
            repo.pop();
        }
        let mut out = format!("{}{}", GIT_SCHEME, repo);
        if !self.path.is_empty() {
            out.push('/');
            out.push_str(&self.path);
        }
        if let Some(rev) = &self.revision {
            out.push('@');
            out.push_str(rev);
        }
        out
    }

    /// The revision spec, or the empty string (meaning: current revision).
    pub fn revision_or_default(&self) -> &str {
        self.revision.as_deref().unwrap_or("")
    }
}

impl std::fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// Split a URI body into `(repository location, relative path)`.
///
/// Tries the whole body first, then shorter prefixes, so a repository nested
/// under another working copy resolves to the deepest match.
fn split_repository(body: &str) -> Result<(PathBuf, String)> {
    if body.is_empty() {
        return Err(Error::not_a_repository("empty repository location"));
    }

    let trimmed = body.trim_end_matches('/');
    let mut candidate = trimmed;
    loop {
        let probe = if candidate.is_empty() { "/" } else { candidate };
        if is_repository(Path::new(probe)) {
            let rel = trimmed[candidate.len()..]
                .trim_start_matches('/')
                .to_string();
            return Ok((PathBuf::from(probe), rel));
        }
        match candidate.rfind('/') {
            Some(slash) => candidate = &candidate[..slash],
            None => break,
        }
    }

    Err(Error::not_a_repository(body.to_string()))
}

/// Whether `path` holds repository metadata: either a working copy with a
/// `.git` directory or a bare repository (`HEAD` plus `objects/`).
pub fn is_repository(path: &Path) -> bool {
    if path.join(".git").exists() {
        return true;
    }
    path.join("HEAD").is_file() && path.join("objects").is_dir()
}

/// Normalize a relative path: strip leading/trailing slashes, collapse `.`
/// segments and repeated slashes, reject `..`.
///
/// An empty input returns an empty string (root).
pub fn normalize_path(path: &str) -> Result<String> {
    if path.is_empty() {
        return Ok(String::new());
    }

    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg == ".." {
            return Err(Error::invalid_path(format!(
                "path segment '{}' is not allowed",
                seg,
            )));
        }
        segments.push(seg);
    }

    Ok(segments.join("/"))
}

/// Returns `true` when the path refers to the tree root (empty or slashes).
pub fn is_root_path(path: &str) -> bool {
    path.is_empty() || path.chars().all(|c| c == '/')
}
