//! Endpoint classification and diff strategy dispatch.
//!
//! An endpoint is either *versioned* (a virtual path into repository
//! history) or *plain* (any location a byte-stream backend can read). The
//! strategy — both versioned, mixed, or both plain — is fixed once per
//! request by a single exhaustive `match` and never changes mid-computation.

use crate::diff::{diff_lines, DiffOptions, DiffResult};
use crate::error::{Error, Result};
use crate::lfs;
use crate::repo::Repo;
use crate::revision;
use crate::tree;
use crate::uri::VirtualPath;

/// One side of a diff request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffEndpoint {
    /// A `git://` virtual path resolved through repository history.
    Versioned(VirtualPath),
    /// A plain location read as an ordinary byte stream.
    Plain(String),
}

impl DiffEndpoint {
    /// Classify a raw location string: `git://` URIs become versioned
    /// endpoints, everything else stays plain.
    ///
    /// # Errors
    /// Propagates parse failures for `git://` URIs, including
    /// [`Error::UnsupportedEndpoint`] for foreign schemes.
    pub fn classify(location: &str) -> Result<Self> {
        if location.starts_with(crate::uri::GIT_SCHEME) {
            Ok(DiffEndpoint::Versioned(VirtualPath::parse(location)?))
        } else if location.contains("://") {
            Err(Error::unsupported_endpoint(format!(
                "scheme of '{}' is not supported",
                location,
            )))
        } else {
            Ok(DiffEndpoint::Plain(location.to_string()))
        }
    }

    fn describe(&self) -> EndpointInfo {
        match self {
            DiffEndpoint::Versioned(vp) => EndpointInfo {
                location: vp.repo.to_string_lossy().into_owned(),
                revision: vp.revision.clone(),
                path: vp.path.clone(),
                commit_id: None,
            },
            DiffEndpoint::Plain(loc) => EndpointInfo {
                location: loc.clone(),
                revision: None,
                path: loc.clone(),
                commit_id: None,
            },
        }
    }
}

/// Resolved description of one endpoint, attached to reports when
/// `include_metadata` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    pub location: String,
    pub revision: Option<String>,
    pub path: String,
    /// Concrete commit id for versioned endpoints.
    pub commit_id: Option<String>,
}

/// A diff plus (optionally) the two resolved endpoint descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub result: DiffResult,
    pub left: Option<EndpointInfo>,
    pub right: Option<EndpointInfo>,
}

/// Byte-read capability for plain endpoints.
///
/// The dispatcher needs nothing else from a plain backend; local disk is
/// the default, but network or archival backends satisfy the same trait.
pub trait ByteSource {
    /// Read the entire content at `location`.
    ///
    /// # Errors
    /// Implementations surface read failures as
    /// [`Error::StorageUnavailable`].
    fn read_all(&self, location: &str) -> Result<Vec<u8>>;
}

/// Local-filesystem byte source.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSource;

impl ByteSource for LocalSource {
    fn read_all(&self, location: &str) -> Result<Vec<u8>> {
        std::fs::read(location)
            .map_err(|e| Error::storage_unavailable(format!("{}: {}", location, e)))
    }
}

/// Diff two endpoints with the default local byte source.
pub fn diff(left: &DiffEndpoint, right: &DiffEndpoint, options: &DiffOptions) -> Result<DiffReport> {
    diff_with(left, right, options, &LocalSource)
}

/// Diff two endpoints, reading plain sides through `source`.
///
/// Retrieval failure on either side aborts the request with that side's
/// originating error; there is no partial diff.
pub fn diff_with(
    left: &DiffEndpoint,
    right: &DiffEndpoint,
    options: &DiffOptions,
    source: &dyn ByteSource,
) -> Result<DiffReport> {
    // Strategy selection happens exactly once, here.
    let (left_bytes, left_info, right_bytes, right_info) = match (left, right) {
        (DiffEndpoint::Versioned(l), DiffEndpoint::Versioned(r)) => {
            log::debug!("diff strategy: versioned/versioned");
            let (lb, li) = read_versioned(l, options)?;
            let (rb, ri) = read_versioned(r, options)?;
            (lb, li, rb, ri)
        }
        (DiffEndpoint::Versioned(l), DiffEndpoint::Plain(r)) => {
            log::debug!("diff strategy: versioned/plain");
            let (lb, li) = read_versioned(l, options)?;
            let rb = source.read_all(r)?;
            (lb, li, rb, right.describe())
        }
        (DiffEndpoint::Plain(l), DiffEndpoint::Versioned(r)) => {
            log::debug!("diff strategy: plain/versioned");
            let lb = source.read_all(l)?;
            let (rb, ri) = read_versioned(r, options)?;
            (lb, left.describe(), rb, ri)
        }
        (DiffEndpoint::Plain(l), DiffEndpoint::Plain(r)) => {
            // Content-only comparison; no revision metadata on either side.
            log::debug!("diff strategy: plain/plain (no index)");
            let lb = source.read_all(l)?;
            let rb = source.read_all(r)?;
            (lb, left.describe(), rb, right.describe())
        }
    };

    let result = diff_lines(&left_bytes, &right_bytes, options)?;

    if options.include_metadata {
        Ok(DiffReport {
            result,
            left: Some(left_info),
            right: Some(right_info),
        })
    } else {
        Ok(DiffReport {
            result,
            left: None,
            right: None,
        })
    }
}

/// Resolve a versioned endpoint to its content bytes: revision -> tree ->
/// blob, with transparent large-object substitution.
fn read_versioned(vp: &VirtualPath, options: &DiffOptions) -> Result<(Vec<u8>, EndpointInfo)> {
    let repo = Repo::open(&vp.repo)?;
    let resolved = revision::resolve(&repo, vp.revision_or_default())?;
    let handle = tree::lookup(&repo, resolved.commit_id, &vp.path)?;
    let bytes = tree::read_bytes(&repo, &handle)?;

    let lfs_root = match &options.lfs_root {
        Some(root) => root.clone(),
        None => repo.lfs_objects_root()?,
    };
    let bytes = lfs::maybe_resolve(&lfs_root, bytes, options.verify_payloads)?.into_bytes();

    let info = EndpointInfo {
        location: vp.repo.to_string_lossy().into_owned(),
        revision: vp.revision.clone(),
        path: vp.path.clone(),
        commit_id: Some(resolved.commit_id.to_string()),
    };
    Ok((bytes, info))
}

/// Convenience: classify two raw locations and diff them.
pub fn diff_locations(left: &str, right: &str, options: &DiffOptions) -> Result<DiffReport> {
    let left = DiffEndpoint::classify(left)?;
    let right = DiffEndpoint::classify(right)?;
    diff(&left, &right, options)
}
