//! Large-object pointer resolution.
//!
//! A pointer record is a small text blob standing in for payload bytes kept
//! in a hash-sharded side store:
//!
//! ```text
//! version https://git-lfs.github.com/spec/v1
//! oid sha256:4d7a21...
//! size 12345
//! ```
//!
//! Blobs that do not start with the version header pass through untouched.
//! A blob that *does* start with the header but is otherwise malformed is an
//! error: passing it through would hand pointer metadata to the caller as if
//! it were real content.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// First line of every pointer record.
pub const POINTER_HEADER: &str = "version https://git-lfs.github.com/spec/v1";

/// A parsed pointer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerRecord {
    /// Hash algorithm named by the `oid` key (e.g. `sha256`).
    pub algorithm: String,
    /// Lowercase hex payload hash.
    pub oid: String,
    /// Declared payload length in bytes.
    pub size: u64,
}

impl PointerRecord {
    /// Side-store location of the payload: `<root>/<H[0:2]>/<H[2:4]>/<H>`.
    pub fn payload_path(&self, root: &Path) -> PathBuf {
        root.join(&self.oid[0..2]).join(&self.oid[2..4]).join(&self.oid)
    }
}

/// Outcome of [`maybe_resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The blob was not a pointer record; bytes returned unchanged.
    Passthrough(Vec<u8>),
    /// The blob was a pointer; `bytes` is the payload from the side store.
    Payload { bytes: Vec<u8>, size: u64 },
}

impl Resolved {
    /// The content bytes, whichever side they came from.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Resolved::Passthrough(bytes) => bytes,
            Resolved::Payload { bytes, .. } => bytes,
        }
    }
}

/// Cheap detection: does this blob begin with the pointer header line?
pub fn looks_like_pointer(bytes: &[u8]) -> bool {
    bytes.starts_with(POINTER_HEADER.as_bytes())
        && matches!(bytes.get(POINTER_HEADER.len()), None | Some(b'\n') | Some(b'\r'))
}

/// Parse a pointer record from blob bytes.
///
/// The caller has already established (via [`looks_like_pointer`]) that the
/// header is present; everything after it must be well-formed `key value`
/// lines including `oid <algorithm>:<hex>` and `size <non-negative int>`.
///
/// # Errors
/// [`Error::PointerMalformed`] on any deviation from the format.
pub fn parse_pointer(bytes: &[u8]) -> Result<PointerRecord> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::pointer_malformed("pointer record is not valid UTF-8"))?;

    let mut lines = text.lines();
    match lines.next() {
        Some(line) if line.trim_end() == POINTER_HEADER => {}
        _ => return Err(Error::pointer_malformed("missing version header")),
    }

    let mut algorithm = None;
    let mut oid = None;
    let mut size = None;

    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(' ')
            .ok_or_else(|| Error::pointer_malformed(format!("bad line: '{}'", line)))?;
        match key {
            "oid" => {
                let (algo, hash) = value.split_once(':').ok_or_else(|| {
                    Error::pointer_malformed("oid must be <algorithm>:<hex-hash>")
                })?;
                if hash.len() < 4 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(Error::pointer_malformed(format!(
                        "oid hash '{}' is not hex",
                        hash,
                    )));
                }
                algorithm = Some(algo.to_string());
                oid = Some(hash.to_ascii_lowercase());
            }
            "size" => {
                let n: u64 = value.parse().map_err(|_| {
                    Error::pointer_malformed(format!("size '{}' is not a non-negative integer", value))
                })?;
                size = Some(n);
            }
            // Unknown keys (e.g. extensions) are tolerated.
            _ => {}
        }
    }

    match (algorithm, oid, size) {
        (Some(algorithm), Some(oid), Some(size)) => Ok(PointerRecord {
            algorithm,
            oid,
            size,
        }),
        (_, None, _) => Err(Error::pointer_malformed("missing required key: oid")),
        (_, _, None) => Err(Error::pointer_malformed("missing required key: size")),
        _ => Err(Error::pointer_malformed("incomplete pointer record")),
    }
}

/// Transparently substitute pointer records with their payload.
///
/// Non-pointer blobs pass through unchanged. For pointers, the payload is
/// read from the side store under `root`; `verify` additionally recomputes
/// the payload hash and compares it against the declared oid (off the hot
/// path by default).
///
/// # Errors
/// * [`Error::PointerMalformed`] for a blob that starts with the header but
///   does not parse.
/// * [`Error::PayloadMissing`] when the side store has no object for the
///   declared hash. Distinct from `PathNotFound`: the query was fine, the
///   storage is inconsistent.
/// * [`Error::PayloadHashMismatch`] in verify mode on digest mismatch.
pub fn maybe_resolve(root: &Path, bytes: Vec<u8>, verify: bool) -> Result<Resolved> {
    if !looks_like_pointer(&bytes) {
        return Ok(Resolved::Passthrough(bytes));
    }

    let pointer = parse_pointer(&bytes)?;
    let bytes = resolve_pointer(root, &pointer, verify)?;
    let size = pointer.size;
    Ok(Resolved::Payload { bytes, size })
}

/// Fetch the payload for an already-parsed pointer record.
pub fn resolve_pointer(root: &Path, pointer: &PointerRecord, verify: bool) -> Result<Vec<u8>> {
    let path = pointer.payload_path(root);
    log::debug!(
        "resolving large-object {}:{} from {}",
        pointer.algorithm,
        pointer.oid,
        path.display(),
    );

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::payload_missing(format!(
                "{}:{} (looked in {})",
                pointer.algorithm,
                pointer.oid,
                path.display(),
            )));
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    if verify {
        let actual = hex::encode(Sha256::digest(&bytes));
        if actual != pointer.oid {
            return Err(Error::PayloadHashMismatch {
                expected: pointer.oid.clone(),
                actual,
            });
        }
    }

    Ok(bytes)
}
