//! Line-level text diff: Myers algorithm via the `similar` crate.
//!
//! Hunks carry their raw line text (terminators included), so the full hunk
//! sequence reapplied to the left buffer reconstructs the right buffer
//! byte-for-byte. Binary-looking content short-circuits to a size/digest
//! delta with no line hunks.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use similar::{ChangeTag, TextDiff};

use crate::error::{Error, Result};
use crate::types::CancelToken;

/// How many leading bytes are sampled for the null-byte binary check.
const BINARY_SAMPLE: usize = 8192;

/// Options shared by the diff engine and the endpoint dispatcher.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Attach resolved endpoint descriptors to the report.
    pub include_metadata: bool,
    /// Context lines kept around each change run.
    pub context: usize,
    /// Per-side input byte ceiling; larger inputs fail with `DiffTooLarge`.
    pub max_bytes: usize,
    /// Per-side input line ceiling.
    pub max_lines: usize,
    /// Recompute large-object payload hashes on retrieval.
    pub verify_payloads: bool,
    /// Override the large-object side store root (default: the repository's
    /// own `lfs/objects`).
    pub lfs_root: Option<PathBuf>,
    /// Cooperative cancellation, checked at hunk-emission boundaries.
    pub cancel: CancelToken,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            include_metadata: false,
            context: 3,
            max_bytes: 16 * 1024 * 1024,
            max_lines: 200_000,
            verify_payloads: false,
            lfs_root: None,
            cancel: CancelToken::new(),
        }
    }
}

/// Tag of one line within a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTag {
    Context,
    Added,
    Removed,
}

/// A contiguous block of change plus surrounding context.
///
/// `old_start`/`new_start` are 1-based. Line text preserves the original
/// terminator (or its absence, on a final unterminated line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<(LineTag, String)>,
}

/// Added/removed/context line totals across all hunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub context: usize,
}

/// Size/digest delta reported instead of hunks for binary content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryDelta {
    pub old_len: usize,
    pub new_len: usize,
    /// sha256 of the left bytes, hex.
    pub old_digest: String,
    /// sha256 of the right bytes, hex.
    pub new_digest: String,
}

/// The result of one diff computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Human-readable unified form of all hunks.
    pub unified: String,
    /// Ordered, non-overlapping hunks, strictly increasing in `old_start`.
    pub hunks: Vec<Hunk>,
    pub stats: DiffStats,
    /// Set when the inputs were binary; `hunks` is then empty.
    pub binary: Option<BinaryDelta>,
}

impl DiffResult {
    /// `true` when the two inputs were identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty() && self.binary.is_none()
    }

    /// Reapply the hunk sequence to the left buffer, reconstructing the
    /// right buffer exactly.
    ///
    /// # Errors
    /// [`Error::UnsupportedEndpoint`] for binary results, which carry no
    /// hunks to apply.
    pub fn apply_to(&self, old: &str) -> Result<String> {
        if self.binary.is_some() {
            return Err(Error::unsupported_endpoint(
                "a binary diff carries no hunks to apply",
            ));
        }

        let old_lines: Vec<&str> = split_keep_ends(old);
        let mut out = String::with_capacity(old.len());
        let mut cursor = 0usize;

        for hunk in &self.hunks {
            let start = hunk.old_start.saturating_sub(1);
            while cursor < start && cursor < old_lines.len() {
                out.push_str(old_lines[cursor]);
                cursor += 1;
            }
            for (tag, text) in &hunk.lines {
                match tag {
                    LineTag::Context => {
                        out.push_str(text);
                        cursor += 1;
                    }
                    LineTag::Removed => {
                        cursor += 1;
                    }
                    LineTag::Added => {
                        out.push_str(text);
                    }
                }
            }
        }

        while cursor < old_lines.len() {
            out.push_str(old_lines[cursor]);
            cursor += 1;
        }
        Ok(out)
    }
}

/// Compute a line-level diff between two byte buffers.
///
/// Empty inputs are valid; diffing against an empty buffer yields a single
/// hunk of pure additions or removals. Content with a null byte in its
/// sampled prefix, or that is not valid UTF-8, short-circuits to a binary
/// delta.
///
/// # Errors
/// * [`Error::DiffTooLarge`] when either side exceeds the byte or line
///   ceiling in `options`.
/// * [`Error::Cancelled`] when the token fires mid-computation.
pub fn diff_lines(old: &[u8], new: &[u8], options: &DiffOptions) -> Result<DiffResult> {
    if old.len() > options.max_bytes || new.len() > options.max_bytes {
        return Err(Error::diff_too_large(format!(
            "input of {} bytes exceeds the {} byte ceiling",
            old.len().max(new.len()),
            options.max_bytes,
        )));
    }

    if is_binary(old) || is_binary(new) {
        return Ok(binary_result(old, new));
    }
    let (old_text, new_text) = match (std::str::from_utf8(old), std::str::from_utf8(new)) {
        (Ok(o), Ok(n)) => (o, n),
        _ => return Ok(binary_result(old, new)),
    };

    if old_text == new_text {
        return Ok(DiffResult {
            unified: String::new(),
            hunks: Vec::new(),
            stats: DiffStats::default(),
            binary: None,
        });
    }

    let old_line_count = split_keep_ends(old_text).len();
    let new_line_count = split_keep_ends(new_text).len();
    if old_line_count > options.max_lines || new_line_count > options.max_lines {
        return Err(Error::diff_too_large(format!(
            "input of {} lines exceeds the {} line ceiling",
            old_line_count.max(new_line_count),
            options.max_lines,
        )));
    }

    let text_diff = TextDiff::from_lines(old_text, new_text);

    let mut hunks = Vec::new();
    let mut stats = DiffStats::default();

    for group in text_diff.grouped_ops(options.context) {
        options.cancel.check()?;

        let mut lines = Vec::new();
        let mut old_start = 0usize;
        let mut new_start = 0usize;
        let mut old_count = 0usize;
        let mut new_count = 0usize;
        let mut first = true;

        for op in &group {
            if first {
                old_start = op.old_range().start + 1;
                new_start = op.new_range().start + 1;
                first = false;
            }

            for change in text_diff.iter_changes(op) {
                let text = change.value().to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        lines.push((LineTag::Context, text));
                        old_count += 1;
                        new_count += 1;
                        stats.context += 1;
                    }
                    ChangeTag::Delete => {
                        lines.push((LineTag::Removed, text));
                        old_count += 1;
                        stats.removed += 1;
                    }
                    ChangeTag::Insert => {
                        lines.push((LineTag::Added, text));
                        new_count += 1;
                        stats.added += 1;
                    }
                }
            }
        }

        hunks.push(Hunk {
            old_start,
            old_count,
            new_start,
            new_count,
            lines,
        });
    }

    let unified = render_unified(&hunks);
    Ok(DiffResult {
        unified,
        hunks,
        stats,
        binary: None,
    })
}

/// Null byte within the sampled prefix marks content as binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SAMPLE)].contains(&0)
}

fn binary_result(old: &[u8], new: &[u8]) -> DiffResult {
    let delta = BinaryDelta {
        old_len: old.len(),
        new_len: new.len(),
        old_digest: hex::encode(Sha256::digest(old)),
        new_digest: hex::encode(Sha256::digest(new)),
    };
    let unified = if delta.old_digest == delta.new_digest {
        String::new()
    } else {
        format!(
            "Binary content differs: {} bytes ({}) -> {} bytes ({})\n",
            delta.old_len,
            &delta.old_digest[..12],
            delta.new_len,
            &delta.new_digest[..12],
        )
    };
    let binary = if delta.old_digest == delta.new_digest {
        None
    } else {
        Some(delta)
    };
    DiffResult {
        unified,
        hunks: Vec::new(),
        stats: DiffStats::default(),
        binary,
    }
}

/// Serialize hunks in unified form with `@@` range headers.
///
/// A side with a zero line count renders the preceding line number, per the
/// unified convention (`-0,0` when inserting at the very start).
fn render_unified(hunks: &[Hunk]) -> String {
    let mut out = String::new();
    for hunk in hunks {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            range_start(hunk.old_start, hunk.old_count),
            hunk.old_count,
            range_start(hunk.new_start, hunk.new_count),
            hunk.new_count,
        ));
        for (tag, text) in &hunk.lines {
            let prefix = match tag {
                LineTag::Context => ' ',
                LineTag::Added => '+',
                LineTag::Removed => '-',
            };
            out.push(prefix);
            out.push_str(text.trim_end_matches(['\n', '\r']));
            out.push('\n');
            if !text.ends_with('\n') {
                out.push_str("\\ No newline at end of file\n");
            }
        }
    }
    out
}

/// Split into lines preserving terminators; an empty input has zero lines.
fn split_keep_ends(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn range_start(start: usize, count: usize) -> usize {
    if count == 0 {
        start.saturating_sub(1)
    } else {
        start
    }
}
