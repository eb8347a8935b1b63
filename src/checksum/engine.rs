//! Checksum engine
//!
//! SHA-256 digests over byte-exact, Markdown-aware, and canonical-text
//! content. Verification treats a mismatch as a normal, reportable
//! outcome; only malformed digests and missing files are errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use super::frontmatter;

/// File extensions treated as Markdown for metadata-block skipping
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Errors for checksum operations
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid checksum format: {0} (must be 64 hex characters)")]
    InvalidDigest(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of comparing content against an expected digest.
///
/// Carries both digests so a mismatch can be reported verbatim.
#[derive(Debug, Clone)]
pub struct Verification {
    /// Whether the recomputed digest equals the expected one
    pub matches: bool,

    /// The expected digest, lowercased
    pub expected: String,

    /// The freshly recomputed digest
    pub actual: String,
}

/// SHA-256 of raw bytes as lowercase hex.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest a file.
///
/// For Markdown files with `skip_metadata` set, a leading metadata block
/// is excluded from the hash. Content that cannot be decoded as UTF-8
/// falls back to byte-exact hashing. Non-Markdown files are always hashed
/// byte-exact regardless of the flag.
pub fn digest_file(path: &Path, skip_metadata: bool) -> Result<String, ChecksumError> {
    if !path.exists() {
        return Err(ChecksumError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;

    if skip_metadata && is_markdown(path) {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            if let Some((_, body)) = frontmatter::split(text) {
                return Ok(digest_bytes(body.as_bytes()));
            }
        }
    }

    Ok(digest_bytes(&bytes))
}

/// Canonical-text digest of a file.
///
/// Used for artifact registration and vault-state hashing. Non-UTF-8
/// content falls back to byte-exact hashing so lossy artifacts remain
/// checksummable.
pub fn digest_canonical_file(path: &Path) -> Result<String, ChecksumError> {
    if !path.exists() {
        return Err(ChecksumError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    match std::str::from_utf8(&bytes) {
        Ok(text) => Ok(digest_canonical_text(text)),
        Err(_) => Ok(digest_bytes(&bytes)),
    }
}

/// Canonical-text digest of a string.
pub fn digest_canonical_text(text: &str) -> String {
    digest_bytes(canonicalize_text(text).as_bytes())
}

/// Canonicalize text for stable hashing across editors and platforms:
/// NFC Unicode normalization, LF line endings, trailing whitespace
/// trimmed per line, exactly one trailing newline.
pub fn canonicalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

    let lines: Vec<&str> = unified.split('\n').map(str::trim_end).collect();
    let mut out = lines.join("\n");

    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}

/// Whether a path names a Markdown file.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Whether a string is a well-formed 64-character hex digest.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Verify raw bytes against an expected digest.
pub fn verify_bytes(content: &[u8], expected: &str) -> Result<Verification, ChecksumError> {
    if !is_hex_digest(expected) {
        return Err(ChecksumError::InvalidDigest(expected.to_string()));
    }
    let actual = digest_bytes(content);
    Ok(Verification {
        matches: actual.eq_ignore_ascii_case(expected),
        expected: expected.to_ascii_lowercase(),
        actual,
    })
}

/// Verify a file against an expected digest using the Markdown-aware policy.
pub fn verify_file(
    path: &Path,
    expected: &str,
    skip_metadata: bool,
) -> Result<Verification, ChecksumError> {
    if !is_hex_digest(expected) {
        return Err(ChecksumError::InvalidDigest(expected.to_string()));
    }
    let actual = digest_file(path, skip_metadata)?;
    Ok(Verification {
        matches: actual.eq_ignore_ascii_case(expected),
        expected: expected.to_ascii_lowercase(),
        actual,
    })
}
