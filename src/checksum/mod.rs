//! Checksum computation, verification, and reconciliation
//!
//! Three canonicalization policies coexist:
//! - byte-exact hashing of raw content
//! - Markdown-aware hashing that skips a leading metadata block
//! - canonical-text hashing (NFC, LF, trimmed lines, single trailing
//!   newline) used by the vault manager for registration and state hashes

mod engine;
mod frontmatter;
mod sync;

pub use engine::{
    canonicalize_text, digest_bytes, digest_canonical_file, digest_canonical_text, digest_file,
    is_hex_digest, is_markdown, verify_bytes, verify_file, ChecksumError, Verification,
    MARKDOWN_EXTENSIONS,
};
pub use frontmatter::{ChecksumField, CHECKSUM_KEY, PENDING};
pub use sync::{ChecksumSync, DriftReport, DriftStatus, SyncError, SyncSource};
