//! Embedded metadata blocks
//!
//! A metadata block is a leading section delimited by `---` lines. Only
//! the single `checksum_sha256` line is ever rewritten; every other byte
//! of the document is preserved verbatim.

/// Field name of the embedded checksum
pub const CHECKSUM_KEY: &str = "checksum_sha256";

/// Placeholder value for a checksum that has not been computed yet
pub const PENDING: &str = "pending";

/// Value of an embedded checksum field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumField {
    /// The literal `pending` sentinel: present but never verified
    Pending,
    /// A recorded digest value
    Digest(String),
}

impl ChecksumField {
    /// Parse a raw field value, stripping quotes.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if trimmed == PENDING {
            ChecksumField::Pending
        } else {
            ChecksumField::Digest(trimmed.to_string())
        }
    }

    /// The concrete digest, if this field holds one.
    pub fn digest(&self) -> Option<&str> {
        match self {
            ChecksumField::Pending => None,
            ChecksumField::Digest(digest) => Some(digest),
        }
    }

    /// The raw value as it appears in the document.
    pub fn value(&self) -> &str {
        match self {
            ChecksumField::Pending => PENDING,
            ChecksumField::Digest(digest) => digest,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ChecksumField::Pending)
    }
}

/// Split content into (block interior, body) when a leading metadata
/// block is present. The interior keeps its trailing newline so the
/// document can be reassembled byte-for-byte.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---\n")?;
    let end = rest.find("\n---\n")?;
    Some((&rest[..end + 1], &rest[end + 5..]))
}

/// Whether the document starts with a metadata block.
pub fn has_block(content: &str) -> bool {
    split(content).is_some()
}

/// Read the embedded checksum field, if any.
pub fn read_checksum(content: &str) -> Option<ChecksumField> {
    let (inner, _) = split(content)?;
    for line in inner.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(CHECKSUM_KEY) {
            if let Some(value) = rest.trim_start().strip_prefix(':') {
                return Some(ChecksumField::parse(value));
            }
        }
    }
    None
}

/// Rewrite the embedded checksum field, returning the updated document.
///
/// An existing field is replaced in place; a missing field is appended at
/// the end of the block, next to the rest of the metadata. Returns `None`
/// when the document has no metadata block.
pub fn write_checksum(content: &str, value: &str) -> Option<String> {
    let (inner, body) = split(content)?;

    let mut lines: Vec<String> = Vec::new();
    let mut replaced = false;
    for line in inner.lines() {
        let is_field = line
            .trim_start()
            .strip_prefix(CHECKSUM_KEY)
            .map(|rest| rest.trim_start().starts_with(':'))
            .unwrap_or(false);
        if is_field && !replaced {
            lines.push(format!("{CHECKSUM_KEY}: {value}"));
            replaced = true;
        } else {
            lines.push(line.to_string());
        }
    }
    if !replaced {
        lines.push(format!("{CHECKSUM_KEY}: {value}"));
    }

    Some(format!("---\n{}\n---\n{}", lines.join("\n"), body))
}
