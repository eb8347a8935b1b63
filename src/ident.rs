//! Artifact identifiers
//!
//! Parses, validates, and generates `vault://` identifiers used as node
//! keys throughout the manifest and lineage graph.
//!
//! Format: `vault://[domain]/[resource...]/[version]`
//! Example: `vault://Standards/Tools/VaultManager/v1.0`

use std::fmt;
use std::str::FromStr;

use regex_lite::Regex;

/// Fixed URI scheme prefix for artifact identifiers
pub const SCHEME: &str = "vault://";

/// Errors for identifier parsing and construction
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("Missing `vault://` scheme prefix: {0}")]
    MissingScheme(String),

    #[error("Identifier needs a domain and at least one resource segment: {0}")]
    TooFewSegments(String),

    #[error("Invalid segment '{segment}' in identifier: {id}")]
    InvalidSegment { id: String, segment: String },

    #[error("Invalid version suffix '{version}' in identifier: {id}")]
    InvalidVersion { id: String, version: String },
}

/// A parsed artifact identifier.
///
/// Immutable value type compared by exact string equality. The version
/// suffix is optional; when present it is `v` followed by dot-separated
/// non-negative integers (`v1.0`, `v2.1.3`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactId {
    domain: String,
    resource: String,
    version: Option<String>,
}

impl ArtifactId {
    /// Construct from parts, validating every segment.
    pub fn new(domain: &str, resource: &str, version: Option<&str>) -> Result<Self, IdError> {
        let id = Self {
            domain: domain.to_string(),
            resource: resource.to_string(),
            version: version.map(str::to_string),
        };
        let rendered = id.to_string();

        if !segment_ok(domain) {
            return Err(IdError::InvalidSegment {
                id: rendered,
                segment: domain.to_string(),
            });
        }
        if resource.is_empty() {
            return Err(IdError::TooFewSegments(rendered));
        }
        for segment in resource.split('/') {
            if !segment_ok(segment) {
                return Err(IdError::InvalidSegment {
                    id: rendered,
                    segment: segment.to_string(),
                });
            }
        }
        if let Some(version) = version {
            if !version_ok(version) {
                return Err(IdError::InvalidVersion {
                    id: rendered,
                    version: version.to_string(),
                });
            }
        }
        Ok(id)
    }

    /// Parse an identifier string.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| IdError::MissingScheme(s.to_string()))?;

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() < 2 {
            return Err(IdError::TooFewSegments(s.to_string()));
        }

        // The last segment is a version suffix only when enough segments
        // remain for domain + resource. A malformed version-looking suffix
        // is reported as such rather than as a bad resource segment.
        let last = segments[segments.len() - 1];
        let (version, path) = if segments.len() >= 3 && version_candidate(last) {
            if !version_ok(last) {
                return Err(IdError::InvalidVersion {
                    id: s.to_string(),
                    version: last.to_string(),
                });
            }
            (Some(last), &segments[..segments.len() - 1])
        } else {
            (None, &segments[..])
        };

        Self::new(path[0], &path[1..].join("/"), version)
    }

    /// Generate an identifier with a semantic version suffix.
    ///
    /// `patch` omitted yields a two-component version (`v{major}.{minor}`).
    pub fn generate(
        domain: &str,
        resource: &str,
        major: u32,
        minor: u32,
        patch: Option<u32>,
    ) -> Result<Self, IdError> {
        let version = match patch {
            Some(patch) => format!("v{major}.{minor}.{patch}"),
            None => format!("v{major}.{minor}"),
        };
        Self::new(domain, resource, Some(&version))
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.domain, self.resource)?;
        if let Some(version) = &self.version {
            write!(f, "/{version}")?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Domain and resource segments: non-empty alphanumeric with `-` and `_`.
fn segment_ok(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Quick shape check used to decide whether a trailing segment was meant
/// to be a version suffix at all.
fn version_candidate(segment: &str) -> bool {
    match segment.strip_prefix('v') {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '.'),
        None => false,
    }
}

/// Strict version pattern: `v` followed by dot-separated integers.
fn version_ok(version: &str) -> bool {
    let re = Regex::new(r"^v\d+(\.\d+)*$").unwrap();
    re.is_match(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_identifier() {
        let id = ArtifactId::parse("vault://Standards/Tools/VaultManager/v1.0").unwrap();
        assert_eq!(id.domain(), "Standards");
        assert_eq!(id.resource(), "Tools/VaultManager");
        assert_eq!(id.version(), Some("v1.0"));
    }

    #[test]
    fn test_parse_without_version() {
        let id = ArtifactId::parse("vault://Demo/Widget").unwrap();
        assert_eq!(id.domain(), "Demo");
        assert_eq!(id.resource(), "Widget");
        assert_eq!(id.version(), None);
    }

    #[test]
    fn test_round_trip() {
        for s in [
            "vault://Demo/Widget/v1.0",
            "vault://Demo/Widget",
            "vault://a-b/c_d/e/v2.1.3",
            "vault://Demo/v1",
        ] {
            let id = ArtifactId::parse(s).unwrap();
            assert_eq!(id.to_string(), s);
            assert_eq!(ArtifactId::parse(&id.to_string()).unwrap(), id);
        }
    }

    #[test]
    fn test_missing_scheme() {
        let err = ArtifactId::parse("https://Demo/Widget/v1.0").unwrap_err();
        assert!(matches!(err, IdError::MissingScheme(_)));
    }

    #[test]
    fn test_too_few_segments() {
        let err = ArtifactId::parse("vault://Demo").unwrap_err();
        assert!(matches!(err, IdError::TooFewSegments(_)));
    }

    #[test]
    fn test_invalid_segment() {
        let err = ArtifactId::parse("vault://Demo/Wid get/v1.0").unwrap_err();
        assert!(matches!(err, IdError::InvalidSegment { segment, .. } if segment == "Wid get"));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(ArtifactId::parse("vault://Demo//v1.0").is_err());
    }

    #[test]
    fn test_malformed_version() {
        let err = ArtifactId::parse("vault://Demo/Widget/v1.").unwrap_err();
        assert!(matches!(err, IdError::InvalidVersion { version, .. } if version == "v1."));
    }

    #[test]
    fn test_version_like_resource_has_dot_rejected() {
        // Two segments only: the trailing v1.0 would be a resource segment,
        // and dots are not valid segment characters.
        assert!(ArtifactId::parse("vault://Demo/v1.0").is_err());
    }

    #[test]
    fn test_generate_two_component() {
        let id = ArtifactId::generate("Demo", "Widget", 1, 0, None).unwrap();
        assert_eq!(id.to_string(), "vault://Demo/Widget/v1.0");
    }

    #[test]
    fn test_generate_three_component() {
        let id = ArtifactId::generate("Demo", "Tools/Widget", 2, 1, Some(3)).unwrap();
        assert_eq!(id.to_string(), "vault://Demo/Tools/Widget/v2.1.3");
    }

    #[test]
    fn test_generate_validates_segments() {
        assert!(ArtifactId::generate("Demo!", "Widget", 1, 0, None).is_err());
    }

    #[test]
    fn test_from_str() {
        let id: ArtifactId = "vault://Demo/Widget/v1.0".parse().unwrap();
        assert_eq!(id.version(), Some("v1.0"));
    }
}
