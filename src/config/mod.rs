//! Layered CLI settings
//!
//! Three layers, later wins: built-in defaults, an optional
//! `.vaultline.toml` in the working directory, and CLI flags. Vault file
//! paths stay explicit `VaultManager` constructor parameters; settings
//! only choose defaults for the command-line surface.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Settings file name looked up in the working directory
pub const SETTINGS_FILE: &str = ".vaultline.toml";

/// Errors for settings loading
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Effective CLI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Vault directory used when `--vault` is not given
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,

    /// Directory scanned for sidecar files when `--scan` is not given
    #[serde(default = "default_scan_dir")]
    pub scan_dir: PathBuf,

    /// Glob patterns selecting files for `sync` when `--files` is not given
    #[serde(default = "default_sync_globs")]
    pub sync_globs: Vec<String>,
}

fn default_vault_dir() -> PathBuf {
    PathBuf::from(".vault")
}

fn default_scan_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sync_globs() -> Vec<String> {
    vec!["*.md".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            scan_dir: default_scan_dir(),
            sync_globs: default_sync_globs(),
        }
    }
}

impl Settings {
    /// Load settings from `dir/.vaultline.toml`, falling back to the
    /// built-in defaults when the file is absent. Missing keys take their
    /// defaults.
    pub fn load(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&fs::read_to_string(&path)?)?)
    }

    /// Apply CLI-flag overrides, the highest-precedence layer.
    pub fn with_overrides(mut self, vault_dir: Option<PathBuf>, scan_dir: Option<PathBuf>) -> Self {
        if let Some(vault_dir) = vault_dir {
            self.vault_dir = vault_dir;
        }
        if let Some(scan_dir) = scan_dir {
            self.scan_dir = scan_dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_file_absent() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.vault_dir, PathBuf::from(".vault"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "vault_dir = \"archive/vault\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.vault_dir, PathBuf::from("archive/vault"));
        assert_eq!(settings.scan_dir, PathBuf::from("."));
        assert_eq!(settings.sync_globs, vec!["*.md".to_string()]);
    }

    #[test]
    fn test_cli_overrides_win() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "vault_dir = \"from-file\"\nscan_dir = \"state\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path())
            .unwrap()
            .with_overrides(Some(PathBuf::from("from-cli")), None);
        assert_eq!(settings.vault_dir, PathBuf::from("from-cli"));
        assert_eq!(settings.scan_dir, PathBuf::from("state"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "vault_dir = [not toml").unwrap();
        assert!(matches!(
            Settings::load(dir.path()),
            Err(SettingsError::Parse(_))
        ));
    }
}
