//! Session configuration
//!
//! All fields default, so an empty or partial TOML file is valid.
//!
//! ```toml
//! generated_id_len = 8
//! log_filter = "collectra_core=debug"
//!
//! [folders]
//! folder_suffix = ".grapto"
//! image_extensions = ["png", "jpg"]
//! ```

use crate::error::{SessionError, SessionResult};
use collectra_record::FolderScanOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest random suffix a v4 UUID can supply
const MAX_GENERATED_ID_LEN: usize = 32;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hex length of the random suffix in generated node ids
    pub generated_id_len: usize,

    /// Record-folder file matching
    pub folders: FolderScanOptions,

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set generated id suffix length, clamped to `1..=32`
    #[inline]
    #[must_use]
    pub fn with_generated_id_len(mut self, len: usize) -> Self {
        self.generated_id_len = len.clamp(1, MAX_GENERATED_ID_LEN);
        self
    }

    /// Suffix length used for generated ids
    ///
    /// Clamped to `1..=32` here as well, since the field is public and may
    /// be set without the builder.
    #[inline]
    #[must_use]
    pub fn id_suffix_len(&self) -> usize {
        self.generated_id_len.clamp(1, MAX_GENERATED_ID_LEN)
    }

    /// Set record-folder matching rules
    #[inline]
    #[must_use]
    pub fn with_folders(mut self, folders: FolderScanOptions) -> Self {
        self.folders = folders;
        self
    }

    /// Set fallback log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] if the text is not valid TOML for
    /// this structure.
    pub fn from_toml_str(text: &str) -> SessionResult<Self> {
        Self::parse(text, Path::new("<inline>"))
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SessionError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> SessionResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SessionError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let len = config.generated_id_len;
        Ok(config.with_generated_id_len(len))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            generated_id_len: 8,
            folders: FolderScanOptions::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.generated_id_len, 8);
        assert_eq!(config.folders.folder_suffix, ".grapto");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = SessionConfig::from_toml_str(
            "generated_id_len = 12\n[folders]\nfolder_suffix = \".rec\"\n",
        )
        .unwrap();
        assert_eq!(config.generated_id_len, 12);
        assert_eq!(config.folders.folder_suffix, ".rec");
        assert_eq!(config.folders.record_extensions, ["yaml", "yml"]);
    }

    #[test]
    fn id_len_is_clamped() {
        let parsed = SessionConfig::from_toml_str("generated_id_len = 0").unwrap();
        assert_eq!(parsed.generated_id_len, 1);
        assert_eq!(SessionConfig::new().with_generated_id_len(99).generated_id_len, 32);
    }

    #[test]
    fn suffix_len_clamped_without_builder() {
        let zero = SessionConfig {
            generated_id_len: 0,
            ..SessionConfig::default()
        };
        assert_eq!(zero.id_suffix_len(), 1);
        let huge = SessionConfig {
            generated_id_len: 1000,
            ..SessionConfig::default()
        };
        assert_eq!(huge.id_suffix_len(), 32);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = SessionConfig::from_toml_str("generated_id_len = \"eight\"").unwrap_err();
        assert!(matches!(err, SessionError::Config { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collectra.toml");
        std::fs::write(&path, "log_filter = \"debug\"\n").unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap().log_filter, "debug");
        assert!(SessionConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
