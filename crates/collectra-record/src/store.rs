//! Storage collaborator
//!
//! Reads and writes the record YAML and locates record folders on disk.
//! A record folder holds one record file and one image; a parent folder
//! holds many record folders whose names end in a fixed suffix.

use crate::error::StorageError;
use crate::normalize::{denormalize, normalize};
use crate::raw::RawRecord;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse record text into a normalized record
///
/// # Errors
/// Returns [`StorageError::Parse`] for invalid YAML or a non-conforming record.
pub fn parse_record(text: &str) -> Result<Record, StorageError> {
    let raw: RawRecord = serde_yaml::from_str(text).map_err(|e| StorageError::Parse {
        message: e.to_string(),
    })?;
    Ok(normalize(raw))
}

/// Serialize a normalized record to record text
///
/// # Errors
/// Returns [`StorageError::Serialize`] if YAML emission fails.
pub fn render_record(record: &Record) -> Result<String, StorageError> {
    serde_yaml::to_string(&denormalize(record)).map_err(|e| StorageError::Serialize {
        message: e.to_string(),
    })
}

/// Load/save seam between the core and the on-disk record
pub trait RecordStore {
    /// Read and normalize the record
    ///
    /// # Errors
    /// Returns [`StorageError`] on IO or parse failure.
    fn load(&self) -> Result<Record, StorageError>;

    /// Denormalize and write the record
    ///
    /// # Errors
    /// Returns [`StorageError`] on IO or serialization failure.
    fn save(&self, record: &Record) -> Result<(), StorageError>;
}

/// Record stored as a YAML file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    /// Store backed by `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for YamlFileStore {
    fn load(&self) -> Result<Record, StorageError> {
        let text = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let record = parse_record(&text)?;
        tracing::debug!("Loaded {} nodes from {}", record.len(), self.path.display());
        Ok(record)
    }

    fn save(&self, record: &Record) -> Result<(), StorageError> {
        let text = render_record(record)?;
        fs::write(&self.path, text).map_err(|e| StorageError::io(&self.path, e))?;
        tracing::debug!("Saved {} nodes to {}", record.len(), self.path.display());
        Ok(())
    }
}

/// File-matching rules for record folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderScanOptions {
    /// Extensions of record files (without dot, lowercase)
    pub record_extensions: Vec<String>,
    /// Extensions of image files (without dot, lowercase)
    pub image_extensions: Vec<String>,
    /// Suffix of record folder names inside a parent folder
    pub folder_suffix: String,
}

impl Default for FolderScanOptions {
    fn default() -> Self {
        Self {
            record_extensions: ["yaml", "yml"].map(String::from).to_vec(),
            image_extensions: ["png", "jpeg", "jpg", "gif", "bmp", "webp", "tiff", "tif"]
                .map(String::from)
                .to_vec(),
            folder_suffix: ".grapto".to_string(),
        }
    }
}

impl FolderScanOptions {
    fn matches(extensions: &[String], path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
    }

    fn is_record(&self, path: &Path) -> bool {
        Self::matches(&self.record_extensions, path)
    }

    fn is_image(&self, path: &Path) -> bool {
        Self::matches(&self.image_extensions, path)
    }
}

/// A folder holding one record file and its image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFolder {
    /// Folder name
    pub name: String,
    /// Folder path
    pub path: PathBuf,
    /// Record file inside the folder
    pub record_path: PathBuf,
    /// Image file inside the folder
    pub image_path: PathBuf,
}

impl RecordFolder {
    /// Locate the record and image files in `dir`
    ///
    /// The first match in file-name order wins for each.
    ///
    /// # Errors
    /// Returns [`StorageError::MissingFile`] if either file is absent, or
    /// [`StorageError::Io`] if the folder cannot be read.
    pub fn scan(dir: impl AsRef<Path>, options: &FolderScanOptions) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        let files = sorted_entries(dir)?
            .into_iter()
            .filter(|p| p.is_file())
            .collect::<Vec<_>>();

        let record_path = files
            .iter()
            .find(|p| options.is_record(p))
            .cloned()
            .ok_or_else(|| StorageError::MissingFile {
                folder: dir.to_path_buf(),
                what: "record",
            })?;
        let image_path = files
            .iter()
            .find(|p| options.is_image(p))
            .cloned()
            .ok_or_else(|| StorageError::MissingFile {
                folder: dir.to_path_buf(),
                what: "image",
            })?;

        Ok(Self {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: dir.to_path_buf(),
            record_path,
            image_path,
        })
    }

    /// Store for this folder's record file
    #[inline]
    #[must_use]
    pub fn store(&self) -> YamlFileStore {
        YamlFileStore::new(&self.record_path)
    }
}

/// Record folders directly inside `parent`, sorted by name
///
/// Sub-folders without the configured suffix, or lacking a record or image
/// file, are skipped.
///
/// # Errors
/// Returns [`StorageError::Io`] if `parent` cannot be read.
pub fn scan_parent(
    parent: impl AsRef<Path>,
    options: &FolderScanOptions,
) -> Result<Vec<RecordFolder>, StorageError> {
    let mut folders = Vec::new();
    for entry in sorted_entries(parent.as_ref())? {
        let is_candidate = entry.is_dir()
            && entry
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&options.folder_suffix));
        if !is_candidate {
            continue;
        }
        match RecordFolder::scan(&entry, options) {
            Ok(folder) => folders.push(folder),
            Err(e) => tracing::debug!("Skipping {}: {}", entry.display(), e),
        }
    }
    Ok(folders)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| StorageError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| StorageError::io(dir, e)))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}
