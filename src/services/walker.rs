use crate::models::{EntryKind, PackageEntry};
use camino::Utf8Path;
use std::path::PathBuf;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Failed to list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8(PathBuf),
}

/// Lists everything beneath a mod root.
///
/// Entries come back in a stable order with `/`-separated paths relative to
/// the root; the root itself is not listed.
#[cfg_attr(test, mockall::automock)]
pub trait FileWalker {
    fn walk(&self, root: &Utf8Path) -> Result<Vec<PackageEntry>, WalkError>;
}

/// `walkdir`-backed walker, sorted by file name at every level
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirWalker;

impl WalkDirWalker {
    pub fn new() -> Self {
        Self
    }
}

impl FileWalker for WalkDirWalker {
    fn walk(&self, root: &Utf8Path) -> Result<Vec<PackageEntry>, WalkError> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| WalkError::Io {
                path: root.to_string(),
                source,
            })?;

            let relative = entry
                .path()
                .strip_prefix(root.as_std_path())
                .unwrap_or(entry.path());

            let mut components = Vec::new();
            for component in relative.components() {
                let text = component
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| WalkError::NonUtf8(entry.path().to_path_buf()))?;
                components.push(text);
            }

            let kind = if entry.file_type().is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };

            entries.push(PackageEntry {
                path: components.join("/"),
                kind,
            });
        }

        tracing::debug!("Listed {} entries under {}", entries.len(), root);
        Ok(entries)
    }
}
