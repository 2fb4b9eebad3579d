use super::extractor::SlotExtractor;
use super::manifest::{JsonManifestReader, ManifestReader};
use super::param::{PARAM_EXTENSION, ParamReader, XmlParamReader};
use super::walker::{FileWalker, WalkDirWalker, WalkError};
use crate::catalog::Catalog;
use crate::models::{
    FighterCode, MANIFEST_FILE, ManifestState, ModPackage, PackageEntry, ParamPatch, ParamState,
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use thiserror::Error;

/// Extensions of archives people point the tool at before extracting them
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "7z", "rar"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Mod folder not found: {0}")]
    NotFound(Utf8PathBuf),

    #[error("{0} is an archive; extract it first and point slotswap at the extracted folder")]
    Archive(Utf8PathBuf),

    #[error("{0} is not a folder")]
    NotADirectory(Utf8PathBuf),

    #[error("Failed to read folder {path}: {source}")]
    ReadDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// Assembles a [`ModPackage`] from a folder on disk.
pub struct PackageLoader<W = WalkDirWalker, M = JsonManifestReader, P = XmlParamReader> {
    walker: W,
    manifest_reader: M,
    param_reader: P,
}

impl PackageLoader {
    pub fn new() -> Self {
        Self::with_collaborators(
            WalkDirWalker::new(),
            JsonManifestReader::new(),
            XmlParamReader::new(),
        )
    }
}

impl Default for PackageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: FileWalker, M: ManifestReader, P: ParamReader> PackageLoader<W, M, P> {
    pub fn with_collaborators(walker: W, manifest_reader: M, param_reader: P) -> Self {
        Self {
            walker,
            manifest_reader,
            param_reader,
        }
    }

    /// Load a mod folder.
    ///
    /// `fighters` overrides inference when non-empty.
    pub fn load(
        &self,
        root: &Utf8Path,
        catalog: &Catalog,
        fighters: &[FighterCode],
    ) -> Result<ModPackage, LoadError> {
        check_root(root)?;

        let name = folder_name(root)?;
        let entries = self.walker.walk(root)?;

        let manifest = if entries
            .iter()
            .any(|e| e.path == MANIFEST_FILE && !e.is_dir())
        {
            match self.manifest_reader.read(&root.join(MANIFEST_FILE)) {
                Ok(strings) => ManifestState::Entries(strings),
                Err(e) => {
                    tracing::warn!("Manifest of {} could not be read: {}", name, e);
                    ManifestState::Unreadable(e.to_string())
                }
            }
        } else {
            ManifestState::Absent
        };

        let params = self.read_params(root, &entries);

        let fighters = if fighters.is_empty() {
            infer_fighters(&name, &entries, &SlotExtractor::new(catalog))
        } else {
            fighters.to_vec()
        };

        tracing::info!(
            "Loaded {}: {} entries, fighters [{}]",
            name,
            entries.len(),
            fighters
                .iter()
                .map(FighterCode::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let package = ModPackage::new(name, entries, manifest, fighters);
        Ok(package.with_params(params))
    }

    fn read_params(&self, root: &Utf8Path, entries: &[PackageEntry]) -> Vec<ParamPatch> {
        entries
            .iter()
            .filter(|e| !e.is_dir() && is_param_patch(&e.path))
            .map(|e| {
                let state = match self.param_reader.read(&root.join(&e.path)) {
                    Ok(values) => ParamState::Values(values),
                    Err(err) => {
                        tracing::warn!("Param patch {} could not be read: {}", e.path, err);
                        ParamState::Unreadable(err.to_string())
                    }
                };
                ParamPatch {
                    path: e.path.clone(),
                    state,
                }
            })
            .collect()
    }
}

fn is_param_patch(path: &str) -> bool {
    Utf8Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PARAM_EXTENSION))
}

fn check_root(root: &Utf8Path) -> Result<(), LoadError> {
    if !root.exists() {
        return Err(LoadError::NotFound(root.to_path_buf()));
    }
    if root.is_file() {
        let is_archive = root.extension().is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            ARCHIVE_EXTENSIONS.contains(&ext.as_str())
        });
        if is_archive {
            return Err(LoadError::Archive(root.to_path_buf()));
        }
        return Err(LoadError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

fn folder_name(root: &Utf8Path) -> Result<String, LoadError> {
    if let Some(name) = root.file_name() {
        return Ok(name.to_string());
    }
    // `.` or a trailing `..` has no file name until resolved
    root.canonicalize_utf8()
        .ok()
        .and_then(|resolved| resolved.file_name().map(str::to_string))
        .ok_or_else(|| LoadError::NotADirectory(root.to_path_buf()))
}

/// Decide which fighters a mod is about.
///
/// Fighter codes matched in the package that also appear as a word of the
/// folder name win; otherwise the most frequent matched code(s). Empty when
/// nothing fighter-specific matched, which disables the fighter check.
pub fn infer_fighters(
    folder_name: &str,
    entries: &[PackageEntry],
    extractor: &SlotExtractor<'_>,
) -> Vec<FighterCode> {
    let mut tally: IndexMap<FighterCode, usize> = IndexMap::new();
    for entry in entries {
        if let Some(fighter) = extractor.extract(&entry.path).and_then(|m| m.fighter) {
            *tally.entry(fighter).or_default() += 1;
        }
    }

    let words: Vec<String> = folder_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    let named: Vec<FighterCode> = tally
        .keys()
        .filter(|code| words.iter().any(|w| w == code.as_str()))
        .cloned()
        .collect();
    if !named.is_empty() {
        return named;
    }

    let Some(top) = tally.values().copied().max() else {
        return Vec::new();
    };
    tally
        .into_iter()
        .filter(|(_, count)| *count == top)
        .map(|(code, _)| code)
        .collect()
}
