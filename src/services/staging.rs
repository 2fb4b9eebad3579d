use super::manifest::{ManifestError, read_json, rewrite_manifest_strings};
use super::walker::{FileWalker, WalkDirWalker, WalkError};
use crate::models::{EntryKind, PlanAction, RenamePlan};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use thiserror::Error;

/// Prefix of the work-in-progress folder a renamed copy is built in
pub const WIP_PREFIX: &str = "WIP_";

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Destination already exists: {0}")]
    DestinationExists(Utf8PathBuf),

    #[error("Work folder already exists: {0}; remove it or finish the previous run first")]
    WipExists(Utf8PathBuf),

    #[error("{0} has no parent folder to stage next to")]
    NoParent(Utf8PathBuf),

    #[error("{destination} would be written inside the source mod {source_root}")]
    InsideSource {
        source_root: Utf8PathBuf,
        destination: Utf8PathBuf,
    },

    #[error("Failed to stage {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to write manifest {path}: {source}")]
    ManifestWrite {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("Staged {staged} of {planned} planned outputs; the work folder was kept at {wip}")]
    Incomplete {
        planned: usize,
        staged: usize,
        wip: Utf8PathBuf,
    },
}

/// What a successful staging run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingReport {
    pub destination: Utf8PathBuf,
    pub planned: usize,
    pub staged: usize,
    pub excluded: usize,
    /// Strings replaced inside config.json
    pub manifest_edits: usize,
}

/// Builds the renamed copy of a mod next to the original.
///
/// The source is only ever read. Output goes to `WIP_<target>` first and is
/// renamed to its final name once every planned output is found in the work
/// folder; on failure the work folder is left in place for inspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagingExecutor<W = WalkDirWalker> {
    walker: W,
}

impl StagingExecutor {
    pub fn new() -> Self {
        Self::with_walker(WalkDirWalker::new())
    }
}

impl<W: FileWalker> StagingExecutor<W> {
    /// Executor that lists the work folder through `walker` before finishing.
    pub fn with_walker(walker: W) -> Self {
        Self { walker }
    }

    /// Paths the executor will write to for `plan`: (work folder, final folder).
    ///
    /// `source_root` is resolved first, so `.` or `mod/..` stage next to the
    /// real folder rather than inside it.
    pub fn destinations(
        &self,
        source_root: &Utf8Path,
        plan: &RenamePlan,
    ) -> Result<(Utf8PathBuf, Utf8PathBuf), StagingError> {
        let resolved = resolve(source_root)?;
        let parent = resolved
            .parent()
            .ok_or_else(|| StagingError::NoParent(resolved.clone()))?;
        let wip = parent.join(format!("{}{}", WIP_PREFIX, plan.target_name));
        let destination = parent.join(&plan.target_name);

        for path in [&wip, &destination] {
            if path.starts_with(&resolved) {
                return Err(StagingError::InsideSource {
                    source_root: resolved,
                    destination: path.clone(),
                });
            }
        }
        Ok((wip, destination))
    }

    pub fn execute(
        &self,
        source_root: &Utf8Path,
        plan: &RenamePlan,
    ) -> Result<StagingReport, StagingError> {
        let source_root = resolve(source_root)?;
        let (wip, destination) = self.destinations(&source_root, plan)?;

        if destination.exists() {
            return Err(StagingError::DestinationExists(destination));
        }
        if wip.exists() {
            return Err(StagingError::WipExists(wip));
        }

        tracing::info!("Staging {} into {}", plan.source_name, wip);
        create_dir(&wip)?;

        let mut manifest_edits = 0;

        for entry in &plan.entries {
            let Some(relative) = entry.destination() else {
                tracing::debug!("Skipping excluded {}", entry.path);
                continue;
            };
            let from = source_root.join(&entry.path);
            let to = wip.join(relative);

            if let Some(parent) = to.parent() {
                create_dir(parent)?;
            }

            match (&entry.action, entry.kind) {
                (_, EntryKind::Dir) => create_dir(&to)?,
                (PlanAction::RewriteManifest { rewrites }, EntryKind::File) => {
                    let mut value = read_json(&from)?;
                    manifest_edits += rewrite_manifest_strings(&mut value, rewrites);
                    let text = serde_json::to_string_pretty(&value).map_err(|source| {
                        StagingError::ManifestWrite {
                            path: to.clone(),
                            source,
                        }
                    })?;
                    fs::write(&to, text).map_err(|source| StagingError::Io {
                        path: to.clone(),
                        source,
                    })?;
                }
                (_, EntryKind::File) => {
                    fs::copy(&from, &to).map_err(|source| StagingError::Io {
                        path: from.clone(),
                        source,
                    })?;
                }
            }
        }

        // Two destinations differing only in case land on one file on some
        // filesystems; count what is really there
        let present: HashSet<String> = self
            .walker
            .walk(&wip)?
            .into_iter()
            .map(|entry| entry.path)
            .collect();
        let planned = plan.planned_outputs();
        let staged = plan
            .destinations()
            .filter(|(path, _)| present.contains(*path))
            .count();
        if staged != planned {
            tracing::warn!("Only {} of {} outputs found in {}", staged, planned, wip);
            return Err(StagingError::Incomplete {
                planned,
                staged,
                wip,
            });
        }

        fs::rename(&wip, &destination).map_err(|source| StagingError::Io {
            path: wip.clone(),
            source,
        })?;

        tracing::info!(
            "Staged {} outputs to {} ({} manifest edits)",
            staged,
            destination,
            manifest_edits
        );

        Ok(StagingReport {
            destination,
            planned,
            staged,
            excluded: plan.excluded_count(),
            manifest_edits,
        })
    }
}

fn resolve(source_root: &Utf8Path) -> Result<Utf8PathBuf, StagingError> {
    source_root
        .canonicalize_utf8()
        .map_err(|source| StagingError::Io {
            path: source_root.to_path_buf(),
            source,
        })
}

fn create_dir(path: &Utf8Path) -> Result<(), StagingError> {
    fs::create_dir_all(path).map_err(|source| StagingError::Io {
        path: path.to_path_buf(),
        source,
    })
}
