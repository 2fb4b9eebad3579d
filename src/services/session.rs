use super::package::{LoadError, PackageLoader};
use super::planner::{PlanError, RenamePlanner};
use super::staging::{StagingError, StagingExecutor, StagingReport};
use super::verifier::{Verifier, VerifyOptions};
use crate::catalog::{Catalog, CatalogError};
use crate::models::{
    AppConfig, FighterCode, FolderSlot, FolderSlotError, ModPackage, RenamePlan, SlotId,
    VerificationReport,
};
use camino::{Utf8Path, Utf8PathBuf};

/// Result of verifying one subfolder in batch mode
#[derive(Debug)]
pub enum FolderOutcome {
    Verified(VerificationReport),
    LoadFailed(String),
}

#[derive(Debug)]
pub struct FolderReport {
    pub name: String,
    pub path: Utf8PathBuf,
    pub outcome: FolderOutcome,
}

impl FolderReport {
    pub fn is_failure(&self) -> bool {
        match &self.outcome {
            FolderOutcome::Verified(report) => report.has_errors(),
            FolderOutcome::LoadFailed(_) => true,
        }
    }
}

/// Verification results for every mod folder under a parent folder
#[derive(Debug, Default)]
pub struct BatchReport {
    pub root: Utf8PathBuf,
    pub folders: Vec<FolderReport>,
    /// Subfolders without a slot token in their name
    pub skipped: Vec<String>,
    /// Entries of the parent that could not be read (non UTF-8 names)
    pub unreadable: Vec<String>,
}

impl BatchReport {
    pub fn failed_count(&self) -> usize {
        self.folders.iter().filter(|f| f.is_failure()).count()
    }

    pub fn passed_count(&self) -> usize {
        self.folders.len() - self.failed_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Ties the loader, verifier, planner and executor together for one run.
pub struct Session {
    catalog: Catalog,
    options: VerifyOptions,
    loader: PackageLoader,
    executor: StagingExecutor,
}

impl Session {
    pub fn new(catalog: Catalog, options: VerifyOptions) -> Self {
        Self {
            catalog,
            options,
            loader: PackageLoader::new(),
            executor: StagingExecutor::new(),
        }
    }

    /// Session with the catalog extensions and verifier settings from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let catalog = Catalog::build(&config.catalog)?;
        Ok(Self::new(catalog, VerifyOptions::from(&config.settings)))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn load(
        &self,
        root: &Utf8Path,
        fighters: &[FighterCode],
    ) -> Result<ModPackage, LoadError> {
        self.loader.load(root, &self.catalog, fighters)
    }

    pub fn verify(&self, package: &ModPackage) -> VerificationReport {
        Verifier::new(&self.catalog, self.options.clone()).verify(package)
    }

    pub fn verify_folder(
        &self,
        root: &Utf8Path,
        fighters: &[FighterCode],
    ) -> Result<(ModPackage, VerificationReport), LoadError> {
        let package = self.load(root, fighters)?;
        let report = self.verify(&package);
        Ok((package, report))
    }

    /// Verify every immediate subfolder of `parent` that looks like a slotted mod.
    ///
    /// Folders are independent: a folder that fails to load, or an entry that
    /// cannot be listed, is recorded and the rest are still verified.
    pub fn verify_batch(
        &self,
        parent: &Utf8Path,
        fighters: &[FighterCode],
    ) -> Result<BatchReport, LoadError> {
        if !parent.is_dir() {
            return Err(if parent.exists() {
                LoadError::NotADirectory(parent.to_path_buf())
            } else {
                LoadError::NotFound(parent.to_path_buf())
            });
        }

        let listing = parent
            .read_dir_utf8()
            .map_err(|source| LoadError::ReadDir {
                path: parent.to_path_buf(),
                source,
            })?;

        let mut batch = BatchReport {
            root: parent.to_path_buf(),
            ..BatchReport::default()
        };
        let mut folders = Vec::new();
        for entry in listing {
            match entry.and_then(|e| e.file_type().map(|kind| (e, kind))) {
                Ok((e, kind)) if kind.is_dir() => folders.push(e.path().to_path_buf()),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", parent, e);
                    batch.unreadable.push(e.to_string());
                }
            }
        }
        folders.sort();

        for path in folders {
            let name = path.file_name().unwrap_or(path.as_str()).to_string();
            if let Err(FolderSlotError::Missing { .. }) = FolderSlot::parse(&name) {
                tracing::debug!("Skipping {}: no slot token in name", name);
                batch.skipped.push(name);
                continue;
            }

            let outcome = match self.verify_folder(&path, fighters) {
                Ok((_, report)) => FolderOutcome::Verified(report),
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path, e);
                    FolderOutcome::LoadFailed(e.to_string())
                }
            };
            batch.folders.push(FolderReport {
                name,
                path,
                outcome,
            });
        }

        tracing::info!(
            "Batch verified {} folder(s) under {}: {} passed, {} failed, {} skipped, {} unreadable",
            batch.folders.len(),
            parent,
            batch.passed_count(),
            batch.failed_count(),
            batch.skipped.len(),
            batch.unreadable.len()
        );
        Ok(batch)
    }

    pub fn plan(
        &self,
        package: &ModPackage,
        report: &VerificationReport,
        target: SlotId,
    ) -> Result<RenamePlan, PlanError> {
        RenamePlanner::new(&self.catalog).plan(package, report, target)
    }

    pub fn stage(
        &self,
        root: &Utf8Path,
        plan: &RenamePlan,
    ) -> Result<StagingReport, StagingError> {
        self.executor.execute(root, plan)
    }

    /// Where the renamed copy of `root` will land.
    pub fn destination(
        &self,
        root: &Utf8Path,
        plan: &RenamePlan,
    ) -> Result<Utf8PathBuf, StagingError> {
        self.executor
            .destinations(root, plan)
            .map(|(_, destination)| destination)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Catalog::builtin(), VerifyOptions::default())
    }
}
