//! Services module - the slot pattern engine and the I/O around it.
//!
//! The engine itself is pure and never touches the filesystem:
//!
//! - [`SlotExtractor`]: matches a relative path against the catalog and
//!   reports the rule, fighter, slot token and effective policy
//! - [`Verifier`]: turns a [`ModPackage`](crate::models::ModPackage) into a
//!   [`VerificationReport`](crate::models::VerificationReport)
//! - [`RenamePlanner`]: computes the old → new mapping for a target slot
//!
//! Everything that reads or writes disk sits behind small seams:
//!
//! - [`FileWalker`] / [`WalkDirWalker`]: ordered listing of a mod folder
//! - [`ManifestReader`] / [`JsonManifestReader`]: strings from `config.json`
//! - [`ParamReader`] / [`XmlParamReader`]: text values of `.prcxml` param patches
//! - [`PackageLoader`]: assembles a package and infers its fighters
//! - [`StagingExecutor`]: writes the renamed copy through a `WIP_` folder
//!
//! [`Session`] wires them together for the CLI.
//!
//! # Usage Example
//!
//! ```ignore
//! use slotswap::services::Session;
//!
//! let session = Session::default();
//! let (package, report) = session.verify_folder("mods/cool_falcon_mod_c00".into(), &[])?;
//! if report.passed() {
//!     let plan = session.plan(&package, &report, "c01".parse()?)?;
//!     session.stage("mods/cool_falcon_mod_c00".into(), &plan)?;
//! }
//! ```

pub mod extractor;
pub mod manifest;
pub mod package;
pub mod param;
pub mod planner;
pub mod session;
pub mod staging;
pub mod verifier;
pub mod walker;

pub use extractor::{PathMatch, SlotCapture, SlotExtractor};
pub use manifest::{JsonManifestReader, ManifestError, ManifestReader, rewrite_manifest_strings};
pub use package::{LoadError, PackageLoader, infer_fighters};
pub use param::{PARAM_EXTENSION, ParamError, ParamReader, XmlParamReader, slot_index};
pub use planner::{PlanError, RenamePlanner};
pub use session::{BatchReport, FolderOutcome, FolderReport, Session};
pub use staging::{StagingError, StagingExecutor, StagingReport, WIP_PREFIX};
pub use verifier::{Verifier, VerifyOptions};
pub use walker::{FileWalker, WalkDirWalker, WalkError};
