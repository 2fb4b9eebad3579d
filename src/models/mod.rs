//! Data models for slotswap.
//!
//! This module contains the plain data that flows between the pattern engine
//! and the I/O around it:
//! - [`SlotId`], [`SlotFamily`], [`FolderSlot`]: slot values and the two ways they are spelled
//! - [`ModPackage`]: a mod folder's name, declared slot, fighter codes, relative entries
//!   and the param patches it carries
//! - [`VerificationIssue`] / [`VerificationReport`]: verifier output
//! - [`RenamePlan`]: old → new path mapping consumed by the staging executor
//! - [`AppConfig`]: settings and catalog extensions loaded from `slotswap.yaml`
//!
//! None of these types touch the filesystem.

pub mod config;
pub mod issue;
pub mod package;
pub mod plan;
pub mod slot;

pub use config::{AppConfig, CatalogSettings, ExtraRule, Settings};
pub use issue::{IssueKind, Severity, VerificationIssue, VerificationReport};
pub use package::{
    EntryKind, MANIFEST_FILE, ManifestState, ModPackage, PackageEntry, ParamPatch, ParamState,
    ParamValue,
};
pub use plan::{PlanAction, PlanEntry, RenamePlan};
pub use slot::{
    FighterCode, FolderSlot, FolderSlotError, FolderSlotStyle, MAX_SLOT, SlotError, SlotFamily,
    SlotId, SlotTokenError, contains_slot_token,
};
