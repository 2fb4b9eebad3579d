use super::issue::VerificationIssue;
use super::package::EntryKind;
use super::slot::SlotId;
use indexmap::IndexMap;

/// What happens to one source path in the renamed copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    /// Copied to a new relative path with its slot token substituted.
    Rename { to: String },
    /// Copied to the same relative path.
    Unchanged,
    /// Left out of the new package.
    Excluded { reason: String },
    /// config.json copied to the same path, each listed string (old → new)
    /// replaced so the manifest names the copy's paths.
    RewriteManifest { rewrites: IndexMap<String, String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub path: String,
    pub kind: EntryKind,
    pub action: PlanAction,
    /// Id of the catalog rule that matched, if any.
    pub rule: Option<String>,
}

impl PlanEntry {
    /// Relative path in the new package, `None` when excluded.
    pub fn destination(&self) -> Option<&str> {
        match &self.action {
            PlanAction::Rename { to } => Some(to),
            PlanAction::Unchanged | PlanAction::RewriteManifest { .. } => Some(&self.path),
            PlanAction::Excluded { .. } => None,
        }
    }
}

/// Complete old → new mapping for a slot change. Pure data; nothing on disk
/// changes until the staging executor consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub source_name: String,
    pub target_name: String,
    pub source_slot: SlotId,
    pub target_slot: SlotId,
    pub entries: Vec<PlanEntry>,
    /// Plan-time warnings (parity flips, files to review by hand).
    pub notes: Vec<VerificationIssue>,
}

impl RenamePlan {
    pub fn renamed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, PlanAction::Rename { .. }))
            .count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.action,
                    PlanAction::Unchanged | PlanAction::RewriteManifest { .. }
                )
            })
            .count()
    }

    pub fn excluded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, PlanAction::Excluded { .. }))
            .count()
    }

    /// Number of files and directories the staged package must contain.
    pub fn planned_outputs(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.destination().is_some())
            .count()
    }

    /// Destination paths in plan order.
    pub fn destinations(&self) -> impl Iterator<Item = (&str, EntryKind)> {
        self.entries
            .iter()
            .filter_map(|e| e.destination().map(|d| (d, e.kind)))
    }
}
