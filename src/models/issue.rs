use std::fmt;

/// How serious a verification finding is.
///
/// Errors block slot changing; warnings are shown but renaming proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Category of a verification finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Folder name carries no slot token at all
    FolderSlotMissing,
    /// Folder name carries a malformed or out-of-range slot token
    FolderSlotInvalid,
    /// Path encodes a different slot than the folder declares
    SlotMismatch,
    /// Path has a slot-shaped token that is not a valid slot
    InvalidSlotToken,
    /// Path belongs to a fighter the mod is not about
    FighterMismatch,
    /// Catalog policy for this shape is undecided; user must confirm
    PolicyUndecided,
    /// Textures depend on slot parity (even/odd)
    ParitySensitive,
    /// Shape must keep a fixed slot but doesn't
    PinnedSlot,
    /// UI portrait index outside the documented family
    UiIndexOutOfRange,
    /// Rule-level advice about a matched file
    Advisory,
    /// config.json declares no file for the mod's slot
    ManifestMissingSlot,
    /// config.json exists but is not valid JSON
    ManifestUnreadable,
    /// Fighter code not in the known list
    UnknownFighterCode,
    /// No slot-specific path anywhere in the mod
    NoSlotPaths,
    /// Param patch carries an `nXX_index` entry keyed to a slot
    ParamSlotIndex,
    /// Param patch names an announcer narration clip
    NarrationReference,
    /// `.prcxml` patch is not well-formed XML
    ParamUnreadable,
}

/// A single (severity, path, message) finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub path: String,
    pub message: String,
}

impl VerificationIssue {
    pub fn error(kind: IssueKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn warning(kind: IssueKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for VerificationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Everything the verifier found for one mod folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub package: String,
    pub issues: Vec<VerificationIssue>,
}

impl VerificationReport {
    pub fn new(package: impl Into<String>, issues: Vec<VerificationIssue>) -> Self {
        Self {
            package: package.into(),
            issues,
        }
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(VerificationIssue::is_error)
    }

    /// No errors; warnings are allowed.
    pub fn passed(&self) -> bool {
        !self.has_errors()
    }

    pub fn errors(&self) -> Vec<&VerificationIssue> {
        self.issues.iter().filter(|i| i.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&VerificationIssue> {
        self.issues.iter().filter(|i| !i.is_error()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = VerificationReport::new(
            "mod_c00",
            vec![
                VerificationIssue::error(IssueKind::SlotMismatch, "a", "bad"),
                VerificationIssue::warning(IssueKind::FighterMismatch, "b", "odd"),
                VerificationIssue::warning(IssueKind::Advisory, "c", "note"),
            ],
        );

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert!(report.has_errors());
        assert!(!report.passed());
    }

    #[test]
    fn test_issue_display() {
        let issue =
            VerificationIssue::warning(IssueKind::Advisory, "ui/message/msg_name.msbt", "heads up");
        assert_eq!(
            issue.to_string(),
            "[warning] ui/message/msg_name.msbt: heads up"
        );
    }
}
