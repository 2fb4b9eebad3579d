use super::extractor::{PathMatch, SlotExtractor};
use super::param::slot_index;
use crate::catalog::{Catalog, Classification, SlotPolicy, suggestions, ui_portrait_meaning};
use crate::models::{
    FolderSlot, FolderSlotError, IssueKind, MANIFEST_FILE, ManifestState, ModPackage,
    PackageEntry, ParamState, Settings, SlotId, VerificationIssue, VerificationReport,
    contains_slot_token,
};
use std::collections::HashSet;

/// Announcer clip prefix; these calls are shared by every mod on a fighter
const NARRATION_PREFIX: &str = "vc_narration_characall";

/// Verifier knobs that come from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyOptions {
    /// Warn about fighter codes outside the known roster, with suggestions
    pub suggest_fighter_codes: bool,
    pub fuzzy_threshold: f64,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            suggest_fighter_codes: false,
            fuzzy_threshold: 0.75,
        }
    }
}

impl From<&Settings> for VerifyOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            suggest_fighter_codes: settings.suggest_fighter_codes,
            fuzzy_threshold: settings.fuzzy_threshold,
        }
    }
}

/// Checks a mod package for slot consistency.
///
/// Verification is pure: it reads only the [`ModPackage`], so running it twice
/// on the same package yields the same report.
#[derive(Debug, Clone)]
pub struct Verifier<'c> {
    extractor: SlotExtractor<'c>,
    options: VerifyOptions,
}

/// Per-run bookkeeping for findings reported once per package or per folder
#[derive(Default)]
struct Seen {
    parity_reported: bool,
    undecided_folders: HashSet<String>,
    unknown_fighters: HashSet<String>,
}

impl<'c> Verifier<'c> {
    pub fn new(catalog: &'c Catalog, options: VerifyOptions) -> Self {
        Self {
            extractor: SlotExtractor::new(catalog),
            options,
        }
    }

    pub fn verify(&self, package: &ModPackage) -> VerificationReport {
        let declared = match package.declared() {
            Ok(declared) => declared,
            Err(e) => {
                // Nothing else can be checked without a slot to compare against
                let kind = match e {
                    FolderSlotError::Missing { .. } => IssueKind::FolderSlotMissing,
                    _ => IssueKind::FolderSlotInvalid,
                };
                tracing::warn!("{}", e);
                return VerificationReport::new(
                    package.name(),
                    vec![VerificationIssue::error(kind, package.name(), e.to_string())],
                );
            }
        };

        let mut issues = Vec::new();
        self.check_manifest(package, declared, &mut issues);
        check_params(package, declared.slot(), &mut issues);

        let mut seen = Seen::default();
        let mut slot_paths = 0;
        for entry in package.leaf_entries() {
            let Some(found) = self.extractor.extract(&entry.path) else {
                continue;
            };
            if found.slot.is_some() {
                slot_paths += 1;
            }
            self.check_path(
                package,
                declared.slot(),
                entry,
                &found,
                &mut seen,
                &mut issues,
            );
        }

        if slot_paths == 0 {
            issues.push(VerificationIssue::warning(
                IssueKind::NoSlotPaths,
                package.name(),
                "no slot-specific files found; is this a one-slot costume mod?",
            ));
        }

        let report = VerificationReport::new(package.name(), issues);
        tracing::info!(
            "Verified {} (slot {}): {} error(s), {} warning(s)",
            package.name(),
            declared.slot(),
            report.error_count(),
            report.warning_count()
        );
        report
    }

    fn check_manifest(
        &self,
        package: &ModPackage,
        declared: &FolderSlot,
        issues: &mut Vec<VerificationIssue>,
    ) {
        match package.manifest() {
            ManifestState::Absent => {}
            ManifestState::Unreadable(reason) => issues.push(VerificationIssue::error(
                IssueKind::ManifestUnreadable,
                MANIFEST_FILE,
                format!("could not be read: {}", reason),
            )),
            ManifestState::Entries(strings) => {
                if !strings.is_empty()
                    && !strings.iter().any(|s| contains_slot_token(s, declared.slot()))
                {
                    issues.push(VerificationIssue::error(
                        IssueKind::ManifestMissingSlot,
                        MANIFEST_FILE,
                        format!(
                            "no entry mentions {}; the manifest does not match the folder's slot",
                            declared.slot()
                        ),
                    ));
                }
            }
        }
    }

    fn check_path(
        &self,
        package: &ModPackage,
        declared: SlotId,
        entry: &PackageEntry,
        found: &PathMatch<'_>,
        seen: &mut Seen,
        issues: &mut Vec<VerificationIssue>,
    ) {
        let path = entry.path.as_str();

        if let Some(capture) = &found.slot {
            match (&capture.value, found.policy) {
                (Err(e), _) => issues.push(VerificationIssue::error(
                    IssueKind::InvalidSlotToken,
                    path,
                    e.to_string(),
                )),
                (Ok(slot), SlotPolicy::FollowMod | SlotPolicy::ParitySensitive)
                    if *slot != declared =>
                {
                    issues.push(VerificationIssue::error(
                        IssueKind::SlotMismatch,
                        path,
                        format!(
                            "path is on slot {} but the folder declares {}",
                            slot, declared
                        ),
                    ));
                }
                (Ok(slot), SlotPolicy::Pinned(pin)) if *slot != pin => {
                    issues.push(VerificationIssue::warning(
                        IssueKind::PinnedSlot,
                        path,
                        format!(
                            "{} always loads from {}; {} is ignored by the game",
                            found.rule.description, pin, slot
                        ),
                    ));
                }
                (Ok(_), SlotPolicy::Undecided) => {
                    let folder = found.slot_folder(path).unwrap_or(path).to_string();
                    if seen.undecided_folders.insert(folder.clone()) {
                        let message = found.rule.verify_note.clone().unwrap_or_else(|| {
                            "slot handling for this path is undecided; confirm by hand".to_string()
                        });
                        issues.push(VerificationIssue::warning(
                            IssueKind::PolicyUndecided,
                            folder,
                            message,
                        ));
                    }
                }
                _ => {}
            }
        }

        if found.policy == SlotPolicy::ParitySensitive && !seen.parity_reported {
            seen.parity_reported = true;
            let note = match found.exception {
                Some(exception) => exception.note.as_str(),
                None => "textures differ between even and odd slots",
            };
            issues.push(VerificationIssue::warning(
                IssueKind::ParitySensitive,
                path,
                format!(
                    "{}; moving between even and odd slots may need different textures",
                    note
                ),
            ));
        }

        if let Some(fighter) = &found.fighter {
            if !package.fighters().is_empty()
                && !found.rule.belongs_to(fighter, package.fighters())
            {
                issues.push(VerificationIssue::warning(
                    IssueKind::FighterMismatch,
                    path,
                    format!(
                        "belongs to '{}', not to this mod's fighter ({}); \
                         possibly an accidental file",
                        fighter,
                        package
                            .fighters()
                            .iter()
                            .map(|f| f.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ));
            }

            if self.options.suggest_fighter_codes
                && !self.extractor.catalog().is_known_fighter(fighter)
                && seen.unknown_fighters.insert(fighter.to_string())
            {
                let close = suggestions(
                    fighter.as_str(),
                    self.extractor.catalog().known_fighters(),
                    self.options.fuzzy_threshold,
                );
                let message = if close.is_empty() {
                    format!("'{}' is not a known fighter code", fighter)
                } else {
                    format!(
                        "'{}' is not a known fighter code; did you mean {}?",
                        fighter,
                        close
                            .iter()
                            .take(3)
                            .map(|c| format!("'{}'", c))
                            .collect::<Vec<_>>()
                            .join(" or ")
                    )
                };
                issues.push(VerificationIssue::warning(
                    IssueKind::UnknownFighterCode,
                    path,
                    message,
                ));
            }
        }

        if let Some(index) = found.index_value()
            && ui_portrait_meaning(index).is_none()
        {
            issues.push(VerificationIssue::warning(
                IssueKind::UiIndexOutOfRange,
                path,
                format!("chara_{} is not a known portrait index", index),
            ));
        }

        if found.policy != SlotPolicy::Undecided {
            let advisory = match (&found.rule.verify_note, found.classification()) {
                (Some(note), _) => Some(note.clone()),
                (None, Classification::Excluded) => Some(format!(
                    "{}; left out of renamed copies",
                    found.rule.description
                )),
                _ => None,
            };
            if let Some(message) = advisory {
                issues.push(VerificationIssue::warning(
                    IssueKind::Advisory,
                    path,
                    message,
                ));
            }
        }
    }
}

/// Findings from readable param patches.
///
/// Param values are never rewritten, so anything keyed to a slot or naming a
/// shared announcer clip is surfaced for the user to check.
fn check_params(package: &ModPackage, declared: SlotId, issues: &mut Vec<VerificationIssue>) {
    for patch in package.params() {
        let values = match &patch.state {
            ParamState::Values(values) => values,
            ParamState::Unreadable(reason) => {
                issues.push(VerificationIssue::warning(
                    IssueKind::ParamUnreadable,
                    &patch.path,
                    format!("could not be read: {}", reason),
                ));
                continue;
            }
        };

        let mut narration = HashSet::new();
        for value in values {
            if let Some(hash) = value.hash.as_deref()
                && let Some(slot) = slot_index(hash)
            {
                let message = if slot == declared {
                    format!(
                        "{} = {} is keyed to {}; it is not renamed with the mod",
                        hash, value.text, slot
                    )
                } else {
                    format!(
                        "{} = {} is keyed to {} but the folder declares {}",
                        hash, value.text, slot, declared
                    )
                };
                issues.push(VerificationIssue::warning(
                    IssueKind::ParamSlotIndex,
                    &patch.path,
                    message,
                ));
            }

            if value.text.starts_with(NARRATION_PREFIX) && narration.insert(value.text.as_str()) {
                issues.push(VerificationIssue::warning(
                    IssueKind::NarrationReference,
                    &patch.path,
                    format!(
                        "names announcer clip {}; every mod on this fighter shares it",
                        value.text
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FighterCode, PackageEntry, ParamPatch, ParamValue, Severity};

    fn captain_package(name: &str, files: &[&str]) -> ModPackage {
        ModPackage::new(
            name,
            files.iter().map(|f| PackageEntry::file(*f)).collect(),
            ManifestState::Absent,
            vec![FighterCode::new("captain")],
        )
    }

    fn verify(package: &ModPackage) -> VerificationReport {
        let catalog = Catalog::builtin();
        Verifier::new(&catalog, VerifyOptions::default()).verify(package)
    }

    #[test]
    fn test_clean_package_passes() {
        let package = captain_package(
            "falcon_c02",
            &[
                "fighter/captain/model/body/c02/model.numatb",
                "ui/replace/chara/chara_0/chara_0_captain_02.bntx",
                "sound/bank/fighter_voice/vc_captain_c02.nus3audio",
                "readme.txt",
            ],
        );
        let report = verify(&package);
        assert!(report.passed(), "{:?}", report.issues);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_folder_slot_halts() {
        let package = captain_package(
            "cool_falcon_mod",
            &["fighter/captain/model/body/c09/model.numatb"],
        );
        let report = verify(&package);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::FolderSlotMissing);
        let message = &report.issues[0].message;
        assert!(message.contains("no slot found in folder name"));
    }

    #[test]
    fn test_slot_mismatch_is_error() {
        let package = captain_package(
            "falcon_c02",
            &[
                "fighter/captain/model/body/c02/model.numatb",
                "fighter/captain/model/body/c03/model.numatb",
            ],
        );
        let report = verify(&package);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors()[0].kind, IssueKind::SlotMismatch);
        assert_eq!(
            report.errors()[0].path,
            "fighter/captain/model/body/c03/model.numatb"
        );
    }

    #[test]
    fn test_invalid_token_is_error() {
        let upper = "fighter/captain/model/body/C02/model.numatb";
        let package = captain_package("falcon_c02", &[upper]);
        let report = verify(&package);
        assert_eq!(report.errors()[0].kind, IssueKind::InvalidSlotToken);
    }

    #[test]
    fn test_stray_fighter_is_warning() {
        let package = captain_package(
            "cool_falcon_mod_c00",
            &[
                "fighter/captain/model/body/c00/model.numatb",
                "fighter/ganon/model/body/c00/model.numatb",
            ],
        );
        let report = verify(&package);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.warnings()[0].kind, IssueKind::FighterMismatch);
    }

    #[test]
    fn test_kirby_cap_warns_once_per_folder() {
        let package = ModPackage::new(
            "kirby_hat_c01",
            vec![
                PackageEntry::file("fighter/kirby/model/copy_captain_cap/c01/model.numdlb"),
                PackageEntry::file("fighter/kirby/model/copy_captain_cap/c01/model.numatb"),
                PackageEntry::file("fighter/kirby/model/body/c01/model.numdlb"),
            ],
            ManifestState::Absent,
            Vec::new(),
        );
        let report = verify(&package);
        let undecided: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::PolicyUndecided)
            .collect();
        assert_eq!(undecided.len(), 1);
        assert_eq!(undecided[0].severity, Severity::Warning);
        assert!(report.passed());
    }

    #[test]
    fn test_kirby_caps_belong_to_kirby_mods() {
        let package = ModPackage::new(
            "kirby_hats_c01",
            vec![
                PackageEntry::file("fighter/kirby/model/body/c01/model.numdlb"),
                PackageEntry::file("fighter/kirby/model/copy_captain_cap/c01/model.numdlb"),
                PackageEntry::file("fighter/kirby/model/copy_captain_cap/c01/model.numatb"),
                PackageEntry::file("fighter/kirby/model/copy_ganon_cap/c01/model.numdlb"),
                PackageEntry::file("fighter/ganon/model/body/c01/model.numdlb"),
            ],
            ManifestState::Absent,
            vec![FighterCode::new("kirby")],
        );
        let report = verify(&package);

        let strays: Vec<&str> = report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::FighterMismatch)
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(strays, vec!["fighter/ganon/model/body/c01/model.numdlb"]);
    }

    #[test]
    fn test_param_patch_findings() {
        let package = captain_package("koopa_c05", &["fighter/captain/model/body/c05/a.numatb"])
            .with_params(vec![
                ParamPatch {
                    path: "ui/param/database/ui_chara_db.prcxml".to_string(),
                    state: ParamState::Values(vec![
                        ParamValue::new(Some("n05_index"), "13"),
                        ParamValue::new(Some("n03_index"), "2"),
                        ParamValue::new(Some("label"), "vc_narration_characall_koopa"),
                        ParamValue::new(Some("label_2"), "vc_narration_characall_koopa"),
                        ParamValue::new(Some("name_id"), "koopa"),
                    ]),
                },
                ParamPatch {
                    path: "ui/param/database/broken.prcxml".to_string(),
                    state: ParamState::Unreadable("unexpected end of stream".to_string()),
                },
            ]);
        let report = verify(&package);
        assert!(report.passed());

        let kinds: Vec<IssueKind> = report.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::ParamSlotIndex,
                IssueKind::ParamSlotIndex,
                IssueKind::NarrationReference,
                IssueKind::ParamUnreadable,
            ]
        );
        let warnings = report.warnings();
        assert!(warnings[0].message.contains("not renamed"));
        assert!(warnings[1].message.contains("folder declares c05"));
        assert!(warnings[2].message.contains("vc_narration_characall_koopa"));
    }

    #[test]
    fn test_wario_parity_warns_once() {
        let package = ModPackage::new(
            "wario_biker_c01",
            vec![
                PackageEntry::file("fighter/wario/model/body/c01/a.nutexb"),
                PackageEntry::file("fighter/wario/model/body/c01/b.nutexb"),
                PackageEntry::file("fighter/wario/model/warioman/c01/c.nutexb"),
            ],
            ManifestState::Absent,
            vec![FighterCode::new("wario")],
        );
        let report = verify(&package);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.warnings()[0].kind, IssueKind::ParitySensitive);
    }

    #[test]
    fn test_pinned_item_slot() {
        let package = captain_package(
            "falcon_c02",
            &[
                "fighter/captain/model/body/c02/model.numatb",
                "item/assist/model/body/c02/model.numdlb",
                "item/assist/model/body/c00/model.numdlb",
            ],
        );
        let report = verify(&package);
        assert!(report.passed());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.warnings()[0].kind, IssueKind::PinnedSlot);
    }

    #[test]
    fn test_ui_index_gap_warns() {
        let package = captain_package(
            "falcon_c02",
            &["ui/replace/chara/chara_9/chara_9_captain_02.bntx"],
        );
        let report = verify(&package);
        assert_eq!(report.warnings()[0].kind, IssueKind::UiIndexOutOfRange);
    }

    #[test]
    fn test_excluded_and_advisory_rules_warn() {
        let package = captain_package(
            "falcon_c02",
            &[
                "fighter/captain/model/body/c02/model.numatb",
                "sound/bank/narration/vc_narration_characall.nus3audio",
                "ui/message/msg_name.msbt",
            ],
        );
        let report = verify(&package);
        assert!(report.passed());
        assert_eq!(report.warning_count(), 2);
        let kinds: Vec<IssueKind> = report.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![IssueKind::Advisory, IssueKind::Advisory]);
    }

    #[test]
    fn test_manifest_checks() {
        let files = vec![
            PackageEntry::file("config.json"),
            PackageEntry::file("fighter/captain/model/body/c02/model.numatb"),
        ];
        let fighters = vec![FighterCode::new("captain")];

        let good = ModPackage::new(
            "falcon_c02",
            files.clone(),
            ManifestState::Entries(vec!["fighter/captain/model/body/c02".to_string()]),
            fighters.clone(),
        );
        assert!(verify(&good).passed());

        let empty = ModPackage::new(
            "falcon_c02",
            files.clone(),
            ManifestState::Entries(Vec::new()),
            fighters.clone(),
        );
        assert!(verify(&empty).passed());

        let wrong = ModPackage::new(
            "falcon_c02",
            files.clone(),
            ManifestState::Entries(vec!["fighter/captain/model/body/c05".to_string()]),
            fighters.clone(),
        );
        assert_eq!(
            verify(&wrong).errors()[0].kind,
            IssueKind::ManifestMissingSlot
        );

        let broken = ModPackage::new(
            "falcon_c02",
            files,
            ManifestState::Unreadable("expected value".to_string()),
            fighters,
        );
        assert_eq!(
            verify(&broken).errors()[0].kind,
            IssueKind::ManifestUnreadable
        );
    }

    #[test]
    fn test_no_slot_paths_warns() {
        let package = captain_package("falcon_c02", &["readme.txt"]);
        let report = verify(&package);
        assert_eq!(report.warnings()[0].kind, IssueKind::NoSlotPaths);
    }

    #[test]
    fn test_unknown_fighter_suggestions_opt_in() {
        let catalog = Catalog::builtin();
        let package = ModPackage::new(
            "falcon_c00",
            vec![PackageEntry::file("fighter/captian/model/body/c00/model.numatb")],
            ManifestState::Absent,
            Vec::new(),
        );

        let quiet = Verifier::new(&catalog, VerifyOptions::default()).verify(&package);
        assert!(quiet.issues.is_empty());

        let options = VerifyOptions {
            suggest_fighter_codes: true,
            ..VerifyOptions::default()
        };
        let report = Verifier::new(&catalog, options).verify(&package);
        assert_eq!(report.warnings()[0].kind, IssueKind::UnknownFighterCode);
        assert!(report.warnings()[0].message.contains("'captain'"));
    }

    #[test]
    fn test_verification_is_idempotent() {
        let package = captain_package(
            "cool_falcon_mod_c00",
            &[
                "fighter/captain/model/body/c00/model.numatb",
                "fighter/ganon/model/body/c00/model.numatb",
                "fighter/captain/model/body/c01/model.numatb",
            ],
        );
        assert_eq!(verify(&package), verify(&package));
    }
}
