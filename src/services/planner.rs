use super::extractor::{PathMatch, SlotExtractor};
use super::param::slot_index;
use crate::catalog::{Catalog, Classification, SlotPolicy};
use crate::models::{
    FolderSlotError, IssueKind, MANIFEST_FILE, ManifestState, ModPackage, ParamState, PlanAction,
    PlanEntry, RenamePlan, SlotId, SlotTokenError, VerificationIssue, VerificationReport,
};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const PARITY_NOTE: &str = "textures differ between even and odd slots";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("verification found {errors} error(s); fix them before changing the slot")]
    Blocked { errors: usize },

    #[error(transparent)]
    MissingFolderSlot(#[from] FolderSlotError),

    #[error("the mod is already on slot {0}; nothing to change")]
    SameSlot(SlotId),

    #[error("'{first}' and '{second}' would both become '{destination}'")]
    Collision {
        first: String,
        second: String,
        destination: String,
    },

    #[error("{path}: {source}")]
    InvalidSlotToken {
        path: String,
        #[source]
        source: SlotTokenError,
    },
}

/// Computes the old → new path mapping for a slot change.
///
/// Planning is pure. Nothing is read from or written to disk.
#[derive(Debug, Clone, Copy)]
pub struct RenamePlanner<'c> {
    extractor: SlotExtractor<'c>,
}

impl<'c> RenamePlanner<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            extractor: SlotExtractor::new(catalog),
        }
    }

    pub fn plan(
        &self,
        package: &ModPackage,
        report: &VerificationReport,
        target: SlotId,
    ) -> Result<RenamePlan, PlanError> {
        if report.has_errors() {
            return Err(PlanError::Blocked {
                errors: report.error_count(),
            });
        }

        let declared = package.declared().map_err(|e| e.clone())?;
        let source = declared.slot();
        if source == target {
            return Err(PlanError::SameSlot(target));
        }

        let manifest = match package.manifest() {
            ManifestState::Entries(strings) => {
                Some(self.manifest_rewrites(strings, source, target))
            }
            _ => None,
        };
        let mut entries = Vec::with_capacity(package.entries().len());
        let mut notes = Vec::new();
        let mut parity_sensitive = None;
        let mut undecided_folders = HashSet::new();
        let mut advised_rules = HashSet::new();

        for entry in package.entries() {
            let path = entry.path.as_str();

            if path == MANIFEST_FILE
                && let Some(rewrites) = &manifest
            {
                let action = if rewrites.is_empty() {
                    PlanAction::Unchanged
                } else {
                    PlanAction::RewriteManifest {
                        rewrites: rewrites.clone(),
                    }
                };
                entries.push(PlanEntry {
                    path: entry.path.clone(),
                    kind: entry.kind,
                    action,
                    rule: None,
                });
                continue;
            }

            let Some(found) = self.extractor.extract(path) else {
                entries.push(PlanEntry {
                    path: entry.path.clone(),
                    kind: entry.kind,
                    action: PlanAction::Unchanged,
                    rule: None,
                });
                continue;
            };

            if let Some(note) = &found.rule.rename_note
                && advised_rules.insert(found.rule.id.as_str())
            {
                notes.push(VerificationIssue::warning(
                    IssueKind::Advisory,
                    path,
                    note.clone(),
                ));
            }

            if found.classification() == Classification::Rename {
                match found.policy {
                    SlotPolicy::Undecided => {
                        if let Some(folder) = found.slot_folder(path)
                            && undecided_folders.insert(folder.to_string())
                        {
                            notes.push(VerificationIssue::warning(
                                IssueKind::PolicyUndecided,
                                folder,
                                format!(
                                    "left at its current slot; confirm this is right for {}",
                                    target
                                ),
                            ));
                        }
                    }
                    SlotPolicy::ParitySensitive if parity_sensitive.is_none() => {
                        let note = found.exception.map(|e| e.note.clone());
                        parity_sensitive = Some((path.to_string(), note));
                    }
                    _ => {}
                }
            }

            let action = action_for(&found, path, source, target).map_err(|e| {
                PlanError::InvalidSlotToken {
                    path: entry.path.clone(),
                    source: e,
                }
            })?;

            entries.push(PlanEntry {
                path: entry.path.clone(),
                kind: entry.kind,
                action,
                rule: Some(found.rule.id.clone()),
            });
        }

        notes.extend(param_notes(package, source, target));

        check_collisions(&entries)?;

        if let Some((path, note)) = parity_sensitive
            && source.is_even() != target.is_even()
        {
            notes.push(VerificationIssue::warning(
                IssueKind::ParitySensitive,
                path,
                format!(
                    "{}; {} and {} have different parity, textures may need replacing",
                    note.unwrap_or_else(|| PARITY_NOTE.to_string()),
                    source,
                    target
                ),
            ));
        }

        let plan = RenamePlan {
            source_name: package.name().to_string(),
            target_name: declared.rename_folder(package.name(), target),
            source_slot: source,
            target_slot: target,
            entries,
            notes,
        };

        tracing::info!(
            "Planned {} -> {}: {} renamed, {} unchanged, {} excluded",
            plan.source_name,
            plan.target_name,
            plan.renamed_count(),
            plan.unchanged_count(),
            plan.excluded_count()
        );

        Ok(plan)
    }

    /// Manifest strings that name a renamed path, mapped to their new text.
    ///
    /// Each string goes through the same rules as the files themselves, so
    /// pinned and undecided paths keep their slot in the manifest too.
    fn manifest_rewrites(
        &self,
        strings: &[String],
        source: SlotId,
        target: SlotId,
    ) -> IndexMap<String, String> {
        strings
            .iter()
            .filter_map(|s| {
                let found = self.extractor.extract(s)?;
                match action_for(&found, s, source, target) {
                    Ok(PlanAction::Rename { to }) => Some((s.clone(), to)),
                    _ => None,
                }
            })
            .collect()
    }
}

/// What happens to one matched path when moving from `source` to `target`.
fn action_for(
    found: &PathMatch<'_>,
    path: &str,
    source: SlotId,
    target: SlotId,
) -> Result<PlanAction, SlotTokenError> {
    match (found.classification(), found.policy) {
        (Classification::Excluded, _) => Ok(PlanAction::Excluded {
            reason: found.rule.description.clone(),
        }),
        (Classification::VerifyOnly, _)
        | (_, SlotPolicy::Pinned(_))
        | (Classification::Rename, SlotPolicy::Undecided) => Ok(PlanAction::Unchanged),
        (Classification::Rename, SlotPolicy::FollowMod | SlotPolicy::ParitySensitive) => {
            let Some(capture) = &found.slot else {
                return Ok(PlanAction::Unchanged);
            };
            match &capture.value {
                Ok(slot) if *slot == source => Ok(found
                    .rewrite(path, target)
                    .map_or(PlanAction::Unchanged, |to| PlanAction::Rename { to })),
                Ok(_) => Ok(PlanAction::Unchanged),
                Err(e) => Err(e.clone()),
            }
        }
    }
}

/// Param entries keyed to the source slot; they are copied as they are.
fn param_notes(package: &ModPackage, source: SlotId, target: SlotId) -> Vec<VerificationIssue> {
    let mut notes = Vec::new();
    for patch in package.params() {
        let ParamState::Values(values) = &patch.state else {
            continue;
        };
        for hash in values.iter().filter_map(|v| v.hash.as_deref()) {
            if slot_index(hash) == Some(source) {
                notes.push(VerificationIssue::warning(
                    IssueKind::ParamSlotIndex,
                    &patch.path,
                    format!(
                        "{} still points at {}; change it to n{:02}_index by hand",
                        hash,
                        source,
                        target.value()
                    ),
                ));
            }
        }
    }
    notes
}

fn check_collisions(entries: &[PlanEntry]) -> Result<(), PlanError> {
    let mut destinations: HashMap<&str, &str> = HashMap::with_capacity(entries.len());
    for entry in entries {
        let Some(destination) = entry.destination() else {
            continue;
        };
        if let Some(first) = destinations.insert(destination, &entry.path) {
            return Err(PlanError::Collision {
                first: first.to_string(),
                second: entry.path.clone(),
                destination: destination.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryKind, FighterCode, PackageEntry, ParamPatch, ParamValue};
    use crate::services::verifier::{Verifier, VerifyOptions};

    fn slot(value: u8) -> SlotId {
        SlotId::new(value).unwrap()
    }

    fn plan(package: &ModPackage, target: u8) -> Result<RenamePlan, PlanError> {
        let catalog = Catalog::builtin();
        let report = Verifier::new(&catalog, VerifyOptions::default()).verify(package);
        RenamePlanner::new(&catalog).plan(package, &report, slot(target))
    }

    fn falcon_package() -> ModPackage {
        ModPackage::new(
            "cool_falcon_mod_c00",
            vec![
                PackageEntry::file("config.json"),
                PackageEntry::dir("fighter"),
                PackageEntry::dir("fighter/captain"),
                PackageEntry::dir("fighter/captain/model"),
                PackageEntry::dir("fighter/captain/model/body"),
                PackageEntry::dir("fighter/captain/model/body/c00"),
                PackageEntry::file("fighter/captain/model/body/c00/model.numatb"),
                PackageEntry::file("ui/replace/chara/chara_0/chara_0_captain_00.bntx"),
                PackageEntry::file("sound/bank/narration/vc_narration_characall.nus3audio"),
                PackageEntry::file("preview.webp"),
            ],
            ManifestState::Entries(vec!["fighter/captain/model/body/c00".to_string()]),
            vec![FighterCode::new("captain")],
        )
    }

    #[test]
    fn test_plan_renames_slot_paths() {
        let plan = plan(&falcon_package(), 1).unwrap();

        assert_eq!(plan.target_name, "cool_falcon_mod_c01");
        let destinations: Vec<Option<&str>> =
            plan.entries.iter().map(|e| e.destination()).collect();
        assert_eq!(
            destinations,
            vec![
                Some("config.json"),
                Some("fighter"),
                Some("fighter/captain"),
                Some("fighter/captain/model"),
                Some("fighter/captain/model/body"),
                Some("fighter/captain/model/body/c01"),
                Some("fighter/captain/model/body/c01/model.numatb"),
                Some("ui/replace/chara/chara_0/chara_0_captain_01.bntx"),
                None,
                Some("preview.webp"),
            ]
        );
        assert_eq!(
            plan.entries[0].action,
            PlanAction::RewriteManifest {
                rewrites: IndexMap::from([(
                    "fighter/captain/model/body/c00".to_string(),
                    "fighter/captain/model/body/c01".to_string(),
                )])
            }
        );
        assert_eq!(plan.entries[5].rule.as_deref(), Some("fighter-body"));
        assert_eq!(plan.entries[5].kind, EntryKind::Dir);
        assert_eq!(plan.renamed_count(), 3);
        assert_eq!(plan.excluded_count(), 1);
    }

    #[test]
    fn test_manifest_rewrites_follow_file_actions() {
        let manifest = [
            "fighter/snake/c00",
            "fighter/snake/model/body/c00/model.numdlb",
            "fighter/kirby/model/copy_snake_cap/c00/model.numdlb",
            "item/assist/model/body/c00/model.numdlb",
            "ui/replace/chara/chara_0/chara_0_snake_00.bntx",
            "sound/bank/narration/vc_narration_characall.nus3audio",
            "fighter/snake/model/body/c03/model.numdlb",
        ];
        let package = ModPackage::new(
            "snake_c00",
            vec![
                PackageEntry::file("config.json"),
                PackageEntry::file("fighter/snake/model/body/c00/model.numdlb"),
                PackageEntry::file("fighter/kirby/model/copy_snake_cap/c00/model.numdlb"),
                PackageEntry::file("item/assist/model/body/c00/model.numdlb"),
                PackageEntry::file("ui/replace/chara/chara_0/chara_0_snake_00.bntx"),
            ],
            ManifestState::Entries(manifest.iter().map(|s| s.to_string()).collect()),
            vec![FighterCode::new("snake")],
        );
        let plan = plan(&package, 1).unwrap();

        let PlanAction::RewriteManifest { rewrites } = &plan.entries[0].action else {
            panic!("manifest not rewritten: {:?}", plan.entries[0].action);
        };
        let pairs: Vec<(&str, &str)> = rewrites
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("fighter/snake/c00", "fighter/snake/c01"),
                (
                    "fighter/snake/model/body/c00/model.numdlb",
                    "fighter/snake/model/body/c01/model.numdlb"
                ),
                (
                    "ui/replace/chara/chara_0/chara_0_snake_00.bntx",
                    "ui/replace/chara/chara_0/chara_0_snake_01.bntx"
                ),
            ]
        );

        // Every renamed file is renamed in the manifest, and nothing else is
        for entry in &plan.entries[1..] {
            match &entry.action {
                PlanAction::Rename { to } => assert_eq!(rewrites.get(&entry.path), Some(to)),
                _ => assert!(!rewrites.contains_key(&entry.path), "{}", entry.path),
            }
        }
    }

    #[test]
    fn test_manifest_without_slot_paths_copied_as_is() {
        let package = ModPackage::new(
            "falcon_c00",
            vec![
                PackageEntry::file("config.json"),
                PackageEntry::file("fighter/captain/model/body/c00/model.numatb"),
            ],
            ManifestState::Entries(vec!["readme.txt".to_string()]),
            vec![FighterCode::new("captain")],
        );
        let plan = plan(&package, 1).unwrap();
        assert_eq!(plan.entries[0].action, PlanAction::Unchanged);
    }

    #[test]
    fn test_param_slot_index_noted() {
        let package = ModPackage::new(
            "koopa_c05",
            vec![PackageEntry::file("fighter/koopa/model/body/c05/model.numdlb")],
            ManifestState::Absent,
            vec![FighterCode::new("koopa")],
        )
        .with_params(vec![ParamPatch {
            path: "ui/param/database/ui_chara_db.prcxml".to_string(),
            state: ParamState::Values(vec![
                ParamValue::new(Some("n05_index"), "13"),
                ParamValue::new(Some("n02_index"), "4"),
            ]),
        }]);
        let plan = plan(&package, 2).unwrap();

        let params: Vec<&VerificationIssue> = plan
            .notes
            .iter()
            .filter(|n| n.kind == IssueKind::ParamSlotIndex)
            .collect();
        assert_eq!(params.len(), 1);
        assert!(params[0].message.contains("n02_index"));
        assert!(params[0].message.starts_with("n05_index"));
    }

    #[test]
    fn test_same_slot_rejected() {
        let result = plan(&falcon_package(), 0);
        assert_eq!(result, Err(PlanError::SameSlot(slot(0))));
    }

    #[test]
    fn test_blocked_by_errors() {
        let package = ModPackage::new(
            "falcon_c00",
            vec![PackageEntry::file("fighter/captain/model/body/c04/model.numatb")],
            ManifestState::Absent,
            vec![FighterCode::new("captain")],
        );
        assert_eq!(plan(&package, 1), Err(PlanError::Blocked { errors: 1 }));
    }

    #[test]
    fn test_missing_folder_slot_rejected() {
        let catalog = Catalog::builtin();
        let package = ModPackage::new("falcon", Vec::new(), ManifestState::Absent, Vec::new());
        let clean = VerificationReport::new("falcon", Vec::new());

        let result = RenamePlanner::new(&catalog).plan(&package, &clean, slot(1));
        assert!(matches!(
            result,
            Err(PlanError::MissingFolderSlot(
                FolderSlotError::Missing { .. }
            ))
        ));
    }

    #[test]
    fn test_collision_detected() {
        let catalog = Catalog::builtin();
        let package = ModPackage::new(
            "falcon_c00",
            vec![
                PackageEntry::file("fighter/captain/model/body/c00/model.numatb"),
                PackageEntry::file("fighter/captain/model/body/c01/model.numatb"),
            ],
            ManifestState::Absent,
            vec![FighterCode::new("captain")],
        );
        // Planning against an empty report to reach the collision check
        let clean = VerificationReport::new("falcon_c00", Vec::new());

        assert!(matches!(
            RenamePlanner::new(&catalog).plan(&package, &clean, slot(1)),
            Err(PlanError::Collision { .. })
        ));
    }

    #[test]
    fn test_undecided_and_pinned_carry_unchanged() {
        let package = ModPackage::new(
            "kirby_hat_c00",
            vec![
                PackageEntry::file("fighter/kirby/model/copy_captain_cap/c00/model.numdlb"),
                PackageEntry::file("fighter/kirby/model/body/c00/model.numdlb"),
                PackageEntry::file("item/assist/model/body/c00/model.numdlb"),
            ],
            ManifestState::Absent,
            vec![FighterCode::new("kirby")],
        );
        let plan = plan(&package, 2).unwrap();

        assert_eq!(plan.entries[0].action, PlanAction::Unchanged);
        assert_eq!(
            plan.entries[1].destination(),
            Some("fighter/kirby/model/body/c02/model.numdlb")
        );
        assert_eq!(plan.entries[2].action, PlanAction::Unchanged);
        let kinds: Vec<IssueKind> = plan.notes.iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&IssueKind::PolicyUndecided));
    }

    #[test]
    fn test_wario_parity_flip_noted() {
        let package = ModPackage::new(
            "wario_c00",
            vec![PackageEntry::file("fighter/wario/model/body/c00/a.nutexb")],
            ManifestState::Absent,
            vec![FighterCode::new("wario")],
        );

        let noted = |target: u8| {
            plan(&package, target)
                .unwrap()
                .notes
                .iter()
                .any(|n| n.kind == IssueKind::ParitySensitive)
        };
        assert!(noted(1));
        assert!(!noted(2));
    }

    #[test]
    fn test_rename_time_advisory() {
        let package = ModPackage::new(
            "falcon_c00",
            vec![
                PackageEntry::file("fighter/captain/model/body/c00/model.numatb"),
                PackageEntry::file("ui/message/msg_name.xmsbt"),
            ],
            ManifestState::Absent,
            vec![FighterCode::new("captain")],
        );
        let plan = plan(&package, 3).unwrap();
        assert_eq!(plan.notes.len(), 1);
        assert_eq!(plan.notes[0].kind, IssueKind::Advisory);
        assert_eq!(plan.entries[1].action, PlanAction::Unchanged);
    }
}
