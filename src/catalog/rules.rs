//! The built-in rule table.
//!
//! Coverage is practical, not theoretical: these are the slot-specific shapes
//! that show up across real one-slot mods. Order is priority order; the
//! extractor takes the first rule that matches.

use super::{CatalogError, Classification, PathRule, RuleException, RuleFamily, SlotPolicy};
use crate::models::{FighterCode, SlotId};
use indexmap::IndexMap;

/// Fighters whose slot-sensitive model folders are not `body`.
///
/// Enumerated per fighter on purpose: most `fighter/<code>/model/<folder>`
/// trees are shared articles that must not be renamed. Incomplete; extend
/// through `catalog.extra_named_subfolders` in slotswap.yaml.
pub const NAMED_SUBFOLDERS: &[(&str, &[&str])] = &[
    ("wario", &["warioman"]),
    ("snake", &["nikita", "cypher"]),
    ("ike", &["sword"]),
];

/// Meaning of each `ui/replace/chara/chara_N` index. Diagnostics only.
pub const UI_PORTRAITS: &[(u32, &str)] = &[
    (0, "record portrait"),
    (1, "character select / boxing ring portrait"),
    (2, "stock icon"),
    (3, "vs. and results portrait"),
    (4, "battle portrait"),
    (5, "spirit portrait"),
    (6, "final smash portrait"),
    (7, "character select icon"),
    (10, "Pokémon Trainer masks"),
    (12, "boss portrait"),
    (13, "unmasked Joker battle portrait"),
];

pub fn ui_portrait_meaning(index: u32) -> Option<&'static str> {
    UI_PORTRAITS
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, meaning)| *meaning)
}

const KIRBY_CAP_NOTE: &str = "Kirby copy-ability hat: unclear whether it should follow \
     Kirby's slot or this fighter's slot; it is left at its current slot, confirm by hand";

const NARRATION_DESCRIPTION: &str = "announcer call; replaces the announcer for every slot \
     and causes file conflicts between slots";

const NARRATION_NOTE: &str = "announcer voice lines have no one-slot form; \
     this file affects every slot and is left out of renamed copies";

fn wario_parity() -> RuleException {
    RuleException {
        fighter: FighterCode::new("wario"),
        policy: SlotPolicy::ParitySensitive,
        note: "Wario's overalls textures differ between even and odd slots".to_string(),
    }
}

fn rule(
    id: &str,
    family: RuleFamily,
    pattern: &str,
    classification: Classification,
) -> Result<PathRule, CatalogError> {
    PathRule::new(id, family, pattern, classification)
}

/// Build the built-in rules, with extra named subfolders merged into the table.
pub fn builtin_rules(
    extra_named: &IndexMap<String, Vec<String>>,
) -> Result<Vec<PathRule>, CatalogError> {
    use Classification::{Excluded, Rename, VerifyOnly};

    let mut rules = vec![
        rule(
            "camera",
            RuleFamily::Camera,
            "camera/fighter/{fighter}/{slot}/**",
            Rename,
        )?
        .with_description("fighter camera animations"),
        rule(
            "effect-model",
            RuleFamily::Effect,
            "effect/fighter/{fighter}/model/*_{slot}/**",
            Rename,
        )?
        .with_description("per-slot effect model"),
        rule(
            "effect-trail",
            RuleFamily::Effect,
            "effect/fighter/{fighter}/trail_{slot}/**",
            Rename,
        )?
        .with_description("per-slot effect trail"),
        rule(
            "effect-file",
            RuleFamily::Effect,
            "effect/fighter/{fighter}/ef_{fighter}_{slot}.eff",
            Rename,
        )?
        .with_description("per-slot effect container"),
        rule(
            "kirby-copy-cap",
            RuleFamily::FighterModel,
            "fighter/kirby/model/copy_{fighter}_cap/{slot}/**",
            Rename,
        )?
        .with_policy(SlotPolicy::Undecided)
        .with_owner("kirby")
        .with_description("Kirby copy-ability hat for another fighter")
        .with_verify_note(KIRBY_CAP_NOTE),
    ];

    let mut named: IndexMap<String, Vec<String>> = NAMED_SUBFOLDERS
        .iter()
        .map(|(fighter, folders)| {
            (
                fighter.to_string(),
                folders.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect();
    for (fighter, folders) in extra_named {
        let entry = named.entry(fighter.to_ascii_lowercase()).or_default();
        for folder in folders {
            if !entry.contains(folder) {
                entry.push(folder.clone());
            }
        }
    }
    for (fighter, folders) in &named {
        for folder in folders {
            rules.push(
                rule(
                    &format!("fighter-named:{fighter}/{folder}"),
                    RuleFamily::FighterModel,
                    &format!("fighter/{{fighter={fighter}}}/model/{folder}/{{slot}}/**"),
                    Rename,
                )?
                .with_exception(wario_parity())
                .with_description(format!("{fighter} {folder} model")),
            );
        }
    }

    rules.extend([
        rule(
            "fighter-body",
            RuleFamily::FighterModel,
            "fighter/{fighter}/model/body/{slot}/**",
            Rename,
        )?
        .with_exception(wario_parity())
        .with_description("fighter body model"),
        rule(
            "fighter-motion",
            RuleFamily::FighterMotion,
            "fighter/{fighter}/motion/body/{slot}/**",
            Rename,
        )?
        .with_description("per-slot fighter animations"),
        rule(
            "fighter-motion-flat",
            RuleFamily::FighterMotion,
            "fighter/{fighter}/motion/{slot}/**",
            Rename,
        )?
        .with_description("per-slot fighter animations"),
        rule(
            "fighter-dir-info",
            RuleFamily::FighterModel,
            "fighter/{fighter}/{slot}",
            Rename,
        )?
        .with_description("per-slot fighter folder as named in config.json"),
        rule(
            "item",
            RuleFamily::Item,
            "item/*/model/*/{slot}/**",
            VerifyOnly,
        )?
        .with_policy(SlotPolicy::Pinned(SlotId::default()))
        .with_description("item model; items only load from c00 and are never renamed"),
        rule(
            "sound-voice",
            RuleFamily::Sound,
            "sound/bank/fighter_voice/vc_{fighter}_{slot}.*",
            Rename,
        )?
        .with_description("per-slot voice bank"),
        rule(
            "sound-effect",
            RuleFamily::Sound,
            "sound/bank/fighter/se_{fighter}_{slot}.*",
            Rename,
        )?
        .with_description("per-slot sound effect bank"),
        rule(
            "ui-chara",
            RuleFamily::Ui,
            "ui/replace/chara/chara_{index}/chara_{index}_{fighter}_{slot:bare}.*",
            Rename,
        )?
        .with_description("character portrait"),
        rule(
            "ui-chara-patch",
            RuleFamily::Ui,
            "ui/replace_patch/chara/chara_{index}/chara_{index}_{fighter}_{slot:bare}.*",
            Rename,
        )?
        .with_description("character portrait"),
        rule(
            "narration",
            RuleFamily::Sound,
            "sound/bank/narration/vc_narration_characall.*",
            Excluded,
        )?
        .with_description(NARRATION_DESCRIPTION)
        .with_verify_note(NARRATION_NOTE),
        rule(
            "msg-name",
            RuleFamily::Param,
            "ui/message/msg_name.msbt",
            VerifyOnly,
        )?
        .with_description("full character name table")
        .with_verify_note(
            "msg_name.msbt replaces names for every slot; \
             prefer a msg_name.xmsbt param patch for one-slot mods",
        ),
        rule(
            "msg-name-patch",
            RuleFamily::Param,
            "ui/message/msg_name.xmsbt",
            VerifyOnly,
        )?
        .with_description("character name param patch")
        .with_rename_note(
            "msg_name.xmsbt is copied as-is; \
             its per-slot name entries may still point at the old slot",
        ),
        rule(
            "chara-db",
            RuleFamily::Param,
            "ui/param/database/ui_chara_db.prc",
            VerifyOnly,
        )?
        .with_description("full character database")
        .with_verify_note(
            "ui_chara_db.prc replaces the database for every slot; \
             prefer a .prcxml param patch for one-slot mods",
        ),
        rule(
            "chara-db-patch",
            RuleFamily::Param,
            "ui/param/database/ui_chara_db.prcx*",
            VerifyOnly,
        )?
        .with_description("character database param patch")
        .with_rename_note(
            "ui_chara_db param patch is copied as-is; slot-indexed entries are not remapped",
        ),
    ]);

    Ok(rules)
}
