//! Path rule catalog - the declarative table behind the slot pattern engine.
//!
//! A [`Catalog`] is an ordered list of [`PathRule`]s, fixed at startup. Each
//! rule pairs a [`Pattern`] with what to do about a match:
//!
//! - [`Classification`]: rename the slot token, only verify it, or leave the
//!   file out of renamed copies
//! - [`SlotPolicy`]: how the captured slot relates to the mod's slot
//! - [`RuleException`]s: per-fighter policy overrides (Wario's parity-sensitive
//!   textures), kept as data so open questions stay visible
//!
//! The catalog is the single point of extension: new rules (built in or from
//! slotswap.yaml) need no extractor or verifier changes.

pub mod fighters;
pub mod pattern;
pub mod rules;

pub use fighters::{KNOWN_FIGHTER_CODES, similarity, suggestions};
pub use pattern::{Captures, Pattern, PatternError};
pub use rules::{NAMED_SUBFOLDERS, UI_PORTRAITS, ui_portrait_meaning};

use crate::models::{CatalogSettings, FighterCode, SlotId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// What the planner does with a path matched by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Slot token is substituted in renamed copies
    Rename,
    /// Checked by the verifier, copied unchanged
    VerifyOnly,
    /// Left out of renamed copies
    Excluded,
}

/// How a captured slot relates to the slot the mod declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Must equal the mod's slot
    FollowMod,
    /// Must stay at a fixed slot whatever the mod's slot is
    Pinned(SlotId),
    /// Nobody knows yet; warn and leave it alone
    Undecided,
    /// Must equal the mod's slot, and textures only carry over between slots of the same parity
    ParitySensitive,
}

/// Broad grouping of rules, named in match logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleFamily {
    Camera,
    Effect,
    FighterModel,
    FighterMotion,
    Item,
    Sound,
    Ui,
    Param,
    Custom,
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleFamily::Camera => "camera",
            RuleFamily::Effect => "effect",
            RuleFamily::FighterModel => "fighter model",
            RuleFamily::FighterMotion => "fighter motion",
            RuleFamily::Item => "item",
            RuleFamily::Sound => "sound",
            RuleFamily::Ui => "ui",
            RuleFamily::Param => "param",
            RuleFamily::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Policy override for one fighter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleException {
    pub fighter: FighterCode,
    pub policy: SlotPolicy,
    pub note: String,
}

/// One family of slot-sensitive paths
#[derive(Debug, Clone)]
pub struct PathRule {
    pub id: String,
    pub family: RuleFamily,
    pub pattern: Pattern,
    pub classification: Classification,
    pub policy: SlotPolicy,
    pub exceptions: Vec<RuleException>,
    /// Fighter whose folder holds the files when the captured fighter is
    /// someone else (Kirby's copy-ability hats)
    pub owner: Option<FighterCode>,
    /// Warning attached to every match at verification time
    pub verify_note: Option<String>,
    /// Warning attached to the rename plan when a match is present
    pub rename_note: Option<String>,
    pub description: String,
}

impl PathRule {
    pub fn new(
        id: &str,
        family: RuleFamily,
        pattern: &str,
        classification: Classification,
    ) -> Result<Self, CatalogError> {
        let pattern = pattern.parse().map_err(|source| CatalogError::Pattern {
            id: id.to_string(),
            source,
        })?;

        Ok(Self {
            id: id.to_string(),
            family,
            pattern,
            classification,
            policy: SlotPolicy::FollowMod,
            exceptions: Vec::new(),
            owner: None,
            verify_note: None,
            rename_note: None,
            description: String::new(),
        })
    }

    pub fn with_policy(mut self, policy: SlotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_exception(mut self, exception: RuleException) -> Self {
        self.exceptions.push(exception);
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(FighterCode::new(owner));
        self
    }

    /// Whether a match captured as `fighter` belongs to one of `fighters`.
    pub fn belongs_to(&self, fighter: &FighterCode, fighters: &[FighterCode]) -> bool {
        fighters.contains(fighter) || self.owner.as_ref().is_some_and(|o| fighters.contains(o))
    }

    pub fn with_verify_note(mut self, note: impl Into<String>) -> Self {
        self.verify_note = Some(note.into());
        self
    }

    pub fn with_rename_note(mut self, note: impl Into<String>) -> Self {
        self.rename_note = Some(note.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Exception applying to `fighter`, if any.
    pub fn exception_for(&self, fighter: Option<&FighterCode>) -> Option<&RuleException> {
        let fighter = fighter?;
        self.exceptions.iter().find(|e| &e.fighter == fighter)
    }

    /// Policy after exceptions for `fighter`.
    pub fn policy_for(&self, fighter: Option<&FighterCode>) -> SlotPolicy {
        self.exception_for(fighter)
            .map_or(self.policy, |exception| exception.policy)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("rule '{id}': {source}")]
    Pattern {
        id: String,
        #[source]
        source: PatternError,
    },

    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),
}

/// Ordered rule table plus the known fighter roster
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<PathRule>,
    known_fighters: Vec<FighterCode>,
}

impl Catalog {
    /// The built-in catalog with no user extensions.
    pub fn builtin() -> Self {
        Self::build(&CatalogSettings::default()).expect("Invalid built-in catalog")
    }

    /// Built-in rules, then the user's extra rules in file order.
    pub fn build(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let mut rules = rules::builtin_rules(&settings.extra_named_subfolders)?;

        for extra in &settings.extra_rules {
            rules.push(
                PathRule::new(
                    &extra.id,
                    RuleFamily::Custom,
                    &extra.pattern,
                    extra.classification,
                )?
                .with_description("user-defined rule"),
            );
        }

        let mut ids = HashSet::new();
        for rule in &rules {
            if !ids.insert(rule.id.as_str()) {
                return Err(CatalogError::DuplicateId(rule.id.clone()));
            }
        }

        let mut known_fighters: Vec<FighterCode> = KNOWN_FIGHTER_CODES
            .iter()
            .map(|code| FighterCode::new(*code))
            .collect();
        for code in &settings.extra_fighter_codes {
            let code = FighterCode::new(code.as_str());
            if !known_fighters.contains(&code) {
                known_fighters.push(code);
            }
        }

        tracing::debug!(
            "Catalog built: {} rules ({} user-defined), {} known fighters",
            rules.len(),
            settings.extra_rules.len(),
            known_fighters.len()
        );

        Ok(Self {
            rules,
            known_fighters,
        })
    }

    pub fn rules(&self) -> &[PathRule] {
        &self.rules
    }

    pub fn known_fighters(&self) -> &[FighterCode] {
        &self.known_fighters
    }

    pub fn is_known_fighter(&self, code: &FighterCode) -> bool {
        self.known_fighters.contains(code)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtraRule;

    fn rule<'c>(catalog: &'c Catalog, id: &str) -> &'c PathRule {
        catalog.rules().iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_builtin_catalog_order() {
        let catalog = Catalog::builtin();
        let position = |id: &str| catalog.rules().iter().position(|r| r.id == id).unwrap();

        // Nested effect model before the plain effect file
        assert!(position("effect-model") < position("effect-file"));
        // Kirby hats before any generic fighter model rule
        assert!(position("kirby-copy-cap") < position("fighter-body"));
        assert!(position("fighter-motion") < position("fighter-motion-flat"));
        let flat = position("fighter-motion-flat");
        assert!(flat < position("fighter-dir-info"));
    }

    #[test]
    fn test_kirby_cap_belongs_to_donor_or_kirby() {
        let catalog = Catalog::builtin();
        let cap = rule(&catalog, "kirby-copy-cap");
        let captain = FighterCode::new("captain");

        assert!(cap.belongs_to(&captain, &[FighterCode::new("kirby")]));
        assert!(cap.belongs_to(&captain, &[captain.clone()]));
        assert!(!cap.belongs_to(&captain, &[FighterCode::new("mario")]));

        let body = rule(&catalog, "fighter-body");
        assert!(!body.belongs_to(&captain, &[FighterCode::new("kirby")]));
    }

    #[test]
    fn test_rule_family_display() {
        let catalog = Catalog::builtin();
        assert_eq!(rule(&catalog, "camera").family.to_string(), "camera");
        assert_eq!(
            rule(&catalog, "fighter-body").family.to_string(),
            "fighter model"
        );
    }

    #[test]
    fn test_wario_exception_policy() {
        let catalog = Catalog::builtin();
        let body = rule(&catalog, "fighter-body");

        assert_eq!(
            body.policy_for(Some(&FighterCode::new("wario"))),
            SlotPolicy::ParitySensitive
        );
        assert_eq!(
            body.policy_for(Some(&FighterCode::new("captain"))),
            SlotPolicy::FollowMod
        );
        assert_eq!(body.policy_for(None), SlotPolicy::FollowMod);
    }

    #[test]
    fn test_extra_rules_appended() {
        let settings = CatalogSettings {
            extra_rules: vec![ExtraRule {
                id: "stage-skin".to_string(),
                pattern: "stage/custom/{fighter}/{slot}/**".to_string(),
                classification: Classification::Rename,
            }],
            extra_fighter_codes: vec!["Sora".to_string()],
            ..CatalogSettings::default()
        };

        let catalog = Catalog::build(&settings).unwrap();
        assert_eq!(catalog.rules().last().unwrap().id, "stage-skin");
        assert_eq!(catalog.rules().last().unwrap().family, RuleFamily::Custom);
        assert!(catalog.is_known_fighter(&FighterCode::new("sora")));
    }

    #[test]
    fn test_invalid_extra_rule_rejected() {
        let settings = CatalogSettings {
            extra_rules: vec![ExtraRule {
                id: "broken".to_string(),
                pattern: "a/{slot}/{slot}".to_string(),
                classification: Classification::Rename,
            }],
            ..CatalogSettings::default()
        };

        assert!(matches!(
            Catalog::build(&settings),
            Err(CatalogError::Pattern { id, .. }) if id == "broken"
        ));
    }

    #[test]
    fn test_duplicate_rule_id_rejected() {
        let settings = CatalogSettings {
            extra_rules: vec![ExtraRule {
                id: "camera".to_string(),
                pattern: "x/{slot}".to_string(),
                classification: Classification::Rename,
            }],
            ..CatalogSettings::default()
        };

        assert_eq!(
            Catalog::build(&settings).unwrap_err(),
            CatalogError::DuplicateId("camera".to_string())
        );
    }

    #[test]
    fn test_every_rename_rule_has_a_slot() {
        for rule in Catalog::builtin().rules() {
            if rule.classification == Classification::Rename {
                assert!(
                    rule.pattern.slot_family().is_some(),
                    "{} has no slot",
                    rule.id
                );
            }
        }
    }
}
