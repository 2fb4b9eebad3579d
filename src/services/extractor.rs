use crate::catalog::{Catalog, Classification, PathRule, RuleException, SlotPolicy};
use crate::models::{FighterCode, SlotFamily, SlotId, SlotTokenError};
use std::ops::Range;

/// The slot-shaped token a rule captured in a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCapture {
    /// Byte range of the token in the matched path
    pub span: Range<usize>,
    pub token: String,
    pub family: SlotFamily,
    /// Parsed slot, or why the token is not a valid slot
    pub value: Result<SlotId, SlotTokenError>,
}

/// Outcome of matching one relative path against the catalog
#[derive(Debug, Clone)]
pub struct PathMatch<'c> {
    pub rule: &'c PathRule,
    pub fighter: Option<FighterCode>,
    pub slot: Option<SlotCapture>,
    /// UI portrait index digits (`chara_N`)
    pub index: Option<String>,
    /// Rule policy after fighter exceptions
    pub policy: SlotPolicy,
    pub exception: Option<&'c RuleException>,
}

impl PathMatch<'_> {
    pub fn classification(&self) -> Classification {
        self.rule.classification
    }

    /// Valid slot encoded in the path, if any.
    pub fn slot_value(&self) -> Option<SlotId> {
        self.slot
            .as_ref()
            .and_then(|capture| capture.value.as_ref().ok().copied())
    }

    pub fn index_value(&self) -> Option<u32> {
        self.index.as_deref().and_then(|digits| digits.parse().ok())
    }

    /// `path` with the slot token replaced by `target` in the capture's own family.
    ///
    /// Only the captured span changes; everything else is kept byte for byte.
    /// `None` when there is no valid slot to replace.
    pub fn rewrite(&self, path: &str, target: SlotId) -> Option<String> {
        let capture = self.slot.as_ref()?;
        capture.value.as_ref().ok()?;

        let mut rewritten = String::with_capacity(path.len());
        rewritten.push_str(&path[..capture.span.start]);
        rewritten.push_str(&capture.family.render(target));
        rewritten.push_str(&path[capture.span.end..]);
        Some(rewritten)
    }

    /// Path prefix ending at the slot token (`fighter/kirby/model/copy_captain_cap/c00`).
    pub fn slot_folder<'p>(&self, path: &'p str) -> Option<&'p str> {
        self.slot.as_ref().map(|capture| &path[..capture.span.end])
    }
}

/// Classifies relative package paths using the catalog's rules in priority order.
#[derive(Debug, Clone, Copy)]
pub struct SlotExtractor<'c> {
    catalog: &'c Catalog,
}

impl<'c> SlotExtractor<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// First matching rule wins; `None` means the path is not slot-sensitive.
    ///
    /// Fails closed: a slot-shaped token that is too wide, uppercase or out of
    /// range still produces a match, with the token error as its slot value.
    pub fn extract(&self, path: &str) -> Option<PathMatch<'c>> {
        let (rule, captures) = self
            .catalog
            .rules()
            .iter()
            .find_map(|rule| rule.pattern.captures(path).map(|caps| (rule, caps)))?;

        let fighter = captures.fighter.map(|span| FighterCode::new(&path[span]));

        let slot = captures.slot.map(|(span, family)| {
            let token = path[span.clone()].to_string();
            let value = family.parse_token(&token);
            SlotCapture {
                span,
                token,
                family,
                value,
            }
        });

        let index = captures.index.map(|span| path[span].to_string());
        let exception = rule.exception_for(fighter.as_ref());
        let policy = rule.policy_for(fighter.as_ref());

        tracing::debug!(
            "{} matched rule {} ({}, slot: {:?})",
            path,
            rule.id,
            rule.family,
            slot.as_ref().map(|s| s.token.as_str())
        );

        Some(PathMatch {
            rule,
            fighter,
            slot,
            index,
            policy,
            exception,
        })
    }
}
