//! Path-shape patterns evaluated against `/`-separated relative paths.
//!
//! A pattern is a list of segments, one per path component:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `model` | literal text |
//! | `*` | any run of characters inside one component (may be empty) |
//! | `{fighter}` | fighter code (`[a-z0-9_]+`); repeated occurrences must agree |
//! | `{fighter=kirby}` | fighter code that must be exactly `kirby` |
//! | `{slot}` | `c`-prefixed slot token (`c03`) |
//! | `{slot:bare}` | bare slot token (`03`) |
//! | `{index}` | UI portrait index (`chara_3`); repeated occurrences must agree |
//! | `**` | zero or more trailing components (last segment only) |
//!
//! Slot and index placeholders take the whole digit run, so `c003` is
//! captured as one malformed token instead of failing to match. The caller
//! decides whether the captured token is valid.

use crate::models::SlotFamily;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// One piece of a pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Wildcard,
    Fighter(Option<String>),
    Slot(SlotFamily),
    UiIndex,
}

impl Part {
    fn is_variable(&self) -> bool {
        !matches!(self, Part::Literal(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Component(Vec<Part>),
    Rest,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern '{pattern}' has an empty segment")]
    EmptySegment { pattern: String },

    #[error("pattern '{pattern}': '**' is only allowed as the last segment")]
    MisplacedRest { pattern: String },

    #[error("pattern '{pattern}': unknown placeholder '{{{name}}}'")]
    UnknownPlaceholder { pattern: String, name: String },

    #[error("pattern '{pattern}': unterminated placeholder")]
    Unterminated { pattern: String },

    #[error("pattern '{pattern}' has more than one slot placeholder")]
    MultipleSlots { pattern: String },

    #[error("pattern '{pattern}': segment '{segment}' has two adjacent placeholders")]
    AdjacentVariables { pattern: String, segment: String },
}

/// Spans captured by a successful match, as byte ranges into the matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    pub fighter: Option<Range<usize>>,
    pub slot: Option<(Range<usize>, SlotFamily)>,
    pub index: Option<Range<usize>>,
}

/// A parsed path-shape pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Slot family of the pattern's slot placeholder, if it has one.
    pub fn slot_family(&self) -> Option<SlotFamily> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Component(parts) => parts.iter().find_map(|part| match part {
                Part::Slot(family) => Some(*family),
                _ => None,
            }),
            Segment::Rest => None,
        })
    }

    /// Match `path` against this pattern.
    ///
    /// Pure and total: never panics, never looks at the filesystem.
    pub fn captures(&self, path: &str) -> Option<Captures> {
        let components = split_components(path)?;
        let mut caps = Captures::default();
        let mut position = 0;

        for segment in &self.segments {
            match segment {
                Segment::Rest => return Some(caps),
                Segment::Component(parts) => {
                    let &(offset, text) = components.get(position)?;
                    caps = match_parts(parts, text, offset, path, caps)?;
                    position += 1;
                }
            }
        }

        (position == components.len()).then_some(caps)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }

        let raw: Vec<&str> = source.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut slot_count = 0;

        for (i, segment) in raw.iter().enumerate() {
            if segment.is_empty() {
                return Err(PatternError::EmptySegment {
                    pattern: source.to_string(),
                });
            }
            if *segment == "**" {
                if i + 1 != raw.len() {
                    return Err(PatternError::MisplacedRest {
                        pattern: source.to_string(),
                    });
                }
                segments.push(Segment::Rest);
                continue;
            }

            let parts = parse_component(source, segment)?;
            slot_count += parts.iter().filter(|p| matches!(p, Part::Slot(_))).count();
            segments.push(Segment::Component(parts));
        }

        if slot_count > 1 {
            return Err(PatternError::MultipleSlots {
                pattern: source.to_string(),
            });
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }
}

fn parse_component(pattern: &str, segment: &str) -> Result<Vec<Part>, PatternError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = segment.chars();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                flush_literal(&mut literal, &mut parts);
                parts.push(Part::Wildcard);
            }
            '{' => {
                flush_literal(&mut literal, &mut parts);
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(PatternError::Unterminated {
                                pattern: pattern.to_string(),
                            });
                        }
                    }
                }
                parts.push(placeholder(pattern, &name)?);
            }
            other => literal.push(other),
        }
    }
    flush_literal(&mut literal, &mut parts);

    if parts
        .windows(2)
        .any(|pair| pair[0].is_variable() && pair[1].is_variable())
    {
        return Err(PatternError::AdjacentVariables {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
        });
    }

    Ok(parts)
}

fn flush_literal(literal: &mut String, parts: &mut Vec<Part>) {
    if !literal.is_empty() {
        parts.push(Part::Literal(std::mem::take(literal)));
    }
}

fn placeholder(pattern: &str, name: &str) -> Result<Part, PatternError> {
    match name {
        "fighter" => Ok(Part::Fighter(None)),
        "slot" => Ok(Part::Slot(SlotFamily::Prefixed)),
        "slot:bare" => Ok(Part::Slot(SlotFamily::Bare)),
        "index" => Ok(Part::UiIndex),
        other => match other.strip_prefix("fighter=") {
            Some(code) if !code.is_empty() => Ok(Part::Fighter(Some(code.to_string()))),
            _ => Err(PatternError::UnknownPlaceholder {
                pattern: pattern.to_string(),
                name: other.to_string(),
            }),
        },
    }
}

/// Components with their byte offsets; `None` for empty components (`a//b`, `/a`).
fn split_components(path: &str) -> Option<Vec<(usize, &str)>> {
    let mut components = Vec::new();
    let mut start = 0;
    for (i, byte) in path.bytes().enumerate() {
        if byte == b'/' {
            components.push((start, &path[start..i]));
            start = i + 1;
        }
    }
    components.push((start, &path[start..]));

    if components.iter().any(|(_, c)| c.is_empty()) {
        return None;
    }
    Some(components)
}

fn is_fighter_byte(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_'
}

fn digit_run(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

/// Backtracking match of one component; variable-width parts try the shortest run first.
fn match_parts(
    parts: &[Part],
    text: &str,
    offset: usize,
    path: &str,
    caps: Captures,
) -> Option<Captures> {
    let Some((part, rest)) = parts.split_first() else {
        return text.is_empty().then_some(caps);
    };

    match part {
        Part::Literal(literal) => {
            let remaining = text.strip_prefix(literal.as_str())?;
            match_parts(rest, remaining, offset + literal.len(), path, caps)
        }
        Part::Wildcard => text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .find_map(|end| match_parts(rest, &text[end..], offset + end, path, caps.clone())),
        Part::Fighter(expected) => {
            let longest = text.bytes().take_while(|b| is_fighter_byte(*b)).count();
            (1..=longest).find_map(|end| {
                let code = &text[..end];
                if expected.as_deref().is_some_and(|wanted| wanted != code) {
                    return None;
                }
                let mut next = caps.clone();
                match &caps.fighter {
                    Some(seen) if &path[seen.clone()] != code => return None,
                    Some(_) => {}
                    None => next.fighter = Some(offset..offset + end),
                }
                match_parts(rest, &text[end..], offset + end, path, next)
            })
        }
        Part::Slot(family) => {
            let prefix = match family {
                SlotFamily::Prefixed if text.starts_with(['c', 'C']) => 1,
                SlotFamily::Prefixed => return None,
                SlotFamily::Bare => 0,
            };
            let digits = digit_run(&text[prefix..]);
            if digits == 0 {
                return None;
            }
            let end = prefix + digits;
            let mut next = caps;
            next.slot = Some((offset..offset + end, *family));
            match_parts(rest, &text[end..], offset + end, path, next)
        }
        Part::UiIndex => {
            let end = digit_run(text);
            if end == 0 {
                return None;
            }
            let mut next = caps;
            match &next.index {
                Some(seen) if path[seen.clone()] != text[..end] => return None,
                Some(_) => {}
                None => next.index = Some(offset..offset + end),
            }
            match_parts(rest, &text[end..], offset + end, path, next)
        }
    }
}
