use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Highest costume slot a one-slot mod can occupy (c00-c07).
pub const MAX_SLOT: u8 = 7;

/// Costume slot of a fighter, compared by value and never by its rendered text.
///
/// The default is `c00`, the slot shared items and articles always load from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u8);

impl SlotId {
    pub fn new(value: u8) -> Result<Self, SlotError> {
        if value > MAX_SLOT {
            return Err(SlotError::OutOfRange(u32::from(value)));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Some fighters (Wario) ship different textures for even and odd slots.
    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{:02}", self.0)
    }
}

/// Errors for slots typed by the user (CLI arguments, config values).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot {0} is outside the supported range c00-c07")]
    OutOfRange(u32),

    #[error("'{0}' is not a slot; use a number like 3, 03 or c03")]
    Unparseable(String),
}

impl FromStr for SlotId {
    type Err = SlotError;

    /// Accepts `3`, `03`, `c03` and `C03`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(['c', 'C']).unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SlotError::Unparseable(s.to_string()));
        }

        let value: u32 = digits
            .parse()
            .map_err(|_| SlotError::Unparseable(s.to_string()))?;
        if value > u32::from(MAX_SLOT) {
            return Err(SlotError::OutOfRange(value));
        }
        Ok(Self(value as u8))
    }
}

/// How a rule family writes its slot token inside package paths.
///
/// The two families are not interchangeable: `model/body/c03` never becomes
/// `model/body/03`, and `chara_3_captain_03.bntx` never gains a `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotFamily {
    /// `c00`..`c07`
    Prefixed,
    /// `00`..`07`
    Bare,
}

impl SlotFamily {
    pub fn render(self, slot: SlotId) -> String {
        match self {
            SlotFamily::Prefixed => format!("c{:02}", slot.0),
            SlotFamily::Bare => format!("{:02}", slot.0),
        }
    }

    /// Validate a token whose shape was already recognised by a pattern.
    pub fn parse_token(self, token: &str) -> Result<SlotId, SlotTokenError> {
        let digits = match self {
            SlotFamily::Prefixed => {
                if token.starts_with('C') {
                    return Err(SlotTokenError::UppercasePrefix {
                        token: token.to_string(),
                    });
                }
                token.strip_prefix('c').unwrap_or(token)
            }
            SlotFamily::Bare => token,
        };

        if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SlotTokenError::Width {
                token: token.to_string(),
            });
        }

        let value: u8 = digits.parse().map_err(|_| SlotTokenError::Width {
            token: token.to_string(),
        })?;
        if value > MAX_SLOT {
            return Err(SlotTokenError::OutOfDomain {
                token: token.to_string(),
            });
        }
        Ok(SlotId(value))
    }
}

/// A slot-shaped token inside a package path that is not a valid slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotTokenError {
    #[error("slot token '{token}' has an uppercase prefix; package paths must be lowercase")]
    UppercasePrefix { token: String },

    #[error("slot token '{token}' must have exactly two digits")]
    Width { token: String },

    #[error("slot token '{token}' is outside the c00-c07 range")]
    OutOfDomain { token: String },
}

/// Spelling the user chose for the slot in a mod folder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderSlotStyle {
    /// `cool_mod_c03`
    LowerPrefix,
    /// `cool_mod_C03`
    UpperPrefix,
    /// `cool_mod_03`
    Bare,
}

impl FolderSlotStyle {
    pub fn render(self, slot: SlotId) -> String {
        match self {
            FolderSlotStyle::LowerPrefix => format!("c{:02}", slot.0),
            FolderSlotStyle::UpperPrefix => format!("C{:02}", slot.0),
            FolderSlotStyle::Bare => format!("{:02}", slot.0),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FolderSlotError {
    #[error(
        "'{name}': no slot found in folder name; \
         put 'c0X' or 'C0X' (X is the slot number) somewhere in the name"
    )]
    Missing { name: String },

    #[error("'{name}': slot token '{token}' in folder name must have two digits, like c03")]
    Malformed { name: String, token: String },

    #[error("'{name}': slot {value} in folder name is outside the supported range c00-c07")]
    OutOfRange { name: String, value: u32 },
}

static PREFIXED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[cC](\d+)").expect("Invalid prefixed slot regex"));

static BARE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z])(\d{2})(?:$|[^0-9A-Za-z])").expect("Invalid bare slot regex")
});

/// Slot declared by a mod folder name, remembering where and how it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSlot {
    slot: SlotId,
    style: FolderSlotStyle,
    span: Range<usize>,
}

impl FolderSlot {
    /// Parse the slot token of a folder name.
    ///
    /// The first valid `c0X`/`C0X` token wins, so `Epic2_falcon_c03` and
    /// `Mac10_falcon_c03` are both slot 3. Without one, a bare token counts
    /// if it is two digits delimited by non-alphanumerics (`v2` and `2023`
    /// never do). A name with only unusable prefixed tokens reports the first
    /// of them.
    pub fn parse(name: &str) -> Result<Self, FolderSlotError> {
        let mut first_error = None;

        for found in PREFIXED_TOKEN.find_iter(name) {
            let token = found.as_str();
            let style = if token.starts_with('C') {
                FolderSlotStyle::UpperPrefix
            } else {
                FolderSlotStyle::LowerPrefix
            };

            let parsed = if token.len() == 3 {
                Self::checked(name, &token[1..], style, found.range())
            } else {
                Err(FolderSlotError::Malformed {
                    name: name.to_string(),
                    token: token.to_string(),
                })
            };
            match parsed {
                Ok(slot) => return Ok(slot),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        if let Some(digits) = BARE_TOKEN.captures(name).and_then(|caps| caps.get(1)) {
            return Self::checked(name, digits.as_str(), FolderSlotStyle::Bare, digits.range());
        }

        Err(FolderSlotError::Missing {
            name: name.to_string(),
        })
    }

    fn checked(
        name: &str,
        digits: &str,
        style: FolderSlotStyle,
        span: Range<usize>,
    ) -> Result<Self, FolderSlotError> {
        let value: u32 = digits.parse().map_err(|_| FolderSlotError::Malformed {
            name: name.to_string(),
            token: digits.to_string(),
        })?;
        let slot = u8::try_from(value)
            .ok()
            .and_then(|v| SlotId::new(v).ok())
            .ok_or_else(|| FolderSlotError::OutOfRange {
                name: name.to_string(),
                value,
            })?;

        Ok(Self { slot, style, span })
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn style(&self) -> FolderSlotStyle {
        self.style
    }

    /// Folder name with the slot token swapped for `target`, keeping the user's spelling.
    pub fn rename_folder(&self, name: &str, target: SlotId) -> String {
        format!(
            "{}{}{}",
            &name[..self.span.start],
            self.style.render(target),
            &name[self.span.end..]
        )
    }
}

/// Byte offsets of standalone `c0X` tokens for `slot` inside free text.
///
/// A token must not follow a letter or digit and must not be followed by a
/// digit, so `ef_captain_c03.eff` and `/c03/` count but `mc03` and `c031` don't.
fn slot_token_offsets(text: &str, slot: SlotId) -> Vec<usize> {
    let bytes = text.as_bytes();
    let wanted = [b'0' + slot.0 / 10, b'0' + slot.0 % 10];

    (0..bytes.len())
        .filter(|&i| {
            bytes[i] == b'c'
                && bytes.get(i + 1..i + 3) == Some(&wanted[..])
                && (i == 0 || !bytes[i - 1].is_ascii_alphanumeric())
                && bytes.get(i + 3).is_none_or(|b| !b.is_ascii_digit())
        })
        .collect()
}

pub fn contains_slot_token(text: &str, slot: SlotId) -> bool {
    !slot_token_offsets(text, slot).is_empty()
}

/// Internal code name of a playable character (`captain`, `kirby`, `pzenigame`...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FighterCode(String);

impl FighterCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FighterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FighterCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
