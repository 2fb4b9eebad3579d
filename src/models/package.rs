use super::slot::{FighterCode, FolderSlot, FolderSlotError};

/// Whether a package entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Dir,
}

/// One path beneath a mod root.
///
/// `path` is relative to the root and always `/`-separated, so slot spans
/// found by the extractor are plain byte ranges into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl PackageEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Name of the Arcropolis manifest at the root of a mod.
pub const MANIFEST_FILE: &str = "config.json";

/// What was found at `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ManifestState {
    #[default]
    Absent,
    /// Every key and string value of the manifest, in document order.
    Entries(Vec<String>),
    /// Present but not valid JSON; holds the reader's message.
    Unreadable(String),
}

/// One text node of a `.prcxml` param patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
    /// `hash` attribute of the element holding the text (`n05_index`)
    pub hash: Option<String>,
    pub text: String,
}

impl ParamValue {
    pub fn new(hash: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            hash: hash.map(str::to_string),
            text: text.into(),
        }
    }
}

/// What was read from a `.prcxml` param patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamState {
    /// Non-empty element texts in document order.
    Values(Vec<ParamValue>),
    /// Not well-formed XML; holds the reader's message.
    Unreadable(String),
}

/// A param patch file inside a mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamPatch {
    pub path: String,
    pub state: ParamState,
}

/// A mod folder as seen by the verifier and the planner.
///
/// The declared slot is parsed from the folder name once, at construction,
/// and the fighter codes are fixed by whoever assembled the package.
#[derive(Debug, Clone)]
pub struct ModPackage {
    name: String,
    declared: Result<FolderSlot, FolderSlotError>,
    fighters: Vec<FighterCode>,
    entries: Vec<PackageEntry>,
    manifest: ManifestState,
    params: Vec<ParamPatch>,
}

impl ModPackage {
    pub fn new(
        name: impl Into<String>,
        entries: Vec<PackageEntry>,
        manifest: ManifestState,
        fighters: Vec<FighterCode>,
    ) -> Self {
        let name = name.into();
        let declared = FolderSlot::parse(&name);
        Self {
            name,
            declared,
            fighters,
            entries,
            manifest,
            params: Vec::new(),
        }
    }

    /// Attach the param patches read from the package.
    pub fn with_params(mut self, params: Vec<ParamPatch>) -> Self {
        self.params = params;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> Result<&FolderSlot, &FolderSlotError> {
        self.declared.as_ref()
    }

    pub fn fighters(&self) -> &[FighterCode] {
        &self.fighters
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn manifest(&self) -> &ManifestState {
        &self.manifest
    }

    pub fn params(&self) -> &[ParamPatch] {
        &self.params
    }

    /// Files, plus directories with nothing beneath them.
    ///
    /// Directories that hold other entries are covered by their contents, so
    /// a stray folder with one file produces one finding instead of two.
    pub fn leaf_entries(&self) -> impl Iterator<Item = &PackageEntry> {
        self.entries.iter().filter(move |entry| {
            if !entry.is_dir() {
                return true;
            }
            let prefix = format!("{}/", entry.path);
            !self.entries.iter().any(|other| other.path.starts_with(&prefix))
        })
    }
}
