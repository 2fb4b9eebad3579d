use crate::catalog::Classification;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configuration from slotswap.yaml
///
/// Every section and field falls back to its default, so an empty or partial
/// file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub settings: Settings,
    pub catalog: CatalogSettings,
}

/// Runtime behaviour of the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory for rolling log files
    pub log_dir: String,

    pub debug_mode: bool,

    /// Mirror log output to stderr
    pub console_logging: bool,

    /// Write the log file as JSON lines
    pub json_logs: bool,

    /// Ask before staging a renamed copy (overridden by `--yes`)
    pub confirm_before_staging: bool,

    /// Warn about fighter codes that are not in the known list
    pub suggest_fighter_codes: bool,

    /// Minimum similarity [0, 1] for a known fighter code to be suggested
    pub fuzzy_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            debug_mode: false,
            console_logging: false,
            json_logs: false,
            confirm_before_staging: true,
            suggest_fighter_codes: false,
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.75
}

/// User extensions to the built-in path rule catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Extra slot-sensitive `fighter/<code>/model/<folder>/c0X` folders, keyed by fighter code
    pub extra_named_subfolders: IndexMap<String, Vec<String>>,

    /// Whole extra rules, matched after every built-in rule
    pub extra_rules: Vec<ExtraRule>,

    /// Fighter codes to treat as known (modded fighters, echo slots)
    pub extra_fighter_codes: Vec<String>,
}

/// A user-defined catalog rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraRule {
    pub id: String,
    pub pattern: String,
    #[serde(default = "default_classification")]
    pub classification: Classification,
}

fn default_classification() -> Classification {
    Classification::Rename
}
