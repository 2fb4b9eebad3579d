// slotswap - slot verification and non-destructive slot changing for Smash Ultimate mods
//
// This is the library crate containing the slot pattern engine and its I/O glue.
// The binary crate (main.rs) provides the command line entry point.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod models;
pub mod report;
pub mod services;

// Re-export commonly used types for convenience
pub use catalog::Catalog;
pub use config::ConfigManager;
pub use models::{AppConfig, ModPackage, RenamePlan, SlotId, VerificationReport};
pub use services::{Session, SlotExtractor};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
