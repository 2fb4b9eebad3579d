//! slotswap - slot verification and non-destructive slot changing for Smash Ultimate mods
//!
//! Main entry point for the command line tool.
//!
//! # Execution Flow
//!
//! 1. Parse arguments and load `slotswap.yaml` from the config directory
//! 2. Initialize logging → `<config dir>/logs/slotswap.<date>`
//! 3. Build the path rule catalog (built-in rules plus config extensions)
//! 4. Verify the mod folder (or every slotted subfolder with `--batch`)
//! 5. For `rename`: print the full old → new plan, confirm, then stage the
//!    copy through a `WIP_` folder and print its tree
//!
//! # Exit Status
//!
//! - `0`: success
//! - `1`: verification errors, a failing batch folder, or an aborted rename
//! - `2`: bad input (missing folder, unzipped archive, invalid slot, same slot)

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use slotswap::catalog::CatalogError;
use slotswap::models::{AppConfig, FighterCode, SlotId};
use slotswap::report;
use slotswap::services::{FileWalker, LoadError, PlanError, Session, WalkDirWalker};
use slotswap::{APP_NAME, ConfigManager, VERSION};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "slotswap",
    version,
    about = "Verify and change the costume slot of Smash Ultimate mods"
)]
struct Cli {
    /// Directory holding slotswap.yaml
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    config_dir: Utf8PathBuf,

    /// Debug-level logging, regardless of the config file
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that every slot-specific path matches the slot in the folder name
    Verify {
        /// Mod folder (or, with --batch, a folder of mod folders)
        #[arg(value_name = "MOD")]
        path: Utf8PathBuf,

        /// Verify every subfolder with a slot in its name
        #[arg(long)]
        batch: bool,

        /// Fighter code(s) the mod is for; inferred when omitted
        #[arg(long = "fighter", value_name = "CODE")]
        fighters: Vec<String>,
    },

    /// Create a copy of the mod moved to another slot; the original is never modified
    Rename {
        #[arg(value_name = "MOD")]
        path: Utf8PathBuf,

        /// Target slot: 3, 03, c03 or C03
        #[arg(value_name = "SLOT")]
        slot: SlotId,

        /// Print the plan and stop
        #[arg(long)]
        dry_run: bool,

        /// Do not ask for confirmation before writing
        #[arg(long)]
        yes: bool,

        #[arg(long = "fighter", value_name = "CODE")]
        fighters: Vec<String>,
    },

    /// Write a default slotswap.yaml into the config directory
    InitConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_manager = ConfigManager::new(&cli.config_dir);

    if let Command::InitConfig = cli.command {
        return match config_manager.init() {
            Ok(true) => {
                println!("Wrote {}", config_manager.config_path());
                ExitCode::SUCCESS
            }
            Ok(false) => {
                let path = config_manager.config_path();
                println!("{} already exists; left untouched", path);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match config_manager.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let log_dir = cli.config_dir.join(&config.settings.log_dir);
    // Logging is best-effort; a read-only directory must not block verification
    let _guard = match slotswap::logging::setup_logging_with_options(
        log_dir.as_str(),
        APP_NAME,
        cli.debug || config.settings.debug_mode,
        config.settings.console_logging,
        config.settings.json_logs,
    ) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<ExitCode> {
    let session = Session::from_config(config).context("Invalid catalog in config")?;

    match command {
        Command::Verify {
            path,
            batch,
            fighters,
        } => verify(&session, &path, batch, &fighter_codes(&fighters)),
        Command::Rename {
            path,
            slot,
            dry_run,
            yes,
            fighters,
        } => {
            let confirm = !yes && config.settings.confirm_before_staging;
            let fighters = fighter_codes(&fighters);
            rename(&session, &path, slot, dry_run, confirm, &fighters)
        }
        Command::InitConfig => Ok(ExitCode::SUCCESS),
    }
}

fn verify(
    session: &Session,
    path: &Utf8Path,
    batch: bool,
    fighters: &[FighterCode],
) -> Result<ExitCode> {
    if batch {
        let batch = session.verify_batch(path, fighters)?;
        print!("{}", report::render_batch(&batch));
        return Ok(exit_status(!batch.has_failures()));
    }

    let (_, verification) = session.verify_folder(path, fighters)?;
    print!("{}", report::render_verification(&verification));
    Ok(exit_status(verification.passed()))
}

fn rename(
    session: &Session,
    path: &Utf8Path,
    target: SlotId,
    dry_run: bool,
    confirm: bool,
    fighters: &[FighterCode],
) -> Result<ExitCode> {
    let (package, verification) = session.verify_folder(path, fighters)?;
    print!("{}", report::render_verification(&verification));
    if verification.has_errors() {
        eprintln!("Not renaming: fix the errors above first");
        return Ok(ExitCode::FAILURE);
    }

    let plan = session.plan(&package, &verification, target)?;
    println!();
    print!("{}", report::render_plan(&plan));

    if dry_run {
        println!("Dry run: nothing was written");
        return Ok(ExitCode::SUCCESS);
    }

    let destination = session.destination(path, &plan)?;
    if confirm && !ask(&format!("Create {}?", destination))? {
        tracing::info!("Rename of {} aborted by user", plan.source_name);
        println!("Aborted; nothing was written");
        return Ok(ExitCode::FAILURE);
    }

    let staged = session.stage(path, &plan)?;
    println!();
    print!("{}", report::render_staging(&staged));

    let entries = WalkDirWalker::new()
        .walk(&staged.destination)
        .with_context(|| format!("Failed to list {}", staged.destination))?;
    print!("{}", report::render_tree(&plan.target_name, &entries));

    Ok(ExitCode::SUCCESS)
}

fn ask(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    let answer = answer.trim().to_ascii_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

fn fighter_codes(raw: &[String]) -> Vec<FighterCode> {
    raw.iter().map(|code| FighterCode::new(code.as_str())).collect()
}

fn exit_status(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// 2 for problems with what the user pointed us at, 1 for everything else.
fn exit_code_for(error: &anyhow::Error) -> u8 {
    let input_error = error.downcast_ref::<LoadError>().is_some()
        || error.downcast_ref::<CatalogError>().is_some()
        || matches!(
            error.downcast_ref::<PlanError>(),
            Some(PlanError::SameSlot(_) | PlanError::MissingFolderSlot(_))
        );
    if input_error { 2 } else { 1 }
}
