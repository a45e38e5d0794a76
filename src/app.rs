//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! validates settings, opens the catalog, and dispatches the relocation run.

use anyhow::{bail, Result};
use std::sync::{Arc, Mutex};
use tracing::debug;

use shutter_move::config::{load_or_init, LoadOutcome, CONFIG_ENV};
use shutter_move::output as out;
use shutter_move::{
    default_config_path, shutdown, ConfigSnapshot, Outcome, RelocationEngine, Store,
};

use crate::cli::Args;
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
            out::print_info(&format!("Using {} (explicit):\n  {}\n", CONFIG_ENV, cfg_env));
            out::print_info(&format!(
                "To override, unset {} or set it to another file.",
                CONFIG_ENV
            ));
            return Ok(());
        }
        match default_config_path() {
            Some(p) => {
                out::print_info(&format!(
                    "Default shutter_move config path:\n  {}\n",
                    p.display()
                ));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there yet. Run without --print-config to create a template.",
                    );
                }
            }
            None => {
                out::print_error("Could not determine a default config path.");
            }
        }
        return Ok(());
    }

    let mut settings = match load_or_init()? {
        LoadOutcome::CreatedTemplate(path) => {
            out::print_success(&format!(
                "A template shutter_move config was written to: {}",
                path.display()
            ));
            out::print_info(
                "Edit the file to set `library_root`, `database`, `template` and optionally `log_level` and `log_file`, then re-run this command.",
            );
            out::print_info(&format!(
                "To use a different location set {}.",
                CONFIG_ENV
            ));
            return Ok(());
        }
        LoadOutcome::Loaded(settings) => settings,
    };

    // Apply CLI overrides (CLI wins)
    args.apply_overrides(&mut settings);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt: Option<tracing_appender::non_blocking::WorkerGuard> =
        init_tracing(&settings.log_level, settings.log_file.as_deref(), args.json).map_err(
            |e| {
                out::print_error(&format!("Failed to initialize logging: {}", e));
                e
            },
        )?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing the current asset then stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .expect("failed to install signal handler");
    }

    if shutdown::is_requested() {
        return Ok(());
    }

    debug!("Starting shutter_move: {:?}", args);

    // Main run (so we can drop the guard after)
    let result = (|| -> Result<()> {
        let template = settings.validate()?;

        let store = Store::open(&settings.database)?;
        store.initialize()?;
        let engine = RelocationEngine::new(Arc::new(store));

        let snapshot = ConfigSnapshot {
            enabled: settings.enabled,
            library_root: settings.library_root.clone(),
            template,
        };

        match args.asset.as_deref() {
            Some(asset_id) => run_single(&engine, &snapshot, asset_id),
            None => run_migration(&engine, &snapshot),
        }
    })();

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn run_single(engine: &RelocationEngine, snapshot: &ConfigSnapshot, asset_id: &str) -> Result<()> {
    match engine.relocate_asset(snapshot, asset_id) {
        Outcome::Success { new_path } => {
            out::print_success(&format!(
                "Relocated asset {} -> {}",
                asset_id,
                new_path.display()
            ));
            Ok(())
        }
        Outcome::Skipped(reason) => {
            out::print_info(&format!("Skipped asset {}: {}", asset_id, reason.describe()));
            Ok(())
        }
        Outcome::Failed(reason) => {
            out::print_error(&format!("Failed to relocate asset {}: {}", asset_id, reason));
            bail!("relocation failed: {}", reason)
        }
    }
}

fn run_migration(engine: &RelocationEngine, snapshot: &ConfigSnapshot) -> Result<()> {
    let summary = engine.relocate_all(snapshot);
    out::print_user(&format!("Migration pass: {}", summary));
    if summary.interrupted {
        out::print_warn("Pass was interrupted; re-run to continue where it left off.");
    }
    if summary.failed > 0 {
        out::print_warn(&format!(
            "{} asset(s) failed; details are in the log. Re-running is safe.",
            summary.failed
        ));
    }
    Ok(())
}
