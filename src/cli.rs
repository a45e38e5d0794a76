//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Without --asset, a full migration pass over the catalog runs.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use shutter_move::{LogLevel, Settings};

/// CLI wrapper for the shutter_move library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Relocate media library assets to their storage-template paths"
)]
pub struct Args {
    /// Relocate a single asset by id instead of running a full migration pass.
    #[arg(long, value_name = "ID", help = "Relocate one asset by id")]
    pub asset: Option<String>,

    /// Override the library root directory (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the library root directory")]
    pub library_root: Option<PathBuf>,

    /// Override the catalog database path (normally configured via XML).
    #[arg(long, value_hint = ValueHint::FilePath, help = "Override the catalog database path")]
    pub database: Option<PathBuf>,

    /// Override the storage template string.
    #[arg(long, help = "Override the storage template")]
    pub template: Option<String>,

    /// Treat the engine as administratively disabled for this run.
    #[arg(long, help = "Disable relocation for this run (every asset is skipped)")]
    pub disable: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Write logs to this file in addition to stdout.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Write logs to this file as well")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Print where shutter_move will look for the config file (or
    /// SHUTTER_MOVE_CONFIG if set), then exit.
    #[arg(
        long,
        help = "Print the config file location used by shutter_move and exit"
    )]
    pub print_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to loaded Settings (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(root) = &self.library_root {
            settings.library_root = root.clone();
        }
        if let Some(db) = &self.database {
            settings.database = db.clone();
        }
        if let Some(template) = &self.template {
            settings.template = template.clone();
        }
        if self.disable {
            settings.enabled = false;
        }
        if let Some(level) = self.effective_log_level() {
            settings.log_level = level;
        }
        if let Some(log_file) = &self.log_file {
            settings.log_file = Some(log_file.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn debug_flag_wins_over_log_level() {
        let args = Args::parse_from(["shutter_move", "-d", "--log-level", "quiet"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn overrides_apply_only_when_set() {
        let args = Args::parse_from([
            "shutter_move",
            "--library-root",
            "/tmp/lib",
            "--disable",
        ]);
        let mut settings = Settings::default();
        let template_before = settings.template.clone();
        args.apply_overrides(&mut settings);
        assert_eq!(settings.library_root, PathBuf::from("/tmp/lib"));
        assert!(!settings.enabled);
        assert_eq!(settings.template, template_before);
    }
}
