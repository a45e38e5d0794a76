//! Core configuration types.
//! - Settings holds runtime configuration with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{paths, DEFAULT_TEMPLATE, LIBRARY_ROOT_DEFAULT};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for the relocation engine and CLI.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory canonical asset paths live under.
    pub library_root: PathBuf,
    /// Catalog database file.
    pub database: PathBuf,
    /// Storage template string; compiled (and thereby validated) before use.
    pub template: String,
    /// Administrative switch for the whole engine.
    pub enabled: bool,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from(LIBRARY_ROOT_DEFAULT),
            database: paths::default_db_path()
                .unwrap_or_else(|| PathBuf::from("shutter_move.db3")),
            template: DEFAULT_TEMPLATE.to_string(),
            enabled: true,
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path(),
        }
    }
}
