//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a commented template file if missing (unless SHUTTER_MOVE_CONFIG
//!   points elsewhere).
//!
//! Unknown XML fields are a hard error so misconfigurations surface early.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{LogLevel, Settings};
use super::{CONFIG_ENV, DEFAULT_TEMPLATE, LIBRARY_ROOT_DEFAULT};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "library_root")]
    library_root: Option<String>,
    #[serde(rename = "database")]
    database: Option<String>,
    #[serde(rename = "template")]
    template: Option<String>,
    #[serde(rename = "enabled")]
    enabled: Option<bool>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

fn xml_to_settings(parsed: XmlConfig) -> Settings {
    let mut settings = Settings::default();

    if let Some(s) = parsed.library_root.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            settings.library_root = PathBuf::from(trimmed);
        }
    }
    if let Some(s) = parsed.database.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            settings.database = PathBuf::from(trimmed);
        }
    }
    if let Some(s) = parsed.template.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            settings.template = trimmed.to_string();
        }
    }
    if let Some(enabled) = parsed.enabled {
        settings.enabled = enabled;
    }
    if let Some(s) = parsed.log_level.as_deref() {
        if let Ok(level) = s.trim().parse::<LogLevel>() {
            settings.log_level = level;
        }
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            settings.log_file = Some(PathBuf::from(trimmed));
        }
    }

    settings
}

/// Load Settings from a specific XML file path.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_settings(parsed))
}

/// Result of resolving configuration at startup.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Settings),
    /// No config existed; a commented template was written for the user to
    /// edit, and the run should stop after pointing them at it.
    CreatedTemplate(PathBuf),
}

/// Resolve configuration: SHUTTER_MOVE_CONFIG wins; otherwise the platform
/// default path, creating a template file there on first run.
pub fn load_or_init() -> Result<LoadOutcome> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        let path = PathBuf::from(p);
        if !path.exists() {
            bail!(
                "{} points at '{}' but no such file exists",
                CONFIG_ENV,
                path.display()
            );
        }
        return Ok(LoadOutcome::Loaded(load_settings_from_path(&path)?));
    }

    let Some(cfg_path) = default_config_path() else {
        return Ok(LoadOutcome::Loaded(Settings::default()));
    };
    if cfg_path.exists() {
        return Ok(LoadOutcome::Loaded(load_settings_from_path(&cfg_path)?));
    }
    create_template_config(&cfg_path)?;
    Ok(LoadOutcome::CreatedTemplate(cfg_path))
}

/// Create the default template config file and parent directory.
/// Refuses symlinked ancestors and keeps conservative permissions.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/shutter_move.log".into());

    let content = format!(
        "<!--\n  shutter_move configuration (XML)\n\n  Fields:\n    library_root -> root directory assets are relocated under\n    database     -> catalog database file (assets, users, move journal)\n    template     -> storage template; tokens like {{{{y}}}}, {{{{MM}}}}, {{{{dd}}}},\n                    {{{{filename}}}}, {{{{assetId}}}}, {{{{album}}}} are substituted\n                    per asset\n    enabled      -> true/false master switch; when false every run is a no-op\n    log_level    -> quiet | normal | info | debug\n    log_file     -> path to log file (optional; stdout is always used)\n\n  Notes:\n    - CLI flags override XML values.\n    - An invalid template fails validation at startup, before any asset is\n      touched.\n-->\n<config>\n  <library_root>{}</library_root>\n  <template>{}</template>\n  <enabled>true</enabled>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n</config>\n",
        LIBRARY_ROOT_DEFAULT, DEFAULT_TEMPLATE, suggested_log
    );

    write_new_0600(path, content.as_bytes())?;
    info!("Created template config at {}", path.display());
    Ok(())
}

/// Create the file fresh (never following an existing symlink) with 0600
/// permissions on Unix.
fn write_new_0600(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write as _;

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
        opts.custom_flags(libc::O_NOFOLLOW);
    }
    let mut file = opts
        .open(path)
        .with_context(|| format!("create config file '{}'", path.display()))?;
    file.write_all(content)?;
    Ok(())
}
