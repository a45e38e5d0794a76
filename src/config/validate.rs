//! Settings validation.
//! Verifies the library root and database location, and compiles the storage
//! template so a bad token is rejected before any asset is touched.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::types::Settings;
use crate::template::{self, CompiledTemplate};

impl Settings {
    /// Validate paths and the template. Returns the compiled template so the
    /// caller can build its configuration snapshot without re-parsing.
    pub fn validate(&self) -> Result<CompiledTemplate> {
        // 1) Library root: must be a directory; create if missing; writable.
        ensure_dir_is_or_create(&self.library_root, "library_root")?;
        ensure_writable(&self.library_root, "library_root")?;

        // 2) Database: parent directory must exist (created best-effort here;
        //    the store creates it again on open).
        if let Some(parent) = self.database.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory '{}'", parent.display())
                })?;
            }
        }

        // 3) Template: compiles or the run stops here.
        let template = template::compile(&self.template)
            .with_context(|| format!("invalid storage template '{}'", self.template))?;

        info!(
            "Config validated: library='{}' database='{}' template='{}' enabled={}",
            self.library_root.display(),
            self.database.display(),
            self.template,
            self.enabled,
        );
        Ok(template)
    }
}

/// Ensure directory exists (create if missing). If it exists, it must be a
/// directory.
fn ensure_dir_is_or_create(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            error!("{name} exists but isn't a directory: {}", path.display());
            bail!("{name} exists but isn't a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create {name} directory '{}'", path.display()))?;
        info!("Created {name} directory: {}", path.display());
    }
    Ok(())
}

/// Ensure directory is writable using a non-destructive probe file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    let probe = path.join(format!(".shutter_move_probe_{}.tmp", std::process::id()));
    match fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)
    {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            debug!("{name} writable: {}", path.display());
            Ok(())
        }
        Err(e) => {
            bail!(
                "Cannot write to {name} '{}': {}. Check directory permissions.",
                path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_library_root() {
        let td = tempdir().unwrap();
        let settings = Settings {
            library_root: td.path().join("library"),
            database: td.path().join("catalog.db3"),
            ..Settings::default()
        };
        settings.validate().unwrap();
        assert!(settings.library_root.is_dir());
    }

    #[test]
    fn rejects_bad_template_before_any_io() {
        let td = tempdir().unwrap();
        let settings = Settings {
            library_root: td.path().to_path_buf(),
            database: td.path().join("catalog.db3"),
            template: "{{nope}}".to_string(),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(format!("{err:#}").contains("invalid storage template"));
    }

    #[test]
    fn rejects_file_as_library_root() {
        let td = tempdir().unwrap();
        let file = td.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();
        let settings = Settings {
            library_root: file,
            database: td.path().join("catalog.db3"),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
