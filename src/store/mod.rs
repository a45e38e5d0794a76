//! SQLite-backed catalog: assets, users, albums, and the move journal.
//!
//! A single connection behind a mutex is enough here: the engine is the only
//! writer (single-writer, single-database assumption) and catalog work is
//! dwarfed by the filesystem work it brackets.

mod moves;
mod schema;
mod types;

pub use schema::SCHEMA;
pub use types::{Asset, AssetKind, MoveRecord, PathKind};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating parent directories if needed) the catalog database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create catalog directory '{}'", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open catalog database '{}'", path.display()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory catalog, used by tests and seeding tools.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory catalog")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create tables and indexes if they do not exist yet.
    pub fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn insert_user(&self, id: &str, storage_label: Option<&str>) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO users (id, storage_label) VALUES (?1, ?2)",
            params![id, storage_label],
        )?;
        Ok(())
    }

    /// The owner's storage label, or None when unset or the user is unknown.
    pub fn user_storage_label(&self, id: &str) -> Result<Option<String>> {
        let label: Option<Option<String>> = self
            .conn()
            .query_row(
                "SELECT storage_label FROM users WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(label.flatten())
    }

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------

    pub fn insert_asset(&self, asset: &Asset) -> Result<()> {
        self.conn().execute(
            "INSERT INTO assets \
             (id, owner_id, path, file_name, checksum, size_bytes, kind, read_only, taken_at, modified_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                asset.id,
                asset.owner_id,
                asset.path.to_string_lossy(),
                asset.file_name,
                asset.checksum,
                asset.size as i64,
                asset.kind.as_str(),
                asset.read_only,
                asset.taken_at.map(|t| t.to_rfc3339()),
                asset.modified_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn asset(&self, id: &str) -> Result<Option<Asset>> {
        let asset = self
            .conn()
            .query_row(
                "SELECT id, owner_id, path, file_name, checksum, size_bytes, kind, read_only, \
                        taken_at, modified_at \
                 FROM assets WHERE id = ?1",
                params![id],
                row_to_asset,
            )
            .optional()?;
        Ok(asset)
    }

    /// Commit a verified move: point the asset's canonical path at `path`.
    pub fn update_asset_path(&self, id: &str, path: &Path) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE assets SET path = ?2 WHERE id = ?1",
            params![id, path.to_string_lossy()],
        )?;
        anyhow::ensure!(changed == 1, "asset '{}' vanished during commit", id);
        Ok(())
    }

    /// One page of assets in ascending id order. Paging by id keeps the bulk
    /// pass deterministic.
    pub fn assets_page(&self, after_id: Option<&str>, limit: u64) -> Result<Vec<Asset>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, path, file_name, checksum, size_bytes, kind, read_only, \
                    taken_at, modified_at \
             FROM assets WHERE id > ?1 ORDER BY id ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![after_id.unwrap_or(""), limit as i64], row_to_asset)?;
        let mut page = Vec::new();
        for row in rows {
            page.push(row?);
        }
        Ok(page)
    }

    pub fn asset_count(&self) -> Result<u64> {
        let n: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    // ------------------------------------------------------------------
    // Albums
    // ------------------------------------------------------------------

    pub fn insert_album(&self, id: &str, name: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO albums (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    pub fn add_album_asset(&self, album_id: &str, asset_id: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO album_assets (album_id, asset_id) VALUES (?1, ?2)",
            params![album_id, asset_id],
        )?;
        Ok(())
    }

    /// Name of an album containing the asset, alphabetically first when the
    /// asset appears in several.
    pub fn album_name_for_asset(&self, asset_id: &str) -> Result<Option<String>> {
        let name = self
            .conn()
            .query_row(
                "SELECT a.name FROM albums a \
                 JOIN album_assets aa ON aa.album_id = a.id \
                 WHERE aa.asset_id = ?1 ORDER BY a.name ASC LIMIT 1",
                params![asset_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }
}

fn row_to_asset(row: &Row<'_>) -> rusqlite::Result<Asset> {
    let path: String = row.get(2)?;
    let kind: String = row.get(6)?;
    let taken_at: Option<String> = row.get(8)?;
    let modified_at: String = row.get(9)?;
    let size: i64 = row.get(5)?;
    Ok(Asset {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        path: path.into(),
        file_name: row.get(3)?,
        checksum: row.get(4)?,
        size: size as u64,
        kind: AssetKind::parse(&kind),
        read_only: row.get(7)?,
        taken_at: taken_at.as_deref().map(|s| parse_ts(s, 8)).transpose()?,
        modified_at: parse_ts(&modified_at, 9)?,
    })
}

fn parse_ts(s: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn sample_asset(id: &str, owner: &str) -> Asset {
        Asset {
            id: id.to_string(),
            owner_id: owner.to_string(),
            path: PathBuf::from(format!("/orig/{id}.jpg")),
            file_name: format!("{id}.jpg"),
            checksum: "abc123".to_string(),
            size: 5000,
            kind: AssetKind::Image,
            read_only: false,
            taken_at: Some(Utc.with_ymd_and_hms(2023, 2, 23, 11, 0, 0).unwrap()),
            modified_at: Utc.with_ymd_and_hms(2023, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    fn store() -> Store {
        let s = Store::open_in_memory().unwrap();
        s.initialize().unwrap();
        s
    }

    #[test]
    fn asset_round_trip() {
        let s = store();
        s.insert_user("u1", None).unwrap();
        s.insert_asset(&sample_asset("a1", "u1")).unwrap();

        let got = s.asset("a1").unwrap().unwrap();
        assert_eq!(got.owner_id, "u1");
        assert_eq!(got.checksum, "abc123");
        assert_eq!(got.size, 5000);
        assert_eq!(
            got.taken_at,
            Some(Utc.with_ymd_and_hms(2023, 2, 23, 11, 0, 0).unwrap())
        );
        assert!(s.asset("missing").unwrap().is_none());
    }

    #[test]
    fn update_asset_path_commits() {
        let s = store();
        s.insert_user("u1", None).unwrap();
        s.insert_asset(&sample_asset("a1", "u1")).unwrap();
        s.update_asset_path("a1", Path::new("/lib/u1/a1.jpg")).unwrap();
        let got = s.asset("a1").unwrap().unwrap();
        assert_eq!(got.path, PathBuf::from("/lib/u1/a1.jpg"));
    }

    #[test]
    fn update_asset_path_rejects_missing_asset() {
        let s = store();
        assert!(s.update_asset_path("ghost", Path::new("/x")).is_err());
    }

    #[test]
    fn storage_label_lookup() {
        let s = store();
        s.insert_user("plain", None).unwrap();
        s.insert_user("labelled", Some("label-1")).unwrap();
        assert_eq!(s.user_storage_label("plain").unwrap(), None);
        assert_eq!(
            s.user_storage_label("labelled").unwrap(),
            Some("label-1".to_string())
        );
        assert_eq!(s.user_storage_label("unknown").unwrap(), None);
    }

    #[test]
    fn paging_is_ordered_by_id() {
        let s = store();
        s.insert_user("u1", None).unwrap();
        for id in ["a3", "a1", "a2"] {
            s.insert_asset(&sample_asset(id, "u1")).unwrap();
        }
        let first = s.assets_page(None, 2).unwrap();
        assert_eq!(
            first.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["a1", "a2"]
        );
        let rest = s.assets_page(Some("a2"), 2).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "a3");
        assert_eq!(s.asset_count().unwrap(), 3);
    }

    #[test]
    fn album_lookup_prefers_first_name() {
        let s = store();
        s.insert_user("u1", None).unwrap();
        s.insert_asset(&sample_asset("a1", "u1")).unwrap();
        s.insert_album("al2", "Zoo").unwrap();
        s.insert_album("al1", "Alps").unwrap();
        s.add_album_asset("al2", "a1").unwrap();
        s.add_album_asset("al1", "a1").unwrap();
        assert_eq!(
            s.album_name_for_asset("a1").unwrap(),
            Some("Alps".to_string())
        );
        assert_eq!(s.album_name_for_asset("a2").unwrap(), None);
    }
}
