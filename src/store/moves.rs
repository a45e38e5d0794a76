//! Move journal accessor.
//!
//! One active record per (entity, path kind), enforced by a UNIQUE constraint
//! and written as an upsert so "create if absent, update otherwise" is a
//! single statement. The record is the sole source of truth for resuming an
//! interrupted move and is never deleted here.

use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use std::path::Path;

use super::{MoveRecord, PathKind, Store};

impl Store {
    /// The active journal entry for (entity, path kind), if any.
    pub fn move_for_entity(&self, entity_id: &str, kind: PathKind) -> Result<Option<MoveRecord>> {
        let record = self
            .conn()
            .query_row(
                "SELECT id, entity_id, path_kind, old_path, new_path \
                 FROM asset_moves WHERE entity_id = ?1 AND path_kind = ?2",
                params![entity_id, kind.as_str()],
                row_to_move,
            )
            .optional()?;
        Ok(record)
    }

    /// Record relocation intent before touching the filesystem. Overwrites
    /// any prior record for the same (entity, path kind).
    pub fn record_intent(
        &self,
        entity_id: &str,
        kind: PathKind,
        old_path: &Path,
        new_path: &Path,
    ) -> Result<MoveRecord> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO asset_moves (entity_id, path_kind, old_path, new_path) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (entity_id, path_kind) DO UPDATE SET \
                 old_path = excluded.old_path, \
                 new_path = excluded.new_path, \
                 changed_at = CURRENT_TIMESTAMP",
            params![
                entity_id,
                kind.as_str(),
                old_path.to_string_lossy(),
                new_path.to_string_lossy(),
            ],
        )?;
        let record = conn.query_row(
            "SELECT id, entity_id, path_kind, old_path, new_path \
             FROM asset_moves WHERE entity_id = ?1 AND path_kind = ?2",
            params![entity_id, kind.as_str()],
            row_to_move,
        )?;
        Ok(record)
    }
}

fn row_to_move(row: &Row<'_>) -> rusqlite::Result<MoveRecord> {
    let kind: String = row.get(2)?;
    let old_path: String = row.get(3)?;
    let new_path: String = row.get(4)?;
    Ok(MoveRecord {
        id: row.get(0)?,
        entity_id: row.get(1)?,
        path_kind: match kind.as_str() {
            "thumbnail_small" => PathKind::ThumbnailSmall,
            "thumbnail_large" => PathKind::ThumbnailLarge,
            "encoded_video" => PathKind::EncodedVideo,
            _ => PathKind::Original,
        },
        old_path: old_path.into(),
        new_path: new_path.into(),
    })
}
