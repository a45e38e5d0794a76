pub const SCHEMA: &str = r#"
-- Users: owners of assets; storage_label overrides the owner id segment
-- in rendered paths.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    storage_label TEXT
);

-- Assets: one row per library asset. `path` is the canonical on-disk
-- location and is only updated after a verified move.
CREATE TABLE IF NOT EXISTS assets (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    path TEXT NOT NULL,
    file_name TEXT NOT NULL,
    checksum TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    kind TEXT NOT NULL DEFAULT 'image',
    read_only INTEGER NOT NULL DEFAULT 0,
    taken_at TEXT,
    modified_at TEXT NOT NULL,
    FOREIGN KEY (owner_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_assets_owner ON assets(owner_id);
CREATE INDEX IF NOT EXISTS idx_assets_path ON assets(path);

-- Move journal: relocation intent per (entity, path kind). Upserted before
-- any filesystem mutation; rows double as history and are never deleted.
CREATE TABLE IF NOT EXISTS asset_moves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id TEXT NOT NULL,
    path_kind TEXT NOT NULL,
    old_path TEXT NOT NULL,
    new_path TEXT NOT NULL,
    changed_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (entity_id, path_kind)
);

CREATE INDEX IF NOT EXISTS idx_asset_moves_entity ON asset_moves(entity_id);

-- Albums back the {{album}} template token.
CREATE TABLE IF NOT EXISTS albums (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS album_assets (
    album_id TEXT NOT NULL,
    asset_id TEXT NOT NULL,
    PRIMARY KEY (album_id, asset_id),
    FOREIGN KEY (album_id) REFERENCES albums(id),
    FOREIGN KEY (asset_id) REFERENCES assets(id)
);
"#;
