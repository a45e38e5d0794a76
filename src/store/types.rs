//! Catalog row types shared across the crate.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::template::TemplateContext;

/// Media kind of an asset, driving the `{{filetype}}`/`{{filetypefull}}`
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Other,
}

impl AssetKind {
    pub fn name(&self) -> &'static str {
        match self {
            AssetKind::Image => "IMAGE",
            AssetKind::Video => "VIDEO",
            AssetKind::Audio => "AUDIO",
            AssetKind::Other => "OTHER",
        }
    }

    pub fn short_code(&self) -> &'static str {
        match self {
            AssetKind::Video => "VID",
            _ => "IMG",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Audio => "audio",
            AssetKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> AssetKind {
        match s {
            "video" => AssetKind::Video,
            "audio" => AssetKind::Audio,
            "other" => AssetKind::Other,
            _ => AssetKind::Image,
        }
    }
}

/// Category of file being relocated for an asset. The journal is keyed by
/// (entity id, path kind), so each kind tracks its own move independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Original,
    ThumbnailSmall,
    ThumbnailLarge,
    EncodedVideo,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Original => "original",
            PathKind::ThumbnailSmall => "thumbnail_small",
            PathKind::ThumbnailLarge => "thumbnail_large",
            PathKind::EncodedVideo => "encoded_video",
        }
    }
}

/// A catalog asset. Only `path` is ever mutated by this crate, and only by
/// committing a verified move.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: String,
    pub owner_id: String,
    pub path: PathBuf,
    /// Original filename as uploaded, including extension.
    pub file_name: String,
    /// Lowercase hex sha-256 of the file content.
    pub checksum: String,
    pub size: u64,
    pub kind: AssetKind,
    pub read_only: bool,
    pub taken_at: Option<DateTime<Utc>>,
    pub modified_at: DateTime<Utc>,
}

impl Asset {
    /// Original filename stem, without its extension.
    pub fn file_stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }

    /// Original filename extension, or empty when there is none.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        }
    }

    /// Timestamp templates render against: capture time, falling back to the
    /// file-modified time.
    pub fn render_timestamp(&self) -> DateTime<Utc> {
        self.taken_at.unwrap_or(self.modified_at)
    }

    /// Build the read-only render context for this asset.
    pub fn template_context<'a>(
        &'a self,
        storage_label: Option<&'a str>,
        album: Option<&'a str>,
    ) -> TemplateContext<'a> {
        TemplateContext {
            owner_id: &self.owner_id,
            storage_label,
            timestamp: self.render_timestamp(),
            filename: self.file_stem(),
            extension: self.extension(),
            asset_id: &self.id,
            kind: self.kind,
            album,
        }
    }
}

/// Journal entry recording relocation intent for one (entity, path kind).
/// Written before any filesystem mutation; never deleted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub id: i64,
    pub entity_id: String,
    pub path_kind: PathKind,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn asset(file_name: &str) -> Asset {
        Asset {
            id: "a1".into(),
            owner_id: "u1".into(),
            path: PathBuf::from("/lib/a1.jpg"),
            file_name: file_name.into(),
            checksum: "00".into(),
            size: 1,
            kind: AssetKind::Image,
            read_only: false,
            taken_at: None,
            modified_at: Utc.with_ymd_and_hms(2023, 2, 23, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn stem_and_extension_split() {
        let a = asset("IMG_0042.JPG");
        assert_eq!(a.file_stem(), "IMG_0042");
        assert_eq!(a.extension(), "JPG");
    }

    #[test]
    fn dotfile_has_no_extension() {
        let a = asset(".hidden");
        assert_eq!(a.file_stem(), ".hidden");
        assert_eq!(a.extension(), "");
    }

    #[test]
    fn capture_time_wins_over_modified_time() {
        let mut a = asset("x.jpg");
        let taken = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        a.taken_at = Some(taken);
        assert_eq!(a.render_timestamp(), taken);
        a.taken_at = None;
        assert_eq!(a.render_timestamp(), a.modified_at);
    }
}
