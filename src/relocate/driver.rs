//! Bulk migration: run the single-asset protocol over the whole catalog.
//!
//! Assets are paged in ascending id order, which also fixes the order in
//! which colliding assets pick up `+1`, `+2`, … suffixes. One asset's
//! failure is recorded and the batch continues; ctrl-c stops the pass at the
//! next asset boundary.

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use super::{conflict, ConfigSnapshot, Outcome, RelocationEngine};
use crate::shutdown;
use crate::store::Asset;
use crate::template::Token;

const PAGE_SIZE: u64 = 1000;

/// Aggregate result of a migration pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
    /// True when the pass stopped early on a shutdown request.
    pub interrupted: bool,
}

impl MigrationSummary {
    pub fn total(&self) -> u64 {
        self.succeeded + self.skipped + self.failed
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} relocated, {} skipped, {} failed",
            self.succeeded, self.skipped, self.failed
        )?;
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}

impl RelocationEngine {
    /// Relocate every asset in the catalog, page by page.
    pub fn relocate_all(&self, snapshot: &ConfigSnapshot) -> MigrationSummary {
        let mut summary = MigrationSummary::default();
        if !snapshot.enabled {
            info!("storage template disabled; migration pass is a no-op");
            return summary;
        }

        let mut last_id: Option<String> = None;
        'pages: loop {
            let page = match self.store().assets_page(last_id.as_deref(), PAGE_SIZE) {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "failed to read assets page; aborting migration pass");
                    summary.failed += 1;
                    break;
                }
            };
            if page.is_empty() {
                break;
            }

            // Resolve each owner's storage label once per page and reuse it
            // for every asset that owner has in the page.
            let mut labels: HashMap<String, Option<String>> = HashMap::new();
            for asset in &page {
                if shutdown::is_requested() {
                    summary.interrupted = true;
                    break 'pages;
                }
                let label = labels
                    .entry(asset.owner_id.clone())
                    .or_insert_with(|| {
                        self.store()
                            .user_storage_label(&asset.owner_id)
                            .unwrap_or_else(|e| {
                                warn!(owner = %asset.owner_id, error = %e, "storage label lookup failed; using owner id");
                                None
                            })
                    })
                    .clone();

                if self.already_migrated(snapshot, asset, label.as_deref()) {
                    debug!(asset = %asset.id, "current path already matches the template");
                    summary.skipped += 1;
                    continue;
                }

                match self.relocate_loaded(snapshot, asset, label.as_deref()) {
                    Outcome::Success { .. } => summary.succeeded += 1,
                    Outcome::Skipped(_) => summary.skipped += 1,
                    Outcome::Failed(reason) => {
                        warn!(asset = %asset.id, error = %reason, "relocation failed; continuing batch");
                        summary.failed += 1;
                    }
                }
            }
            last_id = page.last().map(|a| a.id.clone());
        }

        info!(
            relocated = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "migration pass finished"
        );
        summary
    }

    /// Cheap pre-check with no filesystem probing: the asset is where the
    /// template wants it, or sits beside the target under a `+N` suffix from
    /// an earlier pass (a likely duplicate that was already disambiguated).
    fn already_migrated(
        &self,
        snapshot: &ConfigSnapshot,
        asset: &Asset,
        storage_label: Option<&str>,
    ) -> bool {
        let album = if snapshot.template.uses(Token::Album) {
            self.store()
                .album_name_for_asset(&asset.id)
                .unwrap_or_default()
        } else {
            None
        };
        let ctx = asset.template_context(storage_label, album.as_deref());
        let target = snapshot.target_path(&ctx);

        if asset.path == target {
            return true;
        }
        if asset.path.parent() == target.parent() {
            let current = asset.path.file_name().and_then(|s| s.to_str());
            let wanted = target.file_name().and_then(|s| s.to_str());
            if let (Some(current), Some(wanted)) = (current, wanted) {
                if conflict::strip_conflict_suffix(current).as_deref() == Some(wanted) {
                    return true;
                }
            }
        }
        false
    }
}
