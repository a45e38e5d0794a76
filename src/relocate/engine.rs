//! Single-asset relocation: the plan, verify, move, commit protocol.
//!
//! The sequence for one asset:
//! 1. administrative switch, catalog load, read-only guard;
//! 2. journal-driven recovery resolution of the authoritative source;
//! 3. template render and conflict resolution of the target;
//! 4. journal checkpoint (the crash-recovery point);
//! 5. rename, or copy+verify+delete across filesystems;
//! 6. commit of the canonical path.
//!
//! The per-(entity, path kind) lock is held from recovery through commit.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};
use tracing::{debug, info, warn};

use super::conflict::Placement;
use super::{
    atomic, conflict, copy, io_failure, recovery, ConfigSnapshot, FailureReason, KeyedLocks,
    Outcome, SkipReason,
};
use crate::store::{Asset, PathKind, Store};
use crate::template::Token;

pub struct RelocationEngine {
    store: Arc<Store>,
    locks: KeyedLocks,
}

impl RelocationEngine {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Relocate one asset by id. Expected conditions come back as
    /// [`Outcome`] variants; nothing here panics or raises for them.
    pub fn relocate_asset(&self, snapshot: &ConfigSnapshot, asset_id: &str) -> Outcome {
        if !snapshot.enabled {
            return Outcome::Skipped(SkipReason::Disabled);
        }

        let asset = match self.store.asset(asset_id) {
            Ok(Some(asset)) => asset,
            Ok(None) => return Outcome::Failed(FailureReason::AssetMissing(asset_id.to_string())),
            Err(e) => return Outcome::Failed(FailureReason::Store(e.to_string())),
        };
        let storage_label = match self.store.user_storage_label(&asset.owner_id) {
            Ok(label) => label,
            Err(e) => return Outcome::Failed(FailureReason::Store(e.to_string())),
        };

        self.relocate_loaded(snapshot, &asset, storage_label.as_deref())
    }

    /// Relocation for an already-loaded asset; the bulk driver calls this
    /// directly with its cached storage labels.
    pub(super) fn relocate_loaded(
        &self,
        snapshot: &ConfigSnapshot,
        asset: &Asset,
        storage_label: Option<&str>,
    ) -> Outcome {
        if asset.read_only {
            debug!(asset = %asset.id, "read-only asset; leaving in place");
            return Outcome::Skipped(SkipReason::ReadOnly);
        }

        let slot = self.locks.slot(&asset.id, PathKind::Original);
        let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let prior = match self.store.move_for_entity(&asset.id, PathKind::Original) {
            Ok(prior) => prior,
            Err(e) => return Outcome::Failed(FailureReason::Store(e.to_string())),
        };
        let source = match recovery::resolve_source(asset, prior.as_ref()) {
            Ok(source) => source,
            Err(reason) => return Outcome::Failed(reason),
        };

        let album = if snapshot.template.uses(Token::Album) {
            match self.store.album_name_for_asset(&asset.id) {
                Ok(album) => album,
                Err(e) => return Outcome::Failed(FailureReason::Store(e.to_string())),
            }
        } else {
            None
        };
        let ctx = asset.template_context(storage_label, album.as_deref());
        let candidate = snapshot.target_path(&ctx);

        // Common steady state: the file already sits where the template puts
        // it. If an earlier run moved the file but died before committing,
        // finish the commit now.
        if candidate == source {
            return self.settle_in_place(asset, source);
        }

        let target = match conflict::place(&candidate, &source) {
            Placement::Free(target) => target,
            Placement::SourceHolds(slot_path) => return self.settle_in_place(asset, slot_path),
            Placement::Exhausted {
                candidate,
                attempts,
            } => {
                return Outcome::Failed(FailureReason::DestinationExhausted {
                    candidate,
                    attempts,
                })
            }
        };

        // Crash-recovery checkpoint: intent goes to the journal before any
        // filesystem mutation.
        if let Err(e) = self
            .store
            .record_intent(&asset.id, PathKind::Original, &source, &target)
        {
            return Outcome::Failed(FailureReason::Store(e.to_string()));
        }

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return Outcome::Failed(io_failure("create destination directory", parent, e));
            }
        }

        match atomic::try_atomic_rename(&source, &target) {
            Ok(()) => {
                debug!(asset = %asset.id, to = %target.display(), "renamed in place");
            }
            Err(e) if atomic::is_cross_device(&e) => {
                warn!(
                    asset = %asset.id,
                    error = %e,
                    "rename crossed filesystems; falling back to copy"
                );
                if let Err(reason) = copy::copy_across_devices(&source, &target, asset) {
                    return Outcome::Failed(reason);
                }
            }
            Err(e) => return Outcome::Failed(io_failure("rename to destination", &target, e)),
        }

        info!(
            asset = %asset.id,
            from = %source.display(),
            to = %target.display(),
            "relocated asset file"
        );
        self.commit(asset, target)
    }

    /// The source already occupies its target slot. Skip when the catalog
    /// agrees; otherwise complete the interrupted commit.
    fn settle_in_place(&self, asset: &Asset, path: PathBuf) -> Outcome {
        if asset.path == path {
            return Outcome::Skipped(SkipReason::AlreadyInPlace);
        }
        info!(
            asset = %asset.id,
            path = %path.display(),
            "file already at target; committing interrupted move"
        );
        self.commit(asset, path)
    }

    fn commit(&self, asset: &Asset, new_path: PathBuf) -> Outcome {
        match self.store.update_asset_path(&asset.id, &new_path) {
            Ok(()) => Outcome::Success { new_path },
            Err(e) => Outcome::Failed(FailureReason::Store(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;

    fn snapshot(enabled: bool) -> ConfigSnapshot {
        ConfigSnapshot {
            enabled,
            library_root: PathBuf::from("/nonexistent"),
            template: template::compile("{{y}}/{{filename}}").unwrap(),
        }
    }

    #[test]
    fn disabled_engine_skips_before_any_catalog_access() {
        // An uninitialized store has no tables; any query would error, so a
        // Skipped outcome proves the disabled path does no catalog work.
        let store = Arc::new(Store::open_in_memory().unwrap());
        let engine = RelocationEngine::new(store);
        let outcome = engine.relocate_asset(&snapshot(false), "a1");
        assert!(matches!(outcome, Outcome::Skipped(SkipReason::Disabled)));
    }

    #[test]
    fn missing_asset_fails() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store.initialize().unwrap();
        let engine = RelocationEngine::new(store);
        let outcome = engine.relocate_asset(&snapshot(true), "ghost");
        assert!(matches!(
            outcome,
            Outcome::Failed(FailureReason::AssetMissing(id)) if id == "ghost"
        ));
    }
}
