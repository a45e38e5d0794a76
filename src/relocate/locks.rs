//! In-process keyed lock table.
//!
//! Relocation of a given (entity, path kind) must be serialized: concurrent
//! attempts would race on the same journal row. Different keys proceed
//! independently. The table never shrinks; it is bounded by the number of
//! distinct assets touched in a process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::store::PathKind;

#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<(String, PathKind), Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock slot for (entity, kind). Callers hold the returned mutex for
    /// the duration of the recovery-through-commit window.
    pub fn slot(&self, entity_id: &str, kind: PathKind) -> Arc<Mutex<()>> {
        let mut map = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry((entity_id.to_string(), kind))
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_key_returns_same_slot() {
        let locks = KeyedLocks::new();
        let a = locks.slot("a1", PathKind::Original);
        let b = locks.slot("a1", PathKind::Original);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_kinds_do_not_share_a_slot() {
        let locks = KeyedLocks::new();
        let a = locks.slot("a1", PathKind::Original);
        let b = locks.slot("a1", PathKind::ThumbnailSmall);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn holders_of_the_same_key_serialize() {
        let locks = Arc::new(KeyedLocks::new());
        let counter = Arc::new(Mutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                let slot = locks.slot("a1", PathKind::Original);
                let _held = slot.lock().unwrap();
                let mut c = counter.lock().unwrap();
                let before = *c;
                thread::sleep(Duration::from_millis(2));
                *c = before + 1;
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*counter.lock().unwrap(), 8);
    }
}
