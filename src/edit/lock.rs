//! Per-file advisory locks for the read-validate-write sequence.
//!
//! Only serializes callers inside one process. Two processes editing the
//! same file can still interleave.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Lock table keyed by canonical file path.
#[derive(Debug, Default)]
pub struct FileLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `path`.
    ///
    /// The table entry is dropped again once no other caller holds or waits
    /// on it, so the table only ever holds files with an edit in flight.
    pub fn with_lock<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let lock = self.table().entry(key.clone()).or_default().clone();

        let result = {
            // The guarded value is `()`, so a poisoned lock is still sound.
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f()
        };

        let mut table = self.table();
        // One reference in the table, one here.
        if Arc::strong_count(&lock) == 2 {
            table.remove(&key);
        }
        result
    }

    /// Number of files with an edit in flight.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_same_path_is_serialized() {
        let locks = Arc::new(FileLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    locks.with_lock(Path::new("shared.go"), || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_returns_closure_value() {
        let locks = FileLocks::new();
        assert!(locks.is_empty());
        assert_eq!(locks.with_lock(Path::new("a.go"), || 42), 42);
        locks.with_lock(Path::new("b.go"), || ());
        assert!(locks.is_empty());
    }

    #[test]
    fn test_entry_held_while_in_use() {
        let locks = FileLocks::new();
        locks.with_lock(Path::new("a.go"), || {
            assert_eq!(locks.len(), 1);
            locks.with_lock(Path::new("b.go"), || assert_eq!(locks.len(), 2));
            assert_eq!(locks.len(), 1);
        });
        assert!(locks.is_empty());
    }

    #[test]
    fn test_table_does_not_grow_with_distinct_paths() {
        let locks = FileLocks::new();
        for i in 0..500 {
            locks.with_lock(Path::new(&format!("file{}.go", i)), || ());
        }
        assert!(locks.is_empty());
    }
}
