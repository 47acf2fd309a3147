// Author: Dustin Pilgrim
// License: MIT

//! Read/write coordination for backing-store access.
//!
//! Every tree backed by the same file shares one lock; trees backed by
//! unrelated files never contend. Node mutation itself is not covered.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

static REGISTRY: Lazy<Mutex<HashMap<PathBuf, Weak<RwLock<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone)]
pub(crate) struct StoreGuard {
    lock: Arc<RwLock<()>>,
}

impl StoreGuard {
    /// A guard not shared with anything, for trees without a backing path.
    pub(crate) fn detached() -> Self {
        StoreGuard { lock: Arc::new(RwLock::new(())) }
    }

    /// The guard shared by every tree backed by `path`.
    pub(crate) fn for_path(path: &Path) -> Self {
        let key = normalize(path);
        let mut registry = REGISTRY.lock();
        registry.retain(|_, weak| weak.strong_count() > 0);

        if let Some(lock) = registry.get(&key).and_then(Weak::upgrade) {
            return StoreGuard { lock };
        }

        let lock = Arc::new(RwLock::new(()));
        registry.insert(key, Arc::downgrade(&lock));
        StoreGuard { lock }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }

    pub(crate) fn shares_with(&self, other: &StoreGuard) -> bool {
        Arc::ptr_eq(&self.lock, &other.lock)
    }
}

// Existing files resolve through symlinks. A file that does not exist yet
// only has its directory canonicalized.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(dir), Some(name)) => dir.canonicalize().ok().map(|dir| dir.join(name)),
        _ => None,
    };
    resolved.unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_shares_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cfg");
        let a = StoreGuard::for_path(&path);
        let b = StoreGuard::for_path(&path);
        assert!(a.shares_with(&b));

        let other = StoreGuard::for_path(&dir.path().join("b.cfg"));
        assert!(!a.shares_with(&other));
        assert!(!a.shares_with(&StoreGuard::detached()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_shares_lock_with_target() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.cfg");
        let link = dir.path().join("link.cfg");
        std::fs::write(&real, "").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert!(StoreGuard::for_path(&real).shares_with(&StoreGuard::for_path(&link)));
    }

    #[test]
    fn test_writer_excludes_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.cfg");
        let a = StoreGuard::for_path(&path);
        let b = StoreGuard::for_path(&path);

        let write = a.write();
        assert!(b.lock.try_read().is_none());
        drop(write);
        assert!(b.lock.try_read().is_some());
    }
}
