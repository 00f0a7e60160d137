//! File-backed reference store.
//!
//! Layout mirrors git: `<root>/HEAD` and `<root>/refs/...`, each file holding
//! the hex object id followed by a newline.
//!
//! Updates take `<ref>.lock` with `O_CREAT | O_EXCL`, write the new value
//! into it, re-read the current value under the lock, and rename the lock
//! file over the ref. A writer that finds the lock file present (another
//! handle or another process mid-update) polls for up to [`LOCK_TIMEOUT`]
//! and then reports [`CasOutcome::Busy`]. Writers sharing one store are
//! serialized by a mutex so they never observe each other's lock files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use vds_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::CasOutcome;

/// How long an update waits for a lock held by someone else.
pub const LOCK_TIMEOUT: Duration = Duration::from_millis(100);

const MAX_LOCK_PAUSE: Duration = Duration::from_millis(16);

/// Filesystem implementation of [`RefStore`].
#[derive(Debug)]
pub struct FsRefStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

/// Removes the lock file on drop unless it was renamed into place.
struct LockFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove ref lock");
            }
        }
    }
}

impl FsRefStore {
    /// Open (or create) a ref store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join("refs"))?;
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn read_path(&self, name: &str, path: &Path) -> Result<Option<ObjectId>> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        ObjectId::from_hex(contents.trim())
            .map(Some)
            .map_err(|e| RefError::Corrupt {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Create `lock_path` exclusively, polling while someone else holds it.
    /// `None` means the lock was still held when [`LOCK_TIMEOUT`] ran out.
    fn acquire_lock(lock_path: &Path) -> Result<Option<File>> {
        let deadline = Instant::now() + LOCK_TIMEOUT;
        let mut pause = Duration::from_millis(1);
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(lock_path)
            {
                Ok(file) => return Ok(Some(file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(pause);
                    pause = (pause * 2).min(MAX_LOCK_PAUSE);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl RefStore for FsRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        validate_ref_name(name)?;
        self.read_path(name, &self.ref_path(name))
    }

    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<CasOutcome> {
        validate_ref_name(name)?;
        let _guard = self.write_lock.lock().map_err(|_| RefError::LockPoisoned)?;

        let path = self.ref_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_path = path.with_file_name(format!(
            "{}.lock",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));

        let Some(mut file) = Self::acquire_lock(&lock_path)? else {
            debug!(name, lock = %lock_path.display(), "ref lock still held; giving up");
            return Ok(CasOutcome::Busy);
        };
        let mut lock = LockFile {
            path: lock_path,
            committed: false,
        };

        let actual = self.read_path(name, &path)?;
        if actual != expected {
            debug!(name, ?expected, ?actual, "ref compare-and-swap mismatch");
            drop(file);
            return Ok(CasOutcome::Mismatch { actual });
        }

        writeln!(file, "{}", new.to_hex())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&lock.path, &path)?;
        lock.committed = true;

        debug!(name, new = %new.short_hex(), "ref updated");
        Ok(CasOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    fn temp_store() -> (tempfile::TempDir, FsRefStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRefStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn head_file_holds_hex_and_newline() {
        let (dir, store) = temp_store();
        assert!(store.head().unwrap().is_none());
        store.advance_head(None, id(7)).unwrap();

        let raw = fs::read_to_string(dir.path().join("HEAD")).unwrap();
        assert_eq!(raw, format!("{}\n", id(7).to_hex()));
        assert_eq!(store.head().unwrap(), Some(id(7)));
    }

    #[test]
    fn mismatch_leaves_ref_and_no_lock() {
        let (dir, store) = temp_store();
        store.advance_head(None, id(1)).unwrap();

        let outcome = store.advance_head(None, id(2)).unwrap();
        assert_eq!(
            outcome,
            CasOutcome::Mismatch {
                actual: Some(id(1))
            }
        );
        assert_eq!(store.head().unwrap(), Some(id(1)));
        assert!(!dir.path().join("HEAD.lock").exists());
    }

    #[test]
    fn held_lock_reports_busy() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("HEAD.lock"), b"").unwrap();
        assert_eq!(store.advance_head(None, id(1)).unwrap(), CasOutcome::Busy);
        assert!(store.head().unwrap().is_none());
        // a lock we did not take is left alone
        assert!(dir.path().join("HEAD.lock").exists());
    }

    #[test]
    fn waits_for_a_briefly_held_lock() {
        let (dir, store) = temp_store();
        let lock = dir.path().join("HEAD.lock");
        fs::write(&lock, b"").unwrap();
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            fs::remove_file(lock).unwrap();
        });

        assert_eq!(store.advance_head(None, id(1)).unwrap(), CasOutcome::Updated);
        releaser.join().unwrap();
        assert_eq!(store.head().unwrap(), Some(id(1)));
    }

    #[test]
    fn corrupt_ref_is_an_error() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("HEAD"), b"not hex\n").unwrap();
        assert!(matches!(store.head(), Err(RefError::Corrupt { .. })));
    }

    #[test]
    fn survives_reopen() {
        let (dir, store) = temp_store();
        store.advance_head(None, id(9)).unwrap();
        drop(store);
        let reopened = FsRefStore::open(dir.path()).unwrap();
        assert_eq!(reopened.head().unwrap(), Some(id(9)));
    }

    #[test]
    fn concurrent_cas_has_exactly_one_winner() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);
        store.advance_head(None, id(0)).unwrap();
        let barrier = Arc::new(Barrier::new(6));

        let handles: Vec<_> = (1..=6u8)
            .map(|n| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.advance_head(Some(id(0)), id(n)).unwrap().is_updated()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn separate_handles_never_lose_a_swap_to_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        FsRefStore::open(dir.path()).unwrap().advance_head(None, id(0)).unwrap();
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (1..=4u8)
            .map(|n| {
                let store = FsRefStore::open(dir.path()).unwrap();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.advance_head(Some(id(0)), id(n)).unwrap()
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = outcomes.iter().filter(|o| o.is_updated()).count();
        assert_eq!(winners, 1);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, CasOutcome::Updated | CasOutcome::Mismatch { .. })));
        assert!(!dir.path().join("HEAD.lock").exists());
    }
}
