//! Advisory file locks around the address store.
//!
//! Readers take a shared lock; every read-modify-write holds an exclusive lock
//! for the whole cycle so two `vt` processes never interleave writes.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Advisory lock errors for the store lock file.
#[derive(Debug)]
pub enum LockError {
    Timeout { path: PathBuf, waited: Duration },
    IoError(io::Error),
}

impl From<io::Error> for LockError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError(_) => ErrorCode::StorageUnavailable,
        }
    }

}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { path, waited } => write!(
                f,
                "{}: store lock timed out after {:?} at {}",
                self.code().code(),
                waited,
                path.display()
            ),
            Self::IoError(err) => write!(f, "{}: {}", self.code().code(), err),
        }
    }
}

impl std::error::Error for LockError {}

/// Whether a guard admits other readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    Shared,
    Exclusive,
}

/// RAII guard over the store lock file. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Acquire an exclusive lock, polling until `timeout` elapses.
    pub fn exclusive(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire(path, timeout, LockMode::Exclusive)
    }

    /// Acquire a shared lock, polling until `timeout` elapses.
    pub fn shared(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire(path, timeout, LockMode::Shared)
    }

    fn acquire(path: &Path, timeout: Duration, mode: LockMode) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        loop {
            // Path calls: std's inherent `File` lock methods shadow fs2's.
            let acquired = match mode {
                LockMode::Shared => FileExt::try_lock_shared(&file).is_ok(),
                LockMode::Exclusive => FileExt::try_lock_exclusive(&file).is_ok(),
            };

            if acquired {
                return Ok(Self { file });
            }

            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(RETRY_INTERVAL);
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::{LockError, StoreLock};
    use crate::error::ErrorCode;
    use std::{
        sync::{Arc, Barrier},
        thread,
        time::Duration,
    };

    fn lock_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join(".visitas").join("lock")
    }

    #[test]
    fn exclusive_lock_allows_acquire_and_release() -> Result<(), LockError> {
        let dir = tempfile::tempdir()?;
        let path = lock_path(&dir);
        let lock = StoreLock::exclusive(&path, Duration::from_millis(50))?;
        assert!(path.exists());
        drop(lock);
        let again = StoreLock::exclusive(&path, Duration::from_millis(50))?;
        drop(again);
        Ok(())
    }

    #[test]
    fn exclusive_lock_times_out_when_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        let _guard = StoreLock::exclusive(&path, Duration::from_millis(50)).unwrap();
        let err = StoreLock::exclusive(&path, Duration::from_millis(20)).unwrap_err();

        assert!(matches!(err, LockError::Timeout { path: ref p, .. } if *p == path));
        assert_eq!(err.code(), ErrorCode::LockContention);
        assert!(err.to_string().starts_with("E5002"));
    }

    #[test]
    fn shared_locks_are_compatible() -> Result<(), LockError> {
        let dir = tempfile::tempdir()?;
        let path = lock_path(&dir);
        let first = StoreLock::shared(&path, Duration::from_millis(50))?;
        let second = StoreLock::shared(&path, Duration::from_millis(50))?;
        drop((first, second));
        Ok(())
    }

    #[test]
    fn writer_blocks_readers_until_released() -> Result<(), LockError> {
        let dir = tempfile::tempdir()?;
        let path = lock_path(&dir);

        let held = Arc::new(Barrier::new(2));
        let done = Arc::new(Barrier::new(2));

        let held_thread = Arc::clone(&held);
        let done_thread = Arc::clone(&done);
        let path_in_thread = path.clone();
        let handle = thread::spawn(move || {
            let _writer =
                StoreLock::exclusive(&path_in_thread, Duration::from_millis(200)).unwrap();
            held_thread.wait();
            done_thread.wait();
        });

        held.wait();
        assert!(matches!(
            StoreLock::shared(&path, Duration::from_millis(20)),
            Err(LockError::Timeout { .. })
        ));
        done.wait();
        handle.join().unwrap();

        let follow_up = StoreLock::shared(&path, Duration::from_millis(50))?;
        drop(follow_up);
        Ok(())
    }
}
