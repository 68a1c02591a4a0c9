use std::{
    fs::File,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use fs4::fs_std::FileExt;
use log::debug;
use thiserror::Error;

pub const LOCK_FILE_NAME: &str = ".lock";

const RETRY_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Exclusive lock on a repository directory, released on drop.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Timed out waiting for the lock on {0}")]
    Timeout(String),
    #[error("IO error on lock file {path}: {source}")]
    IO {
        path: String,
        source: std::io::Error,
    },
}

impl FileLock {
    /// Locks `directory` through its `.lock` file.
    pub fn acquire(directory: &Path) -> Result<Self, Error> {
        Self::with_timeout(&directory.join(LOCK_FILE_NAME), DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(path: &Path, timeout: Duration) -> Result<Self, Error> {
        let io_error = |source| Error::IO {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(_) => {
                    debug!("Acquired lock {}", path.display());
                    return Ok(Self {
                        _file: file,
                        path: path.to_path_buf(),
                    });
                }
                Err(error)
                    if error.raw_os_error() == fs4::lock_contended_error().raw_os_error() =>
                {
                    if start.elapsed() >= timeout {
                        return Err(Error::Timeout(path.display().to_string()));
                    }
                    debug!("Failed to acquire a lock on {}, retrying", path.display());
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(error) => return Err(io_error(error)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
