//! Cookie persistence as a JSON array of `name=value` strings.
//!
//! The default file is `.wp_cookies.json` beside the executable. Writes are
//! plain overwrites: a crash mid-write can leave a corrupt file, which the next
//! run treats as empty and re-derives the session.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::CookieJar;

/// File name of the persisted cookie file.
pub const COOKIE_FILE_NAME: &str = ".wp_cookies.json";

/// Errors for persisted cookie file operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The executable's directory cannot be determined.
    #[error("unable to determine the executable directory for the cookie file; pass --cookie-file")]
    ExecutableDirUnavailable,
    /// Filesystem I/O failed.
    #[error("cookie file I/O error at {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a JSON array of strings.
    #[error("cookie file {path} is corrupt: {source}")]
    Corrupt {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Returns the default cookie file path beside the running executable.
///
/// # Errors
///
/// Returns [`StorageError::ExecutableDirUnavailable`] when the executable path
/// cannot be resolved.
pub fn default_cookie_path() -> Result<PathBuf, StorageError> {
    let exe = std::env::current_exe().map_err(|_| StorageError::ExecutableDirUnavailable)?;
    let dir = exe.parent().ok_or(StorageError::ExecutableDirUnavailable)?;
    Ok(dir.join(COOKIE_FILE_NAME))
}

/// Handle to the on-disk cookie file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    /// Uses an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the default path beside the executable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ExecutableDirUnavailable`] when the executable
    /// path cannot be resolved.
    pub fn at_default_location() -> Result<Self, StorageError> {
        default_cookie_path().map(Self::new)
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads persisted cookies, failing soft.
    ///
    /// A missing file yields an empty list silently; an unreadable or corrupt
    /// file is logged and also yields an empty list.
    #[must_use]
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Vec<String> {
        match self.try_load() {
            Ok(Some(cookies)) => {
                info!(
                    count = cookies.len(),
                    path = %self.path.display(),
                    "Loaded cookies"
                );
                cookies
            }
            Ok(None) => {
                debug!("No persisted cookie file");
                Vec::new()
            }
            Err(error) => {
                warn!(error = %error, "Failed to load persisted cookies; continuing without them");
                Vec::new()
            }
        }
    }

    /// Loads persisted cookies, reporting failures.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the file cannot be read and
    /// [`StorageError::Corrupt`] when it is not a JSON array of strings.
    pub fn try_load(&self) -> Result<Option<Vec<String>>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let cookies: Vec<String> =
            serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(cookies))
    }

    /// Writes the jar as a JSON array, overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the parent directory or file cannot be written.
    #[instrument(level = "debug", skip(self, jar), fields(path = %self.path.display(), count = jar.len()))]
    pub fn save(&self, jar: &CookieJar) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let payload = serde_json::to_string(jar.as_slice()).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, payload).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), count = jar.len(), "Cookies saved");
        Ok(())
    }

    /// Deletes the cookie file.
    ///
    /// Returns `true` when the file existed and was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when removal fails.
    pub fn clear(&self) -> Result<bool, StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
