//! Filesystem storage for the persisted session record.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use magicstream_core::error::{Error, StorageError};
use magicstream_core::{Result, SESSION_KEY, Session, SessionStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_read(err: io::Error) -> Error {
    Error::Storage(StorageError::Read {
        message: err.to_string(),
    })
}

fn map_write(err: io::Error) -> Error {
    Error::Storage(StorageError::Write {
        message: err.to_string(),
    })
}

/// A [`SessionStore`] keeping the session as one JSON file.
///
/// The record lives at `<root>/user.json`. Writes go to a temporary file that
/// is renamed into place while holding an exclusive lock on `<root>/user.lock`,
/// so a reader never sees a half-written record. On Unix the record is
/// readable only by its owner.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path of the session record.
    pub fn record_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", SESSION_KEY))
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(format!("{}.lock", SESSION_KEY))
    }

    fn open_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.root).map_err(map_write)?;
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_write)
    }

    fn read_record(&self) -> Result<Option<String>> {
        let path = self.record_path();
        if !path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(map_read)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(map_read(e)),
        };

        lock.unlock().map_err(map_read)?;
        Ok(content)
    }

    fn write_record(&self, json: &str) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(map_write)?;

        let path = self.record_path();
        let temp_path = self
            .root
            .join(format!(".{}.{}.tmp", SESSION_KEY, Uuid::new_v4().simple()));

        let mut file = File::create(&temp_path).map_err(map_write)?;
        file.write_all(json.as_bytes()).map_err(map_write)?;
        file.sync_data().map_err(map_write)?;

        #[cfg(unix)]
        {
            let mut perms = file.metadata().map_err(map_write)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(map_write)?;
        }

        drop(file);
        fs::rename(&temp_path, &path).map_err(map_write)?;

        lock.unlock().map_err(map_write)?;
        Ok(())
    }

    fn remove_record(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(map_write)?;

        match fs::remove_file(self.record_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(map_write(e)),
        }

        lock.unlock().map_err(map_write)?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    #[instrument(skip(self), fields(path = %self.record_path().display()))]
    async fn load(&self) -> Result<Option<Session>> {
        let Some(content) = self.read_record()? else {
            debug!("No session record");
            return Ok(None);
        };

        match Session::from_json(&content) {
            Ok(session) => {
                debug!("Loaded session record");
                Ok(Some(session))
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session record");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, session), fields(path = %self.record_path().display()))]
    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session).map_err(|e| StorageError::Serialize {
            message: e.to_string(),
        })?;

        self.write_record(&json)?;
        debug!("Saved session record");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.record_path().display()))]
    async fn clear(&self) -> Result<()> {
        self.remove_record()?;
        debug!("Cleared session record");
        Ok(())
    }
}
