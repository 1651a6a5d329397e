//! Filesystem-backed [`SubmissionJournal`].
//!
//! One JSON file per submission key lives in the journal directory. Writes
//! go to a staging file that is renamed over the target, so a crash never
//! leaves a half-written checkpoint behind.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::idempotency::SubmissionKey;
use crate::domain::ports::{SubmissionCheckpoint, SubmissionJournal, SubmissionJournalError};

/// Journal storing checkpoints under a directory.
pub struct FileSubmissionJournal {
    dir: Arc<Dir>,
    root: PathBuf,
}

impl FileSubmissionJournal {
    /// Open (creating if needed) the journal directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SubmissionJournalError> {
        let root = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|error| io_error(&root, &error))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|error| io_error(&root, &error))?;
        Ok(Self {
            dir: Arc::new(dir),
            root,
        })
    }

    /// Directory holding the checkpoints.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, SubmissionJournalError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, SubmissionJournalError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || work(&dir))
            .await
            .map_err(|error| SubmissionJournalError::io(format!("journal task failed: {error}")))?
    }
}

fn file_name(key: &SubmissionKey) -> String {
    format!("{key}.json")
}

fn io_error(path: &Path, error: &io::Error) -> SubmissionJournalError {
    SubmissionJournalError::io(format!("{}: {error}", path.display()))
}

#[async_trait]
impl SubmissionJournal for FileSubmissionJournal {
    async fn load(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<SubmissionCheckpoint>, SubmissionJournalError> {
        let name = file_name(key);
        let root = self.root.clone();
        self.blocking(move |dir| {
            let raw = match dir.read(&name) {
                Ok(raw) => raw,
                Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(error) => return Err(io_error(&root.join(&name), &error)),
            };
            serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|error| SubmissionJournalError::corrupt(format!("{name}: {error}")))
        })
        .await
    }

    async fn save(&self, checkpoint: &SubmissionCheckpoint) -> Result<(), SubmissionJournalError> {
        let name = file_name(&checkpoint.key);
        let staging = format!(".{name}.tmp-{}", Uuid::new_v4().simple());
        let payload = serde_json::to_vec_pretty(checkpoint)
            .map_err(|error| SubmissionJournalError::io(format!("encode {name}: {error}")))?;
        let root = self.root.clone();
        debug!(file = %name, "saving submission checkpoint");
        self.blocking(move |dir| {
            dir.write(&staging, &payload)
                .map_err(|error| io_error(&root.join(&staging), &error))?;
            dir.rename(&staging, dir, &name).map_err(|error| {
                let _cleanup = dir.remove_file(&staging);
                io_error(&root.join(&name), &error)
            })
        })
        .await
    }

    async fn clear(&self, key: &SubmissionKey) -> Result<(), SubmissionJournalError> {
        let name = file_name(key);
        let root = self.root.clone();
        self.blocking(move |dir| match dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&root.join(&name), &error)),
        })
        .await
    }
}
