//! Locally persisted client state.
//!
//! A single small TOML file holds the anonymous session id list, the theme
//! preference, and the active session reference. Writes are atomic (tmp file
//! + fsync + rename) under an exclusive file lock; reads go through an
//! in-memory cache so the file is only touched on mutation.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use leadline_core::error::{LeadlineError, Result};
use leadline_core::state::LocalStateRepository;
use leadline_core::theme::ThemeMode;

use crate::paths::LeadlinePaths;

/// The persisted state record (contents of `state.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalState {
    /// Session ids created while unauthenticated, oldest first.
    pub anonymous_session_ids: Vec<String>,
    /// Persisted theme choice; `None` falls back to the system preference.
    pub theme: Option<ThemeMode>,
    /// The session the user last had open.
    pub active_session_id: Option<String>,
}

/// File-backed implementation of [`LocalStateRepository`].
#[derive(Clone)]
pub struct LocalStateStore {
    state: Arc<Mutex<LocalState>>,
    path: PathBuf,
}

impl LocalStateStore {
    /// Opens (or initializes) the state file under the given paths.
    pub fn open(paths: &LeadlinePaths) -> Result<Self> {
        let path = paths.state_file();
        let state = read_state(&path)?.unwrap_or_default();
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            path,
        })
    }

    /// Applies a mutation to the cached state and persists the result.
    async fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut LocalState),
    {
        let snapshot = {
            let mut state = self.state.lock().await;
            f(&mut state);
            state.clone()
        };

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_state(&path, &snapshot))
            .await
            .map_err(|e| LeadlineError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[async_trait]
impl LocalStateRepository for LocalStateStore {
    async fn anonymous_session_ids(&self) -> Vec<String> {
        self.state.lock().await.anonymous_session_ids.clone()
    }

    async fn add_anonymous_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.mutate(move |state| {
            if !state.anonymous_session_ids.contains(&session_id) {
                state.anonymous_session_ids.push(session_id);
            }
        })
        .await
    }

    async fn remove_anonymous_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.mutate(move |state| {
            state.anonymous_session_ids.retain(|id| id != &session_id);
        })
        .await
    }

    async fn theme(&self) -> Option<ThemeMode> {
        self.state.lock().await.theme
    }

    async fn set_theme(&self, mode: ThemeMode) -> Result<()> {
        self.mutate(move |state| state.theme = Some(mode)).await
    }

    async fn active_session(&self) -> Option<String> {
        self.state.lock().await.active_session_id.clone()
    }

    async fn set_active_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.mutate(move |state| state.active_session_id = Some(session_id))
            .await
    }

    async fn clear_active_session(&self) -> Result<()> {
        self.mutate(|state| state.active_session_id = None).await
    }
}

fn read_state(path: &Path) -> Result<Option<LocalState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let state: LocalState = toml::from_str(&content)?;
    Ok(Some(state))
}

/// Atomic write: serialize, write a sibling tmp file, fsync, rename.
/// An exclusive lock on a sibling `.lock` file keeps concurrent processes
/// from interleaving writes.
fn write_state(path: &Path, state: &LocalState) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| LeadlineError::io("State path has no parent directory"))?;
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let _lock = StateLock::acquire(path)?;

    let toml_string = toml::to_string_pretty(state)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| LeadlineError::io("State path has no file name"))?;
    let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(toml_string.as_bytes())?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Exclusive lock guard; the lock file is removed best-effort on drop.
struct StateLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl StateLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| LeadlineError::io(format!("Failed to acquire state lock: {}", e)))?;
        }

        Ok(StateLock { file, lock_path })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
