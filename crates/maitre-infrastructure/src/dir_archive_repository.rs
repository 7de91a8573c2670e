//! Directory-backed archive repository.
//!
//! One TOML file per archived session:
//!
//! ```text
//! base_dir/
//! ├── <session-id-1>.toml
//! └── <session-id-2>.toml
//! ```
//!
//! Writes go through a temp file and rename so a crash mid-write never
//! leaves a torn record.

use crate::dto::ArchivedSessionDto;
use async_trait::async_trait;
use maitre_core::error::{MaitreError, Result};
use maitre_core::session::{ArchiveRepository, Session};
use std::path::{Path, PathBuf};
use tokio::fs;

/// TOML-file-per-session archive store.
pub struct DirArchiveRepository {
    base_dir: PathBuf,
}

impl DirArchiveRepository {
    /// Creates the repository at the default platform data location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined or
    /// created.
    pub async fn default_location() -> Result<Self> {
        Self::new(crate::paths::MaitrePaths::archive_dir()?).await
    }

    /// Creates a repository rooted at `base_dir`, creating the directory
    /// if needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.toml", session_id))
    }

    async fn load_record(&self, path: &Path) -> Result<Session> {
        let raw = fs::read_to_string(path).await?;
        let dto: ArchivedSessionDto = toml::from_str(&raw)?;
        dto.into_session()
    }
}

#[async_trait]
impl ArchiveRepository for DirArchiveRepository {
    async fn save(&self, session: &Session) -> Result<()> {
        let dto = ArchivedSessionDto::from(session);
        let rendered = toml::to_string_pretty(&dto)?;

        let path = self.record_path(&session.id);
        let tmp = self.base_dir.join(format!(".{}.tmp", session.id));
        fs::write(&tmp, rendered).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let path = self.record_path(session_id);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        self.load_record(&path).await.map(Some)
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            match self.load_record(&path).await {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    // Skip unreadable records, keep serving the rest
                    tracing::warn!("Failed to load archive record {:?}: {}", path, e);
                }
            }
        }

        // Most recently active first
        sessions.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(sessions)
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.record_path(session_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MaitreError::from(e)),
        }
    }
}
