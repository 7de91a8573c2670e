//! Filesystem path resolution for Maitre data.

use maitre_core::error::{MaitreError, Result};
use std::path::PathBuf;

/// Resolves the directories Maitre persists data under.
pub struct MaitrePaths;

impl MaitrePaths {
    /// The base data directory (`~/.local/share/maitre` on Linux).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("maitre"))
            .ok_or_else(|| MaitreError::io("could not determine platform data directory"))
    }

    /// The directory archived sessions are written to.
    pub fn archive_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("archive"))
    }
}
