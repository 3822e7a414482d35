//! Photo Exporter - Staged Filesystem Writes
//!
//! Asset files are first written to a temp path, synced, and only renamed
//! into place when the owning transaction commits.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Filesystem handler rooted at the library directory
pub struct SecureFs {
    /// Root directory
    root: PathBuf,
}

/// A file written to its temp path, not yet visible
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl SecureFs {
    /// Create new SecureFs with root directory
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get full path for a relative file
    fn full_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write `data` next to its final path without publishing it
    pub fn stage(&self, relative_path: &str, data: &[u8]) -> std::io::Result<StagedFile> {
        let final_path = self.full_path(relative_path);

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut temp_name = final_path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let staged = StagedFile { temp_path, final_path };

        let written = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged.temp_path)
            .and_then(|mut file| {
                file.write_all(data)?;
                file.sync_all()
            });

        match written {
            Ok(()) => Ok(staged),
            Err(e) => {
                // Only our own temp file; the final path may belong to someone else
                let _ = fs::remove_file(&staged.temp_path);
                Err(e)
            }
        }
    }

    /// Move a staged file into place. Refuses to overwrite.
    pub fn publish(staged: &StagedFile) -> std::io::Result<()> {
        if staged.final_path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", staged.final_path.display()),
            ));
        }
        fs::rename(&staged.temp_path, &staged.final_path)
    }

    /// Drop a file that was never published
    pub fn discard(staged: &StagedFile) {
        Self::remove_quietly(&staged.temp_path);
    }

    /// Take back a file that was already published
    pub fn unpublish(staged: &StagedFile) {
        Self::remove_quietly(&staged.final_path);
    }

    fn remove_quietly(path: &Path) {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}
