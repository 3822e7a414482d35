//! Photo Exporter - Desktop Platform
//!
//! Reference implementations of the platform collaborators: a photo library
//! kept in a directory, and permission sources that either follow a preset
//! or ask on the terminal. Permission answers live in memory only.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::authorization::{AccessLevel, AuthorizationStatus, PermissionPlatform};
use crate::index::{AssetIndex, AssetRecord};
use crate::library::{AssetResource, ChangeBlock, ChangeCompletion, ChangeSet, LibraryError, PhotoLibrary};
use crate::secure_fs::SecureFs;

/// Directory holding asset files, relative to the library root
const ASSETS_DIR: &str = "assets";

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTORY LIBRARY
// ═══════════════════════════════════════════════════════════════════════════════

struct AssetCreation {
    id: String,
    file_name: String,
    resource: AssetResource,
}

/// Changes collected while a change block runs
#[derive(Default)]
struct PendingChanges {
    created: Vec<AssetCreation>,
}

impl ChangeSet for PendingChanges {
    fn create_asset(&mut self, resource: AssetResource) -> Option<String> {
        let uuid = Uuid::new_v4().to_string().to_uppercase();
        let extension = match resource.uniform_type_identifier.as_str() {
            "public.png" => "png",
            "public.jpeg" => "jpg",
            "public.heic" => "heic",
            _ => "dat",
        };
        let id = format!("{uuid}/L0/001");

        self.created.push(AssetCreation {
            id: id.clone(),
            file_name: format!("{uuid}.{extension}"),
            resource,
        });
        Some(id)
    }
}

struct LibraryStore {
    fs: SecureFs,
    index: AssetIndex,
}

impl LibraryStore {
    /// Stage every file, then publish them and insert their rows together
    fn commit(&self, pending: PendingChanges) -> Result<(), LibraryError> {
        let mut staged = Vec::with_capacity(pending.created.len());
        let mut records = Vec::with_capacity(pending.created.len());

        for creation in pending.created {
            let relative = format!("{}/{}", ASSETS_DIR, creation.file_name);
            match self.fs.stage(&relative, &creation.resource.data) {
                Ok(file) => staged.push(file),
                Err(e) => {
                    staged.iter().for_each(SecureFs::discard);
                    return Err(e.into());
                }
            }

            records.push(AssetRecord {
                id: creation.id,
                file_name: creation.file_name,
                uniform_type_identifier: creation.resource.uniform_type_identifier,
                size: creation.resource.data.len() as u64,
                created_at: Utc::now(),
            });
        }

        let mut published = 0;
        let result = self.index.insert_all(&records, || {
            for file in &staged {
                SecureFs::publish(file)?;
                published += 1;
            }
            Ok(())
        });

        if let Err(e) = result {
            for (i, file) in staged.iter().enumerate() {
                if i < published {
                    SecureFs::unpublish(file);
                } else {
                    SecureFs::discard(file);
                }
            }
            return Err(e);
        }

        for record in &records {
            log::debug!("Committed asset {} ({} bytes)", record.id, record.size);
        }
        Ok(())
    }
}

/// Photo library stored in a directory: `assets/` plus an SQLite index
#[derive(Clone)]
pub struct DirectoryLibrary {
    store: Arc<LibraryStore>,
}

impl DirectoryLibrary {
    /// Open or create a library at `root`
    pub fn open(root: &Path) -> Result<Self, LibraryError> {
        std::fs::create_dir_all(root)?;
        let index = AssetIndex::open(root)?;

        log::debug!("Opened photo library at {}", root.display());
        Ok(Self {
            store: Arc::new(LibraryStore {
                fs: SecureFs::new(root),
                index,
            }),
        })
    }

    pub fn root(&self) -> &Path {
        self.store.fs.root()
    }

    /// Stored assets, newest first
    pub fn list_assets(&self) -> Result<Vec<AssetRecord>, LibraryError> {
        self.store.index.list_all()
    }

    /// Path of an asset file
    pub fn asset_path(&self, record: &AssetRecord) -> PathBuf {
        self.root().join(ASSETS_DIR).join(&record.file_name)
    }
}

#[async_trait]
impl PhotoLibrary for DirectoryLibrary {
    async fn perform_changes(&self, changes: ChangeBlock) -> ChangeCompletion {
        let store = Arc::clone(&self.store);

        let outcome = tokio::task::spawn_blocking(move || {
            let mut pending = PendingChanges::default();
            let view: &mut dyn ChangeSet = &mut pending;
            changes(view);
            store.commit(pending)
        })
        .await;

        match outcome {
            Ok(Ok(())) => ChangeCompletion::committed(),
            Ok(Err(e)) => ChangeCompletion::failed(e),
            Err(e) => ChangeCompletion::failed(LibraryError::Rejected(format!("change block aborted: {e}"))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERMISSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Permission source with a preset status and a preset prompt answer
pub struct PresetPermissions {
    status: Mutex<AuthorizationStatus>,
    answer: AuthorizationStatus,
    add_only: bool,
}

impl PresetPermissions {
    pub fn new(status: AuthorizationStatus, answer: AuthorizationStatus, add_only: bool) -> Self {
        Self {
            status: Mutex::new(status),
            answer,
            add_only,
        }
    }
}

#[async_trait]
impl PermissionPlatform for PresetPermissions {
    fn supports_add_only(&self) -> bool {
        self.add_only
    }

    fn authorization_status(&self, _level: AccessLevel) -> AuthorizationStatus {
        *self.status.lock()
    }

    async fn request_authorization(&self, _level: AccessLevel) -> AuthorizationStatus {
        *self.status.lock() = self.answer;
        self.answer
    }
}

/// Asks on the terminal. Starts undetermined on every run.
pub struct ConsolePermissions {
    status: Mutex<AuthorizationStatus>,
    add_only: bool,
}

impl ConsolePermissions {
    pub fn new(add_only: bool) -> Self {
        Self {
            status: Mutex::new(AuthorizationStatus::NotDetermined),
            add_only,
        }
    }

    fn ask(level: AccessLevel) -> std::io::Result<bool> {
        let scope = match level {
            AccessLevel::AddOnly => "add photos to",
            AccessLevel::ReadWrite => "access",
        };

        let mut stderr = std::io::stderr();
        write!(stderr, "Allow photo-exporter to {scope} your photo library? [y/N] ")?;
        stderr.flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

#[async_trait]
impl PermissionPlatform for ConsolePermissions {
    fn supports_add_only(&self) -> bool {
        self.add_only
    }

    fn authorization_status(&self, _level: AccessLevel) -> AuthorizationStatus {
        *self.status.lock()
    }

    async fn request_authorization(&self, level: AccessLevel) -> AuthorizationStatus {
        let allowed = match tokio::task::spawn_blocking(move || Self::ask(level)).await {
            Ok(Ok(allowed)) => allowed,
            Ok(Err(e)) => {
                log::warn!("Could not read permission answer: {}", e);
                false
            }
            Err(e) => {
                log::warn!("Permission prompt aborted: {}", e);
                false
            }
        };

        let answer = if allowed {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        *self.status.lock() = answer;
        answer
    }
}
