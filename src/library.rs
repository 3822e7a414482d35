//! Photo Exporter - Photo Library
//!
//! The library-write transaction collaborator. Changes are described by a
//! block run inside one all-or-nothing transaction; the platform reports
//! completion with a success flag and an optional error.

use async_trait::async_trait;
use thiserror::Error;

/// Kind of resource attached to a created asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Photo,
}

/// Data for a new asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResource {
    pub kind: ResourceKind,
    pub data: Vec<u8>,
    pub uniform_type_identifier: String,
}

impl AssetResource {
    /// Photo resource with an explicit type identifier
    pub fn photo(data: Vec<u8>, uniform_type_identifier: &str) -> Self {
        Self {
            kind: ResourceKind::Photo,
            data,
            uniform_type_identifier: uniform_type_identifier.to_string(),
        }
    }
}

/// Mutations available inside a change block
pub trait ChangeSet {
    /// Request creation of an asset. Returns the placeholder identifier,
    /// valid only if the transaction commits.
    fn create_asset(&mut self, resource: AssetResource) -> Option<String>;
}

/// Change block run inside the transaction
pub type ChangeBlock = Box<dyn FnOnce(&mut dyn ChangeSet) + Send + 'static>;

/// Library-level failure
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    /// Description reported by the platform, passed through as is
    #[error("{0}")]
    Rejected(String),
}

impl From<rusqlite::Error> for LibraryError {
    fn from(e: rusqlite::Error) -> Self {
        LibraryError::Database(e.to_string())
    }
}

/// Completion of a change transaction
#[derive(Debug)]
pub struct ChangeCompletion {
    pub success: bool,
    pub error: Option<LibraryError>,
}

impl ChangeCompletion {
    pub fn committed() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: LibraryError) -> Self {
        Self { success: false, error: Some(error) }
    }
}

/// System photo library
#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// Run `changes` in a single transaction and wait for it to finish
    async fn perform_changes(&self, changes: ChangeBlock) -> ChangeCompletion;
}
