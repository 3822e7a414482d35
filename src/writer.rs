//! Photo Exporter - Asset Writer
//!
//! Creates one PNG photo asset per call, in a single transaction. No retry.

use std::sync::Arc;
use parking_lot::Mutex;

use crate::config::Messages;
use crate::error::{ExportError, ExportResult};
use crate::library::{AssetResource, ChangeSet, PhotoLibrary};

/// Writes byte buffers into the photo library
pub struct AssetWriter {
    library: Arc<dyn PhotoLibrary>,
    uniform_type_identifier: String,
    fallback_message: String,
}

impl AssetWriter {
    pub fn new(library: Arc<dyn PhotoLibrary>, uniform_type_identifier: &str, messages: &Messages) -> Self {
        Self {
            library,
            uniform_type_identifier: uniform_type_identifier.to_string(),
            fallback_message: messages.save_failed.clone(),
        }
    }

    /// Save `bytes` as a new asset and return its identifier
    pub async fn write(&self, bytes: Vec<u8>) -> ExportResult<String> {
        let size = bytes.len();
        let resource = AssetResource::photo(bytes, &self.uniform_type_identifier);

        // Filled inside the transaction, read after completion
        let placeholder = Arc::new(Mutex::new(None::<String>));
        let slot = Arc::clone(&placeholder);

        let completion = self
            .library
            .perform_changes(Box::new(move |changes: &mut dyn ChangeSet| {
                *slot.lock() = changes.create_asset(resource);
            }))
            .await;

        if let Some(error) = completion.error {
            log::error!("Photo library write failed: {}", error);
            return Err(ExportError::SaveFailed {
                message: error.to_string(),
            });
        }

        let identifier = placeholder.lock().take();
        match identifier {
            Some(identifier) if completion.success => {
                log::info!("Saved {} bytes as asset {}", size, identifier);
                Ok(identifier)
            }
            _ => {
                log::error!("Photo library reported no created asset");
                Err(ExportError::SaveFailed {
                    message: self.fallback_message.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LibraryScript, ScriptedLibrary};

    fn writer(library: Arc<ScriptedLibrary>) -> AssetWriter {
        AssetWriter::new(library, "public.png", &Messages::default())
    }

    #[tokio::test]
    async fn test_commit_returns_identifier() {
        let library = ScriptedLibrary::new(LibraryScript::Commit("ABC-123".into()));
        let id = writer(library.clone()).write(vec![0x89, b'P', b'N', b'G']).await.unwrap();

        assert_eq!(id, "ABC-123");
        assert_eq!(library.transaction_count(), 1);

        let created = library.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].uniform_type_identifier, "public.png");
        assert_eq!(created[0].data, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_transaction_error() {
        let library = ScriptedLibrary::new(LibraryScript::Fail("The operation couldn't be completed".into()));
        let err = writer(library.clone()).write(vec![1]).await.unwrap_err();

        assert_eq!(err.code(), "save_failed");
        assert_eq!(err.message(), "The operation couldn't be completed");
        assert_eq!(library.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_success_without_identifier() {
        let library = ScriptedLibrary::new(LibraryScript::CommitWithoutPlaceholder);
        let err = writer(library).write(vec![1]).await.unwrap_err();

        assert_eq!(err, ExportError::SaveFailed {
            message: Messages::default().save_failed,
        });
    }

    #[tokio::test]
    async fn test_placeholder_without_success() {
        let library = ScriptedLibrary::new(LibraryScript::Abort("ABC-123".into()));
        let err = writer(library).write(vec![1]).await.unwrap_err();
        assert_eq!(err.message(), Messages::default().save_failed);
    }
}
