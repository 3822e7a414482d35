//! Photo Exporter - Configuration
//!
//! Channel wiring, access-scope preference and the localized messages
//! reported back to the host. Loaded from an optional JSON file; every field
//! falls back to its default.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Channel the exporter registers on
pub const DEFAULT_CHANNEL_NAME: &str = "store_image_maker/image_exporter";

/// The single supported method
pub const DEFAULT_METHOD_NAME: &str = "saveImageToPhotos";

/// Uniform type identifier attached to created resources
pub const PNG_UNIFORM_TYPE: &str = "public.png";

/// Which authorization scope to query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScopePreference {
    /// Add-only when the platform supports it, legacy otherwise
    #[default]
    Auto,
    /// Always the add-only scope
    AddOnly,
    /// Always the legacy undifferentiated scope
    Legacy,
}

/// Fixed user-facing messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Messages {
    pub invalid_arguments: String,
    pub permission_denied: String,
    pub permission_unknown: String,
    /// Used when the write reports success without an identifier
    pub save_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_arguments: "PNGバイト列が渡されていません。".into(),
            permission_denied: "写真への保存権限が許可されていません。".into(),
            permission_unknown: "写真保存の権限状態を判定できませんでした。".into(),
            save_failed: "写真の保存に失敗しました。".into(),
        }
    }
}

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Method channel name
    pub channel_name: String,
    /// Supported method name
    pub method_name: String,
    /// Authorization scope selection
    pub access_scope: ScopePreference,
    /// Type identifier of the created resource
    pub uniform_type_identifier: String,
    /// Root of the directory-backed library
    pub library_path: PathBuf,
    /// Localized messages
    pub messages: Messages,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        let pictures = dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            channel_name: DEFAULT_CHANNEL_NAME.into(),
            method_name: DEFAULT_METHOD_NAME.into(),
            access_scope: ScopePreference::Auto,
            uniform_type_identifier: PNG_UNIFORM_TYPE.into(),
            library_path: pictures.join("photo-exporter"),
            messages: Messages::default(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
