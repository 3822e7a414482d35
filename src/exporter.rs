//! Photo Exporter - Image Export Service
//!
//! Wires the save pipeline: validate the call, pass the authorization gate,
//! write the asset, reply once.
//!
//! ```text
//! MethodCall ──► validate ──► AuthorizationGate ──► AssetWriter ──► ReplyChannel
//!                   │                │                   │              ▲
//!                   └── rejection ───┴───── failure ─────┴──────────────┘
//! ```

use std::sync::Arc;
use async_trait::async_trait;

use crate::authorization::{select_provider, AuthorizationGate, AuthorizationProvider, PermissionPlatform};
use crate::channel::{MethodCall, MethodCallHandler, MethodChannelRegistry, MethodResponse};
use crate::config::{ExporterConfig, Messages};
use crate::error::ExportResult;
use crate::library::PhotoLibrary;
use crate::reply::ReplyChannel;
use crate::request::{validate, Rejection};
use crate::writer::AssetWriter;

/// Handler for the image export channel.
///
/// Owns no global state; each call runs its own pipeline with exclusively
/// owned bytes and outcome.
pub struct ImageExporter {
    channel_name: String,
    method_name: String,
    messages: Messages,
    gate: AuthorizationGate,
    writer: AssetWriter,
}

impl ImageExporter {
    /// Build from an already selected authorization provider
    pub fn new(
        config: &ExporterConfig,
        authorization: Arc<dyn AuthorizationProvider>,
        library: Arc<dyn PhotoLibrary>,
    ) -> Self {
        Self {
            channel_name: config.channel_name.clone(),
            method_name: config.method_name.clone(),
            messages: config.messages.clone(),
            gate: AuthorizationGate::new(authorization, config.messages.clone()),
            writer: AssetWriter::new(library, &config.uniform_type_identifier, &config.messages),
        }
    }

    /// Build for a platform, selecting the authorization scope from its capability
    pub fn for_platform(
        config: &ExporterConfig,
        platform: Arc<dyn PermissionPlatform>,
        library: Arc<dyn PhotoLibrary>,
    ) -> Self {
        let provider = select_provider(platform, config.access_scope);
        Self::new(config, provider, library)
    }

    /// Register on the configured channel
    pub fn register(self, registry: &MethodChannelRegistry) -> Arc<Self> {
        let exporter = Arc::new(self);
        registry.set_method_call_handler(&exporter.channel_name, exporter.clone());
        exporter
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Authorize, then write. Typed entry point for Rust callers.
    pub async fn save_image_to_photos(&self, bytes: Vec<u8>) -> ExportResult<String> {
        self.gate.ensure_authorized().await?;
        self.writer.write(bytes).await
    }

    /// Run the pipeline for one call and build its reply
    pub async fn respond(&self, call: MethodCall) -> MethodResponse {
        log::debug!("Handling {} on {}", call.method, self.channel_name);

        let bytes = match validate(call, &self.method_name, &self.messages) {
            Ok(bytes) => bytes,
            Err(Rejection::NotImplemented) => return MethodResponse::NotImplemented,
            Err(Rejection::Invalid(err)) => {
                log::warn!("Rejected export request: {}", err);
                return err.into();
            }
        };

        self.save_image_to_photos(bytes).await.into()
    }
}

#[async_trait]
impl MethodCallHandler for ImageExporter {
    async fn handle(&self, call: MethodCall, reply: ReplyChannel) {
        let response = self.respond(call).await;
        reply.send(response);
    }
}
