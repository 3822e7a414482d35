//! # Photo Exporter
//!
//! Saves a PNG byte buffer handed over by a host application into the
//! user's photo library, behind the platform's authorization rules, and
//! answers every request exactly once.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     PHOTO EXPORTER                       │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────┐  │
//! │  │  REQUEST    │  │  AUTH       │  │  ASSET WRITER   │  │
//! │  │  VALIDATOR  │─►│  GATE       │─►│  (transaction)  │  │
//! │  └──────┬──────┘  └──────┬──────┘  └────────┬────────┘  │
//! │         │                │                   │           │
//! │  ┌──────┴────────────────┴───────────────────┴────────┐ │
//! │  │          REPLY CHANNEL (one shot, main thread)      │ │
//! │  └─────────────────────────────────────────────────────┘ │
//! │                                                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────┐  │
//! │  │ PERMISSION  │  │ PHOTO       │  │  METHOD CHANNEL │  │
//! │  │ PLATFORM    │  │ LIBRARY     │  │  REGISTRY       │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - The permission prompt is shown at most once per request, and only
//!   when the status is not determined
//! - The write is a single all-or-nothing transaction, never retried
//! - Exactly one reply per request, delivered on the host's main thread

pub mod error;
pub mod config;
pub mod channel;
pub mod request;
pub mod authorization;
pub mod library;
pub mod writer;
pub mod reply;
pub mod exporter;

#[cfg(feature = "desktop")]
pub mod secure_fs;
#[cfg(feature = "desktop")]
pub mod index;
#[cfg(feature = "desktop")]
pub mod desktop;

#[cfg(test)]
mod testing;

pub use error::{ExportError, ExportResult};
pub use config::ExporterConfig;
pub use channel::{MethodCall, MethodChannelRegistry, MethodResponse, MethodValue};
pub use authorization::{AuthorizationGate, AuthorizationStatus, PermissionPlatform};
pub use library::PhotoLibrary;
pub use reply::{HostDispatcher, MainThread, ReplyChannel};
pub use exporter::ImageExporter;

/// Photo Exporter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
