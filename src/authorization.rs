//! Photo Exporter - Authorization Gate
//!
//! Decides whether a save may proceed. The status is queried fresh on every
//! request; the user is prompted at most once, and only when the status is
//! not determined yet.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Messages, ScopePreference};
use crate::error::{ExportError, ExportResult};

/// Photo library authorization status as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
    /// Access granted to a user-selected subset
    Limited,
    /// A value this crate does not know about
    Unknown(i64),
}

impl AuthorizationStatus {
    /// Map a raw platform status value
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::NotDetermined,
            1 => Self::Restricted,
            2 => Self::Denied,
            3 => Self::Authorized,
            4 => Self::Limited,
            other => Self::Unknown(other),
        }
    }

    /// Raw platform status value
    pub fn raw(&self) -> i64 {
        match self {
            Self::NotDetermined => 0,
            Self::Restricted => 1,
            Self::Denied => 2,
            Self::Authorized => 3,
            Self::Limited => 4,
            Self::Unknown(raw) => *raw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotDetermined => "not-determined",
            Self::Restricted => "restricted",
            Self::Denied => "denied",
            Self::Authorized => "authorized",
            Self::Limited => "limited",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "unknown({raw})"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for AuthorizationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "not-determined" | "notdetermined" => Ok(Self::NotDetermined),
            "restricted" => Ok(Self::Restricted),
            "denied" => Ok(Self::Denied),
            "authorized" => Ok(Self::Authorized),
            "limited" => Ok(Self::Limited),
            other => other
                .parse::<i64>()
                .map(Self::from_raw)
                .map_err(|_| format!("unknown authorization status: {s}")),
        }
    }
}

/// Access level passed to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// Write new assets without reading the library
    AddOnly,
    /// Legacy undifferentiated access
    ReadWrite,
}

/// OS permission collaborator
#[async_trait]
pub trait PermissionPlatform: Send + Sync {
    /// Whether the platform distinguishes add-only access
    fn supports_add_only(&self) -> bool;

    /// Current status, synchronous
    fn authorization_status(&self, level: AccessLevel) -> AuthorizationStatus;

    /// Show the system prompt once and wait for the user's answer
    async fn request_authorization(&self, level: AccessLevel) -> AuthorizationStatus;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROVIDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Capability-specific view of the platform permission API
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    fn level(&self) -> AccessLevel;

    fn status(&self) -> AuthorizationStatus;

    /// Prompt the user; true when the answer grants access
    async fn request(&self) -> bool;
}

/// Add-only scope. Authorized and limited answers both grant access.
pub struct AddOnlyAuthorization {
    platform: Arc<dyn PermissionPlatform>,
}

impl AddOnlyAuthorization {
    pub fn new(platform: Arc<dyn PermissionPlatform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl AuthorizationProvider for AddOnlyAuthorization {
    fn level(&self) -> AccessLevel {
        AccessLevel::AddOnly
    }

    fn status(&self) -> AuthorizationStatus {
        self.platform.authorization_status(AccessLevel::AddOnly)
    }

    async fn request(&self) -> bool {
        let answer = self.platform.request_authorization(AccessLevel::AddOnly).await;
        matches!(answer, AuthorizationStatus::Authorized | AuthorizationStatus::Limited)
    }
}

/// Legacy scope. Only an authorized answer grants access.
pub struct LegacyAuthorization {
    platform: Arc<dyn PermissionPlatform>,
}

impl LegacyAuthorization {
    pub fn new(platform: Arc<dyn PermissionPlatform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl AuthorizationProvider for LegacyAuthorization {
    fn level(&self) -> AccessLevel {
        AccessLevel::ReadWrite
    }

    fn status(&self) -> AuthorizationStatus {
        self.platform.authorization_status(AccessLevel::ReadWrite)
    }

    async fn request(&self) -> bool {
        let answer = self.platform.request_authorization(AccessLevel::ReadWrite).await;
        answer == AuthorizationStatus::Authorized
    }
}

/// Pick the provider once, from the detected platform capability
pub fn select_provider(
    platform: Arc<dyn PermissionPlatform>,
    preference: ScopePreference,
) -> Arc<dyn AuthorizationProvider> {
    let add_only = match preference {
        ScopePreference::AddOnly => true,
        ScopePreference::Legacy => false,
        ScopePreference::Auto => platform.supports_add_only(),
    };

    if add_only {
        log::debug!("Using add-only photo library authorization");
        Arc::new(AddOnlyAuthorization::new(platform))
    } else {
        log::debug!("Using legacy photo library authorization");
        Arc::new(LegacyAuthorization::new(platform))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps every status to proceed or a specific failure
pub struct AuthorizationGate {
    provider: Arc<dyn AuthorizationProvider>,
    messages: Messages,
}

impl AuthorizationGate {
    pub fn new(provider: Arc<dyn AuthorizationProvider>, messages: Messages) -> Self {
        Self { provider, messages }
    }

    /// Resolve access for one request. Suspends only on the prompt.
    pub async fn ensure_authorized(&self) -> ExportResult<()> {
        let status = self.provider.status();
        log::debug!("Photo library status ({:?}): {}", self.provider.level(), status);

        match status {
            AuthorizationStatus::Authorized | AuthorizationStatus::Limited => Ok(()),
            AuthorizationStatus::NotDetermined => {
                if self.provider.request().await {
                    log::info!("Photo library access granted by user");
                    Ok(())
                } else {
                    log::warn!("Photo library access refused by user");
                    Err(self.denied())
                }
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                log::warn!("Photo library access is {}", status);
                Err(self.denied())
            }
            AuthorizationStatus::Unknown(raw) => {
                log::warn!("Unrecognized photo library status {}", raw);
                Err(ExportError::PermissionUnknown {
                    status: raw,
                    message: self.messages.permission_unknown.clone(),
                })
            }
        }
    }

    fn denied(&self) -> ExportError {
        ExportError::PermissionDenied {
            message: self.messages.permission_denied.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPermissions;

    fn gate(platform: Arc<ScriptedPermissions>, preference: ScopePreference) -> AuthorizationGate {
        AuthorizationGate::new(select_provider(platform, preference), Messages::default())
    }

    #[test]
    fn test_raw_mapping() {
        for raw in 0..=4 {
            assert_eq!(AuthorizationStatus::from_raw(raw).raw(), raw);
        }
        assert_eq!(AuthorizationStatus::from_raw(3), AuthorizationStatus::Authorized);
        assert_eq!(AuthorizationStatus::from_raw(42), AuthorizationStatus::Unknown(42));
        assert_eq!("limited".parse::<AuthorizationStatus>(), Ok(AuthorizationStatus::Limited));
        assert_eq!("9".parse::<AuthorizationStatus>(), Ok(AuthorizationStatus::Unknown(9)));
        assert!("maybe".parse::<AuthorizationStatus>().is_err());
    }

    #[test]
    fn test_provider_selection() {
        let modern = ScriptedPermissions::new(AuthorizationStatus::Authorized, AuthorizationStatus::Denied);
        let legacy = ScriptedPermissions::legacy(AuthorizationStatus::Authorized, AuthorizationStatus::Denied);

        assert_eq!(select_provider(modern.clone(), ScopePreference::Auto).level(), AccessLevel::AddOnly);
        assert_eq!(select_provider(legacy.clone(), ScopePreference::Auto).level(), AccessLevel::ReadWrite);
        assert_eq!(select_provider(modern, ScopePreference::Legacy).level(), AccessLevel::ReadWrite);
        assert_eq!(select_provider(legacy, ScopePreference::AddOnly).level(), AccessLevel::AddOnly);
    }

    #[tokio::test]
    async fn test_status_queried_at_provider_level() {
        let legacy = ScriptedPermissions::legacy(AuthorizationStatus::NotDetermined, AuthorizationStatus::Authorized);
        assert_eq!(gate(legacy.clone(), ScopePreference::Auto).ensure_authorized().await, Ok(()));
        assert_eq!(legacy.queried_levels(), vec![AccessLevel::ReadWrite]);
        assert_eq!(legacy.last_prompt_level(), Some(AccessLevel::ReadWrite));

        let modern = ScriptedPermissions::new(AuthorizationStatus::Authorized, AuthorizationStatus::Denied);
        assert_eq!(gate(modern.clone(), ScopePreference::Auto).ensure_authorized().await, Ok(()));
        assert_eq!(modern.queried_levels(), vec![AccessLevel::AddOnly]);
    }

    #[tokio::test]
    async fn test_granted_statuses_skip_prompt() {
        for status in [AuthorizationStatus::Authorized, AuthorizationStatus::Limited] {
            let platform = ScriptedPermissions::new(status, AuthorizationStatus::Denied);
            assert_eq!(gate(platform.clone(), ScopePreference::Auto).ensure_authorized().await, Ok(()));
            assert_eq!(platform.prompt_count(), 0);
            assert_eq!(platform.status_query_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_not_determined_prompts_once() {
        let platform = ScriptedPermissions::new(AuthorizationStatus::NotDetermined, AuthorizationStatus::Authorized);
        assert_eq!(gate(platform.clone(), ScopePreference::Auto).ensure_authorized().await, Ok(()));
        assert_eq!(platform.prompt_count(), 1);
        assert_eq!(platform.last_prompt_level(), Some(AccessLevel::AddOnly));

        let platform = ScriptedPermissions::new(AuthorizationStatus::NotDetermined, AuthorizationStatus::Denied);
        let err = gate(platform.clone(), ScopePreference::Auto).ensure_authorized().await.unwrap_err();
        assert_eq!(err.code(), "permission_denied");
        assert_eq!(platform.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_limited_answer_depends_on_scope() {
        let platform = ScriptedPermissions::new(AuthorizationStatus::NotDetermined, AuthorizationStatus::Limited);
        assert_eq!(gate(platform.clone(), ScopePreference::AddOnly).ensure_authorized().await, Ok(()));

        let platform = ScriptedPermissions::new(AuthorizationStatus::NotDetermined, AuthorizationStatus::Limited);
        let err = gate(platform.clone(), ScopePreference::Legacy).ensure_authorized().await.unwrap_err();
        assert_eq!(err.code(), "permission_denied");
        assert_eq!(platform.last_prompt_level(), Some(AccessLevel::ReadWrite));
    }

    #[tokio::test]
    async fn test_terminal_refusals() {
        for status in [AuthorizationStatus::Denied, AuthorizationStatus::Restricted] {
            let platform = ScriptedPermissions::new(status, AuthorizationStatus::Authorized);
            let err = gate(platform.clone(), ScopePreference::Auto).ensure_authorized().await.unwrap_err();
            assert_eq!(err, ExportError::PermissionDenied {
                message: Messages::default().permission_denied,
            });
            assert_eq!(platform.prompt_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_unknown_status() {
        let platform = ScriptedPermissions::new(AuthorizationStatus::Unknown(99), AuthorizationStatus::Authorized);
        let err = gate(platform.clone(), ScopePreference::Auto).ensure_authorized().await.unwrap_err();
        assert_eq!(err.code(), "permission_unknown");
        assert_eq!(err.message(), Messages::default().permission_unknown);
        assert_eq!(platform.prompt_count(), 0);
    }
}
