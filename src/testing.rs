//! Scripted platform collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::authorization::{AccessLevel, AuthorizationStatus, PermissionPlatform};
use crate::library::{AssetResource, ChangeBlock, ChangeCompletion, ChangeSet, LibraryError, PhotoLibrary};

/// Permission platform with a fixed status and a fixed prompt answer
pub struct ScriptedPermissions {
    status: AuthorizationStatus,
    answer: AuthorizationStatus,
    add_only: bool,
    status_queries: AtomicUsize,
    prompts: AtomicUsize,
    last_prompt_level: Mutex<Option<AccessLevel>>,
    queried_levels: Mutex<Vec<AccessLevel>>,
}

impl ScriptedPermissions {
    pub fn new(status: AuthorizationStatus, answer: AuthorizationStatus) -> Arc<Self> {
        Arc::new(Self::build(status, answer, true))
    }

    /// Platform without the add-only distinction
    pub fn legacy(status: AuthorizationStatus, answer: AuthorizationStatus) -> Arc<Self> {
        Arc::new(Self::build(status, answer, false))
    }

    fn build(status: AuthorizationStatus, answer: AuthorizationStatus, add_only: bool) -> Self {
        Self {
            status,
            answer,
            add_only,
            status_queries: AtomicUsize::new(0),
            prompts: AtomicUsize::new(0),
            last_prompt_level: Mutex::new(None),
            queried_levels: Mutex::new(Vec::new()),
        }
    }

    pub fn status_query_count(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn last_prompt_level(&self) -> Option<AccessLevel> {
        *self.last_prompt_level.lock()
    }

    /// Levels passed to every status query, in order
    pub fn queried_levels(&self) -> Vec<AccessLevel> {
        self.queried_levels.lock().clone()
    }
}

#[async_trait]
impl PermissionPlatform for ScriptedPermissions {
    fn supports_add_only(&self) -> bool {
        self.add_only
    }

    fn authorization_status(&self, level: AccessLevel) -> AuthorizationStatus {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        self.queried_levels.lock().push(level);
        self.status
    }

    async fn request_authorization(&self, level: AccessLevel) -> AuthorizationStatus {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt_level.lock() = Some(level);
        tokio::task::yield_now().await;
        self.answer
    }
}

/// Outcome a [`ScriptedLibrary`] reports
#[derive(Debug, Clone)]
pub enum LibraryScript {
    /// Commit and hand out this placeholder
    Commit(String),
    /// Commit without handing out a placeholder
    CommitWithoutPlaceholder,
    /// Hand out a placeholder, then report neither success nor error
    Abort(String),
    /// Fail the transaction with this description
    Fail(String),
}

struct ScriptedChanges {
    placeholder: Option<String>,
    created: Vec<AssetResource>,
}

impl ChangeSet for ScriptedChanges {
    fn create_asset(&mut self, resource: AssetResource) -> Option<String> {
        self.created.push(resource);
        self.placeholder.clone()
    }
}

/// Photo library following a script and recording what it was asked to do
pub struct ScriptedLibrary {
    script: LibraryScript,
    transactions: AtomicUsize,
    created: Mutex<Vec<AssetResource>>,
}

impl ScriptedLibrary {
    pub fn new(script: LibraryScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            transactions: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Resources created by committed transactions
    pub fn created(&self) -> Vec<AssetResource> {
        self.created.lock().clone()
    }
}

#[async_trait]
impl PhotoLibrary for ScriptedLibrary {
    async fn perform_changes(&self, changes: ChangeBlock) -> ChangeCompletion {
        self.transactions.fetch_add(1, Ordering::SeqCst);

        let placeholder = match &self.script {
            LibraryScript::Commit(id) | LibraryScript::Abort(id) => Some(id.clone()),
            LibraryScript::CommitWithoutPlaceholder | LibraryScript::Fail(_) => None,
        };
        let mut set = ScriptedChanges { placeholder, created: Vec::new() };

        // Completion arrives on another task, like the platform callback
        let handle = tokio::spawn(async move {
            let view: &mut dyn ChangeSet = &mut set;
            changes(view);
            set
        });
        let set = match handle.await {
            Ok(set) => set,
            Err(e) => return ChangeCompletion::failed(LibraryError::Rejected(e.to_string())),
        };

        match &self.script {
            LibraryScript::Commit(_) | LibraryScript::CommitWithoutPlaceholder => {
                self.created.lock().extend(set.created);
                ChangeCompletion::committed()
            }
            LibraryScript::Abort(_) => ChangeCompletion { success: false, error: None },
            LibraryScript::Fail(description) => {
                ChangeCompletion::failed(LibraryError::Rejected(description.clone()))
            }
        }
    }
}
