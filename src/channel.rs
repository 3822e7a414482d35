//! Photo Exporter - Method Channel
//!
//! Value model of the host bridge and a registry routing calls to handlers
//! by channel name. Handlers are registered once, when the host is wired up.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::error::ExportError;
use crate::reply::{HostDispatcher, ReplyChannel};

/// Value carried across the bridge
#[derive(Debug, Clone, PartialEq)]
pub enum MethodValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Binary payload (typed data)
    Bytes(Vec<u8>),
    List(Vec<MethodValue>),
    Map(BTreeMap<String, MethodValue>),
}

/// Incoming call
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Option<MethodValue>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Option<MethodValue>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call with a single `key: value` argument map
    pub fn with_argument(method: impl Into<String>, key: &str, value: MethodValue) -> Self {
        let mut args = BTreeMap::new();
        args.insert(key.to_string(), value);
        Self::new(method, Some(MethodValue::Map(args)))
    }

    /// Take a named argument out of the argument map
    pub fn take_argument(&mut self, key: &str) -> Option<MethodValue> {
        match self.arguments.as_mut() {
            Some(MethodValue::Map(args)) => args.remove(key),
            _ => None,
        }
    }
}

/// Reply sent back across the bridge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        value: String,
    },
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    /// The bridge's sentinel for an unknown method
    NotImplemented,
}

impl MethodResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }
}

impl From<ExportError> for MethodResponse {
    fn from(err: ExportError) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: err.message().to_string(),
            details: None,
        }
    }
}

impl From<Result<String, ExportError>> for MethodResponse {
    fn from(result: Result<String, ExportError>) -> Self {
        match result {
            Ok(value) => MethodResponse::Success { value },
            Err(err) => err.into(),
        }
    }
}

/// Handler bound to a channel. Must consume `reply`.
#[async_trait]
pub trait MethodCallHandler: Send + Sync {
    async fn handle(&self, call: MethodCall, reply: ReplyChannel);
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Routes calls to the handler registered for a channel name
pub struct MethodChannelRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn MethodCallHandler>>>,
    dispatcher: Arc<dyn HostDispatcher>,
}

impl MethodChannelRegistry {
    pub fn new(dispatcher: Arc<dyn HostDispatcher>) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Bind a handler; replaces any previous one on the same channel
    pub fn set_method_call_handler(&self, channel: &str, handler: Arc<dyn MethodCallHandler>) {
        log::debug!("Registering handler on channel {}", channel);
        self.handlers.write().insert(channel.to_string(), handler);
    }

    /// Run a call and return the receiver of its single reply
    pub async fn invoke(&self, channel: &str, call: MethodCall) -> oneshot::Receiver<MethodResponse> {
        let (reply, rx) = ReplyChannel::oneshot(Arc::clone(&self.dispatcher));
        let handler = self.handlers.read().get(channel).cloned();

        match handler {
            Some(handler) => handler.handle(call, reply).await,
            None => {
                log::warn!("No handler on channel {}", channel);
                reply.send(MethodResponse::NotImplemented);
            }
        }

        rx
    }
}
