//! Photo Exporter - Reply Delivery
//!
//! One-shot reply channel. A reply is always marshaled onto the host's
//! mandated context through a [`HostDispatcher`], whatever thread the
//! pipeline finished on.

use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use crossbeam_channel::{unbounded, Sender};
use tokio::sync::oneshot;

use crate::channel::MethodResponse;

/// Unit of work run on the host context
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Host-side consumer of a reply
pub type ReplySink = Box<dyn FnOnce(MethodResponse) + Send + 'static>;

/// Message delivered when a channel is dropped without a reply
pub const DROPPED_REPLY_MESSAGE: &str = "Request ended without producing a result";

/// Marshals jobs onto the execution context the host requires for replies
pub trait HostDispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN THREAD
// ═══════════════════════════════════════════════════════════════════════════════

/// Dedicated host thread running dispatched jobs in FIFO order
pub struct MainThread {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl MainThread {
    /// Spawn the thread with the given name
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (sender, receiver) = unbounded::<Job>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for job in receiver {
                    job();
                }
            })?;
        let thread_id = handle.thread().id();

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            thread_id,
        })
    }

    /// Id of the thread replies run on
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

impl HostDispatcher for MainThread {
    fn dispatch(&self, job: Job) {
        let Some(sender) = self.sender.as_ref() else {
            log::error!("Main thread is shut down, job dropped");
            return;
        };

        if sender.send(job).is_err() {
            log::error!("Main thread stopped, job dropped");
        }
    }
}

impl Drop for MainThread {
    fn drop(&mut self) {
        // Closing the queue lets the thread drain and exit
        self.sender.take();

        if let Some(handle) = self.handle.take() {
            if thread::current().id() != self.thread_id && handle.join().is_err() {
                log::error!("Main thread panicked");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPLY CHANNEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Write-once reply sink for a single request.
///
/// `send` consumes the channel. A channel dropped without a reply still
/// delivers a `save_failed` error, so the host sees exactly one reply.
pub struct ReplyChannel {
    sink: Option<ReplySink>,
    dispatcher: Arc<dyn HostDispatcher>,
}

impl ReplyChannel {
    /// Wrap a host sink
    pub fn new<F>(dispatcher: Arc<dyn HostDispatcher>, sink: F) -> Self
    where
        F: FnOnce(MethodResponse) + Send + 'static,
    {
        Self {
            sink: Some(Box::new(sink)),
            dispatcher,
        }
    }

    /// Channel paired with a receiver for Rust callers
    pub fn oneshot(dispatcher: Arc<dyn HostDispatcher>) -> (Self, oneshot::Receiver<MethodResponse>) {
        let (tx, rx) = oneshot::channel();
        let channel = Self::new(dispatcher, move |response| {
            if tx.send(response).is_err() {
                log::warn!("Reply receiver went away before the reply arrived");
            }
        });
        (channel, rx)
    }

    /// Deliver the reply
    pub fn send(mut self, response: MethodResponse) {
        self.deliver(response);
    }

    fn deliver(&mut self, response: MethodResponse) {
        if let Some(sink) = self.sink.take() {
            self.dispatcher.dispatch(Box::new(move || sink(response)));
        }
    }
}

impl Drop for ReplyChannel {
    fn drop(&mut self) {
        if self.sink.is_some() {
            log::error!("Reply channel dropped without a reply");
            self.deliver(MethodResponse::Error {
                code: "save_failed".into(),
                message: DROPPED_REPLY_MESSAGE.into(),
                details: None,
            });
        }
    }
}
