//! Asynchronous model loading for diorama.
//!
//! A [`ModelSource`] turns a path into a scene fragment; how the file is
//! decoded is up to the source. [`ModelLoader`] runs sources as tokio tasks
//! and hands finished loads back over an `async_channel`, so the viewer can
//! merge them on its own thread whenever it pumps the channel.

pub mod source;

use crate::scene::graph::Node;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub use source::{SnapshotModelSource, StaticModelSource};

/// Identifier of a single load request.
pub type LoadId = u64;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode model snapshot: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("model source panicked: {0}")]
    Panicked(String),
}

impl LoadError {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        LoadError::Panicked(message)
    }
}

/// Produces a scene fragment for a model path.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Node, LoadError>;

    fn name(&self) -> &'static str;
}

/// Outcome of a load request, delivered through the loader channel.
#[derive(Debug)]
pub enum LoadEvent {
    Completed { id: LoadId, path: PathBuf, fragment: Node },
    Failed { id: LoadId, path: PathBuf, error: LoadError },
}

impl LoadEvent {
    pub fn id(&self) -> LoadId {
        match self {
            LoadEvent::Completed { id, .. } | LoadEvent::Failed { id, .. } => *id,
        }
    }
}

/// Cancellation handle for an in-flight load.
#[derive(Debug)]
pub struct LoadHandle {
    id: LoadId,
    path: PathBuf,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl LoadHandle {
    pub fn id(&self) -> LoadId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Abort the task. A result already queued in the channel is still
    /// delivered, so consumers must drop events for cancelled ids.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Spawns model loads on a tokio runtime and collects their results.
pub struct ModelLoader {
    runtime: Handle,
    source: Arc<dyn ModelSource>,
    sender: async_channel::Sender<LoadEvent>,
    receiver: async_channel::Receiver<LoadEvent>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("source", &self.source.name())
            .field("queued", &self.receiver.len())
            .finish()
    }
}

impl ModelLoader {
    pub fn new(runtime: Handle, source: Arc<dyn ModelSource>) -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self {
            runtime,
            source,
            sender,
            receiver,
            next_id: AtomicU64::new(1),
        }
    }

    /// Loader bound to the runtime of the calling context.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current(source: Arc<dyn ModelSource>) -> Self {
        Self::new(Handle::current(), source)
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Start loading `path`. Never blocks.
    ///
    /// Every load that is not cancelled delivers exactly one event, even when
    /// the source panics.
    pub fn load(&self, path: impl Into<PathBuf>) -> LoadHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let path = path.into();
        let cancelled = Arc::new(AtomicBool::new(false));

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let flag = Arc::clone(&cancelled);
        let task_path = path.clone();

        tracing::debug!(id, path = %path.display(), source = source.name(), "model load requested");

        let task = self.runtime.spawn(async move {
            let outcome = AssertUnwindSafe(source.load(&task_path))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(LoadError::from_panic(payload)));
            if flag.load(Ordering::Acquire) {
                return;
            }
            let event = match outcome {
                Ok(fragment) => LoadEvent::Completed { id, path: task_path, fragment },
                Err(error) => LoadEvent::Failed { id, path: task_path, error },
            };
            // The receiver is gone once the owning viewer was torn down.
            let _ = sender.send(event).await;
        });

        LoadHandle { id, path, cancelled, task }
    }

    /// Next finished load, if one is queued.
    pub fn try_next(&self) -> Option<LoadEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the next finished load.
    pub async fn next(&self) -> Option<LoadEvent> {
        self.receiver.recv().await.ok()
    }

    pub fn queued(&self) -> usize {
        self.receiver.len()
    }
}
