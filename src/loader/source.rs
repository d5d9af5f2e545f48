use super::{LoadError, ModelSource};
use crate::scene::graph::Node;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Serves a fragment that is already in memory, optionally after a delay.
#[derive(Debug, Clone)]
pub struct StaticModelSource {
    fragment: Result<Node, String>,
    delay: Option<Duration>,
}

impl StaticModelSource {
    pub fn new(fragment: Node) -> Self {
        Self {
            fragment: Ok(fragment),
            delay: None,
        }
    }

    /// A source whose every load fails with `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            fragment: Err(reason.into()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ModelSource for StaticModelSource {
    async fn load(&self, _path: &Path) -> Result<Node, LoadError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.fragment.clone().map_err(LoadError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Reads a bincode snapshot written by [`Node::to_snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotModelSource;

impl SnapshotModelSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelSource for SnapshotModelSource {
    async fn load(&self, path: &Path) -> Result<Node, LoadError> {
        let bytes = tokio::fs::read(path).await?;
        let node = Node::from_snapshot(&bytes)?;
        tracing::debug!(path = %path.display(), nodes = node.subtree_len(), "decoded model snapshot");
        Ok(node)
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}
