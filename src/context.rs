//! Per-instance view state and viewer notifications.

use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::loader::LoadId;
use crate::markers::{MarkerId, MarkerLayer};
use crate::renderer::{RenderScene, RendererBinding, RendererError};
use crate::scene::graph::SceneGraph;
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// Notifications published by a viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Attached,
    Detached,
    Rendered { frame: u64 },
    Resized { width: u32, height: u32 },
    MarkerSpawned { id: MarkerId },
    MarkersCleared { count: usize },
    ModelMerged { load_id: LoadId, nodes: usize },
    ModelFailed { load_id: LoadId },
}

/// Fan-out of viewer events to every live subscriber.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    sinks: Arc<Mutex<Vec<async_channel::Sender<ViewerEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventStream {
        let (sender, receiver) = async_channel::unbounded();
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.push(sender);
        }
        EventStream {
            receiver: Box::pin(receiver),
        }
    }

    /// Deliver `event` to all subscribers; dropped subscribers are pruned.
    pub fn emit(&self, event: ViewerEvent) {
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.retain(|sink| sink.try_send(event.clone()).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.lock().map(|sinks| sinks.len()).unwrap_or(0)
    }
}

/// Async stream of viewer events.
pub struct EventStream {
    receiver: Pin<Box<async_channel::Receiver<ViewerEvent>>>,
}

impl EventStream {
    /// Next already-published event, without waiting.
    pub fn try_next_event(&self) -> Option<ViewerEvent> {
        self.receiver.try_recv().ok()
    }

    /// All already-published events.
    pub fn drain(&self) -> Vec<ViewerEvent> {
        std::iter::from_fn(|| self.try_next_event()).collect()
    }
}

impl Stream for EventStream {
    type Item = ViewerEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.as_mut().poll_next(cx)
    }
}

/// Everything one attached viewer owns: scene, markers, camera, controls
/// and the renderer binding. Handlers receive it by reference.
#[derive(Debug)]
pub struct ViewContext {
    pub config: ViewerConfig,
    pub graph: SceneGraph,
    pub markers: MarkerLayer,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub binding: RendererBinding,
    pub(crate) events: EventBus,
}

impl ViewContext {
    /// Draw exactly one frame of the current scene and markers.
    pub fn render(&mut self) -> Result<(), RendererError> {
        let scene = RenderScene {
            graph: &self.graph,
            markers: &self.markers,
            camera: &self.camera,
        };
        self.binding.render(&scene)?;
        let frame = self.binding.frame_count();
        tracing::debug!(frame, "rendered");
        self.events.emit(ViewerEvent::Rendered { frame });
        Ok(())
    }

    pub fn frame_count(&self) -> u64 {
        self.binding.frame_count()
    }

    pub(crate) fn emit(&self, event: ViewerEvent) {
        self.events.emit(event);
    }
}
