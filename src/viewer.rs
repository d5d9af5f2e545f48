//! The viewer: owns one [`ViewContext`] while attached to a canvas and
//! tracks the model loads started for it.

use crate::camera::{compute_aspect_ratio, configure_camera, PerspectiveCamera};
use crate::canvas::Canvas;
use crate::config::ViewerConfig;
use crate::context::{EventBus, EventStream, ViewContext, ViewerEvent};
use crate::controls::{ControlInput, OrbitControls};
use crate::interaction::{self, KeyEvent, PointerEvent, ResizeEvent};
use crate::loader::{LoadEvent, LoadHandle, LoadId, ModelLoader};
use crate::markers::MarkerLayer;
use crate::renderer::manager::RendererRegistry;
use crate::renderer::{Renderer, RendererBinding, RendererError};
use crate::scene::builder::build_scene;
use crate::scene::graph::SceneGraph;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("viewer is not attached to a canvas")]
    NotAttached,

    #[error("viewer is already attached to a canvas")]
    AlreadyAttached,

    #[error(transparent)]
    Renderer(#[from] RendererError),
}

/// What happened to a load the viewer was waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Merged { id: LoadId, nodes: usize },
    Failed { id: LoadId },
}

#[derive(Debug)]
pub struct Viewer {
    config: ViewerConfig,
    registry: RendererRegistry,
    loader: ModelLoader,
    context: Option<Box<ViewContext>>,
    pending: HashMap<LoadId, LoadHandle>,
    events: EventBus,
}

impl Viewer {
    pub fn new(config: ViewerConfig, loader: ModelLoader) -> Self {
        Self {
            config,
            registry: RendererRegistry::with_builtin(),
            loader,
            context: None,
            pending: HashMap::new(),
            events: EventBus::new(),
        }
    }

    /// Replace the renderer registry used by [`Viewer::attach`].
    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    pub fn is_attached(&self) -> bool {
        self.context.is_some()
    }

    /// Attach with the renderer named in the configuration.
    pub fn attach(&mut self, canvas: Canvas) -> Result<(), ViewerError> {
        if self.is_attached() {
            return Err(ViewerError::AlreadyAttached);
        }
        let renderer = self
            .registry
            .create_by_name(&self.config.renderer, &self.config.renderer_parameters)?;
        self.attach_with_renderer(canvas, renderer)
    }

    /// Build the scene, set up camera, renderer and controls, start the
    /// model load and draw the first frame.
    pub fn attach_with_renderer(&mut self, canvas: Canvas, renderer: Box<dyn Renderer>) -> Result<(), ViewerError> {
        if self.is_attached() {
            return Err(ViewerError::AlreadyAttached);
        }

        let (graph, load) = build_scene(&self.config, &self.loader);
        let (width, height) = canvas.client_size();
        let camera = configure_camera(
            self.config.field_of_view,
            self.config.near_clipping_plane,
            self.config.far_clipping_plane,
            compute_aspect_ratio(width, height),
        )
        .with_position(self.config.camera_position);
        let binding = RendererBinding::bind(canvas, renderer);

        let mut context = Box::new(ViewContext {
            markers: MarkerLayer::new(self.config.marker_limit),
            controls: OrbitControls::new(self.config.rotate_speed, self.config.zoom_speed),
            config: self.config.clone(),
            graph,
            camera,
            binding,
            events: self.events.clone(),
        });

        if let Err(error) = context.render() {
            load.cancel();
            return Err(error.into());
        }

        tracing::info!(
            renderer = context.binding.renderer().name(),
            width,
            height,
            load = load.id(),
            "viewer attached"
        );
        self.pending.insert(load.id(), load);
        self.context = Some(context);
        self.events.emit(ViewerEvent::Attached);
        Ok(())
    }

    /// Tear down: cancel every pending load and hand back the canvas.
    pub fn detach(&mut self) -> Result<Canvas, ViewerError> {
        let context = self.context.take().ok_or(ViewerError::NotAttached)?;
        let cancelled = self.pending.len();
        for (_, load) in self.pending.drain() {
            load.cancel();
        }
        let ViewContext { binding, .. } = *context;
        let (canvas, renderer) = binding.unbind();
        tracing::info!(renderer = renderer.name(), cancelled, "viewer detached");
        self.events.emit(ViewerEvent::Detached);
        Ok(canvas)
    }

    pub fn context(&self) -> Option<&ViewContext> {
        self.context.as_deref()
    }

    pub fn context_mut(&mut self) -> Option<&mut ViewContext> {
        self.context.as_deref_mut()
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.context().map(|ctx| &ctx.graph)
    }

    pub fn markers(&self) -> Option<&MarkerLayer> {
        self.context().map(|ctx| &ctx.markers)
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.context().map(|ctx| &ctx.camera)
    }

    pub fn frame_count(&self) -> u64 {
        self.context().map_or(0, ViewContext::frame_count)
    }

    fn attached(&mut self) -> Result<&mut ViewContext, ViewerError> {
        self.context.as_deref_mut().ok_or(ViewerError::NotAttached)
    }

    /// Request one frame.
    pub fn render(&mut self) -> Result<(), ViewerError> {
        Ok(self.attached()?.render()?)
    }

    /// Write the last drawn frame to an image file.
    pub fn save_frame(&self, path: impl AsRef<std::path::Path>) -> Result<(), ViewerError> {
        let ctx = self.context().ok_or(ViewerError::NotAttached)?;
        Ok(ctx.binding.save_frame(path.as_ref())?)
    }

    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> Result<usize, ViewerError> {
        Ok(interaction::on_pointer_down(self.attached()?, event)?)
    }

    pub fn on_pointer_up(&self, event: &PointerEvent) {
        interaction::on_pointer_up(event);
    }

    pub fn on_key_press(&self, event: &KeyEvent) {
        interaction::on_key_press(event);
    }

    pub fn on_resize(&mut self, event: ResizeEvent) -> Result<(), ViewerError> {
        let ctx = self.attached()?;
        ctx.binding.canvas_mut().set_container_size(event.width, event.height);
        Ok(interaction::on_resize(ctx)?)
    }

    pub fn on_control_input(&mut self, input: ControlInput) -> Result<bool, ViewerError> {
        Ok(interaction::on_control_input(self.attached()?, input)?)
    }

    pub fn clear_markers(&mut self) -> Result<usize, ViewerError> {
        Ok(interaction::clear_markers(self.attached()?)?)
    }

    /// Start loading another model into the attached scene.
    pub fn load_model(&mut self, path: impl Into<PathBuf>) -> Result<LoadId, ViewerError> {
        if !self.is_attached() {
            return Err(ViewerError::NotAttached);
        }
        let load = self.loader.load(path);
        let id = load.id();
        self.pending.insert(id, load);
        Ok(id)
    }

    /// Cancel a pending load. Returns false when `id` is not pending.
    pub fn cancel_load(&mut self, id: LoadId) -> bool {
        match self.pending.remove(&id) {
            Some(load) => {
                load.cancel();
                tracing::debug!(id, "model load cancelled");
                true
            }
            None => false,
        }
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Merge every load that has already finished, without waiting.
    pub fn poll_loads(&mut self) -> Result<Vec<LoadOutcome>, ViewerError> {
        let mut outcomes = Vec::new();
        while let Some(event) = self.loader.try_next() {
            if let Some(outcome) = self.handle_load_event(event)? {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Wait for the next pending load to finish and merge it.
    ///
    /// `None` when nothing is pending.
    pub async fn next_load(&mut self) -> Result<Option<LoadOutcome>, ViewerError> {
        while !self.pending.is_empty() {
            let Some(event) = self.loader.next().await else {
                break;
            };
            if let Some(outcome) = self.handle_load_event(event)? {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    fn handle_load_event(&mut self, event: LoadEvent) -> Result<Option<LoadOutcome>, ViewerError> {
        let id = event.id();
        if self.pending.remove(&id).is_none() {
            tracing::debug!(id, "dropping result of a cancelled load");
            return Ok(None);
        }

        match event {
            LoadEvent::Completed { fragment, path, .. } => {
                let ctx = self.attached()?;
                let nodes = fragment.subtree_len();
                ctx.graph.add_node_to_root(fragment);
                tracing::info!(id, nodes, path = %path.display(), "model merged");
                ctx.emit(ViewerEvent::ModelMerged { load_id: id, nodes });
                ctx.render()?;
                Ok(Some(LoadOutcome::Merged { id, nodes }))
            }
            LoadEvent::Failed { path, error, .. } => {
                tracing::warn!(id, path = %path.display(), %error, "model load failed");
                self.events.emit(ViewerEvent::ModelFailed { load_id: id });
                Ok(Some(LoadOutcome::Failed { id }))
            }
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        for (_, load) in self.pending.drain() {
            load.cancel();
        }
    }
}
