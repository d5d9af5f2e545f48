//! Renderer module of diorama
//!
//! Defines the backend boundary ([`Renderer`]), the canvas binding that keeps
//! a backend sized to its canvas, and a registry of backend factories.
//! Drawing is strictly on demand: [`RendererBinding::render`] draws exactly
//! one frame and nothing here schedules frames on its own.

pub mod cpu_reference;
pub mod factory;
pub mod manager;
pub mod prelude;
pub mod settings;

use crate::camera::PerspectiveCamera;
use crate::canvas::Canvas;
use crate::config::ConfigError;
use crate::markers::MarkerLayer;
use crate::scene::graph::SceneGraph;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer creation failed: {0}")]
    CreationFailed(String),

    #[error("invalid renderer parameters: {0}")]
    InvalidParameters(String),

    #[error("no renderer factory named '{0}'")]
    RendererNotFoundByName(String),

    #[error("a renderer factory named '{0}' is already registered")]
    FactoryAlreadyRegistered(String),

    #[error("renderer '{0}' keeps no readable frame")]
    NoFrameImage(&'static str),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<ConfigError> for RendererError {
    fn from(error: ConfigError) -> Self {
        RendererError::InvalidParameters(error.to_string())
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderScene<'a> {
    pub graph: &'a SceneGraph,
    pub markers: &'a MarkerLayer,
    pub camera: &'a PerspectiveCamera,
}

/// Trait that all renderer backends implement.
pub trait Renderer: Send + Debug {
    /// Device pixels per CSS pixel for the output buffer.
    fn set_pixel_ratio(&mut self, ratio: f32);

    fn pixel_ratio(&self) -> f32;

    /// Resize the output to `width` x `height` CSS pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Current output size in CSS pixels.
    fn size(&self) -> (u32, u32);

    /// Draw one frame synchronously.
    fn render(&mut self, scene: &RenderScene<'_>) -> Result<(), RendererError>;

    /// Frames drawn since creation.
    fn frame_count(&self) -> u64;

    fn name(&self) -> &'static str;

    /// Last drawn frame, for backends that can read it back.
    fn frame_image(&self) -> Option<&image::RgbaImage> {
        None
    }
}

/// One canvas bound to one renderer.
///
/// After [`RendererBinding::bind`] and after every [`RendererBinding::sync_size`]
/// the renderer size equals the canvas client size.
#[derive(Debug)]
pub struct RendererBinding {
    canvas: Canvas,
    renderer: Box<dyn Renderer>,
}

impl RendererBinding {
    pub fn bind(canvas: Canvas, mut renderer: Box<dyn Renderer>) -> Self {
        renderer.set_pixel_ratio(canvas.device_pixel_ratio());
        let (width, height) = canvas.client_size();
        renderer.set_size(width, height);
        tracing::debug!(renderer = renderer.name(), width, height, "renderer bound to canvas");
        Self { canvas, renderer }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Resize the renderer output to the canvas client size.
    pub fn sync_size(&mut self) {
        let (width, height) = self.canvas.client_size();
        self.renderer.set_size(width, height);
    }

    pub fn is_in_sync(&self) -> bool {
        self.renderer.size() == self.canvas.client_size()
    }

    pub fn render(&mut self, scene: &RenderScene<'_>) -> Result<(), RendererError> {
        self.renderer.render(scene)
    }

    pub fn frame_count(&self) -> u64 {
        self.renderer.frame_count()
    }

    /// Write the last drawn frame to `path`; the format follows the extension.
    pub fn save_frame(&self, path: &std::path::Path) -> Result<(), RendererError> {
        let image = self
            .renderer
            .frame_image()
            .ok_or(RendererError::NoFrameImage(self.renderer.name()))?;
        image.save(path)?;
        Ok(())
    }

    /// Give back the canvas and renderer.
    pub fn unbind(self) -> (Canvas, Box<dyn Renderer>) {
        (self.canvas, self.renderer)
    }
}
