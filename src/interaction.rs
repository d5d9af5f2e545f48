//! Input handlers for an attached view.
//!
//! Each handler works on an explicit [`ViewContext`]. Only pointer-down,
//! resize, control input and marker clearing touch state; pointer-up and
//! key presses are logged and otherwise ignored.

use crate::camera::compute_aspect_ratio;
use crate::canvas::CanvasStyle;
use crate::context::{ViewContext, ViewerEvent};
use crate::controls::ControlInput;
use crate::picking::{pointer_to_ndc, Raycaster};
use crate::renderer::RendererError;

/// Pointer position in CSS pixels, relative to the canvas top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerEvent {
    pub fn at(client_x: f32, client_y: f32) -> Self {
        Self { client_x, client_y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// New container size reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

/// Pick under the pointer and drop one marker per intersection.
///
/// Returns the number of markers spawned. Every marker is announced and
/// followed by its own frame, so a pick with no hits draws nothing.
pub fn on_pointer_down(ctx: &mut ViewContext, event: &PointerEvent) -> Result<usize, RendererError> {
    let (width, height) = ctx.binding.canvas().client_size();
    let Some(ndc) = pointer_to_ndc(event.client_x, event.client_y, width, height) else {
        tracing::debug!(width, height, "pointer down on an empty canvas");
        return Ok(0);
    };
    if ctx.camera.is_projection_dirty() {
        ctx.camera.update_projection_matrix();
    }
    let Some(raycaster) = Raycaster::from_camera(ndc, &ctx.camera)
        .map(|raycaster| raycaster.with_line_threshold(ctx.config.line_threshold))
    else {
        tracing::debug!("camera projection is degenerate, nothing to pick");
        return Ok(0);
    };

    let candidates = ctx.graph.pick_candidates();
    tracing::debug!(x = ndc.x, y = ndc.y, candidates = candidates.len(), "picking");
    let hits = raycaster.intersect_candidates(candidates);
    tracing::debug!(hits = hits.len(), "intersected");

    let (snap, marker_height) = (ctx.config.snap, ctx.config.marker_height);
    for hit in &hits {
        let id = ctx.markers.spawn(hit.point, snap, marker_height);
        tracing::trace!(marker = id, node = %hit.name, distance = hit.distance, "marker spawned");
        ctx.emit(ViewerEvent::MarkerSpawned { id });
        ctx.render()?;
    }
    Ok(hits.len())
}

pub fn on_pointer_up(event: &PointerEvent) {
    tracing::debug!(x = event.client_x, y = event.client_y, "pointer up");
}

pub fn on_key_press(event: &KeyEvent) {
    tracing::debug!(key = %event.key, "key press");
}

/// Fit the canvas to its container, then bring camera and renderer in line
/// with the new client size and draw. Repeating it without a container
/// change yields the same state.
pub fn on_resize(ctx: &mut ViewContext) -> Result<(), RendererError> {
    let canvas = ctx.binding.canvas_mut();
    canvas.style = CanvasStyle::FILL;
    let (width, height) = canvas.client_size();
    tracing::info!(width, height, "resize");

    ctx.camera.set_aspect(compute_aspect_ratio(width, height));
    ctx.camera.update_projection_matrix();
    ctx.binding.sync_size();

    ctx.emit(ViewerEvent::Resized { width, height });
    ctx.render()
}

/// Feed orbit-control input to the camera; renders when the camera moved.
pub fn on_control_input(ctx: &mut ViewContext, input: ControlInput) -> Result<bool, RendererError> {
    let height = ctx.binding.canvas().client_height();
    if !ctx.controls.apply(&mut ctx.camera, input, height) {
        return Ok(false);
    }
    ctx.render()?;
    Ok(true)
}

/// Drop every marker; renders when any were present.
pub fn clear_markers(ctx: &mut ViewContext) -> Result<usize, RendererError> {
    let count = ctx.markers.clear();
    if count > 0 {
        tracing::debug!(count, "markers cleared");
        ctx.emit(ViewerEvent::MarkersCleared { count });
        ctx.render()?;
    }
    Ok(count)
}
