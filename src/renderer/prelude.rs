//! Prelude for diorama::renderer
//!
//! Re-exports the renderer boundary, the built-in backend and the factory types.

pub use super::cpu_reference::CpuReferenceRenderer;
pub use super::factory::{CpuReferenceRendererFactory, RendererFactory, RendererInfo};
pub use super::manager::RendererRegistry;
pub use super::settings::{RendererSettings, ShadowMapType};
pub use super::{RenderScene, Renderer, RendererBinding, RendererError};
