use std::collections::HashMap;
use std::fmt::Debug;

use crate::renderer::cpu_reference::CpuReferenceRenderer;
use crate::renderer::settings::RendererSettings;
use crate::renderer::{Renderer, RendererError};

/// Information about a renderer backend a factory can create.
#[derive(Debug, Clone)]
pub struct RendererInfo {
    /// Human-readable name of the renderer
    pub name: String,

    /// Comma-separated list of capabilities supported by this renderer
    pub capabilities: String,

    /// Map of parameter names to their descriptions
    pub parameters: HashMap<String, String>,
}

impl RendererInfo {
    pub fn new(name: impl Into<String>, capabilities: impl Into<String>, parameters: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            capabilities: capabilities.into(),
            parameters,
        }
    }

    /// Split the capabilities string into individual capability names.
    ///
    /// Whitespace is trimmed and empty entries are dropped.
    pub fn get_capabilities(&self) -> Vec<&str> {
        self.capabilities
            .split(',')
            .map(|cap| cap.trim())
            .filter(|cap| !cap.is_empty())
            .collect()
    }

    /// Case-sensitive check against the trimmed capability names.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.get_capabilities()
            .iter()
            .any(|&cap| cap == capability.trim())
    }

    pub fn has_parameter(&self, param_name: &str) -> bool {
        self.parameters.contains_key(param_name)
    }

    pub fn get_parameter_description(&self, param_name: &str) -> Option<&String> {
        self.parameters.get(param_name)
    }
}

/// Creates renderer backends from parameter strings.
pub trait RendererFactory: Send + Sync + Debug {
    fn create(&self, parameters: &str) -> Result<Box<dyn Renderer>, RendererError>;

    fn get_info(&self) -> RendererInfo;

    /// Check parameters without building a renderer.
    fn validate_parameters(&self, _parameters: &str) -> Result<(), RendererError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CpuReferenceRendererFactory;

impl CpuReferenceRendererFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RendererFactory for CpuReferenceRendererFactory {
    fn create(&self, parameters: &str) -> Result<Box<dyn Renderer>, RendererError> {
        let settings = RendererSettings::from_parameters(parameters)?;
        Ok(Box::new(CpuReferenceRenderer::with_settings(settings)))
    }

    fn get_info(&self) -> RendererInfo {
        let parameters = [
            ("antialias", "Smooth edges (true/false); recorded, lines are drawn aliased"),
            ("clear_color", "Background color as 0xRRGGBB or #RRGGBB"),
            ("clear_alpha", "Background alpha in 0..=1"),
            ("auto_clear", "Clear before each frame (true/false)"),
            ("shadow_map", "off, basic, pcf or pcf_soft"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        RendererInfo::new("cpu_reference", "wireframe,headless,png_export", parameters)
    }

    fn validate_parameters(&self, parameters: &str) -> Result<(), RendererError> {
        RendererSettings::from_parameters(parameters).map(|_| ())
    }
}
