use std::collections::BTreeMap;

use crate::renderer::factory::{CpuReferenceRendererFactory, RendererFactory, RendererInfo};
use crate::renderer::{Renderer, RendererError};

/// Registry of renderer factories keyed by renderer name.
///
/// The viewer asks the registry for the backend named in its configuration;
/// hosts can register their own factories (for example a GPU backend)
/// before attaching.
#[derive(Debug, Default)]
pub struct RendererRegistry {
    factories: BTreeMap<String, Box<dyn RendererFactory>>,
}

impl RendererRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in backends.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        let factory = CpuReferenceRendererFactory::new();
        registry.factories.insert(factory.get_info().name, Box::new(factory));
        registry
    }

    /// Register a factory under the name reported by its [`RendererInfo`].
    ///
    /// # Example
    /// ```
    /// use diorama::renderer::manager::RendererRegistry;
    /// use diorama::renderer::factory::CpuReferenceRendererFactory;
    ///
    /// let mut registry = RendererRegistry::new();
    /// registry.register(Box::new(CpuReferenceRendererFactory::new())).unwrap();
    /// assert_eq!(registry.get_factory_count(), 1);
    /// ```
    pub fn register(&mut self, factory: Box<dyn RendererFactory>) -> Result<(), RendererError> {
        let name = factory.get_info().name;
        if self.factories.contains_key(&name) {
            return Err(RendererError::FactoryAlreadyRegistered(name));
        }
        tracing::debug!(renderer = %name, "renderer factory registered");
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Create a renderer by factory name.
    pub fn create_by_name(&self, name: &str, parameters: &str) -> Result<Box<dyn Renderer>, RendererError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RendererError::RendererNotFoundByName(name.to_string()))?;
        factory.create(parameters)
    }

    pub fn get_renderer_info_list(&self) -> Vec<RendererInfo> {
        self.factories.values().map(|factory| factory.get_info()).collect()
    }

    /// Factories that advertise `capability`.
    pub fn find_by_capability(&self, capability: &str) -> Vec<RendererInfo> {
        self.factories
            .values()
            .map(|factory| factory.get_info())
            .filter(|info| info.has_capability(capability))
            .collect()
    }

    pub fn find_factory_by_name(&self, name: &str) -> Option<RendererInfo> {
        self.factories.get(name).map(|factory| factory.get_info())
    }

    pub fn validate_parameters_for(&self, name: &str, parameters: &str) -> Result<(), RendererError> {
        self.factories
            .get(name)
            .ok_or_else(|| RendererError::RendererNotFoundByName(name.to_string()))?
            .validate_parameters(parameters)
    }

    pub fn get_factory_count(&self) -> usize {
        self.factories.len()
    }
}
