//! Engine configuration and the collaborators it exposes.
//!
//! The registry consumes these traits only; deployment caching and
//! property extraction live in the surrounding engine.

use crate::errors::ContextError;
use std::fmt;
use std::sync::Arc;

/// A structured document holding deployment-time overrides for one
/// process definition.
pub type InfoDocument = Arc<serde_json::Value>;

/// Cached definition info for one process definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionInfoCacheObject {
    /// The process definition id.
    pub id: String,
    /// Revision of the stored info.
    pub revision: u32,
    /// The override document, if one was ever stored.
    pub info_node: Option<InfoDocument>,
}

impl DefinitionInfoCacheObject {
    /// Creates a cache object without a document.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            revision: 1,
            info_node: None,
        }
    }

    /// Sets the info document.
    #[must_use]
    pub fn with_info_node(mut self, document: serde_json::Value) -> Self {
        self.info_node = Some(Arc::new(document));
        self
    }

    /// Sets the revision.
    #[must_use]
    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }
}

/// Looks up definition info by process definition id.
#[cfg_attr(test, mockall::automock)]
pub trait DefinitionInfoCache: Send + Sync {
    /// Returns the cached info object for `process_definition_id`.
    ///
    /// `Ok(None)` means the definition has no info object.
    fn process_definition_info(
        &self,
        process_definition_id: &str,
    ) -> Result<Option<DefinitionInfoCacheObject>, ContextError>;
}

/// Extracts named element properties from an info document.
#[cfg_attr(test, mockall::automock)]
pub trait DynamicPropertiesService: Send + Sync {
    /// Returns the properties recorded for `element_id`, if any.
    fn element_properties(
        &self,
        element_id: &str,
        document: &serde_json::Value,
    ) -> Option<serde_json::Value>;
}

/// The active engine configuration.
pub trait EngineConfiguration: Send + Sync + fmt::Debug {
    /// Returns a name used in logs.
    fn name(&self) -> &str;

    /// Returns the deployment cache for definition info.
    fn deployment_cache(&self) -> &dyn DefinitionInfoCache;

    /// Returns the dynamic properties service.
    fn dynamic_properties(&self) -> &dyn DynamicPropertiesService;
}

/// An engine configuration assembled from shared collaborators.
#[derive(Clone)]
pub struct StaticEngineConfiguration {
    name: String,
    deployment_cache: Arc<dyn DefinitionInfoCache>,
    dynamic_properties: Arc<dyn DynamicPropertiesService>,
}

impl StaticEngineConfiguration {
    /// Creates a configuration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        deployment_cache: Arc<dyn DefinitionInfoCache>,
        dynamic_properties: Arc<dyn DynamicPropertiesService>,
    ) -> Self {
        Self {
            name: name.into(),
            deployment_cache,
            dynamic_properties,
        }
    }

    /// Replaces the dynamic properties service.
    #[must_use]
    pub fn with_dynamic_properties(mut self, service: Arc<dyn DynamicPropertiesService>) -> Self {
        self.dynamic_properties = service;
        self
    }
}

impl EngineConfiguration for StaticEngineConfiguration {
    fn name(&self) -> &str {
        &self.name
    }

    fn deployment_cache(&self) -> &dyn DefinitionInfoCache {
        self.deployment_cache.as_ref()
    }

    fn dynamic_properties(&self) -> &dyn DynamicPropertiesService {
        self.dynamic_properties.as_ref()
    }
}

impl fmt::Debug for StaticEngineConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticEngineConfiguration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
