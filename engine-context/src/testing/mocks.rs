//! Mock collaborators for registry tests.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::InterpretableExecution;
use crate::engine::{
    DefinitionInfoCache, DefinitionInfoCacheObject, EngineConfiguration,
    StaticEngineConfiguration,
};
use crate::errors::ContextError;
use crate::overrides::InfoDocumentPropertiesService;

/// A deployment cache backed by a map that counts lookups per id.
#[derive(Debug, Default)]
pub struct CountingDefinitionInfoCache {
    objects: HashMap<String, DefinitionInfoCacheObject>,
    lookups: Mutex<HashMap<String, usize>>,
}

impl CountingDefinitionInfoCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cache object, keyed by its id.
    #[must_use]
    pub fn with_object(mut self, object: DefinitionInfoCacheObject) -> Self {
        self.objects.insert(object.id.clone(), object);
        self
    }

    /// Returns how many times `process_definition_id` was looked up.
    #[must_use]
    pub fn lookups(&self, process_definition_id: &str) -> usize {
        self.lookups
            .lock()
            .get(process_definition_id)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the total number of lookups.
    #[must_use]
    pub fn total_lookups(&self) -> usize {
        self.lookups.lock().values().sum()
    }
}

impl DefinitionInfoCache for CountingDefinitionInfoCache {
    fn process_definition_info(
        &self,
        process_definition_id: &str,
    ) -> Result<Option<DefinitionInfoCacheObject>, ContextError> {
        *self
            .lookups
            .lock()
            .entry(process_definition_id.to_string())
            .or_insert(0) += 1;
        Ok(self.objects.get(process_definition_id).cloned())
    }
}

/// A plain execution with fixed ids.
#[derive(Debug, Clone)]
pub struct MockExecution {
    id: String,
    process_instance_id: String,
    process_definition_id: String,
    activity_id: Option<String>,
}

impl MockExecution {
    /// Creates an execution that is its own process instance.
    #[must_use]
    pub fn new(id: impl Into<String>, process_definition_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            process_instance_id: id.clone(),
            id,
            process_definition_id: process_definition_id.into(),
            activity_id: None,
        }
    }

    /// Sets the current activity.
    #[must_use]
    pub fn with_activity(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    /// Sets the process instance id.
    #[must_use]
    pub fn with_process_instance(mut self, process_instance_id: impl Into<String>) -> Self {
        self.process_instance_id = process_instance_id.into();
        self
    }
}

impl InterpretableExecution for MockExecution {
    fn id(&self) -> &str {
        &self.id
    }

    fn process_instance_id(&self) -> Option<&str> {
        Some(&self.process_instance_id)
    }

    fn process_definition_id(&self) -> Option<&str> {
        Some(&self.process_definition_id)
    }

    fn activity_id(&self) -> Option<&str> {
        self.activity_id.as_deref()
    }
}

/// Builds a configuration over `cache` using the default property service.
#[must_use]
pub fn mock_configuration(
    name: &str,
    cache: Arc<CountingDefinitionInfoCache>,
) -> Arc<dyn EngineConfiguration> {
    Arc::new(StaticEngineConfiguration::new(
        name,
        cache,
        Arc::new(InfoDocumentPropertiesService),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_cache_counts_misses_too() {
        let cache = CountingDefinitionInfoCache::new()
            .with_object(DefinitionInfoCacheObject::new("pd1"));

        assert!(cache.process_definition_info("pd1").unwrap().is_some());
        assert!(cache.process_definition_info("pd2").unwrap().is_none());
        assert_eq!(cache.lookups("pd1"), 1);
        assert_eq!(cache.total_lookups(), 2);
    }
}
