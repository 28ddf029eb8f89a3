//! Read-through cache of definition info documents.

use crate::context::ContextStack;
use crate::engine::{EngineConfiguration, InfoDocument};
use crate::errors::ContextError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Info documents keyed by process definition id.
///
/// A `None` value records that the definition was resolved and has no
/// document, so the deployment cache is not asked again.
pub type OverrideMap = HashMap<String, Option<InfoDocument>>;

/// Memoizes definition info documents for the lifetime of a unit of work.
///
/// The map is allocated by the first write. Reads on an unallocated cache
/// return empty results and leave it unallocated.
#[derive(Default)]
pub struct OverrideCache {
    documents: RefCell<Option<OverrideMap>>,
}

impl OverrideCache {
    /// Creates an empty, unallocated cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the override properties of `element_id` in
    /// `process_definition_id`.
    ///
    /// The definition's document is fetched from the active configuration's
    /// deployment cache the first time it is needed and memoized. Property
    /// extraction runs on every call.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::MissingConfiguration` if `configurations` has
    /// no active value when one is needed, and propagates deployment cache
    /// failures.
    pub fn element_properties(
        &self,
        element_id: &str,
        process_definition_id: &str,
        configurations: &ContextStack<Arc<dyn EngineConfiguration>>,
    ) -> Result<Option<serde_json::Value>, ContextError> {
        if !self.contains(process_definition_id) {
            let configuration = configurations
                .current()
                .ok_or_else(|| ContextError::missing_configuration(process_definition_id))?;
            let info = configuration
                .deployment_cache()
                .process_definition_info(process_definition_id)?;
            let document = info.and_then(|object| object.info_node);
            debug!(
                process_definition_id,
                configuration = configuration.name(),
                has_document = document.is_some(),
                "Resolved definition info for overrides"
            );
            self.record(process_definition_id, document);
        }

        let Some(document) = self.document(process_definition_id) else {
            return Ok(None);
        };

        let configuration = configurations
            .current()
            .ok_or_else(|| ContextError::missing_configuration(process_definition_id))?;
        Ok(configuration
            .dynamic_properties()
            .element_properties(element_id, &document))
    }

    /// Returns a snapshot of the cached documents.
    ///
    /// An unallocated cache yields an empty map and stays unallocated.
    #[must_use]
    pub fn override_map(&self) -> OverrideMap {
        self.documents.borrow().clone().unwrap_or_default()
    }

    /// Stores `document` for `process_definition_id`, replacing any entry.
    pub fn add_override_element(
        &self,
        process_definition_id: impl Into<String>,
        document: InfoDocument,
    ) {
        self.record(process_definition_id, Some(document));
    }

    /// Returns the cached document, if the definition resolved to one.
    #[must_use]
    pub fn document(&self, process_definition_id: &str) -> Option<InfoDocument> {
        self.documents
            .borrow()
            .as_ref()
            .and_then(|map| map.get(process_definition_id).cloned().flatten())
    }

    /// Returns true if the definition has been resolved or seeded.
    #[must_use]
    pub fn contains(&self, process_definition_id: &str) -> bool {
        self.documents
            .borrow()
            .as_ref()
            .is_some_and(|map| map.contains_key(process_definition_id))
    }

    /// Returns the number of cached definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.borrow().as_ref().map_or(0, HashMap::len)
    }

    /// Returns true if no definitions are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the map exists.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.documents.borrow().is_some()
    }

    /// Discards every cached document and returns how many there were.
    pub fn clear(&self) -> usize {
        self.documents.borrow_mut().take().map_or(0, |map| map.len())
    }

    fn record(&self, process_definition_id: impl Into<String>, document: Option<InfoDocument>) {
        self.documents
            .borrow_mut()
            .get_or_insert_with(HashMap::new)
            .insert(process_definition_id.into(), document);
    }
}

impl fmt::Debug for OverrideCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .documents
            .try_borrow()
            .map(|documents| documents.as_ref().map_or(0, HashMap::len))
            .unwrap_or_default();
        f.debug_struct("OverrideCache")
            .field("entries", &entries)
            .finish()
    }
}
