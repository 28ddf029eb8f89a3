//! Default element property extraction for info documents.
//!
//! Documents keep per-element overrides under a top-level `bpmn` object:
//!
//! ```json
//! { "bpmn": { "serviceTask1": { "serviceTaskClassName": "com.acme.Impl" } } }
//! ```

use crate::engine::DynamicPropertiesService;
use serde_json::{Map, Value};

/// Top-level key holding element overrides.
pub const ELEMENT_PROPERTIES_KEY: &str = "bpmn";

/// Reads element properties from the `bpmn` section of a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoDocumentPropertiesService;

impl InfoDocumentPropertiesService {
    /// Creates the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DynamicPropertiesService for InfoDocumentPropertiesService {
    fn element_properties(&self, element_id: &str, document: &Value) -> Option<Value> {
        document
            .get(ELEMENT_PROPERTIES_KEY)
            .and_then(|elements| elements.get(element_id))
            .filter(|properties| properties.is_object())
            .cloned()
    }
}

/// Sets one override property for an element, creating the intermediate
/// objects as needed. A non-object document is replaced by an object.
pub fn set_element_property(document: &mut Value, element_id: &str, property: &str, value: Value) {
    let mut root = take_object(document);
    let mut elements = root
        .get_mut(ELEMENT_PROPERTIES_KEY)
        .map(take_object)
        .unwrap_or_default();
    let mut properties = elements
        .get_mut(element_id)
        .map(take_object)
        .unwrap_or_default();

    properties.insert(property.to_string(), value);
    elements.insert(element_id.to_string(), Value::Object(properties));
    root.insert(ELEMENT_PROPERTIES_KEY.to_string(), Value::Object(elements));
    *document = Value::Object(root);
}

/// Moves the object out of `value`, or yields an empty one for non-objects.
fn take_object(value: &mut Value) -> Map<String, Value> {
    match value.take() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
