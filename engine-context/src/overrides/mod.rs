//! Per-unit-of-work override properties.

mod cache;
mod properties;

pub use cache::{OverrideCache, OverrideMap};
pub use properties::{set_element_property, InfoDocumentPropertiesService, ELEMENT_PROPERTIES_KEY};
