//! # Engine Context
//!
//! Scoped ambient state for a process-execution engine.
//!
//! A command may trigger a nested command, which may enter and leave several
//! executions, all on one worker. Every layer needs the innermost active
//! context and must get the enclosing one back on exit. Engine context
//! provides:
//!
//! - **Context stacks**: command, engine configuration and execution
//!   contexts with LIFO visibility and scope guards
//! - **Job executor slot**: a single, last-write-wins value
//! - **Override cache**: memoized per-definition info documents resolved
//!   through the active engine configuration
//! - **Ambient carriers**: per-thread and per-task registries for call
//!   sites that cannot take the registry as a parameter
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use engine_context::prelude::*;
//!
//! let registry = ContextRegistry::new();
//! let _config = registry.enter_configuration(configuration);
//! let _command = registry.enter_command(CommandContext::new("StartProcess"));
//!
//! if let Some(props) = registry.override_element_properties("task1", "pd1")? {
//!     // apply runtime overrides
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod overrides;
pub mod registry;
pub mod testing;

#[cfg(test)]
mod registry_tests;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::RegistryConfig;
    pub use crate::context::{
        CommandContext, ContextSlot, ContextStack, ExecutionContext, InterpretableExecution,
        JobExecutorContext,
    };
    pub use crate::engine::{
        DefinitionInfoCache, DefinitionInfoCacheObject, DynamicPropertiesService,
        EngineConfiguration, InfoDocument, StaticEngineConfiguration,
    };
    pub use crate::errors::{ContextError, StackKind};
    pub use crate::overrides::{InfoDocumentPropertiesService, OverrideCache, OverrideMap};
    pub use crate::registry::{
        CommandScope, ConfigurationScope, ContextRegistry, ExecutionScope, JobExecutorScope,
        LeakReport,
    };
}
