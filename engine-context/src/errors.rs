//! Error types for the context registry.
//!
//! Only genuine misuse is an error here. Asking for the current value of an
//! empty registry is a normal `None`, never a `ContextError`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Identifies one of the stack-scoped registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackKind {
    /// The command context stack.
    Command,
    /// The engine configuration stack.
    EngineConfiguration,
    /// The execution context stack.
    Execution,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::EngineConfiguration => write!(f, "engine_configuration"),
            Self::Execution => write!(f, "execution"),
        }
    }
}

/// The main error type for registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// `pop` was called without a matching `push` on this registry.
    #[error("Stack underflow: no active {stack} context to remove")]
    StackUnderflow {
        /// The stack that was empty.
        stack: StackKind,
    },

    /// Override properties were requested outside any engine configuration.
    #[error("No active engine configuration to resolve overrides for process definition '{process_definition_id}'")]
    MissingConfiguration {
        /// The process definition being resolved.
        process_definition_id: String,
    },

    /// The deployment cache failed to return definition info.
    #[error("Definition info lookup failed for '{process_definition_id}': {reason}")]
    DefinitionLookup {
        /// The process definition being resolved.
        process_definition_id: String,
        /// The reason reported by the cache.
        reason: String,
    },
}

impl ContextError {
    /// Creates a stack underflow error.
    #[must_use]
    pub fn underflow(stack: StackKind) -> Self {
        Self::StackUnderflow { stack }
    }

    /// Creates a missing configuration error.
    #[must_use]
    pub fn missing_configuration(process_definition_id: impl Into<String>) -> Self {
        Self::MissingConfiguration {
            process_definition_id: process_definition_id.into(),
        }
    }

    /// Creates a definition lookup error.
    #[must_use]
    pub fn definition_lookup(
        process_definition_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DefinitionLookup {
            process_definition_id: process_definition_id.into(),
            reason: reason.into(),
        }
    }

    /// Returns a stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StackUnderflow { .. } => "CONTEXT-001-UNDERFLOW",
            Self::MissingConfiguration { .. } => "CONTEXT-002-NO_CONFIGURATION",
            Self::DefinitionLookup { .. } => "CONTEXT-003-LOOKUP",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));

        match self {
            Self::StackUnderflow { stack } => {
                map.insert("stack".to_string(), serde_json::json!(stack.to_string()));
            }
            Self::MissingConfiguration { process_definition_id } => {
                map.insert(
                    "process_definition_id".to_string(),
                    serde_json::json!(process_definition_id),
                );
            }
            Self::DefinitionLookup { process_definition_id, reason } => {
                map.insert(
                    "process_definition_id".to_string(),
                    serde_json::json!(process_definition_id),
                );
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}
