//! Command context handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Describes the engine command currently executing.
///
/// Nested commands push their own context; the outer one becomes visible
/// again once the nested command's scope ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Unique id of this command invocation.
    pub command_id: Uuid,
    /// Name of the command (e.g. `"StartProcessInstance"`).
    pub command_name: String,
    /// When the command started.
    pub started_at: DateTime<Utc>,
    /// Free-form attributes attached by interceptors.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl CommandContext {
    /// Creates a command context with a fresh id.
    #[must_use]
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_id: Uuid::new_v4(),
            command_name: command_name.into(),
            started_at: Utc::now(),
            attributes: HashMap::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Gets an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_command_context() {
        let ctx = CommandContext::new("CompleteTask")
            .with_attribute("task_id", serde_json::json!("t-1"));

        assert_eq!(ctx.command_name, "CompleteTask");
        assert_eq!(ctx.attribute("task_id"), Some(&serde_json::json!("t-1")));
        assert_ne!(ctx.command_id, CommandContext::new("CompleteTask").command_id);
    }
}
