//! Configuration for context registries.

use serde::{Deserialize, Serialize};

/// Behavioral knobs for a [`ContextRegistry`](crate::registry::ContextRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Clear the override cache when the outermost command scope exits.
    #[serde(default = "default_clear_overrides")]
    pub clear_overrides_on_command_exit: bool,
    /// Log a warning when `reset` finds state left behind.
    #[serde(default = "default_warn_on_leak")]
    pub warn_on_leak: bool,
    /// Capacity reserved when a stack is first allocated.
    #[serde(default = "default_initial_capacity")]
    pub initial_stack_capacity: usize,
}

fn default_clear_overrides() -> bool {
    true
}

fn default_warn_on_leak() -> bool {
    true
}

fn default_initial_capacity() -> usize {
    4
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            clear_overrides_on_command_exit: default_clear_overrides(),
            warn_on_leak: default_warn_on_leak(),
            initial_stack_capacity: default_initial_capacity(),
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the override cache is cleared on outermost command exit.
    #[must_use]
    pub fn with_clear_overrides_on_command_exit(mut self, enabled: bool) -> Self {
        self.clear_overrides_on_command_exit = enabled;
        self
    }

    /// Sets whether leaked state is logged on reset.
    #[must_use]
    pub fn with_warn_on_leak(mut self, enabled: bool) -> Self {
        self.warn_on_leak = enabled;
        self
    }

    /// Sets the initial stack capacity.
    #[must_use]
    pub fn with_initial_stack_capacity(mut self, capacity: usize) -> Self {
        self.initial_stack_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(config.clear_overrides_on_command_exit);
        assert!(config.warn_on_leak);
        assert_eq!(config.initial_stack_capacity, 4);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RegistryConfig = serde_json::from_str(r#"{"warn_on_leak": false}"#).unwrap();

        assert_eq!(config, RegistryConfig::new().with_warn_on_leak(false));
    }

    #[test]
    fn test_builder() {
        let config = RegistryConfig::new()
            .with_clear_overrides_on_command_exit(false)
            .with_initial_stack_capacity(16);

        assert!(!config.clear_overrides_on_command_exit);
        assert_eq!(config.initial_stack_capacity, 16);
    }
}
