//! Execution context wrapper.

use std::fmt;
use std::sync::Arc;

/// An in-flight process execution, as seen by the context registry.
///
/// The registry never drives an execution; it only hands it to nested
/// callers.
pub trait InterpretableExecution: Send + Sync {
    /// Returns the execution id.
    fn id(&self) -> &str;

    /// Returns the id of the owning process instance.
    fn process_instance_id(&self) -> Option<&str>;

    /// Returns the id of the process definition being executed.
    fn process_definition_id(&self) -> Option<&str>;

    /// Returns the activity the execution is positioned at.
    fn activity_id(&self) -> Option<&str> {
        None
    }
}

/// Immutable view over one execution, created when it is pushed.
#[derive(Clone)]
pub struct ExecutionContext {
    execution: Arc<dyn InterpretableExecution>,
}

impl ExecutionContext {
    /// Wraps an execution.
    #[must_use]
    pub fn new(execution: Arc<dyn InterpretableExecution>) -> Self {
        Self { execution }
    }

    /// Returns the wrapped execution.
    #[must_use]
    pub fn execution(&self) -> &Arc<dyn InterpretableExecution> {
        &self.execution
    }

    /// Returns the execution id.
    #[must_use]
    pub fn execution_id(&self) -> &str {
        self.execution.id()
    }

    /// Returns the process instance id.
    #[must_use]
    pub fn process_instance_id(&self) -> Option<&str> {
        self.execution.process_instance_id()
    }

    /// Returns the process definition id.
    #[must_use]
    pub fn process_definition_id(&self) -> Option<&str> {
        self.execution.process_definition_id()
    }

    /// Returns the current activity id.
    #[must_use]
    pub fn activity_id(&self) -> Option<&str> {
        self.execution.activity_id()
    }

    /// Returns true if both contexts wrap the same execution object.
    #[must_use]
    pub fn wraps(&self, execution: &Arc<dyn InterpretableExecution>) -> bool {
        Arc::ptr_eq(&self.execution, execution)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id())
            .field("process_instance_id", &self.process_instance_id())
            .field("process_definition_id", &self.process_definition_id())
            .finish()
    }
}
