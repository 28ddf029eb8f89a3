//! The context registry: ambient state for one unit of work.
//!
//! A `ContextRegistry` is created when a command or job starts and passed
//! by reference to everything nested under it. It is `Send` but not
//! `Sync`, so a registry is only ever observed by one thread at a time.
//!
//! Scopes are entered through guards that undo the push on drop:
//!
//! ```rust,ignore
//! let registry = ContextRegistry::new();
//! let _config = registry.enter_configuration(configuration);
//! let _command = registry.enter_command(CommandContext::new("CompleteTask"));
//! let props = registry.override_element_properties("task1", "pd1")?;
//! ```
//!
//! Code that cannot receive the registry explicitly can reach the
//! per-thread instance with [`ContextRegistry::with_thread_local`] or a
//! per-task instance installed by [`ContextRegistry::task_scope`].

use crate::config::RegistryConfig;
use crate::context::{
    CommandContext, ContextSlot, ContextStack, ExecutionContext, InterpretableExecution,
    JobExecutorContext, SlotGuard, StackGuard,
};
use crate::engine::{EngineConfiguration, InfoDocument};
use crate::errors::{ContextError, StackKind};
use crate::overrides::{OverrideCache, OverrideMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

thread_local! {
    static THREAD_REGISTRY: ContextRegistry = ContextRegistry::new();
}

tokio::task_local! {
    static TASK_REGISTRY: ContextRegistry;
}

/// Guard for an engine configuration scope.
pub type ConfigurationScope<'a> = StackGuard<'a, Arc<dyn EngineConfiguration>>;

/// Guard for an execution scope.
pub type ExecutionScope<'a> = StackGuard<'a, ExecutionContext>;

/// Guard for a job executor scope.
pub type JobExecutorScope<'a> = SlotGuard<'a, Arc<JobExecutorContext>>;

/// What a registry still held when it was reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakReport {
    /// Command contexts left on the stack.
    pub command_depth: usize,
    /// Engine configurations left on the stack.
    pub configuration_depth: usize,
    /// Execution contexts left on the stack.
    pub execution_depth: usize,
    /// Whether a job executor context was still set.
    pub job_executor_set: bool,
    /// Cached override documents.
    pub override_entries: usize,
}

impl LeakReport {
    /// Returns true if no scoped state was left behind.
    ///
    /// Cached override documents do not count; they are a cache, not a scope.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.command_depth == 0
            && self.configuration_depth == 0
            && self.execution_depth == 0
            && !self.job_executor_set
    }
}

/// Stacks, slot and cache holding the ambient state of one unit of work.
#[derive(Debug)]
pub struct ContextRegistry {
    config: RegistryConfig,
    commands: ContextStack<Arc<CommandContext>>,
    configurations: ContextStack<Arc<dyn EngineConfiguration>>,
    executions: ContextStack<ExecutionContext>,
    job_executor: ContextSlot<Arc<JobExecutorContext>>,
    overrides: OverrideCache,
}

impl ContextRegistry {
    /// Creates an empty registry with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let capacity = config.initial_stack_capacity;
        Self {
            commands: ContextStack::with_capacity(StackKind::Command, capacity),
            configurations: ContextStack::with_capacity(StackKind::EngineConfiguration, capacity),
            executions: ContextStack::with_capacity(StackKind::Execution, capacity),
            job_executor: ContextSlot::new("job_executor"),
            overrides: OverrideCache::new(),
            config,
        }
    }

    /// Returns the registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // Command contexts

    /// Returns the innermost active command context.
    #[must_use]
    pub fn command_context(&self) -> Option<Arc<CommandContext>> {
        self.commands.current()
    }

    /// Pushes a command context.
    pub fn push_command(&self, command: impl Into<Arc<CommandContext>>) {
        self.commands.push(command.into());
    }

    /// Pops the innermost command context.
    ///
    /// Unlike dropping a [`CommandScope`], this never clears the override
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::StackUnderflow` if no command is active.
    pub fn pop_command(&self) -> Result<Arc<CommandContext>, ContextError> {
        self.commands.pop()
    }

    /// Returns true if a command context is active.
    #[must_use]
    pub fn is_command_active(&self) -> bool {
        self.commands.is_active()
    }

    /// Enters a command scope.
    #[must_use = "the command is popped as soon as the scope is dropped"]
    pub fn enter_command(&self, command: impl Into<Arc<CommandContext>>) -> CommandScope<'_> {
        self.push_command(command);
        CommandScope {
            registry: self,
            depth: self.commands.depth(),
        }
    }

    // Engine configurations

    /// Returns the innermost active engine configuration.
    #[must_use]
    pub fn configuration(&self) -> Option<Arc<dyn EngineConfiguration>> {
        self.configurations.current()
    }

    /// Pushes an engine configuration.
    pub fn push_configuration(&self, configuration: Arc<dyn EngineConfiguration>) {
        self.configurations.push(configuration);
    }

    /// Pops the innermost engine configuration.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::StackUnderflow` if no configuration is active.
    pub fn pop_configuration(&self) -> Result<Arc<dyn EngineConfiguration>, ContextError> {
        self.configurations.pop()
    }

    /// Returns true if an engine configuration is active.
    #[must_use]
    pub fn is_configuration_active(&self) -> bool {
        self.configurations.is_active()
    }

    /// Enters an engine configuration scope.
    #[must_use = "the configuration is popped as soon as the scope is dropped"]
    pub fn enter_configuration(
        &self,
        configuration: Arc<dyn EngineConfiguration>,
    ) -> ConfigurationScope<'_> {
        self.configurations.enter(configuration)
    }

    // Execution contexts

    /// Returns the innermost active execution context.
    #[must_use]
    pub fn execution_context(&self) -> Option<ExecutionContext> {
        self.executions.current()
    }

    /// Wraps `execution` in an [`ExecutionContext`] and pushes it.
    pub fn push_execution(&self, execution: Arc<dyn InterpretableExecution>) {
        self.executions.push(ExecutionContext::new(execution));
    }

    /// Pops the innermost execution context.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::StackUnderflow` if no execution is active.
    pub fn pop_execution(&self) -> Result<ExecutionContext, ContextError> {
        self.executions.pop()
    }

    /// Returns true if an execution context is active.
    #[must_use]
    pub fn is_execution_active(&self) -> bool {
        self.executions.is_active()
    }

    /// Enters an execution scope.
    #[must_use = "the execution is popped as soon as the scope is dropped"]
    pub fn enter_execution(
        &self,
        execution: Arc<dyn InterpretableExecution>,
    ) -> ExecutionScope<'_> {
        self.executions.enter(ExecutionContext::new(execution))
    }

    // Job executor

    /// Returns the job executor context.
    #[must_use]
    pub fn job_executor_context(&self) -> Option<Arc<JobExecutorContext>> {
        self.job_executor.get()
    }

    /// Sets the job executor context, replacing any previous one.
    pub fn set_job_executor_context(&self, context: impl Into<Arc<JobExecutorContext>>) {
        self.job_executor.set(context.into());
    }

    /// Clears the job executor context.
    pub fn clear_job_executor_context(&self) {
        self.job_executor.clear();
    }

    /// Sets the job executor context until the returned scope is dropped.
    #[must_use = "the job executor context is cleared as soon as the scope is dropped"]
    pub fn enter_job_executor(
        &self,
        context: impl Into<Arc<JobExecutorContext>>,
    ) -> JobExecutorScope<'_> {
        self.job_executor.enter(context.into())
    }

    // Override properties

    /// Resolves override properties for an element of a process definition.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::MissingConfiguration` when no engine
    /// configuration is active, and propagates deployment cache failures.
    pub fn override_element_properties(
        &self,
        element_id: &str,
        process_definition_id: &str,
    ) -> Result<Option<serde_json::Value>, ContextError> {
        self.overrides
            .element_properties(element_id, process_definition_id, &self.configurations)
    }

    /// Returns a snapshot of the override map. Never allocates.
    #[must_use]
    pub fn override_map(&self) -> OverrideMap {
        self.overrides.override_map()
    }

    /// Seeds the override map.
    pub fn add_override_element(
        &self,
        process_definition_id: impl Into<String>,
        document: InfoDocument,
    ) {
        self.overrides
            .add_override_element(process_definition_id, document);
    }

    /// Discards the override map.
    pub fn clear_overrides(&self) {
        self.overrides.clear();
    }

    // Lifecycle

    /// Reports what the registry currently holds.
    #[must_use]
    pub fn leak_report(&self) -> LeakReport {
        LeakReport {
            command_depth: self.commands.depth(),
            configuration_depth: self.configurations.depth(),
            execution_depth: self.executions.depth(),
            job_executor_set: self.job_executor.is_set(),
            override_entries: self.overrides.len(),
        }
    }

    /// Drains every registry so the owner can start an unrelated unit of
    /// work, returning what was left behind.
    pub fn reset(&self) -> LeakReport {
        let report = self.leak_report();
        if !report.is_clean() && self.config.warn_on_leak {
            warn!(
                command_depth = report.command_depth,
                configuration_depth = report.configuration_depth,
                execution_depth = report.execution_depth,
                job_executor_set = report.job_executor_set,
                "Context registry reset with unbalanced scopes"
            );
        }

        self.commands.clear();
        self.configurations.clear();
        self.executions.clear();
        self.job_executor.clear();
        self.overrides.clear();

        debug!(override_entries = report.override_entries, "Context registry reset");
        report
    }

    // Ambient carriers

    /// Runs `f` with the calling thread's registry.
    ///
    /// Each OS thread gets its own registry, created on first use. Pooled
    /// threads should call [`reset`](Self::reset) between units of work.
    pub fn with_thread_local<R>(f: impl FnOnce(&Self) -> R) -> R {
        THREAD_REGISTRY.with(f)
    }

    /// Runs `future` with `registry` installed as the current task's
    /// registry.
    pub async fn task_scope<F: Future>(registry: Self, future: F) -> F::Output {
        TASK_REGISTRY.scope(registry, future).await
    }

    /// Runs `f` with the current task's registry.
    ///
    /// Returns `None` outside [`task_scope`](Self::task_scope).
    pub fn with_task_local<R>(f: impl FnOnce(&Self) -> R) -> Option<R> {
        TASK_REGISTRY.try_with(f).ok()
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A command scope. Dropping it pops the command.
///
/// When the outermost command exits and
/// [`RegistryConfig::clear_overrides_on_command_exit`] is set, the override
/// cache is cleared too.
pub struct CommandScope<'a> {
    registry: &'a ContextRegistry,
    depth: usize,
}

impl CommandScope<'_> {
    /// Returns the innermost active command context.
    #[must_use]
    pub fn command_context(&self) -> Option<Arc<CommandContext>> {
        self.registry.command_context()
    }
}

impl Drop for CommandScope<'_> {
    fn drop(&mut self) {
        let registry = self.registry;
        registry.commands.exit_scope(self.depth);

        if registry.config.clear_overrides_on_command_exit && !registry.commands.is_active() {
            let cleared = registry.overrides.clear();
            if cleared > 0 {
                debug!(cleared, "Cleared override cache at outermost command exit");
            }
        }
    }
}

impl fmt::Debug for CommandScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandScope")
            .field("depth", &self.depth)
            .finish()
    }
}
