//! Context handles and the containers that scope them.
//!
//! This module provides:
//! - Lazily allocated LIFO stacks with scope guards
//! - A single-value slot for job-executor state
//! - The command, execution and job-executor handles

mod command;
mod execution;
mod job;
mod slot;
mod stack;

pub use command::CommandContext;
pub use execution::{ExecutionContext, InterpretableExecution};
pub use job::JobExecutorContext;
pub use slot::{ContextSlot, SlotGuard};
pub use stack::{ContextStack, StackGuard};
