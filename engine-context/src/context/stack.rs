//! Lazily allocated LIFO stack of context values.

use crate::errors::{ContextError, StackKind};
use std::cell::RefCell;
use std::fmt;
use tracing::{error, trace};

/// A last-in-first-out stack of context handles.
///
/// The backing vector is only allocated by the first `push`. Reads on a
/// never-pushed stack return `None` and leave it unallocated.
///
/// The stack is `!Sync`; a single instance can only ever be observed from
/// the thread that owns it.
pub struct ContextStack<T> {
    kind: StackKind,
    capacity: usize,
    entries: RefCell<Option<Vec<T>>>,
}

impl<T: Clone> ContextStack<T> {
    /// Creates an unallocated stack.
    #[must_use]
    pub fn new(kind: StackKind) -> Self {
        Self::with_capacity(kind, 0)
    }

    /// Creates an unallocated stack that reserves `capacity` on first push.
    #[must_use]
    pub fn with_capacity(kind: StackKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            entries: RefCell::new(None),
        }
    }

    /// Returns which registry this stack backs.
    #[must_use]
    pub fn kind(&self) -> StackKind {
        self.kind
    }

    /// Pushes a value, allocating the stack if needed.
    pub fn push(&self, value: T) {
        let mut entries = self.entries.borrow_mut();
        let stack = entries.get_or_insert_with(|| Vec::with_capacity(self.capacity));
        stack.push(value);
        trace!(stack = %self.kind, depth = stack.len(), "Context pushed");
    }

    /// Returns the top value without removing it.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.entries
            .borrow()
            .as_ref()
            .and_then(|stack| stack.last().cloned())
    }

    /// Removes and returns the top value.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::StackUnderflow` if nothing is pushed.
    pub fn pop(&self) -> Result<T, ContextError> {
        let mut entries = self.entries.borrow_mut();
        let stack = entries
            .as_mut()
            .ok_or_else(|| ContextError::underflow(self.kind))?;
        let value = stack.pop().ok_or_else(|| ContextError::underflow(self.kind))?;
        trace!(stack = %self.kind, depth = stack.len(), "Context popped");
        Ok(value)
    }

    /// Returns true if at least one value is pushed. Never allocates.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entries
            .borrow()
            .as_ref()
            .is_some_and(|stack| !stack.is_empty())
    }

    /// Returns true once the backing vector exists.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.entries.borrow().is_some()
    }

    /// Returns the number of pushed values.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.borrow().as_ref().map_or(0, Vec::len)
    }

    /// Drops the stack entirely and returns how many values it held.
    pub fn clear(&self) -> usize {
        self.entries.borrow_mut().take().map_or(0, |stack| stack.len())
    }

    /// Shrinks the stack to at most `depth` values and returns how many
    /// were discarded. Never grows or allocates the stack.
    pub fn truncate(&self, depth: usize) -> usize {
        self.entries.borrow_mut().as_mut().map_or(0, |stack| {
            let discarded = stack.len().saturating_sub(depth);
            stack.truncate(depth);
            discarded
        })
    }

    /// Pushes `value` and returns a guard that pops it on drop.
    #[must_use = "the value is popped as soon as the guard is dropped"]
    pub fn enter(&self, value: T) -> StackGuard<'_, T> {
        self.push(value);
        StackGuard {
            stack: self,
            depth: self.depth(),
        }
    }

    /// Ends a scope entered at `depth`.
    ///
    /// The scoped value is popped only if it is still on top. Otherwise the
    /// stack is cut back to the state before the scope was entered.
    pub(crate) fn exit_scope(&self, depth: usize) {
        let current = self.depth();
        if current == depth {
            if let Err(err) = self.pop() {
                error!(stack = %self.kind, error = %err, "Scope exit found an unbalanced stack");
            }
            return;
        }

        let discarded = self.truncate(depth.saturating_sub(1));
        error!(
            stack = %self.kind,
            expected_depth = depth,
            depth = current,
            discarded,
            "Scope exited out of order"
        );
    }
}

impl<T> fmt::Debug for ContextStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = self
            .entries
            .try_borrow()
            .map(|entries| entries.as_ref().map_or(0, Vec::len))
            .unwrap_or_default();
        f.debug_struct("ContextStack")
            .field("kind", &self.kind)
            .field("depth", &depth)
            .finish()
    }
}

/// Pops its stack when dropped, including on early return or unwind.
pub struct StackGuard<'a, T: Clone> {
    stack: &'a ContextStack<T>,
    depth: usize,
}

impl<T: Clone> StackGuard<'_, T> {
    /// Returns the top of the guarded stack.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.stack.current()
    }
}

impl<T: Clone> Drop for StackGuard<'_, T> {
    fn drop(&mut self) {
        self.stack.exit_scope(self.depth);
    }
}

impl<T: Clone> fmt::Debug for StackGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackGuard")
            .field("stack", &self.stack.kind)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> ContextStack<&'static str> {
        ContextStack::new(StackKind::Command)
    }

    #[test]
    fn test_empty_stack_has_no_current() {
        let stack = stack();
        assert_eq!(stack.current(), None);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_lifo_order() {
        let stack = stack();
        stack.push("outer");
        stack.push("inner");

        assert_eq!(stack.current(), Some("inner"));
        assert_eq!(stack.pop().unwrap(), "inner");
        assert_eq!(stack.current(), Some("outer"));
        assert_eq!(stack.pop().unwrap(), "outer");
        assert_eq!(stack.current(), None);
    }

    #[test]
    fn test_pop_on_unallocated_stack_underflows() {
        let stack = stack();
        let err = stack.pop().unwrap_err();

        assert_eq!(err, ContextError::underflow(StackKind::Command));
        assert!(!stack.is_allocated());
    }

    #[test]
    fn test_pop_on_drained_stack_underflows() {
        let stack = stack();
        stack.push("a");
        stack.pop().unwrap();

        assert!(stack.pop().is_err());
        assert!(stack.is_allocated());
    }

    #[test]
    fn test_is_active_does_not_allocate() {
        let stack = stack();
        assert!(!stack.is_active());
        assert!(!stack.is_allocated());
        assert_eq!(stack.current(), None);
        assert!(!stack.is_allocated());
    }

    #[test]
    fn test_clear_returns_discarded_count() {
        let stack = stack();
        stack.push("a");
        stack.push("b");

        assert_eq!(stack.clear(), 2);
        assert!(!stack.is_allocated());
        assert_eq!(stack.clear(), 0);
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let stack = stack();
        {
            let guard = stack.enter("scoped");
            assert_eq!(guard.current(), Some("scoped"));
            assert_eq!(stack.depth(), 1);
        }
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_guard_tolerates_manual_pop() {
        let stack = stack();
        let guard = stack.enter("scoped");
        stack.pop().unwrap();
        drop(guard);

        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_out_of_order_exit_restores_state_before_outer_scope() {
        let stack = stack();
        stack.push("base");
        let outer = stack.enter("outer");
        let inner = stack.enter("inner");

        drop(outer);
        assert_eq!(stack.current(), Some("base"));
        assert_eq!(stack.depth(), 1);

        drop(inner);
        assert_eq!(stack.current(), Some("base"));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_guard_discards_values_pushed_inside_scope() {
        let stack = stack();
        let guard = stack.enter("scoped");
        stack.push("manual");

        drop(guard);
        assert_eq!(stack.current(), None);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_truncate_never_grows() {
        let stack = stack();
        assert_eq!(stack.truncate(3), 0);
        assert!(!stack.is_allocated());

        stack.push("a");
        stack.push("b");
        assert_eq!(stack.truncate(5), 0);
        assert_eq!(stack.truncate(1), 1);
        assert_eq!(stack.current(), Some("a"));
    }

    #[test]
    fn test_guard_pops_on_panic() {
        let stack = stack();
        stack.push("outer");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = stack.enter("inner");
            panic!("command failed");
        }));

        assert!(result.is_err());
        assert_eq!(stack.current(), Some("outer"));
    }
}
