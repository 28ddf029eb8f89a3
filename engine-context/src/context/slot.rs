//! Single-value context slot.

use std::cell::RefCell;
use std::fmt;
use tracing::trace;

/// Holds at most one value. Setting replaces, it never nests.
pub struct ContextSlot<T> {
    name: &'static str,
    value: RefCell<Option<T>>,
}

impl<T: Clone> ContextSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: RefCell::new(None),
        }
    }

    /// Stores `value`, returning the one it replaced.
    pub fn set(&self, value: T) -> Option<T> {
        let previous = self.value.borrow_mut().replace(value);
        trace!(slot = self.name, replaced = previous.is_some(), "Context slot set");
        previous
    }

    /// Returns the stored value.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.value.borrow().clone()
    }

    /// Removes the stored value. Clearing an empty slot is a no-op.
    pub fn clear(&self) -> Option<T> {
        self.value.borrow_mut().take()
    }

    /// Returns true if a value is stored.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Stores `value` and returns a guard that clears the slot on drop.
    #[must_use = "the slot is cleared as soon as the guard is dropped"]
    pub fn enter(&self, value: T) -> SlotGuard<'_, T> {
        self.set(value);
        SlotGuard { slot: self }
    }
}

impl<T> fmt::Debug for ContextSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let is_set = self
            .value
            .try_borrow()
            .map(|value| value.is_some())
            .unwrap_or_default();
        f.debug_struct("ContextSlot")
            .field("name", &self.name)
            .field("is_set", &is_set)
            .finish()
    }
}

/// Clears its slot when dropped.
pub struct SlotGuard<'a, T: Clone> {
    slot: &'a ContextSlot<T>,
}

impl<T: Clone> Drop for SlotGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.clear();
    }
}

impl<T: Clone> fmt::Debug for SlotGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotGuard").field("slot", &self.slot.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let slot = ContextSlot::new("job_executor");
        slot.set(1);
        assert_eq!(slot.set(2), Some(1));
        assert_eq!(slot.get(), Some(2));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let slot = ContextSlot::new("job_executor");
        slot.set("x");
        assert_eq!(slot.clear(), Some("x"));
        assert_eq!(slot.clear(), None);
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_guard_clears() {
        let slot = ContextSlot::new("job_executor");
        {
            let _guard = slot.enter(7);
            assert!(slot.is_set());
        }
        assert!(!slot.is_set());
    }
}
