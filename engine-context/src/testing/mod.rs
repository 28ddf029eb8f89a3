//! Testing utilities for code that runs inside a context registry.
//!
//! This module provides:
//! - Mock deployment caches and executions
//! - A tracing subscriber for test output

mod mocks;

pub use mocks::{mock_configuration, CountingDefinitionInfoCache, MockExecution};

use tracing_subscriber::EnvFilter;

/// Installs a test-writer tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
