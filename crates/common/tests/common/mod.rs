//! Shared fixtures for namespace client integration tests
#![allow(dead_code)]

use common::prelude::*;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness; `RUST_LOG=common=debug` shows the walk
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A client over a fresh in-memory namespace
pub fn setup_test_env() -> (NamespaceClient<MemoryNamespace>, MemoryNamespace) {
    init_tracing();
    let namespace = MemoryNamespace::new();
    let client = NamespaceClient::new(namespace.clone(), &ClientConfig::default());
    (client, namespace)
}

/// Same as [`setup_test_env`], with `paths` (and their ancestors) already present
pub fn setup_seeded(paths: &[&str]) -> (NamespaceClient<MemoryNamespace>, MemoryNamespace) {
    let (client, namespace) = setup_test_env();
    for path in paths {
        namespace.seed(path, path.as_bytes());
    }
    (client, namespace)
}

/// Assert every opened session was closed again
pub fn assert_sessions_released(namespace: &MemoryNamespace) {
    assert_eq!(
        namespace.open_sessions(),
        0,
        "{} of {} sessions left open",
        namespace.open_sessions(),
        namespace.sessions_opened()
    );
}
