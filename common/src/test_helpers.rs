//! Shared test helpers for cross-crate use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global counter for truly unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a globally unique test identifier that won't conflict across
/// parallel tests. Combines a timestamp with an atomic counter.
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// In-memory SQLite database URL for tests that don't need a file on disk.
pub fn in_memory_database_url() -> String {
    "sqlite::memory:".to_string()
}
