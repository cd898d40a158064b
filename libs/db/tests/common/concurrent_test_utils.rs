/// Shared test utilities for concurrent store integration tests
///
/// This module provides common infrastructure for testing concurrent access:
/// - Metrics collection for read and write operations
/// - Test context for coordinating one writer and many readers
/// - Writer task that inserts numbered items and publishes flushed progress
///
/// Used by:
/// - test_concurrent_readonly.rs (read-only instances)
/// - test_concurrent_secondary.rs (secondary instances with catch-up)
use sedb_db::{RocksConfig, Store};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collected during read or write operations
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Number of successful operations
    pub success_count: u64,
    /// Number of failed operations
    pub error_count: u64,
    /// Sum of operation latencies in microseconds
    pub total_latency_us: u64,
    /// Maximum latency in microseconds
    pub max_latency_us: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            success_count: 0,
            error_count: 0,
            total_latency_us: 0,
            max_latency_us: 0,
        }
    }

    pub fn record_success(&mut self, latency_us: u64) {
        self.success_count += 1;
        self.total_latency_us += latency_us;
        self.max_latency_us = self.max_latency_us.max(latency_us);
    }

    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    pub fn avg_latency_us(&self) -> f64 {
        if self.success_count > 0 {
            self.total_latency_us as f64 / self.success_count as f64
        } else {
            0.0
        }
    }
}

/// Key under which the writer stores item `i`.
pub fn item_key(i: usize) -> String {
    format!("item:{:06}", i)
}

/// Shared test context for coordinating writer and readers
pub struct TestContext {
    /// Number of items written and flushed by the writer
    pub flushed_items: AtomicUsize,
    /// Signal to stop all threads
    pub stop_signal: AtomicBool,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            flushed_items: AtomicUsize::new(0),
            stop_signal: AtomicBool::new(false),
        }
    }

    pub fn flushed(&self) -> usize {
        self.flushed_items.load(Ordering::Acquire)
    }

    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }

    pub fn signal_stop(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }
}

/// Writer task: inserts `num_items` items, flushing every `flush_every` items.
///
/// `context.flushed_items` is only advanced after a flush returns, so readers
/// may rely on every item below that count being durable.
pub fn writer_task(
    mut store: Store,
    context: Arc<TestContext>,
    num_items: usize,
    flush_every: usize,
) -> Metrics {
    let mut metrics = Metrics::new();

    for i in 0..num_items {
        if context.should_stop() {
            break;
        }

        let start = Instant::now();
        match store.set(&item_key(i), &(i as u64)) {
            Ok(()) => metrics.record_success(start.elapsed().as_micros() as u64),
            Err(_) => metrics.record_error(),
        }

        if (i + 1) % flush_every == 0 || i + 1 == num_items {
            store.flush().expect("Writer flush failed");
            context.flushed_items.store(i + 1, Ordering::Release);
        }
    }

    store.close().expect("Writer close failed");
    metrics
}

/// Open a read-write store at `db_path`.
pub fn open_writer(db_path: &Path) -> Store {
    Store::open(RocksConfig::new(db_path)).expect("Failed to open writer")
}
