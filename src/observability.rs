use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Counters for board reads and order commands
#[derive(Debug, Default)]
pub struct StoreMetrics {
    pub board_reads: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub commands: AtomicU64,
    pub command_failures: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_board_read(&self, cache_hit: bool) {
        self.board_reads.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_command(&self, succeeded: bool) {
        self.commands.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.command_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> StoreStats {
        StoreStats {
            board_reads: self.board_reads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            commands: self.commands.load(Ordering::Relaxed),
            command_failures: self.command_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Store metrics: board_reads={}, cache_hits={}, cache_misses={}, commands={}, failures={}",
            stats.board_reads,
            stats.cache_hits,
            stats.cache_misses,
            stats.commands,
            stats.command_failures
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub board_reads: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub commands: u64,
    pub command_failures: u64,
}

/// Times one store command, including retries
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        debug!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Store command finished"
        );
    }
}
