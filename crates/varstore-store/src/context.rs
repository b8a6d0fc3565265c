//! Process-wide output switch and I/O time accounting.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Shared I/O state for a group of stores.
///
/// Every store built with the same `Arc<IoContext>` obeys the same enable
/// switch and adds its elapsed read/write time to the same counter.
/// [`IoContext::global`] is the process-wide instance.
#[derive(Debug)]
pub struct IoContext {
    enabled: AtomicBool,
    io_nanos: AtomicU64,
}

impl IoContext {
    /// An enabled context with no accumulated time.
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            io_nanos: AtomicU64::new(0),
        }
    }

    /// The process-wide context.
    pub fn global() -> Arc<IoContext> {
        static GLOBAL: OnceLock<Arc<IoContext>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(IoContext::new())))
    }

    /// Whether writes are performed. Reads ignore this switch.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turn writes on or off for every store sharing this context.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Add `elapsed` to the accumulated I/O time. Saturates at `u64::MAX`
    /// nanoseconds.
    pub fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .io_nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |t| {
                Some(t.saturating_add(nanos))
            });
    }

    /// Total time spent in store reads and writes.
    pub fn io_time(&self) -> Duration {
        Duration::from_nanos(self.io_nanos.load(Ordering::Relaxed))
    }

    /// [`io_time`](Self::io_time) in seconds.
    pub fn io_seconds(&self) -> f64 {
        self.io_time().as_secs_f64()
    }

    /// Reset the accumulated time to zero, returning the previous total.
    pub fn reset_io_time(&self) -> Duration {
        Duration::from_nanos(self.io_nanos.swap(0, Ordering::Relaxed))
    }
}

impl Default for IoContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_enabled_and_empty() {
        let ctx = IoContext::new();
        assert!(ctx.is_enabled());
        assert_eq!(ctx.io_time(), Duration::ZERO);
        assert_eq!(ctx.io_seconds(), 0.0);
    }

    #[test]
    fn switch_toggles() {
        let ctx = IoContext::new();
        ctx.set_enabled(false);
        assert!(!ctx.is_enabled());
        ctx.set_enabled(true);
        assert!(ctx.is_enabled());
    }

    #[test]
    fn record_accumulates_and_reset_clears() {
        let ctx = IoContext::new();
        ctx.record(Duration::from_millis(250));
        ctx.record(Duration::from_millis(750));
        assert_eq!(ctx.io_time(), Duration::from_secs(1));
        assert_eq!(ctx.io_seconds(), 1.0);
        assert_eq!(ctx.reset_io_time(), Duration::from_secs(1));
        assert_eq!(ctx.io_time(), Duration::ZERO);
    }

    #[test]
    fn record_saturates() {
        let ctx = IoContext::new();
        ctx.record(Duration::MAX);
        ctx.record(Duration::from_secs(1));
        assert_eq!(ctx.io_time(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let ctx = Arc::new(IoContext::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        ctx.record(Duration::from_nanos(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ctx.io_time(), Duration::from_nanos(8000));
    }

    #[test]
    fn global_is_shared() {
        assert!(Arc::ptr_eq(&IoContext::global(), &IoContext::global()));
    }
}
