//! Counters describing pool activity.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Pool metrics collector
#[derive(Debug)]
pub struct Metrics {
    // Task counters
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_panicked: AtomicU64,
    tasks_discarded: AtomicU64,
    failures_dropped: AtomicU64,

    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,

    // Timing
    busy_time_ns: AtomicU64,
    queue_wait_ns: AtomicU64,

    // Execution latency; None only if the histogram could not be built.
    latency_histogram: RwLock<Option<Histogram<u64>>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            tasks_discarded: AtomicU64::new(0),
            failures_dropped: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            busy_time_ns: AtomicU64::new(0),
            queue_wait_ns: AtomicU64::new(0),
            latency_histogram: RwLock::new(Histogram::new(3).ok()),
            start_time: Instant::now(),
        }
    }

    pub fn record_submit(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Marks a task as started after waiting `queue_wait` in the queue.
    pub fn record_start(&self, queue_wait: Duration) {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        self.queue_wait_ns
            .fetch_add(saturating_nanos(queue_wait), Ordering::Relaxed);
    }

    /// Marks a started task as finished, successfully or not.
    pub fn record_finish(&self, duration: Duration, panicked: bool) {
        let duration_ns = saturating_nanos(duration);
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        self.busy_time_ns.fetch_add(duration_ns, Ordering::Relaxed);
        if panicked {
            self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(mut guard) = self.latency_histogram.try_write() {
            if let Some(hist) = guard.as_mut() {
                let _ = hist.record(duration_ns);
            }
        }
    }

    pub fn record_discarded(&self, count: usize) {
        self.tasks_discarded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// A failure report that did not fit in the failure channel.
    pub fn record_failure_dropped(&self) {
        self.failures_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let histogram = self.latency_histogram.read();
        let (avg, p50, p99, max) = match histogram.as_ref() {
            Some(h) if h.len() > 0 => (
                h.mean() as u64,
                h.value_at_quantile(0.50),
                h.value_at_quantile(0.99),
                h.max(),
            ),
            _ => (0, 0, 0, 0),
        };

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            tasks_discarded: self.tasks_discarded.load(Ordering::Relaxed),
            failures_dropped: self.failures_dropped.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Acquire),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
            busy_time_ns: self.busy_time_ns.load(Ordering::Relaxed),
            queue_wait_ns: self.queue_wait_ns.load(Ordering::Relaxed),
            avg_latency_ns: avg,
            p50_latency_ns: p50,
            p99_latency_ns: p99,
            max_latency_ns: max,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_submitted: u64,
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    pub tasks_discarded: u64,
    pub failures_dropped: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub busy_time_ns: u64,
    pub queue_wait_ns: u64,
    pub avg_latency_ns: u64,
    pub p50_latency_ns: u64,
    pub p99_latency_ns: u64,
    pub max_latency_ns: u64,
}

impl MetricsSnapshot {
    /// Average time a task spent queued before a worker picked it up.
    pub fn avg_queue_wait_ns(&self) -> u64 {
        if self.tasks_executed == 0 {
            return 0;
        }
        self.queue_wait_ns / self.tasks_executed
    }

    pub fn tasks_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.tasks_executed as f64 / seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_basic() {
        let metrics = Metrics::new();

        metrics.record_submit();
        metrics.record_submit();
        metrics.record_start(Duration::from_nanos(500));
        metrics.record_finish(Duration::from_nanos(1000), false);
        metrics.record_start(Duration::from_nanos(1500));
        metrics.record_finish(Duration::from_nanos(2000), true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_submitted, 2);
        assert_eq!(snapshot.tasks_executed, 2);
        assert_eq!(snapshot.tasks_panicked, 1);
        assert_eq!(snapshot.in_flight, 0);
        assert_eq!(snapshot.peak_in_flight, 1);
        assert_eq!(snapshot.avg_queue_wait_ns(), 1000);
        assert!(snapshot.avg_latency_ns > 0);
    }

    #[test]
    fn test_peak_in_flight() {
        let metrics = Metrics::new();

        metrics.record_start(Duration::ZERO);
        metrics.record_start(Duration::ZERO);
        metrics.record_start(Duration::ZERO);
        assert_eq!(metrics.in_flight(), 3);

        for _ in 0..3 {
            metrics.record_finish(Duration::ZERO, false);
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.in_flight, 0);
        assert_eq!(snapshot.peak_in_flight, 3);
    }

    #[test]
    fn test_discarded() {
        let metrics = Metrics::new();
        metrics.record_discarded(4);
        metrics.record_failure_dropped();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_discarded, 4);
        assert_eq!(snapshot.failures_dropped, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Metrics::new().snapshot();
        assert_eq!(snapshot.avg_latency_ns, 0);
        assert_eq!(snapshot.avg_queue_wait_ns(), 0);
    }
}
