use std::sync::atomic::{AtomicU64, Ordering};

/// Diagnostics counters for locally-recovered pipeline events.
///
/// Everything the worker swallows (skipped reads, classifier failures)
/// stays observable here without ever blocking the next cycle. Relaxed
/// ordering: counters are advisory, not synchronization.
#[derive(Default)]
pub struct PipelineStats {
    frames_published: AtomicU64,
    reads_skipped: AtomicU64,
    classify_failures: AtomicU64,
    no_face_ticks: AtomicU64,
}

/// A point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_published: u64,
    pub reads_skipped: u64,
    pub classify_failures: u64,
    pub no_face_ticks: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_publish(&self) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_read(&self) {
        self.reads_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classify_failure(&self) {
        self.classify_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_face(&self) {
        self.no_face_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_published: self.frames_published.load(Ordering::Relaxed),
            reads_skipped: self.reads_skipped.load(Ordering::Relaxed),
            classify_failures: self.classify_failures.load(Ordering::Relaxed),
            no_face_ticks: self.no_face_ticks.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let snap = PipelineStats::new().snapshot();
        assert_eq!(snap.frames_published, 0);
        assert_eq!(snap.reads_skipped, 0);
        assert_eq!(snap.classify_failures, 0);
        assert_eq!(snap.no_face_ticks, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = PipelineStats::new();
        stats.record_publish();
        stats.record_publish();
        stats.record_skipped_read();
        stats.record_classify_failure();
        stats.record_no_face();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_published, 2);
        assert_eq!(snap.reads_skipped, 1);
        assert_eq!(snap.classify_failures, 1);
        assert_eq!(snap.no_face_ticks, 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let stats = std::sync::Arc::new(PipelineStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = std::sync::Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_publish();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.snapshot().frames_published, 400);
    }
}
