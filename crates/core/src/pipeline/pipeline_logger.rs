use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting observer for worker-loop events.
///
/// Decouples the pipeline from specific output mechanisms (stdout, GUI
/// signals, log crate) so callers can watch the loop without changing
/// the orchestration code. Moved into the worker thread at start.
pub trait PipelineLogger: Send {
    /// Report a completed cycle by publish sequence number.
    fn tick(&mut self, sequence: u64);

    /// Record how long a named pipeline stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by tests and by display
/// frontends with their own progress surface.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn tick(&mut self, _sequence: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger for headless runs: per-stage timing accumulation and a
/// throughput summary when the pipeline stops.
///
/// Tick output is throttled to every `throttle_ticks` cycles to keep a
/// 20 fps loop from flooding the log.
pub struct StdoutPipelineLogger {
    throttle_ticks: u64,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    ticks: u64,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_ticks: u64) -> Self {
        Self {
            throttle_ticks: throttle_ticks.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            ticks: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Pipeline summary ({} cycles, {elapsed_s:.1}s total):",
            self.ticks
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        if self.ticks > 0 && elapsed_s > 0.0 {
            let fps = self.ticks as f64 / elapsed_s;
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(20)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn tick(&mut self, sequence: u64) {
        self.ticks += 1;
        if sequence % self.throttle_ticks == 0 {
            log::info!("published frame {sequence}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.tick(1);
        logger.timing("classify", 5.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("classify", 20.0);
        logger.timing("classify", 30.0);
        logger.timing("capture", 5.0);

        let classify = logger.timings_for("classify").unwrap();
        assert_eq!(classify.len(), 2);
        assert!((classify[0] - 20.0).abs() < f64::EPSILON);

        assert_eq!(logger.timings_for("capture").unwrap().len(), 1);
    }

    #[test]
    fn test_summary_includes_stages_and_fps() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.tick(0);
        logger.tick(1);
        logger.timing("classify", 20.0);
        logger.timing("annotate", 5.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("classify"));
        assert!(summary.contains("annotate"));
        assert!(summary.contains("fps"));
        assert!(summary.contains("2 cycles"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_tick_counts() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 0..25 {
            logger.tick(i);
        }
        assert_eq!(logger.ticks, 25);
    }
}
