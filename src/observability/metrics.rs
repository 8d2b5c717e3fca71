use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one chain stage, shared with the processor through an `Arc`.
pub struct StageMetrics {
    stage_id: String,
    buffers_processed: AtomicU64,
    samples_processed: AtomicU64,
    samples_clipped: AtomicU64,
}

impl StageMetrics {
    pub fn new(stage_id: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            buffers_processed: AtomicU64::new(0),
            samples_processed: AtomicU64::new(0),
            samples_clipped: AtomicU64::new(0),
        }
    }

    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    pub fn buffers_processed(&self) -> u64 {
        self.buffers_processed.load(Ordering::Relaxed)
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed.load(Ordering::Relaxed)
    }

    pub fn samples_clipped(&self) -> u64 {
        self.samples_clipped.load(Ordering::Relaxed)
    }

    pub fn record_buffer(&self, samples: u64, clipped: u64) {
        self.buffers_processed.fetch_add(1, Ordering::Relaxed);
        self.samples_processed.fetch_add(samples, Ordering::Relaxed);
        self.samples_clipped.fetch_add(clipped, Ordering::Relaxed);
    }

    /// Fraction of processed samples that hit the clamp, 0.0 when idle
    pub fn clip_ratio(&self) -> f64 {
        let samples = self.samples_processed();
        if samples == 0 {
            return 0.0;
        }
        self.samples_clipped() as f64 / samples as f64
    }
}
