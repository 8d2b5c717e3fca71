use std::collections::HashMap;
use std::sync::Arc;
use super::StageMetrics;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub stage_id: String,
    pub buffers_processed: u64,
    pub samples_processed: u64,
    pub samples_clipped: u64,
}

#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: HashMap<String, Arc<StageMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, stage_id: impl Into<String>, metrics: Arc<StageMetrics>) {
        self.metrics.insert(stage_id.into(), metrics);
    }

    pub fn snapshot(&self) -> HashMap<String, MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|(id, metrics)| {
                (
                    id.clone(),
                    MetricsSnapshot {
                        stage_id: metrics.stage_id().to_string(),
                        buffers_processed: metrics.buffers_processed(),
                        samples_processed: metrics.samples_processed(),
                        samples_clipped: metrics.samples_clipped(),
                    },
                )
            })
            .collect()
    }

    pub fn get_stage_metrics(&self, stage_id: &str) -> Option<Arc<StageMetrics>> {
        self.metrics.get(stage_id).cloned()
    }

    /// Totals across every registered stage: (samples processed, samples clipped)
    pub fn totals(&self) -> (u64, u64) {
        self.metrics.values().fold((0, 0), |(samples, clipped), m| {
            (samples + m.samples_processed(), clipped + m.samples_clipped())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Human readable summary, stages sorted by id
    pub fn report(&self) -> String {
        if self.metrics.is_empty() {
            return "No stages registered".to_string();
        }

        let snapshot = self.snapshot();
        let mut ids: Vec<&String> = snapshot.keys().collect();
        ids.sort();

        let mut report = String::from("=== Chain Metrics ===\n");
        for id in ids {
            let m = &snapshot[id];
            report.push_str(&format!(
                "\n[{}]\n  Buffers: {}\n  Samples: {}\n  Clipped: {}\n",
                id, m.buffers_processed, m.samples_processed, m.samples_clipped
            ));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_totals() {
        let mut collector = MetricsCollector::new();
        let a = Arc::new(StageMetrics::new("a"));
        let b = Arc::new(StageMetrics::new("b"));
        collector.register("a", a.clone());
        collector.register("b", b.clone());

        a.record_buffer(10, 1);
        b.record_buffer(10, 3);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot["a"].samples_clipped, 1);
        assert_eq!(snapshot["b"].buffers_processed, 1);
        assert_eq!(collector.totals(), (20, 4));
    }

    #[test]
    fn test_report() {
        let mut collector = MetricsCollector::new();
        assert_eq!(collector.report(), "No stages registered");

        collector.register("gain", Arc::new(StageMetrics::new("gain")));
        let report = collector.report();
        assert!(report.contains("[gain]"));
        assert!(report.contains("Clipped: 0"));
    }
}
