pub mod metrics;
pub mod collector;

pub use metrics::StageMetrics;
pub use collector::{MetricsCollector, MetricsSnapshot};
