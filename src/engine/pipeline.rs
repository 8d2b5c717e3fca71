use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::EffectsChain;
use crate::core::AudioProcessor;
use crate::observability::{MetricsCollector, StageMetrics};
use crate::processors::{GainProcessor, DEFAULT_GAIN, STUDIO_GAIN};

/// Frames handed to the chain per block when the config names none
pub const DEFAULT_FRAME_SIZE: usize = 4096;

/// Largest accepted `frame_size`
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// Settings of a `"Gain"` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainConfig {
    /// Linear factor
    #[serde(default)]
    pub gain: Option<f64>,
    /// Decibels, converted with `10^(db/20)`
    #[serde(default)]
    pub gain_db: Option<f64>,
}

impl GainConfig {
    pub fn linear_gain(&self) -> Result<f64> {
        match (self.gain, self.gain_db) {
            (Some(_), Some(_)) => bail!("Gain config sets both gain and gain_db"),
            (Some(gain), None) => Ok(gain),
            (None, Some(db)) => Ok(10_f64.powf(db / 20.0)),
            (None, None) => Ok(DEFAULT_GAIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageKind {
    Gain { gain: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    pub id: String,
    pub kind: StageKind,
}

/// Parsed chain description; builds a fresh `EffectsChain` per stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<StageSpec>,
    frame_size: usize,
}

impl Pipeline {
    /// Parse a chain description:
    ///
    /// ```json
    /// {
    ///   "processors": [{"id": "boost", "type": "Gain", "config": {"gain": 1.8}}],
    ///   "pipeline_config": {"frame_size": 4096}
    /// }
    /// ```
    pub fn from_json(config: Value) -> Result<Self> {
        let frame_size = match config["pipeline_config"]["frame_size"].as_u64() {
            Some(0) => bail!("frame_size must be greater than zero"),
            Some(size) if size > MAX_FRAME_SIZE as u64 => {
                bail!("frame_size {} exceeds the maximum of {}", size, MAX_FRAME_SIZE)
            }
            Some(size) => size as usize,
            None => DEFAULT_FRAME_SIZE,
        };

        let mut stages = Vec::new();
        if let Some(processors) = config["processors"].as_array() {
            for (index, stage_config) in processors.iter().enumerate() {
                let stage_type = stage_config["type"]
                    .as_str()
                    .ok_or(anyhow!("Processor {} missing type", index))?;
                let id = stage_config["id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}_{}", stage_type.to_lowercase(), index));
                let stage_cfg = stage_config["config"].clone();

                let kind = match stage_type {
                    "Gain" => {
                        let gain_config: GainConfig = if stage_cfg.is_null() {
                            GainConfig::default()
                        } else {
                            serde_json::from_value(stage_cfg)
                                .with_context(|| format!("Invalid config for processor {}", id))?
                        };
                        let gain = gain_config.linear_gain()?;
                        // Validates the factor up front
                        GainProcessor::new(gain).with_context(|| format!("Processor {}", id))?;
                        StageKind::Gain { gain }
                    }
                    _ => return Err(anyhow!("Unknown processor type: {}", stage_type)),
                };

                if stages.iter().any(|s: &StageSpec| s.id == id) {
                    bail!("Duplicate processor id: {}", id);
                }
                stages.push(StageSpec { id, kind });
            }
        }

        Ok(Self { stages, frame_size })
    }

    /// Read a chain description from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .context("Failed to parse pipeline config JSON")?;
        Self::from_json(value)
    }

    /// The "studio" enhance chain: a single 1.8x boost
    pub fn studio_preset() -> Self {
        Self {
            stages: vec![StageSpec {
                id: "studio_gain".to_string(),
                kind: StageKind::Gain { gain: STUDIO_GAIN },
            }],
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Instantiate the stages, each reporting into the returned collector
    pub fn build(&self) -> Result<(EffectsChain, MetricsCollector)> {
        let mut collector = MetricsCollector::new();
        let mut chain = EffectsChain::default();

        for spec in &self.stages {
            let metrics = Arc::new(StageMetrics::new(spec.id.clone()));
            let stage: Box<dyn AudioProcessor> = match spec.kind {
                StageKind::Gain { gain } => {
                    Box::new(GainProcessor::new(gain)?.with_metrics(metrics.clone()))
                }
            };
            collector.register(spec.id.clone(), metrics);
            chain.push(stage);
        }

        Ok((chain, collector))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::studio_preset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gain_config_variants() {
        assert_eq!(GainConfig::default().linear_gain().unwrap(), DEFAULT_GAIN);

        let db = GainConfig { gain: None, gain_db: Some(20.0) };
        assert!((db.linear_gain().unwrap() - 10.0).abs() < 1e-9);

        let both = GainConfig { gain: Some(2.0), gain_db: Some(6.0) };
        assert!(both.linear_gain().is_err());
    }

    #[test]
    fn test_generated_ids() {
        let pipeline = Pipeline::from_json(json!({
            "processors": [{"type": "Gain"}, {"type": "Gain", "config": {"gain": 2.0}}]
        }))
        .unwrap();

        let ids: Vec<&str> = pipeline.stages().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["gain_0", "gain_1"]);
        assert_eq!(pipeline.frame_size(), DEFAULT_FRAME_SIZE);
    }

    #[test]
    fn test_studio_preset() {
        let pipeline = Pipeline::studio_preset();
        assert_eq!(pipeline.stages()[0].kind, StageKind::Gain { gain: 1.8 });
    }
}
