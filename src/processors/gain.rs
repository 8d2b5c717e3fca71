use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{debug, trace};

use super::ProcessorState;
use crate::core::{pcm, AudioFormat, AudioProcessor, SampleFormat};
use crate::observability::StageMetrics;

/// Gain used when a config names none
pub const DEFAULT_GAIN: f64 = 1.5;

/// Boost applied by the studio preset
pub const STUDIO_GAIN: f64 = 1.8;

/// Scale one sample and saturate it into the 16-bit range.
///
/// The product is rounded half away from zero in `f64` before narrowing.
/// Returns the new sample and whether it hit the clamp.
#[inline]
pub fn apply_gain(sample: i16, gain: f64) -> (i16, bool) {
    let boosted = (sample as f64 * gain).round();
    if boosted > i16::MAX as f64 {
        (i16::MAX, true)
    } else if boosted < i16::MIN as f64 {
        (i16::MIN, true)
    } else {
        (boosted as i16, false)
    }
}

/// Fixed linear gain with clipping protection for 16-bit PCM.
pub struct GainProcessor {
    gain: f64,
    format: AudioFormat,
    state: ProcessorState,
    buffer: Vec<u8>,
    pending: bool,
    metrics: Option<Arc<StageMetrics>>,
}

impl Default for GainProcessor {
    fn default() -> Self {
        Self::with_gain(DEFAULT_GAIN)
    }
}

impl GainProcessor {
    /// Creates a processor with a linear gain factor.
    ///
    /// The factor must be finite and strictly positive.
    pub fn new(gain: f64) -> Result<Self> {
        if !gain.is_finite() || gain <= 0.0 {
            bail!("Gain must be a positive finite number, got {}", gain);
        }
        Ok(Self::with_gain(gain))
    }

    /// Creates a processor from a decibel value
    pub fn from_db(gain_db: f64) -> Result<Self> {
        Self::new(10_f64.powf(gain_db / 20.0))
    }

    fn with_gain(gain: f64) -> Self {
        Self {
            gain,
            format: AudioFormat::NOT_SET,
            state: ProcessorState::Unconfigured,
            buffer: Vec::new(),
            pending: false,
            metrics: None,
        }
    }

    /// Report processed and clipped sample counts into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<StageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn input_format(&self) -> AudioFormat {
        self.format
    }

    /// Bytes currently reserved for output
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    fn transition(&mut self, next: ProcessorState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid gain transition {} -> {}",
            self.state.name(),
            next.name()
        );
        trace!(from = self.state.name(), to = next.name(), "gain state");
        self.state = next;
    }
}

impl AudioProcessor for GainProcessor {
    fn configure(&mut self, input_format: AudioFormat) -> Result<AudioFormat> {
        if !input_format.is_set() {
            self.format = AudioFormat::NOT_SET;
            self.pending = false;
            self.transition(ProcessorState::Unconfigured);
            return Ok(input_format);
        }
        if input_format.encoding != SampleFormat::I16 {
            bail!("Unhandled format for gain stage: {}", input_format);
        }

        debug!(format = %input_format, gain = self.gain, "gain configured");
        self.format = input_format;
        self.pending = false;
        self.transition(ProcessorState::Active);

        // Rate, channels and encoding pass through untouched
        Ok(input_format)
    }

    fn is_active(&self) -> bool {
        self.state.is_configured()
    }

    fn queue_input(&mut self, input: &mut &[u8]) {
        let sample_bytes = input.len() & !1;

        // Keeps the allocation when it is already large enough
        self.buffer.clear();
        self.buffer.reserve(sample_bytes);

        let mut clipped = 0u64;
        while let Some(sample) = pcm::read_i16_le(input) {
            let (boosted, hit) = apply_gain(sample, self.gain);
            clipped += hit as u64;
            self.buffer.extend_from_slice(&boosted.to_le_bytes());
        }

        // A trailing odd byte is not a sample
        let rest: &[u8] = *input;
        *input = &rest[rest.len()..];

        if let Some(metrics) = &self.metrics {
            metrics.record_buffer((sample_bytes / 2) as u64, clipped);
        }

        self.pending = !self.buffer.is_empty();
        if matches!(self.state, ProcessorState::Draining | ProcessorState::Ended) {
            // End of stream already signalled: ended once nothing is left to take
            let next = if self.pending {
                ProcessorState::Draining
            } else {
                ProcessorState::Ended
            };
            if next != self.state {
                self.transition(next);
            }
        }
    }

    fn get_output(&mut self) -> &[u8] {
        if !self.pending {
            return &[];
        }
        self.pending = false;
        if self.state == ProcessorState::Draining {
            self.transition(ProcessorState::Ended);
        }
        &self.buffer
    }

    fn queue_end_of_stream(&mut self) {
        match self.state {
            ProcessorState::Active if self.pending => self.transition(ProcessorState::Draining),
            ProcessorState::Active => self.transition(ProcessorState::Ended),
            ProcessorState::Unconfigured => trace!("end of stream on unconfigured gain ignored"),
            ProcessorState::Draining | ProcessorState::Ended => {}
        }
    }

    fn is_ended(&self) -> bool {
        self.state == ProcessorState::Ended
    }

    fn flush(&mut self) {
        self.pending = false;
        if self.state.is_configured() {
            self.transition(ProcessorState::Active);
        }
    }

    fn reset(&mut self) {
        self.pending = false;
        self.buffer = Vec::new();
        self.format = AudioFormat::NOT_SET;
        self.transition(ProcessorState::Unconfigured);
    }

    fn name(&self) -> &str {
        "Gain"
    }
}
