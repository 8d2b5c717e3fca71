use anyhow::{Context, Result};
use tracing::debug;

use crate::core::{AudioFormat, AudioProcessor};
use crate::processors::ProcessorState;

/// Ordered list of stages applied to one stream.
///
/// The chain is itself an `AudioProcessor`: each active stage's output is
/// queued into the next active stage, inactive stages are skipped, and a
/// chain without active stages passes bytes through unchanged.
pub struct EffectsChain {
    stages: Vec<Box<dyn AudioProcessor>>,
    input_format: AudioFormat,
    output_format: AudioFormat,
    state: ProcessorState,
    output: Vec<u8>,
    scratch: Vec<u8>,
    pending: bool,
}

impl Default for EffectsChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl EffectsChain {
    pub fn new(stages: Vec<Box<dyn AudioProcessor>>) -> Self {
        Self {
            stages,
            input_format: AudioFormat::NOT_SET,
            output_format: AudioFormat::NOT_SET,
            state: ProcessorState::Unconfigured,
            output: Vec::new(),
            scratch: Vec::new(),
            pending: false,
        }
    }

    /// Append a stage. The chain must be configured again before use.
    pub fn push(&mut self, stage: Box<dyn AudioProcessor>) {
        self.stages.push(stage);
        if self.state.is_configured() {
            self.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn input_format(&self) -> AudioFormat {
        self.input_format
    }

    pub fn output_format(&self) -> AudioFormat {
        self.output_format
    }

    /// Queue one buffer and copy out whatever the chain produced for it.
    pub fn process_all(&mut self, input: &[u8]) -> Vec<u8> {
        let mut data = input;
        self.queue_input(&mut data);
        self.get_output().to_vec()
    }

    fn transition(&mut self, next: ProcessorState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid chain transition {} -> {}",
            self.state.name(),
            next.name()
        );
        self.state = next;
    }
}

impl AudioProcessor for EffectsChain {
    fn configure(&mut self, input_format: AudioFormat) -> Result<AudioFormat> {
        self.pending = false;
        if !input_format.is_set() {
            for stage in self.stages.iter_mut() {
                stage.reset();
            }
            self.input_format = AudioFormat::NOT_SET;
            self.output_format = AudioFormat::NOT_SET;
            self.transition(ProcessorState::Unconfigured);
            return Ok(input_format);
        }

        let mut current = input_format;
        for (index, stage) in self.stages.iter_mut().enumerate() {
            let output = stage
                .configure(current)
                .with_context(|| format!("Failed to configure stage {} ({})", index, stage.name()))?;
            if stage.is_active() {
                current = output;
            }
        }

        let active = self.stages.iter().filter(|s| s.is_active()).count();
        debug!(
            input = %input_format,
            output = %current,
            stages = self.stages.len(),
            active,
            "effects chain configured"
        );

        self.input_format = input_format;
        self.output_format = current;
        self.transition(ProcessorState::Active);
        Ok(current)
    }

    fn is_active(&self) -> bool {
        self.state.is_configured()
    }

    fn queue_input(&mut self, input: &mut &[u8]) {
        let mut fed = false;
        self.output.clear();

        for stage in self.stages.iter_mut().filter(|s| s.is_active()) {
            if fed {
                std::mem::swap(&mut self.output, &mut self.scratch);
                let mut data = self.scratch.as_slice();
                stage.queue_input(&mut data);
            } else {
                stage.queue_input(input);
                fed = true;
            }
            self.output.clear();
            self.output.extend_from_slice(stage.get_output());
        }

        if !fed {
            let rest: &[u8] = *input;
            self.output.extend_from_slice(rest);
            *input = &rest[rest.len()..];
        }

        self.pending = !self.output.is_empty();
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
        &self.output
    }

    fn queue_end_of_stream(&mut self) {
        if !matches!(self.state, ProcessorState::Active) {
            return;
        }

        // Bytes still flowing downstream once each stage is told to finish
        let mut carry: Vec<u8> = Vec::new();
        for stage in self.stages.iter_mut().filter(|s| s.is_active()) {
            let mut next = Vec::new();
            if !carry.is_empty() {
                let mut data = carry.as_slice();
                stage.queue_input(&mut data);
                next.extend_from_slice(stage.get_output());
            }
            stage.queue_end_of_stream();
            loop {
                let tail = stage.get_output();
                if tail.is_empty() {
                    break;
                }
                next.extend_from_slice(tail);
            }
            carry = next;
        }

        if !carry.is_empty() {
            if !self.pending {
                self.output.clear();
            }
            self.output.extend_from_slice(&carry);
            self.pending = true;
        }

        if self.pending {
            self.transition(ProcessorState::Draining);
        } else {
            self.transition(ProcessorState::Ended);
        }
    }

    fn is_ended(&self) -> bool {
        self.state == ProcessorState::Ended
    }

    fn flush(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.flush();
        }
        self.pending = false;
        if self.state.is_configured() {
            self.transition(ProcessorState::Active);
        }
    }

    fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
        self.pending = false;
        self.output = Vec::new();
        self.scratch = Vec::new();
        self.input_format = AudioFormat::NOT_SET;
        self.output_format = AudioFormat::NOT_SET;
        self.transition(ProcessorState::Unconfigured);
    }

    fn name(&self) -> &str {
        "EffectsChain"
    }
}
