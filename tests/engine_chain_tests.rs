use anyhow::Result;
use studiofx::core::pcm::{bytes_to_samples, samples_to_bytes};
use studiofx::core::{AudioFormat, AudioProcessor};
use studiofx::engine::EffectsChain;
use studiofx::processors::{GainProcessor, ProcessorState};

/// Holds back the last `delay` bytes of each buffer until the next one,
/// releasing them at end of stream.
struct DelayStage {
    delay: usize,
    held: Vec<u8>,
    output: Vec<u8>,
    pending: bool,
    active: bool,
    ended: bool,
    eos: bool,
}

impl DelayStage {
    fn new(delay_samples: usize) -> Self {
        Self {
            delay: delay_samples * 2,
            held: Vec::new(),
            output: Vec::new(),
            pending: false,
            active: false,
            ended: false,
            eos: false,
        }
    }
}

impl AudioProcessor for DelayStage {
    fn configure(&mut self, input_format: AudioFormat) -> Result<AudioFormat> {
        self.active = input_format.is_set();
        Ok(input_format)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn queue_input(&mut self, input: &mut &[u8]) {
        let rest: &[u8] = *input;
        self.held.extend_from_slice(rest);
        *input = &rest[rest.len()..];
        let release = self.held.len().saturating_sub(self.delay);
        self.output = self.held.drain(..release).collect();
        self.pending = !self.output.is_empty();
    }

    fn get_output(&mut self) -> &[u8] {
        if !self.pending {
            return &[];
        }
        self.pending = false;
        if self.eos {
            self.ended = true;
        }
        &self.output
    }

    fn queue_end_of_stream(&mut self) {
        self.eos = true;
        self.output = std::mem::take(&mut self.held);
        self.pending = !self.output.is_empty();
        self.ended = !self.pending;
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn flush(&mut self) {
        self.held.clear();
        self.pending = false;
        self.eos = false;
        self.ended = false;
    }

    fn reset(&mut self) {
        self.flush();
        self.active = false;
    }

    fn name(&self) -> &str {
        "Delay"
    }
}

/// Refuses every format, so the chain must bypass it
struct InactiveStage;

impl AudioProcessor for InactiveStage {
    fn configure(&mut self, input_format: AudioFormat) -> Result<AudioFormat> {
        Ok(input_format)
    }
    fn is_active(&self) -> bool {
        false
    }
    fn queue_input(&mut self, _input: &mut &[u8]) {
        panic!("inactive stage received input");
    }
    fn get_output(&mut self) -> &[u8] {
        &[]
    }
    fn queue_end_of_stream(&mut self) {}
    fn is_ended(&self) -> bool {
        true
    }
    fn flush(&mut self) {}
    fn reset(&mut self) {}
}

fn gain(g: f64) -> Box<dyn AudioProcessor> {
    Box::new(GainProcessor::new(g).unwrap())
}

fn delay(samples: usize) -> Box<dyn AudioProcessor> {
    Box::new(DelayStage::new(samples))
}

#[test]
fn test_chain_applies_gain() {
    let mut chain = EffectsChain::new(vec![gain(1.8)]);
    let format = AudioFormat::pcm16(44100, 1);
    assert_eq!(chain.configure(format).unwrap(), format);

    let out = chain.process_all(&samples_to_bytes(&[20000, -20000, 100]));
    assert_eq!(bytes_to_samples(&out), vec![32767, -32768, 180]);
}

#[test]
fn test_inactive_stage_bypassed() {
    let mut chain = EffectsChain::new(vec![Box::new(InactiveStage) as Box<dyn AudioProcessor>, gain(2.0)]);
    chain.configure(AudioFormat::pcm16(44100, 1)).unwrap();

    let out = chain.process_all(&samples_to_bytes(&[1, 2]));
    assert_eq!(bytes_to_samples(&out), vec![2, 4]);
}

#[test]
fn test_configure_error_names_stage() {
    let mut chain = EffectsChain::new(vec![gain(2.0)]);
    let err = chain
        .configure(AudioFormat::new(44100, 1, studiofx::core::SampleFormat::F32))
        .unwrap_err();

    assert!(format!("{:#}", err).contains("stage 0 (Gain)"));
    assert!(!chain.is_active());
}

#[test]
fn test_end_of_stream_drains_delayed_tail() {
    let mut chain = EffectsChain::new(vec![delay(2), gain(2.0)]);
    chain.configure(AudioFormat::pcm16(44100, 1)).unwrap();

    let out = chain.process_all(&samples_to_bytes(&[1, 2, 3, 4]));
    assert_eq!(bytes_to_samples(&out), vec![2, 4]);

    chain.queue_end_of_stream();
    assert!(!chain.is_ended());
    assert_eq!(chain.state(), ProcessorState::Draining);

    assert_eq!(bytes_to_samples(chain.get_output()), vec![6, 8]);
    assert!(chain.is_ended());
    assert!(chain.get_output().is_empty());
}

#[test]
fn test_end_of_stream_keeps_undrained_output() {
    let mut chain = EffectsChain::new(vec![delay(1), gain(1.0)]);
    chain.configure(AudioFormat::pcm16(44100, 1)).unwrap();

    let bytes = samples_to_bytes(&[10, 20]);
    chain.queue_input(&mut bytes.as_slice());
    chain.queue_end_of_stream();

    assert_eq!(bytes_to_samples(chain.get_output()), vec![10, 20]);
    assert!(chain.is_ended());
}

#[test]
fn test_flush_and_reset() {
    let mut chain = EffectsChain::new(vec![gain(1.5)]);
    chain.configure(AudioFormat::pcm16(44100, 2)).unwrap();

    let bytes = samples_to_bytes(&[1, 2]);
    chain.queue_input(&mut bytes.as_slice());
    chain.flush();
    assert!(chain.get_output().is_empty());
    assert!(chain.is_active());
    assert_eq!(chain.output_format(), AudioFormat::pcm16(44100, 2));

    chain.reset();
    assert!(!chain.is_active());
    assert_eq!(chain.output_format(), AudioFormat::NOT_SET);
}

#[test]
fn test_chain_nests_as_stage() {
    let inner = EffectsChain::new(vec![gain(2.0)]);
    let mut outer = EffectsChain::new(vec![Box::new(inner) as Box<dyn AudioProcessor>, gain(2.0)]);
    outer.configure(AudioFormat::pcm16(8000, 1)).unwrap();

    let out = outer.process_all(&samples_to_bytes(&[3]));
    assert_eq!(bytes_to_samples(&out), vec![12]);
}

#[test]
fn test_empty_input_while_draining_ends_chain() {
    let mut chain = EffectsChain::new(vec![gain(2.0)]);
    chain.configure(AudioFormat::pcm16(44100, 1)).unwrap();

    let bytes = samples_to_bytes(&[1, 2]);
    chain.queue_input(&mut bytes.as_slice());
    chain.queue_end_of_stream();
    assert_eq!(chain.state(), ProcessorState::Draining);

    chain.queue_input(&mut &[][..]);

    assert!(chain.get_output().is_empty());
    assert!(chain.is_ended());
}
