use super::AudioFormat;
use anyhow::Result;

/// Base trait for every stage of an effects chain.
///
/// Stages are driven synchronously by one caller at a time: `queue_input`
/// consumes a buffer, `get_output` lends the transformed bytes back until
/// the next mutating call. Implementors must be object safe so a chain can
/// hold `Box<dyn AudioProcessor>` of mixed kinds.
pub trait AudioProcessor: Send {
    /// Negotiate the stream format and return the format this stage emits.
    ///
    /// An empty format (`AudioFormat::NOT_SET`) leaves the stage inactive.
    fn configure(&mut self, input_format: AudioFormat) -> Result<AudioFormat>;

    /// Whether the stage wants to see data; inactive stages are bypassed.
    fn is_active(&self) -> bool;

    /// Consume all of `input`, advancing it to its end.
    fn queue_input(&mut self, input: &mut &[u8]);

    /// Pending output, returned once. Empty until more input is queued.
    fn get_output(&mut self) -> &[u8];

    /// No more input will arrive for this stream.
    fn queue_end_of_stream(&mut self);

    /// End of stream was signalled and all output has been drained.
    fn is_ended(&self) -> bool;

    /// Drop pending output and the end-of-stream flag, keeping the format.
    fn flush(&mut self);

    /// Return to the unconfigured state.
    fn reset(&mut self);

    fn name(&self) -> &str {
        "Processor"
    }
}

impl<T: AudioProcessor + ?Sized> AudioProcessor for Box<T> {
    fn configure(&mut self, input_format: AudioFormat) -> Result<AudioFormat> {
        (**self).configure(input_format)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn queue_input(&mut self, input: &mut &[u8]) {
        (**self).queue_input(input)
    }

    fn get_output(&mut self) -> &[u8] {
        (**self).get_output()
    }

    fn queue_end_of_stream(&mut self) {
        (**self).queue_end_of_stream()
    }

    fn is_ended(&self) -> bool {
        (**self).is_ended()
    }

    fn flush(&mut self) {
        (**self).flush()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
