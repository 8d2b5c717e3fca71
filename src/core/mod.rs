pub mod format;
pub mod pcm;
pub mod processor;

pub use format::{AudioFormat, SampleFormat};
pub use processor::AudioProcessor;
