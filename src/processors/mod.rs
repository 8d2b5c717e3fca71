pub mod gain;
pub mod state;

pub use gain::{apply_gain, GainProcessor, DEFAULT_GAIN, STUDIO_GAIN};
pub use state::ProcessorState;
