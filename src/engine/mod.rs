pub mod chain;
pub mod enhancer;
pub mod job;
pub mod pipeline;
pub mod state;

pub use chain::EffectsChain;
pub use enhancer::{enhance_file, AudioEnhancer, EnhanceReport};
pub use job::{EnhanceJob, OUTPUT_EXTENSION};
pub use pipeline::{GainConfig, Pipeline, StageKind, StageSpec, DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE};
pub use state::JobState;
