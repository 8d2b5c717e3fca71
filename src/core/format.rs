use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample data format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    I16,  // 16-bit PCM, little-endian
    I24,  // 24-bit packed
    I32,  // 32-bit integer
    F32,  // 32-bit float
    F64,  // 64-bit float
    U8,   // 8-bit unsigned
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::I16 => 2,
            SampleFormat::I24 => 3,
            SampleFormat::I32 | SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
            SampleFormat::U8 => 1,
        }
    }
}

impl Default for SampleFormat {
    fn default() -> Self {
        SampleFormat::I16
    }
}

/// Stream format negotiated between the pipeline and its stages.
///
/// A format with a zero sample rate or zero channels is "not set"; handing it
/// to `configure` leaves a stage inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub encoding: SampleFormat,
}

impl AudioFormat {
    pub const NOT_SET: AudioFormat = AudioFormat {
        sample_rate: 0,
        channel_count: 0,
        encoding: SampleFormat::I16,
    };

    pub fn new(sample_rate: u32, channel_count: u16, encoding: SampleFormat) -> Self {
        Self {
            sample_rate,
            channel_count,
            encoding,
        }
    }

    /// 16-bit PCM at the given rate and channel count
    pub fn pcm16(sample_rate: u32, channel_count: u16) -> Self {
        Self::new(sample_rate, channel_count, SampleFormat::I16)
    }

    pub fn is_set(&self) -> bool {
        self.sample_rate > 0 && self.channel_count > 0
    }

    /// Bytes per interleaved frame (one sample for every channel)
    pub fn bytes_per_frame(&self) -> usize {
        self.encoding.bytes_per_sample() * self.channel_count as usize
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::NOT_SET
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_set() {
            return write!(f, "NOT_SET");
        }
        write!(
            f,
            "{:?} {}Hz x{}",
            self.encoding, self.sample_rate, self.channel_count
        )
    }
}
