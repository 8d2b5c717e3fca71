use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::Pipeline;
use crate::core::{AudioFormat, AudioProcessor};

/// Outcome of one enhance job
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceReport {
    pub output: PathBuf,
    pub format: AudioFormat,
    /// Interleaved frames written
    pub frames: u64,
    pub samples_processed: u64,
    pub samples_clipped: u64,
}

/// Runs a pipeline over 16-bit PCM WAV files.
pub struct AudioEnhancer {
    pipeline: Pipeline,
}

impl Default for AudioEnhancer {
    fn default() -> Self {
        Self::new(Pipeline::studio_preset())
    }
}

impl AudioEnhancer {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Enhance `input` into `output` on the blocking thread pool
    pub async fn enhance(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<EnhanceReport> {
        let pipeline = self.pipeline.clone();
        let input = input.as_ref().to_path_buf();
        let output = output.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || enhance_file(&pipeline, &input, &output))
            .await
            .context("Enhance task panicked")?
    }
}

/// Decode, run the chain block by block, and encode with the same layout
pub fn enhance_file(pipeline: &Pipeline, input: &Path, output: &Path) -> Result<EnhanceReport> {
    let mut reader = hound::WavReader::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!(
            "{} is {}-bit {:?}; only 16-bit integer PCM is supported",
            input.display(),
            spec.bits_per_sample,
            spec.sample_format
        );
    }

    let format = AudioFormat::pcm16(spec.sample_rate, spec.channels);
    let (mut chain, collector) = pipeline.build()?;
    let out_format = chain
        .configure(format)
        .with_context(|| format!("Failed to configure chain for {}", format))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        format = %format,
        stages = chain.len(),
        "enhancing"
    );

    let out_dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    // Encoded beside the target and renamed over it only once complete
    let temp = tempfile::NamedTempFile::new_in(out_dir)
        .with_context(|| format!("Failed to create temporary file in {}", out_dir.display()))?;
    let out_spec = hound::WavSpec {
        channels: out_format.channel_count,
        sample_rate: out_format.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let handle = temp
        .as_file()
        .try_clone()
        .with_context(|| format!("Failed to open {}", temp.path().display()))?;
    let mut writer = hound::WavWriter::new(BufWriter::new(handle), out_spec)
        .with_context(|| format!("Failed to start WAV stream for {}", output.display()))?;

    let block_samples = pipeline
        .frame_size()
        .checked_mul(spec.channels as usize)
        .context("Block size overflows")?;
    let mut block: Vec<u8> = Vec::new();
    let mut samples = reader.samples::<i16>();
    let mut written = 0u64;

    loop {
        block.clear();
        for sample in samples.by_ref().take(block_samples) {
            let sample = sample.with_context(|| format!("Failed to decode {}", input.display()))?;
            block.extend_from_slice(&sample.to_le_bytes());
        }
        if block.is_empty() {
            break;
        }

        let mut data = block.as_slice();
        chain.queue_input(&mut data);
        written += write_pcm(&mut writer, chain.get_output())?;
    }

    chain.queue_end_of_stream();
    while !chain.is_ended() {
        let tail = chain.get_output();
        if tail.is_empty() {
            break;
        }
        written += write_pcm(&mut writer, tail)?;
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize {}", output.display()))?;
    drop(reader);
    temp.persist(output)
        .with_context(|| format!("Failed to replace {}", output.display()))?;

    let (samples_processed, samples_clipped) = collector.totals();
    if samples_clipped > 0 {
        warn!(samples_clipped, samples_processed, "samples clipped while enhancing");
    }

    let channels = out_format.channel_count.max(1) as u64;
    Ok(EnhanceReport {
        output: output.to_path_buf(),
        format: out_format,
        frames: written / channels,
        samples_processed,
        samples_clipped,
    })
}

fn write_pcm(writer: &mut hound::WavWriter<BufWriter<File>>, bytes: &[u8]) -> Result<u64> {
    let mut count = 0u64;
    for pair in bytes.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        count += 1;
    }
    Ok(count)
}
