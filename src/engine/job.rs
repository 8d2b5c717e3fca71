use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::{AudioEnhancer, EnhanceReport, JobState};
use crate::output::{enhanced_name, resolve_target, Target};

/// Extension of files the enhancer writes
pub const OUTPUT_EXTENSION: &str = "wav";

/// Select, name, check for duplicates, then enhance one file.
pub struct EnhanceJob {
    enhancer: AudioEnhancer,
    out_dir: PathBuf,
    state: JobState,
}

impl EnhanceJob {
    pub fn new(enhancer: AudioEnhancer, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            enhancer,
            out_dir: out_dir.into(),
            state: JobState::Idle,
        }
    }

    /// Get current job state
    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Transition to a new state with validation
    pub fn transition_to(&mut self, new_state: JobState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(anyhow!(
                "Invalid state transition: {} -> {}",
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;
        Ok(())
    }

    /// Pick a source; proposes `<stem>_CK_Enhance` as the output name
    pub fn select(&mut self, source: impl Into<PathBuf>) -> Result<String> {
        let source = source.into();
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Source has no usable file name: {}", source.display()))?;
        let name = enhanced_name(file_name);

        self.transition_to(JobState::Selected {
            source,
            name: name.clone(),
        })?;
        Ok(name)
    }

    /// Accept the proposed name, or `custom_name` when given.
    ///
    /// Moves to `DuplicateFound` when the output exists, otherwise to
    /// `Processing`.
    pub fn confirm(&mut self, custom_name: Option<&str>) -> Result<&JobState> {
        let (source, name) = match &self.state {
            JobState::Selected { source, name } => {
                (source.clone(), custom_name.unwrap_or(name.as_str()).to_string())
            }
            other => return Err(anyhow!("Cannot confirm a name while {}", other.name())),
        };

        let next = match resolve_target(&self.out_dir, &name, OUTPUT_EXTENSION)? {
            Target::Duplicate(target) => JobState::DuplicateFound { source, target },
            Target::Fresh(target) => JobState::Processing { source, target },
        };
        self.transition_to(next)?;
        Ok(&self.state)
    }

    /// Overwrite the existing output found by `confirm`
    pub fn overwrite(&mut self) -> Result<()> {
        let next = match &self.state {
            JobState::DuplicateFound { source, target } => JobState::Processing {
                source: source.clone(),
                target: target.clone(),
            },
            other => return Err(anyhow!("Nothing to overwrite while {}", other.name())),
        };
        self.transition_to(next)
    }

    /// Abandon the selection or duplicate prompt
    pub fn cancel(&mut self) -> Result<()> {
        self.transition_to(JobState::Idle)
    }

    /// Start over after a finished job
    pub fn reset(&mut self) {
        self.state = JobState::Idle;
    }

    /// Enhance straight into `target`, skipping the naming steps
    pub async fn start(&mut self, source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Result<EnhanceReport> {
        self.transition_to(JobState::Processing {
            source: source.into(),
            target: target.into(),
        })?;
        self.run().await
    }

    /// Run the enhancer; the job ends in `Success` or `Error`
    pub async fn run(&mut self) -> Result<EnhanceReport> {
        let (source, target) = match &self.state {
            JobState::Processing { source, target } => (source.clone(), target.clone()),
            other => return Err(anyhow!("Cannot run while {}", other.name())),
        };

        match self.enhancer.enhance(&source, &target).await {
            Ok(report) => {
                info!(output = %report.output.display(), frames = report.frames, "enhance finished");
                self.transition_to(JobState::Success {
                    output: report.output.clone(),
                })?;
                Ok(report)
            }
            Err(e) => {
                error!(source = %source.display(), "enhance failed: {:#}", e);
                self.transition_to(JobState::Error {
                    error_msg: format!("{:#}", e),
                })?;
                Err(e)
            }
        }
    }
}
