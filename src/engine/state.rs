use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Enhance job states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    /// Source chosen, output name proposed
    Selected {
        source: PathBuf,
        name: String,
    },
    /// Output already exists, waiting for overwrite or cancel
    DuplicateFound {
        source: PathBuf,
        target: PathBuf,
    },
    Processing {
        source: PathBuf,
        target: PathBuf,
    },
    Success {
        output: PathBuf,
    },
    Error {
        error_msg: String,
    },
}

impl JobState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &JobState) -> bool {
        use JobState::*;

        matches!(
            (self, target),
            // From Idle
            (Idle, Selected { .. }) |
            (Idle, Processing { .. }) |

            // From Selected
            (Selected { .. }, DuplicateFound { .. }) |
            (Selected { .. }, Processing { .. }) |
            (Selected { .. }, Idle) |

            // From DuplicateFound
            (DuplicateFound { .. }, Processing { .. }) |
            (DuplicateFound { .. }, Idle) |

            // From Processing
            (Processing { .. }, Success { .. }) |
            (Processing { .. }, Error { .. }) |

            // Terminal states go back to Idle
            (Success { .. }, Idle) |
            (Error { .. }, Idle)
        )
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Selected { .. } => "Selected",
            Self::DuplicateFound { .. } => "DuplicateFound",
            Self::Processing { .. } => "Processing",
            Self::Success { .. } => "Success",
            Self::Error { .. } => "Error",
        }
    }
}

impl Default for JobState {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processing() -> JobState {
        JobState::Processing {
            source: PathBuf::from("in.wav"),
            target: PathBuf::from("out.wav"),
        }
    }

    #[test]
    fn test_valid_transitions() {
        let idle = JobState::Idle;
        let selected = JobState::Selected {
            source: PathBuf::from("in.wav"),
            name: "in_CK_Enhance".to_string(),
        };

        assert!(idle.can_transition_to(&selected));
        assert!(selected.can_transition_to(&processing()));
        assert!(!processing().can_transition_to(&idle));
    }

    #[test]
    fn test_duplicate_resolution() {
        let duplicate = JobState::DuplicateFound {
            source: PathBuf::from("in.wav"),
            target: PathBuf::from("out.wav"),
        };

        assert!(duplicate.can_transition_to(&processing()));
        assert!(duplicate.can_transition_to(&JobState::Idle));
        assert!(!duplicate.can_transition_to(&JobState::Success { output: PathBuf::from("out.wav") }));
    }

    #[test]
    fn test_terminal_states_reset() {
        let error = JobState::Error { error_msg: "decode failed".to_string() };

        assert!(error.can_transition_to(&JobState::Idle));
        assert!(!error.can_transition_to(&processing()));
    }
}
