use serde::{Deserialize, Serialize};

/// Lifecycle of a chain stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessorState {
    Unconfigured,
    Active,
    /// End of stream signalled, output still pending
    Draining,
    Ended,
}

impl ProcessorState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &ProcessorState) -> bool {
        use ProcessorState::*;

        matches!(
            (self, target),
            // configure
            (Unconfigured, Active) |
            (Active, Active) |

            // end of stream, with or without pending output
            (Active, Draining) |
            (Active, Ended) |
            (Draining, Ended) |

            // new input after the stream ended
            (Ended, Draining) |

            // flush
            (Draining, Active) |
            (Ended, Active) |

            // reset
            (_, Unconfigured)
        )
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Unconfigured => "Unconfigured",
            Self::Active => "Active",
            Self::Draining => "Draining",
            Self::Ended => "Ended",
        }
    }
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self::Unconfigured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProcessorState::*;

    #[test]
    fn test_valid_transitions() {
        assert!(Unconfigured.can_transition_to(&Active));
        assert!(Active.can_transition_to(&Draining));
        assert!(Draining.can_transition_to(&Ended));
        assert!(Ended.can_transition_to(&Active));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!Unconfigured.can_transition_to(&Draining));
        assert!(!Unconfigured.can_transition_to(&Ended));
        assert!(!Draining.can_transition_to(&Draining));
    }

    #[test]
    fn test_reset_from_anywhere() {
        for state in [Unconfigured, Active, Draining, Ended] {
            assert!(state.can_transition_to(&Unconfigured), "{}", state.name());
        }
    }
}
