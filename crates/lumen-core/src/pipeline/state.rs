//! Per-invocation pipeline state.

use crate::error::ErrorKind;

/// Where a single pipeline run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Validating,
    Encoding,
    Summarizing,
    Classifying,
    Done,
    Failed(ErrorKind),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Stages advance strictly in order; any live state may fail.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Done | Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Validating, Encoding)
            | (Encoding, Summarizing)
            | (Summarizing, Classifying)
            | (Classifying, Done) => true,
            _ => false,
        }
    }
}

/// Tracks and logs the state of one run.
#[derive(Debug)]
pub(crate) struct StateTracker {
    state: PipelineState,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        tracing::debug!("Pipeline state: {:?}", PipelineState::Validating);
        Self {
            state: PipelineState::Validating,
        }
    }

    pub(crate) fn state(&self) -> PipelineState {
        self.state
    }

    /// Move to `next`; illegal transitions are logged and ignored.
    pub(crate) fn advance(&mut self, next: PipelineState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Ignoring pipeline transition {:?} -> {:?}", self.state, next);
            return false;
        }
        tracing::debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let mut tracker = StateTracker::new();
        for next in [
            PipelineState::Encoding,
            PipelineState::Summarizing,
            PipelineState::Classifying,
            PipelineState::Done,
        ] {
            assert!(tracker.advance(next));
        }
        assert!(tracker.state().is_terminal());
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!PipelineState::Validating.can_transition_to(PipelineState::Summarizing));
        assert!(!PipelineState::Encoding.can_transition_to(PipelineState::Done));
        assert!(!PipelineState::Classifying.can_transition_to(PipelineState::Encoding));
    }

    #[test]
    fn test_any_live_state_can_fail() {
        let failed = PipelineState::Failed(ErrorKind::ModelProcessing);
        for state in [
            PipelineState::Validating,
            PipelineState::Encoding,
            PipelineState::Summarizing,
            PipelineState::Classifying,
        ] {
            assert!(state.can_transition_to(failed));
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut tracker = StateTracker::new();
        assert!(tracker.advance(PipelineState::Failed(ErrorKind::NotFound)));
        assert!(!tracker.advance(PipelineState::Encoding));
        assert!(!tracker.advance(PipelineState::Done));
        assert_eq!(
            tracker.state(),
            PipelineState::Failed(ErrorKind::NotFound)
        );
    }
}
