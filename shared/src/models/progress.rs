//! Onboarding pipeline progress
//!
//! The pipeline moves strictly forward through six states:
//! `Submitted -> Predicting -> Forecasting -> RiskScoring -> Persisting -> Done`.
//! `Failed` is terminal and reachable from any state except `Done`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Step of the pipeline that produced a failure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validation,
    Predict,
    Forecast,
    Risk,
    Persist,
}

impl PipelineStage {
    /// Label shown to the user when this stage fails
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Validation => "Onboarding form",
            PipelineStage::Predict => "Predict API",
            PipelineStage::Forecast => "Forecast API",
            PipelineStage::Risk => "Risk API",
            PipelineStage::Persist => "Saving report",
        }
    }

    /// State the pipeline is in while this stage runs
    pub fn running_state(&self) -> PipelineState {
        match self {
            PipelineStage::Validation => PipelineState::Submitted,
            PipelineStage::Predict => PipelineState::Predicting,
            PipelineStage::Forecast => PipelineState::Forecasting,
            PipelineStage::Risk => PipelineState::RiskScoring,
            PipelineStage::Persist => PipelineState::Persisting,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline state machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Submitted,
    Predicting,
    Forecasting,
    RiskScoring,
    Persisting,
    Done,
    Failed(PipelineStage),
}

/// Number of displayed progress steps
pub const PROGRESS_STEPS: u8 = 6;

const STEP_MESSAGES: [&str; PROGRESS_STEPS as usize] = [
    "Sending crop details to model...",
    "Generating ideal crop-stage plan...",
    "Filling 120-day forecast across stages...",
    "Calculating stage-wise & overall risk...",
    "Saving report to your account...",
    "Finalizing report...",
];

impl PipelineState {
    /// Discrete step index 0..=5 for display. A failure keeps the index of
    /// the step that was running.
    pub fn step_index(&self) -> u8 {
        match self {
            PipelineState::Submitted => 0,
            PipelineState::Predicting => 1,
            PipelineState::Forecasting => 2,
            PipelineState::RiskScoring => 3,
            PipelineState::Persisting => 4,
            PipelineState::Done => 5,
            PipelineState::Failed(stage) => stage.running_state().step_index(),
        }
    }

    /// Running state for a displayed step index
    pub fn from_step_index(step: u8) -> Option<PipelineState> {
        match step {
            0 => Some(PipelineState::Submitted),
            1 => Some(PipelineState::Predicting),
            2 => Some(PipelineState::Forecasting),
            3 => Some(PipelineState::RiskScoring),
            4 => Some(PipelineState::Persisting),
            5 => Some(PipelineState::Done),
            _ => None,
        }
    }

    /// Fixed progress message for the current step
    pub fn message(&self) -> &'static str {
        STEP_MESSAGES[self.step_index() as usize]
    }

    /// Completion percentage, `(index + 1) / 6`
    pub fn percent(&self) -> u8 {
        let idx = u32::from(self.step_index()) + 1;
        ((idx * 100 + u32::from(PROGRESS_STEPS) / 2) / u32::from(PROGRESS_STEPS)) as u8
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }

    /// The single state that follows this one on success
    pub fn next(&self) -> Option<PipelineState> {
        match self {
            PipelineState::Submitted => Some(PipelineState::Predicting),
            PipelineState::Predicting => Some(PipelineState::Forecasting),
            PipelineState::Forecasting => Some(PipelineState::RiskScoring),
            PipelineState::RiskScoring => Some(PipelineState::Persisting),
            PipelineState::Persisting => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Failed(_) => None,
        }
    }

    /// Whether moving to `to` is a legal transition
    pub fn can_transition_to(&self, to: PipelineState) -> bool {
        match to {
            PipelineState::Failed(_) => !self.is_terminal(),
            other => self.next() == Some(other),
        }
    }
}

/// Lifecycle of a background onboarding job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Done,
    Failed,
}

/// Failure shown to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureNotice {
    pub stage: PipelineStage,
    pub message: String,
}

/// Progress as displayed by the processing modal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub step: u8,
    pub message: String,
    pub percent: u8,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureNotice>,
}

impl ProgressSnapshot {
    pub fn running(state: PipelineState) -> Self {
        Self {
            step: state.step_index(),
            message: state.message().to_string(),
            percent: state.percent(),
            state: JobState::Running,
            report_id: None,
            error: None,
        }
    }

    pub fn done(report_id: Uuid) -> Self {
        Self {
            state: JobState::Done,
            report_id: Some(report_id),
            ..Self::running(PipelineState::Done)
        }
    }

    pub fn failed(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            state: JobState::Failed,
            error: Some(FailureNotice {
                stage,
                message: message.into(),
            }),
            ..Self::running(PipelineState::Failed(stage))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAPPY_PATH: [PipelineState; 6] = [
        PipelineState::Submitted,
        PipelineState::Predicting,
        PipelineState::Forecasting,
        PipelineState::RiskScoring,
        PipelineState::Persisting,
        PipelineState::Done,
    ];

    #[test]
    fn test_happy_path_is_strictly_ordered() {
        for (i, pair) in HAPPY_PATH.windows(2).enumerate() {
            assert_eq!(pair[0].step_index() as usize, i);
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0].can_transition_to(pair[1]));
            assert!(!pair[1].can_transition_to(pair[0]));
        }
        assert_eq!(PipelineState::Done.next(), None);
        for state in HAPPY_PATH {
            assert_eq!(PipelineState::from_step_index(state.step_index()), Some(state));
        }
        assert_eq!(PipelineState::from_step_index(6), None);
    }

    #[test]
    fn test_cannot_skip_steps() {
        assert!(!PipelineState::Submitted.can_transition_to(PipelineState::Forecasting));
        assert!(!PipelineState::Predicting.can_transition_to(PipelineState::Done));
    }

    #[test]
    fn test_failure_reachable_from_every_non_done_state() {
        let failed = PipelineState::Failed(PipelineStage::Risk);
        for state in &HAPPY_PATH[..5] {
            assert!(state.can_transition_to(failed));
        }
        assert!(!PipelineState::Done.can_transition_to(failed));
        assert!(!failed.can_transition_to(PipelineState::Failed(PipelineStage::Persist)));
        assert!(!failed.can_transition_to(PipelineState::Submitted));
    }

    #[test]
    fn test_messages_and_percentages() {
        assert_eq!(PipelineState::Submitted.message(), "Sending crop details to model...");
        assert_eq!(PipelineState::Done.message(), "Finalizing report...");
        let percents: Vec<u8> = HAPPY_PATH.iter().map(|s| s.percent()).collect();
        assert_eq!(percents, vec![17, 33, 50, 67, 83, 100]);
    }

    #[test]
    fn test_failed_snapshot_keeps_running_step() {
        let snap = ProgressSnapshot::failed(PipelineStage::Forecast, "Forecast API failed (503)");
        assert_eq!(snap.step, 2);
        assert_eq!(snap.state, JobState::Failed);
        assert_eq!(snap.error.unwrap().stage, PipelineStage::Forecast);
    }
}
