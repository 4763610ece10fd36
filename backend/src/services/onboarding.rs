//! Onboarding pipeline
//!
//! Runs Predict, Forecast and Risk strictly in sequence, then persists one
//! report. Nothing is written until all three calls succeed, so a failure at
//! any step leaves no trace in storage.

use serde_json::{Map, Value};
use shared::{
    check_onboarding_input, ForecastedStagePlan, NewReport, OnboardingInput, PipelineStage,
    PipelineState, ProgressSnapshot, RawPayloads, ReportStatus, RiskResult, StagePlan,
};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::external::{AdvisoryServices, ServiceError};
use crate::repository::{RepositoryError, ReportRepository};

/// Form field names that the Predict service knows under another name
pub const PREDICT_FIELD_ALIASES: &[(&str, &str)] = &[("sowing_date", "sw_date")];

/// Pipeline failure, tagged with the step that failed
#[derive(Error, Debug)]
pub enum OnboardingError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Predict API {0}")]
    Predict(ServiceError),

    #[error("Forecast API {0}")]
    Forecast(ServiceError),

    #[error("Risk API {0}")]
    Risk(ServiceError),

    #[error("Saving report failed: {0}")]
    Persist(RepositoryError),
}

impl OnboardingError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            OnboardingError::Validation { .. } => PipelineStage::Validation,
            OnboardingError::Predict(_) => PipelineStage::Predict,
            OnboardingError::Forecast(_) => PipelineStage::Forecast,
            OnboardingError::Risk(_) => PipelineStage::Risk,
            OnboardingError::Persist(_) => PipelineStage::Persist,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            OnboardingError::Predict(ServiceError::Timeout { .. })
                | OnboardingError::Forecast(ServiceError::Timeout { .. })
                | OnboardingError::Risk(ServiceError::Timeout { .. })
        )
    }
}

fn predict_field_name(field: &'static str) -> &'static str {
    PREDICT_FIELD_ALIASES
        .iter()
        .find(|(from, _)| *from == field)
        .map(|(_, to)| *to)
        .unwrap_or(field)
}

/// Predict request body for a (trimmed) form
pub fn predict_request(input: &OnboardingInput) -> Map<String, Value> {
    let fields: [(&'static str, &str); 7] = [
        ("crop", &input.crop),
        ("seed_type", &input.seed_type),
        ("soil", &input.soil),
        ("district", &input.district),
        ("season", &input.season),
        ("state", &input.state),
        ("sowing_date", &input.sowing_date),
    ];

    fields
        .into_iter()
        .map(|(name, value)| {
            (
                predict_field_name(name).to_string(),
                Value::String(value.to_string()),
            )
        })
        .collect()
}

/// Publishes pipeline progress to any number of watchers
pub struct ProgressTracker {
    tx: watch::Sender<ProgressSnapshot>,
    visited: Mutex<Vec<PipelineState>>,
}

impl ProgressTracker {
    pub fn new() -> (Self, watch::Receiver<ProgressSnapshot>) {
        let (tx, rx) = watch::channel(ProgressSnapshot::running(PipelineState::Submitted));
        let tracker = Self {
            tx,
            visited: Mutex::new(vec![PipelineState::Submitted]),
        };
        (tracker, rx)
    }

    /// A tracker nobody is watching yet
    pub fn detached() -> Self {
        Self::new().0
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    pub fn current(&self) -> PipelineState {
        self.visited().last().copied().unwrap_or(PipelineState::Submitted)
    }

    /// Every state entered so far, in order
    pub fn visited(&self) -> Vec<PipelineState> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Move to `to` if that is a legal transition; returns whether it moved
    fn transition(&self, to: PipelineState) -> bool {
        let mut visited = self
            .visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let from = visited.last().copied().unwrap_or(PipelineState::Submitted);
        if !from.can_transition_to(to) {
            tracing::warn!(?from, ?to, "Ignoring illegal pipeline transition");
            return false;
        }
        visited.push(to);
        true
    }

    pub fn advance(&self, to: PipelineState) {
        if self.transition(to) {
            tracing::info!(step = to.step_index(), "{}", to.message());
            self.tx.send_replace(ProgressSnapshot::running(to));
        }
    }

    pub fn finish(&self, report_id: Uuid) {
        if self.transition(PipelineState::Done) {
            self.tx.send_replace(ProgressSnapshot::done(report_id));
        }
    }

    pub fn fail(&self, error: &OnboardingError) {
        if self.transition(PipelineState::Failed(error.stage())) {
            self.tx
                .send_replace(ProgressSnapshot::failed(error.stage(), error.to_string()));
        }
    }
}

/// Onboarding pipeline orchestrator
#[derive(Clone)]
pub struct OnboardingService {
    services: Arc<dyn AdvisoryServices>,
    reports: Arc<dyn ReportRepository>,
    timeout: Duration,
}

impl OnboardingService {
    pub fn new(
        services: Arc<dyn AdvisoryServices>,
        reports: Arc<dyn ReportRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            services,
            reports,
            timeout,
        }
    }

    /// Run the whole chain for one submission and return the new report id
    pub async fn run(
        &self,
        input: &OnboardingInput,
        user_id: Uuid,
        progress: &ProgressTracker,
    ) -> Result<Uuid, OnboardingError> {
        let span = tracing::info_span!("onboarding", %user_id, crop = %input.crop.trim());

        async move {
            let result = self.run_steps(input, user_id, progress).await;
            match &result {
                Ok(report_id) => {
                    progress.finish(*report_id);
                    tracing::info!(%report_id, "Onboarding complete");
                }
                Err(e) => {
                    progress.fail(e);
                    tracing::warn!(stage = ?e.stage(), "Onboarding failed: {}", e);
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_steps(
        &self,
        input: &OnboardingInput,
        user_id: Uuid,
        progress: &ProgressTracker,
    ) -> Result<Uuid, OnboardingError> {
        let input = input.trimmed();
        check_onboarding_input(&input).map_err(|e| OnboardingError::Validation {
            field: e.field,
            message: e.message,
        })?;
        let sowing_date = input
            .sowing_date()
            .ok_or_else(|| OnboardingError::Validation {
                field: "sowing_date".to_string(),
                message: "Sowing date must be a valid date (YYYY-MM-DD)".to_string(),
            })?;

        let predict_input = Value::Object(predict_request(&input));

        progress.advance(PipelineState::Predicting);
        let predicted: StagePlan = self
            .call(self.services.predict(&predict_input))
            .await
            .map_err(OnboardingError::Predict)?;
        if !predicted.has_stages() {
            return Err(OnboardingError::Predict(ServiceError::EmptyStages));
        }

        progress.advance(PipelineState::Forecasting);
        let forecasted: ForecastedStagePlan = self
            .call(self.services.forecast(&predicted))
            .await
            .map_err(OnboardingError::Forecast)?;

        progress.advance(PipelineState::RiskScoring);
        let risk: RiskResult = self
            .call(self.services.risk(&forecasted))
            .await
            .map_err(OnboardingError::Risk)?;

        progress.advance(PipelineState::Persisting);
        let report = NewReport {
            user_id,
            status: ReportStatus::Ready,
            title: input.title(),
            crop: input.crop.clone(),
            seed_type: input.seed_type.clone(),
            soil: input.soil.clone(),
            district: input.district.clone(),
            state: input.state.clone(),
            season: input.season.clone(),
            sowing_date,
            overall_risk: risk.overall_risk.clone(),
            stage_wise_risk: risk.stage_wise_risk.clone(),
            description: risk.description.clone().unwrap_or_default(),
            raw: RawPayloads {
                predict_input,
                predicted,
                forecasted_payload: forecasted,
                risk_result: risk,
            },
        };

        let doc = self
            .reports
            .create(report)
            .await
            .map_err(OnboardingError::Persist)?;

        Ok(doc.id)
    }

    /// Await one upstream call, giving up after the configured timeout
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ServiceError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheat() -> OnboardingInput {
        OnboardingInput {
            crop: "Wheat".to_string(),
            seed_type: "hybrid".to_string(),
            soil: "loam".to_string(),
            district: "Ludhiana".to_string(),
            season: "rabi".to_string(),
            state: "Punjab".to_string(),
            sowing_date: "2024-11-15".to_string(),
        }
    }

    #[test]
    fn test_predict_request_renames_sowing_date() {
        let body = predict_request(&wheat());
        assert_eq!(body.get("sw_date"), Some(&Value::String("2024-11-15".into())));
        assert!(body.get("sowing_date").is_none());
        assert_eq!(body.get("crop"), Some(&Value::String("Wheat".into())));
        assert_eq!(body.len(), 7);
    }

    #[test]
    fn test_error_messages_carry_stage_label() {
        let err = OnboardingError::Predict(ServiceError::Status {
            status: 500,
            detail: Some("boom".to_string()),
        });
        assert_eq!(err.to_string(), "Predict API failed (500) - boom");
        assert_eq!(err.stage(), PipelineStage::Predict);
        assert!(!err.is_timeout());

        let timeout = OnboardingError::Risk(ServiceError::Timeout { after_ms: 120_000 });
        assert_eq!(timeout.to_string(), "Risk API timed out after 120000ms");
        assert!(timeout.is_timeout());

        let empty = OnboardingError::Predict(ServiceError::EmptyStages);
        assert_eq!(empty.to_string(), "Predict API returned empty stages");
    }

    #[test]
    fn test_tracker_rejects_backwards_moves() {
        let (tracker, rx) = ProgressTracker::new();
        tracker.advance(PipelineState::Predicting);
        tracker.advance(PipelineState::Forecasting);
        tracker.advance(PipelineState::Predicting);

        assert_eq!(tracker.current(), PipelineState::Forecasting);
        assert_eq!(rx.borrow().step, 2);
        assert_eq!(rx.borrow().percent, 50);
    }

    #[test]
    fn test_tracker_failure_is_terminal() {
        let tracker = ProgressTracker::detached();
        tracker.advance(PipelineState::Predicting);
        tracker.fail(&OnboardingError::Predict(ServiceError::EmptyStages));
        tracker.finish(Uuid::new_v4());

        let snap = tracker.snapshot();
        assert_eq!(snap.state, shared::JobState::Failed);
        assert!(snap.report_id.is_none());
        assert_eq!(
            tracker.current(),
            PipelineState::Failed(PipelineStage::Predict)
        );
    }
}
