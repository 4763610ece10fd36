//! Onboarding HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use shared::{OnboardingInput, ProgressSnapshot};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::ProgressTracker;
use crate::AppState;

#[derive(Serialize)]
pub struct OnboardingResponse {
    pub report_id: Uuid,
    pub progress: ProgressSnapshot,
}

#[derive(Serialize)]
pub struct JobStarted {
    pub job_id: Uuid,
}

/// Run the onboarding pipeline and wait for the report
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<OnboardingInput>,
) -> Result<(StatusCode, Json<OnboardingResponse>), AppError> {
    let tracker = ProgressTracker::detached();
    let report_id = state
        .onboarding_service()
        .run(&input, user.user_id, &tracker)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OnboardingResponse {
            report_id,
            progress: tracker.snapshot(),
        }),
    ))
}

/// Start the pipeline in the background
pub async fn start_job(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<OnboardingInput>,
) -> (StatusCode, Json<JobStarted>) {
    let job_id = state
        .jobs
        .start(state.onboarding_service(), input, user.user_id)
        .await;

    (StatusCode::ACCEPTED, Json(JobStarted { job_id }))
}

/// Progress of a background run
pub async fn job_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ProgressSnapshot>, AppError> {
    state
        .jobs
        .get(job_id, user.user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Onboarding job".to_string()))
}
