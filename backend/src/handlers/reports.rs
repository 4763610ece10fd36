//! Report HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shared::{ReportDocument, ReportFilter, ReportSummary};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::report::parse_status;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub crop: Option<String>,
}

#[derive(Serialize)]
pub struct ReportList {
    pub reports: Vec<ReportDocument>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// List the caller's reports, newest first
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ReportList>, AppError> {
    let filter = ReportFilter {
        status: parse_status(query.status.as_deref())?,
        crop: query
            .crop
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };

    let reports = state.report_service().list(user.user_id, &filter).await?;
    Ok(Json(ReportList { reports }))
}

/// Get one report
pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ReportDocument>, AppError> {
    let report = state
        .report_service()
        .get_owned(report_id, user.user_id)
        .await?;
    Ok(Json(report))
}

/// Report view model for the detail page
pub async fn get_report_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ReportSummary>, AppError> {
    let summary = state
        .report_service()
        .summary(report_id, user.user_id)
        .await?;
    Ok(Json(summary))
}

/// Change a report's status
pub async fn update_report_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<ReportDocument>, AppError> {
    let status = parse_status(Some(body.status.as_str()))?.ok_or_else(|| AppError::Validation {
        field: "status".to_string(),
        message: "Status is required".to_string(),
    })?;

    let report = state
        .report_service()
        .update_status(report_id, user.user_id, status)
        .await?;
    Ok(Json(report))
}
