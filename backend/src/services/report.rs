//! Report reads and status updates, always scoped to the owner

use shared::{ReportDocument, ReportFilter, ReportStatus, ReportSummary};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::repository::ReportRepository;

#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// A report owned by `user_id`. Reports of other users look absent.
    pub async fn get_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<ReportDocument> {
        self.reports
            .get_by_id(id)
            .await?
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Report".to_string()))
    }

    pub async fn list(&self, user_id: Uuid, filter: &ReportFilter) -> AppResult<Vec<ReportDocument>> {
        Ok(self.reports.list_by_user(user_id, filter).await?)
    }

    pub async fn summary(&self, id: Uuid, user_id: Uuid) -> AppResult<ReportSummary> {
        let doc = self.get_owned(id, user_id).await?;
        Ok(ReportSummary::from_document(&doc))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: ReportStatus,
    ) -> AppResult<ReportDocument> {
        self.get_owned(id, user_id).await?;
        let doc = self.reports.update_status(id, status).await?;
        tracing::info!(report_id = %id, %status, "Report status updated");
        Ok(doc)
    }
}

/// Parse an optional `status` query value
pub fn parse_status(value: Option<&str>) -> AppResult<Option<ReportStatus>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<ReportStatus>()
            .map(Some)
            .map_err(|message| AppError::Validation {
                field: "status".to_string(),
                message,
            }),
    }
}
