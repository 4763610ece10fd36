//! In-memory repositories, used when no database is configured and in tests

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    normalize_email, NewReport, NewUser, ReportDocument, ReportFilter, ReportStatus, User,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, ReportRepository, UserRepository};

#[derive(Default)]
pub struct MemoryReportRepository {
    reports: RwLock<HashMap<Uuid, ReportDocument>>,
}

impl MemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports
    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

#[async_trait]
impl ReportRepository for MemoryReportRepository {
    async fn create(&self, report: NewReport) -> RepositoryResult<ReportDocument> {
        let doc = report.into_document(Uuid::new_v4(), Utc::now());
        self.reports.write().await.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<ReportDocument>> {
        Ok(self.reports.read().await.get(&id).cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: &ReportFilter,
    ) -> RepositoryResult<Vec<ReportDocument>> {
        let reports = self.reports.read().await;
        let mut docs: Vec<ReportDocument> = reports
            .values()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
    ) -> RepositoryResult<ReportDocument> {
        let mut reports = self.reports.write().await;
        let doc = reports.get_mut(&id).ok_or_else(|| RepositoryError::NotFound {
            entity: "Report",
            id: id.to_string(),
        })?;
        doc.status = status;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let email = normalize_email(&user.email);
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(RepositoryError::Conflict(format!("User with email {}", email)));
        }

        let user = NewUser { email, ..user }.into_user(Uuid::new_v4(), Utc::now());
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
