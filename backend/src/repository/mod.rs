//! Storage for users and crop reports
//!
//! Handlers and services only see the traits below. `postgres` backs them
//! with sqlx when a database URL is configured, `memory` otherwise.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryReportRepository, MemoryUserRepository};
pub use postgres::{PgReportRepository, PgUserRepository};

use async_trait::async_trait;
use shared::{NewReport, NewUser, ReportDocument, ReportFilter, ReportStatus, User};
use thiserror::Error;
use uuid::Uuid;

/// Storage failure
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0} already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// User-scoped crop reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a report; the store assigns id and timestamps
    async fn create(&self, report: NewReport) -> RepositoryResult<ReportDocument>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<ReportDocument>>;

    /// A user's reports, newest first
    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: &ReportFilter,
    ) -> RepositoryResult<Vec<ReportDocument>>;

    /// Change `status` and bump `updated_at`
    async fn update_status(&self, id: Uuid, status: ReportStatus)
        -> RepositoryResult<ReportDocument>;

    /// Check the store is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}

/// User accounts, keyed by normalised email
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
}
