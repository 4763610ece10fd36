//! PostgreSQL repositories
//!
//! Reports keep the risk summary and the raw payload chain in JSONB columns.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    normalize_email, NewReport, NewUser, OverallRisk, RawPayloads, ReportDocument, ReportFilter,
    ReportStatus, StageRisk, User, UserLocation,
};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, ReportRepository, UserRepository};

const REPORT_COLUMNS: &str = r#"
    id, user_id, status, title, crop, seed_type, soil, district, state, season,
    sowing_date, overall_risk, stage_wise_risk, description, raw, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    title: String,
    crop: String,
    seed_type: String,
    soil: String,
    district: String,
    state: String,
    season: String,
    sowing_date: NaiveDate,
    overall_risk: Option<Json<OverallRisk>>,
    stage_wise_risk: Json<Vec<StageRisk>>,
    description: String,
    raw: Json<RawPayloads>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for ReportDocument {
    type Error = RepositoryError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ReportStatus>()
            .map_err(RepositoryError::Corrupt)?;

        Ok(ReportDocument {
            id: row.id,
            user_id: row.user_id,
            status,
            title: row.title,
            crop: row.crop,
            seed_type: row.seed_type,
            soil: row.soil,
            district: row.district,
            state: row.state,
            season: row.season,
            sowing_date: row.sowing_date,
            overall_risk: row.overall_risk.map(|j| j.0),
            stage_wise_risk: row.stage_wise_risk.0,
            description: row.description,
            raw: row.raw.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    city: String,
    state: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            phone: row.phone,
            location: UserLocation {
                city: row.city,
                state: row.state,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgReportRepository {
    db: PgPool,
}

impl PgReportRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, report: NewReport) -> RepositoryResult<ReportDocument> {
        let query = format!(
            r#"
            INSERT INTO reports (
                user_id, status, title, crop, seed_type, soil, district, state, season,
                sowing_date, overall_risk, stage_wise_risk, description, raw
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let row = sqlx::query_as::<_, ReportRow>(&query)
            .bind(report.user_id)
            .bind(report.status.as_str())
            .bind(&report.title)
            .bind(&report.crop)
            .bind(&report.seed_type)
            .bind(&report.soil)
            .bind(&report.district)
            .bind(&report.state)
            .bind(&report.season)
            .bind(report.sowing_date)
            .bind(report.overall_risk.as_ref().map(Json))
            .bind(Json(&report.stage_wise_risk))
            .bind(&report.description)
            .bind(Json(&report.raw))
            .fetch_one(&self.db)
            .await?;

        row.try_into()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<ReportDocument>> {
        let query = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        let row = sqlx::query_as::<_, ReportRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(ReportDocument::try_from).transpose()
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: &ReportFilter,
    ) -> RepositoryResult<Vec<ReportDocument>> {
        let query = format!(
            r#"
            SELECT {}
            FROM reports
            WHERE user_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR LOWER(crop) = LOWER($3))
            ORDER BY created_at DESC
            "#,
            REPORT_COLUMNS
        );

        let rows = sqlx::query_as::<_, ReportRow>(&query)
            .bind(user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.crop.as_deref().map(str::trim))
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(ReportDocument::try_from).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
    ) -> RepositoryResult<ReportDocument> {
        let query = format!(
            "UPDATE reports SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            REPORT_COLUMNS
        );

        let row = sqlx::query_as::<_, ReportRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Report",
                id: id.to_string(),
            })?;

        row.try_into()
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let email = normalize_email(&user.email);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, phone, city, state, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, password_hash, phone, city, state, latitude, longitude, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.location.city)
        .bind(&user.location.state)
        .bind(user.location.latitude)
        .bind(user.location.longitude)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("User with email {}", email))
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, city, state, latitude, longitude, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, city, state, latitude, longitude, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }
}
