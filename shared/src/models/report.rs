//! Crop report documents

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{ForecastedStagePlan, OverallRisk, RiskResult, StagePlan, StageRisk};

/// Processing status of a report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Processing,
    #[default]
    Ready,
    Error,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Ready => "ready",
            ReportStatus::Error => "error",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "processing" => Ok(ReportStatus::Processing),
            "ready" => Ok(ReportStatus::Ready),
            "error" => Ok(ReportStatus::Error),
            other => Err(format!(
                "Unknown report status '{}': expected pending, processing, ready or error",
                other
            )),
        }
    }
}

/// Every payload exchanged during onboarding, kept for audit and debugging
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawPayloads {
    pub predict_input: Value,
    pub predicted: StagePlan,
    pub forecasted_payload: ForecastedStagePlan,
    pub risk_result: RiskResult,
}

/// A persisted crop report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: ReportStatus,
    pub title: String,
    pub crop: String,
    pub seed_type: String,
    pub soil: String,
    pub district: String,
    pub state: String,
    pub season: String,
    pub sowing_date: NaiveDate,
    pub overall_risk: Option<OverallRisk>,
    pub stage_wise_risk: Vec<StageRisk>,
    pub description: String,
    pub raw: RawPayloads,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report contents before the store assigns an id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub user_id: Uuid,
    pub status: ReportStatus,
    pub title: String,
    pub crop: String,
    pub seed_type: String,
    pub soil: String,
    pub district: String,
    pub state: String,
    pub season: String,
    pub sowing_date: NaiveDate,
    pub overall_risk: Option<OverallRisk>,
    pub stage_wise_risk: Vec<StageRisk>,
    pub description: String,
    pub raw: RawPayloads,
}

impl NewReport {
    /// Assign identity and timestamps, as a store does on insert
    pub fn into_document(self, id: Uuid, now: DateTime<Utc>) -> ReportDocument {
        ReportDocument {
            id,
            user_id: self.user_id,
            status: self.status,
            title: self.title,
            crop: self.crop,
            seed_type: self.seed_type,
            soil: self.soil,
            district: self.district,
            state: self.state,
            season: self.season,
            sowing_date: self.sowing_date,
            overall_risk: self.overall_risk,
            stage_wise_risk: self.stage_wise_risk,
            description: self.description,
            raw: self.raw,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filters for listing a user's reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub crop: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, report: &ReportDocument) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some(crop) = &self.crop {
            if !report.crop.eq_ignore_ascii_case(crop.trim()) {
                return false;
            }
        }
        true
    }
}
