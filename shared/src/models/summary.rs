//! Report view model: normalised levels, 0-100 scores and stage advice

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    scale_overall_score, scale_stage_score, EnvMetric, ReportDocument, ReportStatus, RiskLevel,
    Stage,
};

/// Deviation at or above which a metric triggers a recommendation
pub const RECOMMENDATION_THRESHOLD: f64 = 0.2;

const MAX_CONTRIBUTORS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 4;

/// Scaled risk with a display level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaledRisk {
    pub score: u8,
    pub level: RiskLevel,
}

/// A metric pulling a stage away from its ideal conditions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskContributor {
    pub factor: String,
    pub impact: u8,
    pub description: String,
}

/// One row of the stage table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageSummary {
    pub stage: String,
    pub duration_days: u32,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub contributors: Vec<RiskContributor>,
    pub recommendations: Vec<String>,
}

/// Everything the report detail view renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub report_id: Uuid,
    pub title: String,
    pub crop: String,
    pub seed_type: String,
    pub district: String,
    pub state: String,
    pub season: String,
    pub sowing_date: NaiveDate,
    pub status: ReportStatus,
    pub season_risk: ScaledRisk,
    pub stage_risks: Vec<StageSummary>,
    pub description: String,
}

/// Relative distance between forecast and ideal; an ideal of zero divides by one
pub fn deviation(ideal: f64, forecast: f64) -> f64 {
    let denom = if ideal == 0.0 { 1.0 } else { ideal.abs() };
    (forecast - ideal).abs() / denom
}

fn recommendation(metric: EnvMetric, delta: f64) -> Option<&'static str> {
    match metric {
        EnvMetric::RainMm if delta > 0.0 => {
            Some("Improve drainage; avoid waterlogging after heavy rains.")
        }
        EnvMetric::RainMm => {
            Some("Plan supplemental irrigation; conserve soil moisture with mulching.")
        }
        EnvMetric::TmaxC if delta > 0.0 => {
            Some("Use mulching/shade where possible; irrigate during cooler hours.")
        }
        EnvMetric::TmaxC => {
            Some("Watch for cold stress; consider protective irrigation/fogging if needed.")
        }
        EnvMetric::TminC if delta < 0.0 => {
            Some("Protect seedlings from cold nights (mulch / light irrigation).")
        }
        EnvMetric::TminC => {
            Some("Monitor for heat stress during nights; ensure adequate soil moisture.")
        }
        EnvMetric::RhPct if delta > 0.0 => Some(
            "High humidity: monitor fungal disease; ensure airflow and timely spray if required.",
        ),
        EnvMetric::RhPct => {
            Some("Low humidity: avoid moisture stress; optimize irrigation scheduling.")
        }
        EnvMetric::WindKmph if delta > 0.0 => Some(
            "High wind: use windbreaks; secure young plants and support staking if needed.",
        ),
        EnvMetric::WindKmph => None,
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Contributors and recommendations for one stage
///
/// Only metrics present in both the ideal and the forecasted profile count.
pub fn stage_advice(stage: &Stage) -> (Vec<RiskContributor>, Vec<String>) {
    let (Some(ideal), Some(forecast)) = (&stage.ideal, &stage.forecasted) else {
        return (Vec::new(), Vec::new());
    };

    let diffs: Vec<(EnvMetric, f64, f64, f64)> = EnvMetric::ALL
        .iter()
        .filter_map(|&m| {
            let ideal = ideal.get(m)?;
            let fc = forecast.get(m)?;
            Some((m, ideal, fc, deviation(ideal, fc)))
        })
        .collect();

    let mut ranked = diffs.clone();
    ranked.sort_by(|a, b| b.3.total_cmp(&a.3));
    let contributors = ranked
        .iter()
        .take(MAX_CONTRIBUTORS)
        .map(|(m, ideal, fc, dev)| RiskContributor {
            factor: m.label().to_string(),
            impact: (dev * 100.0).round().clamp(0.0, 100.0) as u8,
            description: format!(
                "Forecast {}{} vs ideal {}{}",
                format_value(*fc),
                m.unit(),
                format_value(*ideal),
                m.unit()
            ),
        })
        .collect();

    let mut recommendations: Vec<String> = Vec::new();
    for (m, ideal, fc, dev) in &diffs {
        if *dev < RECOMMENDATION_THRESHOLD {
            continue;
        }
        if let Some(text) = recommendation(*m, fc - ideal) {
            if !recommendations.iter().any(|r| r == text) {
                recommendations.push(text.to_string());
            }
        }
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);

    (contributors, recommendations)
}

impl ReportSummary {
    pub fn from_document(doc: &ReportDocument) -> Self {
        let stage_wise = if doc.stage_wise_risk.is_empty() {
            &doc.raw.risk_result.stage_wise_risk
        } else {
            &doc.stage_wise_risk
        };

        let stage_risks = doc
            .raw
            .forecasted_payload
            .stages
            .iter()
            .map(|stage| {
                let matched = stage_wise
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(&stage.name));
                let (contributors, recommendations) = stage_advice(stage);
                StageSummary {
                    stage: stage.name.clone(),
                    duration_days: stage.duration_days.unwrap_or(0),
                    risk_score: scale_stage_score(matched.map(|r| r.score).unwrap_or(0.0)),
                    risk_level: RiskLevel::normalize(
                        matched.map(|r| r.level.as_str()).unwrap_or(""),
                    ),
                    contributors,
                    recommendations,
                }
            })
            .collect();

        let overall = doc
            .overall_risk
            .as_ref()
            .or(doc.raw.risk_result.overall_risk.as_ref());
        let season_risk = ScaledRisk {
            score: scale_overall_score(overall.map(|o| o.score).unwrap_or(0.0)),
            level: RiskLevel::normalize(overall.map(|o| o.level.as_str()).unwrap_or("")),
        };

        Self {
            report_id: doc.id,
            title: doc.title.clone(),
            crop: doc.crop.clone(),
            seed_type: doc.seed_type.clone(),
            district: doc.district.clone(),
            state: doc.state.clone(),
            season: doc.season.clone(),
            sowing_date: doc.sowing_date,
            status: doc.status,
            season_risk,
            stage_risks,
            description: doc.description.clone(),
        }
    }
}
