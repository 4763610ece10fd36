//! Risk scoring models returned by the Risk service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Risk for a single crop stage as reported upstream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageRisk {
    pub name: String,
    pub score: f64,
    pub level: String,
}

/// Season-wide risk as reported upstream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallRisk {
    pub score: f64,
    pub level: String,
}

/// Risk service response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default)]
    pub stage_wise_risk: Vec<StageRisk>,
    #[serde(default)]
    pub overall_risk: Option<OverallRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalised risk level used by the report views
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map the free-form upstream level ("Low", "Moderate", "Very High", ...)
    /// onto the four display levels. Unknown values fall back to `Medium`.
    pub fn normalize(level: &str) -> Self {
        match level.trim().to_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "moderate" | "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            "very high" | "very_high" | "critical" => RiskLevel::Critical,
            _ => RiskLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bound of a typical overall score (about ten stages at ~1.6 each)
pub const OVERALL_SCORE_CEILING: f64 = 16.0;

/// Upper bound of a typical stage score
pub const STAGE_SCORE_CEILING: f64 = 1.6;

fn scale_to_100(score: f64, ceiling: f64) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    ((score / ceiling) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Scale an overall risk score onto 0..=100
pub fn scale_overall_score(score: f64) -> u8 {
    scale_to_100(score, OVERALL_SCORE_CEILING)
}

/// Scale a stage risk score onto 0..=100
pub fn scale_stage_score(score: f64) -> u8 {
    scale_to_100(score, STAGE_SCORE_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_levels() {
        assert_eq!(RiskLevel::normalize("Low"), RiskLevel::Low);
        assert_eq!(RiskLevel::normalize(" Moderate "), RiskLevel::Medium);
        assert_eq!(RiskLevel::normalize("HIGH"), RiskLevel::High);
        assert_eq!(RiskLevel::normalize("Very High"), RiskLevel::Critical);
        assert_eq!(RiskLevel::normalize("very_high"), RiskLevel::Critical);
        assert_eq!(RiskLevel::normalize(""), RiskLevel::Medium);
        assert_eq!(RiskLevel::normalize("extreme"), RiskLevel::Medium);
    }

    #[test]
    fn test_score_scaling() {
        assert_eq!(scale_overall_score(2.0), 13);
        assert_eq!(scale_overall_score(16.0), 100);
        assert_eq!(scale_overall_score(40.0), 100);
        assert_eq!(scale_overall_score(-1.0), 0);
        assert_eq!(scale_stage_score(0.3), 19);
        assert_eq!(scale_stage_score(1.6), 100);
        assert_eq!(scale_stage_score(f64::NAN), 0);
    }

    #[test]
    fn test_risk_result_without_description() {
        let result: RiskResult = serde_json::from_value(json!({
            "stage_wise_risk": [{"name": "Germination", "score": 0.3, "level": "Low"}],
            "overall_risk": {"score": 2, "level": "Low"}
        }))
        .unwrap();

        assert!(result.description.is_none());
        assert_eq!(result.overall_risk.unwrap().score, 2.0);
        assert_eq!(result.stage_wise_risk[0].name, "Germination");
    }
}
