//! Crop stage plan models exchanged with the Predict and Forecast services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Environmental conditions for a crop stage
///
/// Upstream services omit metrics they have no data for, and may send metrics
/// the platform does not interpret; those stay in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EnvProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmin_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmax_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rh_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_kmph: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metrics tracked in an [`EnvProfile`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EnvMetric {
    TminC,
    TmaxC,
    RhPct,
    RainMm,
    WindKmph,
}

impl EnvMetric {
    pub const ALL: [EnvMetric; 5] = [
        EnvMetric::TminC,
        EnvMetric::TmaxC,
        EnvMetric::RhPct,
        EnvMetric::RainMm,
        EnvMetric::WindKmph,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EnvMetric::TminC => "Min Temperature",
            EnvMetric::TmaxC => "Max Temperature",
            EnvMetric::RhPct => "Humidity",
            EnvMetric::RainMm => "Rainfall",
            EnvMetric::WindKmph => "Wind",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            EnvMetric::TminC | EnvMetric::TmaxC => "°C",
            EnvMetric::RhPct => "%",
            EnvMetric::RainMm => "mm",
            EnvMetric::WindKmph => "km/h",
        }
    }
}

impl EnvProfile {
    /// Profile with all five tracked metrics set
    pub fn new(tmin_c: f64, tmax_c: f64, rh_pct: f64, rain_mm: f64, wind_kmph: f64) -> Self {
        Self {
            tmin_c: Some(tmin_c),
            tmax_c: Some(tmax_c),
            rh_pct: Some(rh_pct),
            rain_mm: Some(rain_mm),
            wind_kmph: Some(wind_kmph),
            extra: Map::new(),
        }
    }

    pub fn get(&self, metric: EnvMetric) -> Option<f64> {
        match metric {
            EnvMetric::TminC => self.tmin_c,
            EnvMetric::TmaxC => self.tmax_c,
            EnvMetric::RhPct => self.rh_pct,
            EnvMetric::RainMm => self.rain_mm,
            EnvMetric::WindKmph => self.wind_kmph,
        }
    }
}

/// A single growth stage
///
/// Fields the platform does not interpret are kept in `extra` so the payload
/// can be forwarded to the next service unchanged. Absent fields stay absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Stage {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<EnvProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecasted: Option<EnvProfile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage plan returned by the Predict service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StagePlan {
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_days: Option<u32>,
    #[serde(default)]
    pub sw_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage plan after the Forecast service filled in `forecasted` per stage
pub type ForecastedStagePlan = StagePlan;

impl StagePlan {
    pub fn has_stages(&self) -> bool {
        !self.stages.is_empty()
    }

    /// Look up a stage by name, ignoring case
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
