//! Fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    ForecastedStagePlan, NewReport, OnboardingInput, ReportDocument, ReportFilter, ReportStatus,
    RiskResult, StagePlan,
};
use std::sync::Mutex;
use uuid::Uuid;

use crop_advisory_backend::external::{AdvisoryServices, ServiceError};
use crop_advisory_backend::repository::{RepositoryError, RepositoryResult, ReportRepository};

pub fn wheat_input() -> OnboardingInput {
    OnboardingInput {
        crop: "Wheat".to_string(),
        seed_type: "hybrid".to_string(),
        soil: "loam".to_string(),
        district: "Ludhiana".to_string(),
        season: "rabi".to_string(),
        state: "Punjab".to_string(),
        sowing_date: "2024-11-15".to_string(),
    }
}

pub fn wheat_plan_json() -> Value {
    json!({
        "crop": "Wheat",
        "district": "Ludhiana",
        "state": "Punjab",
        "total_duration_days": 20,
        "sw_date": "2024-11-15",
        "model_version": "stage-v2",
        "stages": [{
            "name": "Germination",
            "duration_days": 20,
            "importance_weight": 1,
            "ideal": {"tmin_c": 10, "tmax_c": 20, "rh_pct": 60, "rain_mm": 5, "wind_kmph": 10}
        }]
    })
}

pub fn wheat_forecast_json() -> Value {
    let mut plan = wheat_plan_json();
    plan["stages"][0]["forecasted"] =
        json!({"tmin_c": 12, "tmax_c": 22, "rh_pct": 55, "rain_mm": 2, "wind_kmph": 8, "solar_wm2": 210.5});
    plan
}

pub fn wheat_risk_json() -> Value {
    json!({
        "crop": "Wheat",
        "district": "Ludhiana",
        "stage_wise_risk": [{"name": "Germination", "score": 0.3, "level": "Low"}],
        "overall_risk": {"score": 2, "level": "Low"}
    })
}

/// How a fake upstream call behaves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    Succeed,
    EmptyStages,
    Status(u16),
    Hang,
}

/// Scripted stand-in for the three inference services
pub struct FakeServices {
    pub predict: Behaviour,
    pub forecast: Behaviour,
    pub risk: Behaviour,
    pub calls: Mutex<Vec<&'static str>>,
    pub predict_requests: Mutex<Vec<Value>>,
    pub risk_requests: Mutex<Vec<Value>>,
}

impl FakeServices {
    pub fn healthy() -> Self {
        Self {
            predict: Behaviour::Succeed,
            forecast: Behaviour::Succeed,
            risk: Behaviour::Succeed,
            calls: Mutex::new(Vec::new()),
            predict_requests: Mutex::new(Vec::new()),
            risk_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn predict_requests(&self) -> Vec<Value> {
        self.predict_requests.lock().unwrap().clone()
    }

    /// Bodies handed to the Risk service, as they would go on the wire
    pub fn risk_requests(&self) -> Vec<Value> {
        self.risk_requests.lock().unwrap().clone()
    }

    async fn respond<T: serde::de::DeserializeOwned>(
        &self,
        name: &'static str,
        behaviour: Behaviour,
        ok: Value,
    ) -> Result<T, ServiceError> {
        self.calls.lock().unwrap().push(name);
        match behaviour {
            Behaviour::Succeed => Ok(serde_json::from_value(ok).unwrap()),
            Behaviour::EmptyStages => {
                let mut body = ok;
                body["stages"] = json!([]);
                Ok(serde_json::from_value(body).unwrap())
            }
            Behaviour::Status(status) => Err(ServiceError::Status {
                status,
                detail: Some("boom".to_string()),
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl AdvisoryServices for FakeServices {
    async fn predict(&self, request: &Value) -> Result<StagePlan, ServiceError> {
        self.predict_requests.lock().unwrap().push(request.clone());
        self.respond("predict", self.predict, wheat_plan_json()).await
    }

    async fn forecast(&self, _plan: &StagePlan) -> Result<ForecastedStagePlan, ServiceError> {
        self.respond("forecast", self.forecast, wheat_forecast_json())
            .await
    }

    async fn risk(&self, plan: &ForecastedStagePlan) -> Result<RiskResult, ServiceError> {
        self.risk_requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(plan).unwrap());
        self.respond("risk", self.risk, wheat_risk_json()).await
    }
}

/// Report store whose writes always fail
pub struct FailingReports;

fn disk_full() -> RepositoryError {
    RepositoryError::Corrupt("disk full".to_string())
}

#[async_trait]
impl ReportRepository for FailingReports {
    async fn create(&self, _report: NewReport) -> RepositoryResult<ReportDocument> {
        Err(disk_full())
    }

    async fn get_by_id(&self, _id: Uuid) -> RepositoryResult<Option<ReportDocument>> {
        Ok(None)
    }

    async fn list_by_user(
        &self,
        _user_id: Uuid,
        _filter: &ReportFilter,
    ) -> RepositoryResult<Vec<ReportDocument>> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _id: Uuid,
        _status: ReportStatus,
    ) -> RepositoryResult<ReportDocument> {
        Err(disk_full())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
