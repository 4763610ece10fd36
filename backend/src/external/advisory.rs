//! Clients for the Predict, Forecast and Risk inference services
//!
//! All three are JSON-over-POST endpoints. Each response is forwarded
//! unchanged as the next request body.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{ForecastedStagePlan, RiskResult, StagePlan};

use super::{post_json, ServiceError};
use crate::config::ServicesConfig;

/// The three inference services the onboarding pipeline chains together
#[async_trait]
pub trait AdvisoryServices: Send + Sync {
    /// Stage plan for the submitted crop details
    async fn predict(&self, request: &Value) -> Result<StagePlan, ServiceError>;

    /// Fill a forecasted profile into every stage
    async fn forecast(&self, plan: &StagePlan) -> Result<ForecastedStagePlan, ServiceError>;

    /// Stage-wise and overall risk for a forecasted plan
    async fn risk(&self, plan: &ForecastedStagePlan) -> Result<RiskResult, ServiceError>;
}

/// HTTP client for the inference services
#[derive(Clone)]
pub struct AdvisoryClient {
    client: Client,
    predict_url: String,
    forecast_url: String,
    risk_url: String,
}

impl AdvisoryClient {
    /// Create a new AdvisoryClient
    pub fn new(config: &ServicesConfig) -> Self {
        Self::with_urls(
            config.predict_url.clone(),
            config.forecast_url.clone(),
            config.risk_url.clone(),
        )
    }

    /// Create a client with explicit endpoints (for testing)
    pub fn with_urls(predict_url: String, forecast_url: String, risk_url: String) -> Self {
        Self {
            client: Client::new(),
            predict_url,
            forecast_url,
            risk_url,
        }
    }
}

#[async_trait]
impl AdvisoryServices for AdvisoryClient {
    async fn predict(&self, request: &Value) -> Result<StagePlan, ServiceError> {
        tracing::debug!(url = %self.predict_url, "Calling predict service");
        post_json(&self.client, &self.predict_url, request).await
    }

    async fn forecast(&self, plan: &StagePlan) -> Result<ForecastedStagePlan, ServiceError> {
        tracing::debug!(url = %self.forecast_url, stages = plan.stages.len(), "Calling forecast service");
        post_json(&self.client, &self.forecast_url, plan).await
    }

    async fn risk(&self, plan: &ForecastedStagePlan) -> Result<RiskResult, ServiceError> {
        tracing::debug!(url = %self.risk_url, stages = plan.stages.len(), "Calling risk service");
        post_json(&self.client, &self.risk_url, plan).await
    }
}
