//! Crop Advisory Platform - Backend
//!
//! Turns a farmer's crop onboarding form into a stored risk report by
//! chaining the Predict, Forecast and Risk inference services.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod services;

pub use config::Config;

use external::{AdvisoryClient, AdvisoryServices, ExpertChatClient, GeocodingClient};
use repository::{MemoryReportRepository, MemoryUserRepository, ReportRepository, UserRepository};
use services::{AuthService, ChatService, OnboardingJobs, OnboardingService, ReportService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reports: Arc<dyn ReportRepository>,
    pub users: Arc<dyn UserRepository>,
    pub advisory: Arc<dyn AdvisoryServices>,
    pub geocoder: GeocodingClient,
    pub expert_chat: ExpertChatClient,
    pub jobs: OnboardingJobs,
}

impl AppState {
    /// State with HTTP clients built from `config`
    pub fn new(
        config: Config,
        reports: Arc<dyn ReportRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            advisory: Arc::new(AdvisoryClient::new(&config.services)),
            geocoder: GeocodingClient::new(&config.services),
            expert_chat: ExpertChatClient::new(&config.services),
            jobs: OnboardingJobs::new(),
            config: Arc::new(config),
            reports,
            users,
        }
    }

    /// State backed by in-memory repositories
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryReportRepository::new()),
            Arc::new(MemoryUserRepository::new()),
        )
    }

    /// Swap the inference service clients
    pub fn with_advisory(mut self, advisory: Arc<dyn AdvisoryServices>) -> Self {
        self.advisory = advisory;
        self
    }

    pub fn onboarding_service(&self) -> OnboardingService {
        OnboardingService::new(
            self.advisory.clone(),
            self.reports.clone(),
            self.config.services.timeout(),
        )
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.users.clone(), self.geocoder.clone(), &self.config)
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.reports.clone())
    }

    pub fn chat_service(&self) -> ChatService {
        ChatService::new(self.report_service(), self.expert_chat.clone())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Crop Advisory Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
