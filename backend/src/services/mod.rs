//! Business logic services for the Crop Advisory Platform

pub mod auth;
pub mod chat;
pub mod jobs;
pub mod onboarding;
pub mod report;

pub use auth::AuthService;
pub use chat::ChatService;
pub use jobs::OnboardingJobs;
pub use onboarding::{OnboardingError, OnboardingService, ProgressTracker};
pub use report::ReportService;
