//! HTTP request handlers

pub mod auth;
pub mod chat;
pub mod health;
pub mod onboarding;
pub mod reports;

pub use auth::{login, me, register};
pub use chat::ask_expert;
pub use health::health_check;
pub use onboarding::{job_status, start_job, submit};
pub use reports::{get_report, get_report_summary, list_reports, update_report_status};
