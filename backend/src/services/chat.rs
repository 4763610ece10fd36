//! Expert chat proxy
//!
//! Adds an optional plain-text report context to the farmer's question and
//! forwards it, with recent history, to the expert chat service.

use serde::{Deserialize, Serialize};
use shared::{clamp_text, ReportSummary};
use uuid::Uuid;

use super::report::ReportService;
use crate::error::{AppError, AppResult};
use crate::external::expert_chat::{ChatTurn, ExpertChatRequest};
use crate::external::ExpertChatClient;

const CONTEXT_MAX_CHARS: usize = 4500;
const TURN_MAX_CHARS: usize = 1200;
const MAX_HISTORY_TURNS: usize = 10;
const MAX_CONTEXT_STAGES: usize = 6;

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub message: String,
    pub report_id: Option<Uuid>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub context_report_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ChatService {
    reports: ReportService,
    client: ExpertChatClient,
}

impl ChatService {
    pub fn new(reports: ReportService, client: ExpertChatClient) -> Self {
        Self { reports, client }
    }

    pub async fn ask(&self, user_id: Uuid, input: ChatInput) -> AppResult<ChatReply> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(AppError::Validation {
                field: "message".to_string(),
                message: "Message is required".to_string(),
            });
        }

        let context = match input.report_id {
            Some(id) => {
                let summary = self.reports.summary(id, user_id).await?;
                build_report_context(&summary)
            }
            None => String::new(),
        };
        let history = recent_history(input.history);

        let answer = self
            .client
            .ask(&ExpertChatRequest {
                msg: message,
                context: &context,
                history: &history,
            })
            .await
            .map_err(AppError::ExpertChat)?;

        Ok(ChatReply {
            answer,
            context_report_id: input.report_id,
        })
    }
}

/// Plain-text report block for the expert model
pub fn build_report_context(summary: &ReportSummary) -> String {
    let mut lines = vec![
        "=== SELECTED REPORT CONTEXT ===".to_string(),
        format!("Report ID: {}", summary.report_id),
    ];

    if summary.seed_type.is_empty() {
        lines.push(format!("Crop: {}", summary.crop));
    } else {
        lines.push(format!(
            "Crop: {} | Variety/Seed: {}",
            summary.crop, summary.seed_type
        ));
    }
    lines.push(format!("Location: {}, {}", summary.district, summary.state));
    lines.push(format!("Season: {}", summary.season));
    lines.push(format!("Sowing Date: {}", summary.sowing_date));
    lines.push(format!("Status: {}", summary.status));
    lines.push(format!(
        "Overall Risk: {}/100 ({})",
        summary.season_risk.score,
        summary.season_risk.level.as_str().to_uppercase()
    ));

    if !summary.stage_risks.is_empty() {
        lines.push(String::new());
        lines.push("Stage-wise Risk (top):".to_string());
        for (i, stage) in summary
            .stage_risks
            .iter()
            .take(MAX_CONTEXT_STAGES)
            .enumerate()
        {
            lines.push(format!(
                "{}. {} - {}/100 ({})",
                i + 1,
                stage.stage,
                stage.risk_score,
                stage.risk_level.as_str().to_uppercase()
            ));
        }
    }

    lines.push("=== END REPORT CONTEXT ===".to_string());
    clamp_text(&lines.join("\n"), CONTEXT_MAX_CHARS)
}

/// Last ten turns, each clamped
pub fn recent_history(history: Vec<ChatTurn>) -> Vec<ChatTurn> {
    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);
    history
        .into_iter()
        .skip(skip)
        .map(|turn| ChatTurn {
            content: clamp_text(&turn.content, TURN_MAX_CHARS),
            ..turn
        })
        .collect()
}
