//! WebAssembly module for the Crop Advisory Platform
//!
//! Provides client-side computation for:
//! - Onboarding form validation before submit
//! - Processing modal progress messages
//! - Risk level normalisation and score scaling for the report view

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("Crop advisory WASM module loaded"));
}

#[derive(Serialize)]
struct FormCheck {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Validate an onboarding form given as JSON.
/// Returns `{"valid": true}` or the first failing field and its message.
#[wasm_bindgen]
pub fn validate_onboarding_form(form_json: &str) -> Result<String, JsValue> {
    let input: OnboardingInput = serde_json::from_str(form_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid form JSON: {}", e)))?;

    let check = match check_onboarding_input(&input.trimmed()) {
        Ok(()) => FormCheck {
            valid: true,
            field: None,
            message: None,
        },
        Err(e) => FormCheck {
            valid: false,
            field: Some(e.field),
            message: Some(e.message),
        },
    };

    serde_json::to_string(&check).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Progress message for a step index (0..=5)
#[wasm_bindgen]
pub fn progress_message(step: u8) -> String {
    PipelineState::from_step_index(step)
        .map(|s| s.message().to_string())
        .unwrap_or_default()
}

/// Progress percentage for a step index (0..=5)
#[wasm_bindgen]
pub fn progress_percent(step: u8) -> u8 {
    PipelineState::from_step_index(step)
        .map(|s| s.percent())
        .unwrap_or(0)
}

/// All progress messages in step order
#[wasm_bindgen]
pub fn progress_steps() -> js_sys::Array {
    (0..PROGRESS_STEPS)
        .map(|step| JsValue::from_str(&progress_message(step)))
        .collect()
}

/// Normalise an upstream risk level to low, medium, high or critical
#[wasm_bindgen]
pub fn normalize_risk_level(level: &str) -> String {
    RiskLevel::normalize(level).as_str().to_string()
}

/// Overall risk score on a 0-100 scale
#[wasm_bindgen]
pub fn scale_overall_risk(score: f64) -> u8 {
    scale_overall_score(score)
}

/// Stage risk score on a 0-100 scale
#[wasm_bindgen]
pub fn scale_stage_risk(score: f64) -> u8 {
    scale_stage_score(score)
}

/// Build the report view model from a stored report document
#[wasm_bindgen]
pub fn summarize_report(report_json: &str) -> Result<String, JsValue> {
    let doc: ReportDocument = serde_json::from_str(report_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid report JSON: {}", e)))?;

    serde_json::to_string(&ReportSummary::from_document(&doc))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_onboarding_form() {
        let ok = validate_onboarding_form(
            r#"{"crop":"Wheat","seed_type":"hybrid","soil":"loam","district":"Ludhiana",
                "season":"rabi","state":"Punjab","sowing_date":"2024-11-15"}"#,
        )
        .unwrap();
        assert_eq!(ok, r#"{"valid":true}"#);

        let missing = validate_onboarding_form(
            r#"{"crop":"Wheat","seed_type":" ","soil":"loam","district":"Ludhiana",
                "season":"rabi","state":"Punjab","sowing_date":"2024-11-15"}"#,
        )
        .unwrap();
        assert_eq!(
            missing,
            r#"{"valid":false,"field":"seed_type","message":"Seed type is required"}"#
        );
    }

    #[test]
    fn test_progress_lookup() {
        assert_eq!(progress_message(0), "Sending crop details to model...");
        assert_eq!(progress_message(3), "Calculating stage-wise & overall risk...");
        assert_eq!(progress_message(9), "");
        assert_eq!(progress_percent(0), 17);
        assert_eq!(progress_percent(5), 100);
        assert_eq!(progress_percent(6), 0);
    }

    #[test]
    fn test_risk_helpers() {
        assert_eq!(normalize_risk_level("Moderate"), "medium");
        assert_eq!(normalize_risk_level("very high"), "critical");
        assert_eq!(scale_overall_risk(8.0), 50);
        assert_eq!(scale_stage_risk(0.8), 50);
    }
}
