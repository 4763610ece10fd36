//! Crop onboarding form submitted by a farmer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::validate_sowing_date;

/// Onboarding form fields as entered in the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct OnboardingInput {
    #[validate(length(min = 1, message = "Crop is required"))]
    pub crop: String,
    #[validate(length(min = 1, message = "Seed type is required"))]
    pub seed_type: String,
    #[validate(length(min = 1, message = "Soil type is required"))]
    pub soil: String,
    #[validate(length(min = 1, message = "District is required"))]
    pub district: String,
    #[validate(length(min = 1, message = "Season is required"))]
    pub season: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(custom = "validate_sowing_date")]
    pub sowing_date: String,
}

impl OnboardingInput {
    /// Form fields in display order
    pub const FIELDS: [&'static str; 7] = [
        "crop",
        "seed_type",
        "soil",
        "district",
        "season",
        "state",
        "sowing_date",
    ];

    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            crop: self.crop.trim().to_string(),
            seed_type: self.seed_type.trim().to_string(),
            soil: self.soil.trim().to_string(),
            district: self.district.trim().to_string(),
            season: self.season.trim().to_string(),
            state: self.state.trim().to_string(),
            sowing_date: self.sowing_date.trim().to_string(),
        }
    }

    /// Parsed sowing date, `None` if the field is not a calendar date
    pub fn sowing_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.sowing_date.trim(), "%Y-%m-%d").ok()
    }

    /// Card title shown in report lists
    pub fn title(&self) -> String {
        format!("{} • {}", self.crop, self.district)
    }
}

/// First failing field of an onboarding form, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validate a form and report the first failing field in display order
pub fn check_onboarding_input(input: &OnboardingInput) -> Result<(), FieldError> {
    let errors = match input.validate() {
        Ok(()) => return Ok(()),
        Err(errors) => errors,
    };
    let field_errors = errors.field_errors();

    for field in OnboardingInput::FIELDS {
        if let Some(first) = field_errors.get(field).and_then(|errs| errs.first()) {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            return Err(FieldError {
                field: field.to_string(),
                message,
            });
        }
    }

    Err(FieldError {
        field: "form".to_string(),
        message: "Invalid onboarding form".to_string(),
    })
}
