//! Validation of raw provider output into a [`ParkingAnalysisResult`].
//!
//! Validation never fails. Output that cannot be trusted is replaced by a
//! fallback result whose `error` field carries the diagnostic, so the display
//! always has something to show.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::result::ParkingAnalysisResult;

/// Confidence used when the model reports something unusable.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("code fence pattern is valid")
});

/// Outcome of validating one provider reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The reply carried every required field.
    Valid(ParkingAnalysisResult),
    /// The reply was unusable; the result is the fallback shape.
    Fallback(ParkingAnalysisResult),
}

impl ValidationOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ValidationOutcome::Fallback(_))
    }

    pub fn result(&self) -> &ParkingAnalysisResult {
        match self {
            ValidationOutcome::Valid(result) | ValidationOutcome::Fallback(result) => result,
        }
    }

    pub fn into_result(self) -> ParkingAnalysisResult {
        match self {
            ValidationOutcome::Valid(result) | ValidationOutcome::Fallback(result) => result,
        }
    }
}

/// Turns provider text into typed results, stamping the model that produced it.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    model: String,
}

impl ResponseValidator {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Validate `raw`, timestamping the result with the current time.
    pub fn validate(&self, raw: &str) -> ValidationOutcome {
        self.validate_at(raw, Utc::now())
    }

    /// Validate `raw`, timestamping the result with `now`.
    pub fn validate_at(&self, raw: &str, now: DateTime<Utc>) -> ValidationOutcome {
        match self.parse(raw, now) {
            Ok(result) => {
                debug!(
                    model = %self.model,
                    can_park = ?result.can_park,
                    confidence = result.confidence,
                    "Validated sign analysis"
                );
                ValidationOutcome::Valid(result)
            }
            Err(reason) => {
                warn!(model = %self.model, reason = %reason, "Provider reply rejected, using fallback");
                ValidationOutcome::Fallback(ParkingAnalysisResult::fallback(
                    reason,
                    self.model.clone(),
                    now,
                ))
            }
        }
    }

    fn parse(&self, raw: &str, now: DateTime<Utc>) -> Result<ParkingAnalysisResult, String> {
        let cleaned = strip_code_fences(raw);
        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| format!("Failed to parse analysis as JSON: {}", e))?;
        let object = value
            .as_object()
            .ok_or_else(|| "Analysis is not a JSON object".to_string())?;

        let can_park = match required(object, "canPark")? {
            Value::Bool(flag) => *flag,
            _ => return Err("Field canPark is not a boolean".to_string()),
        };
        let confidence = coerce_confidence(required(object, "confidence")?);
        let raw_text = match required(object, "rawText")? {
            Value::String(text) => text.clone(),
            _ => return Err("Field rawText is not a string".to_string()),
        };

        Ok(ParkingAnalysisResult {
            can_park: Some(can_park),
            time_limit: optional_string(object, "timeLimit"),
            days: string_list(object, "days"),
            hours: optional_string(object, "hours"),
            payment_required: object.get("paymentRequired").and_then(Value::as_bool),
            vehicle_types: string_list(object, "vehicleTypes"),
            special_conditions: string_list(object, "specialConditions"),
            confidence,
            raw_text,
            is_mock_data: false,
            error: None,
            timestamp: now,
            model: self.model.clone(),
        })
    }
}

/// Remove a surrounding markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(captures) = CODE_FENCE.captures(trimmed) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str().trim().to_string();
        }
    }

    // Unterminated fence
    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
        return body.trim().to_string();
    }

    trimmed.to_string()
}

/// Clamp-free coercion: numbers within [0, 1] pass, anything else becomes 0.5.
pub fn coerce_confidence(value: &Value) -> f64 {
    value
        .as_f64()
        .filter(|score| (0.0..=1.0).contains(score))
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn required<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value, String> {
    match object.get(field) {
        None => Err(format!("Missing required field: {}", field)),
        Some(Value::Null) => Err(format!("Required field is null: {}", field)),
        Some(value) => Ok(value),
    }
}

fn optional_string(object: &Map<String, Value>, field: &str) -> Option<String> {
    object.get(field).and_then(Value::as_str).map(str::to_string)
}

fn string_list(object: &Map<String, Value>, field: &str) -> Vec<String> {
    object
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
