//! The parking analysis result handed to the display layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Model identifier stamped on synthetic results.
pub const MOCK_MODEL: &str = "mock";

/// Special condition reported when a reply could not be validated.
pub const FALLBACK_CONDITION: &str = "Unable to analyze - please check sign manually";

/// Raw text reported when a reply could not be validated.
pub const FALLBACK_RAW_TEXT: &str = "Error reading sign";

/// Structured reading of a parking sign.
///
/// `can_park`, `confidence` and `raw_text` are always populated; on the
/// fallback path they carry sentinel values (`None`, `0.0`,
/// [`FALLBACK_RAW_TEXT`]) and `error` explains why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingAnalysisResult {
    /// Whether parking is allowed right now; `None` when unknown
    pub can_park: Option<bool>,
    pub time_limit: Option<String>,
    /// Weekday names the posted rules apply to
    pub days: Vec<String>,
    pub hours: Option<String>,
    pub payment_required: Option<bool>,
    pub vehicle_types: Vec<String>,
    pub special_conditions: Vec<String>,
    /// Always within [0, 1]
    pub confidence: f64,
    /// Sign text as read by the model
    pub raw_text: String,
    #[serde(default)]
    pub is_mock_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub model: String,
}

impl ParkingAnalysisResult {
    /// Well-formed result for a reply that could not be validated.
    pub fn fallback(error: impl Into<String>, model: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            can_park: None,
            time_limit: None,
            days: Vec::new(),
            hours: None,
            payment_required: None,
            vehicle_types: Vec::new(),
            special_conditions: vec![FALLBACK_CONDITION.to_string()],
            confidence: 0.0,
            raw_text: FALLBACK_RAW_TEXT.to_string(),
            is_mock_data: false,
            error: Some(error.into()),
            timestamp,
            model: model.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Confidence as a whole percentage.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Coarse confidence bands shown next to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.9 {
            ConfidenceLevel::High
        } else if score > 0.8 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High Confidence",
            ConfidenceLevel::Medium => "Medium Confidence",
            ConfidenceLevel::Low => "Low Confidence - Please Verify",
        }
    }
}
