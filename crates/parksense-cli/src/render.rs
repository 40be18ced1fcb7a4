//! Plain-text and JSON rendering of analysis results.

use parksense_analysis::ParkingAnalysisResult;

use crate::error::CliResult;
use crate::output::OutputStyle;

/// Notice printed above synthetic results.
pub const MOCK_DATA_NOTICE: &str =
    "Demo Result: This is mock data. Add your OpenAI API key for real parking sign analysis.";

/// Render `result` for a terminal.
pub fn render_text(result: &ParkingAnalysisResult, style: &OutputStyle) -> String {
    let mut lines = Vec::new();

    if result.is_mock_data {
        lines.push(style.warning(MOCK_DATA_NOTICE));
        lines.push(String::new());
    }

    match result.can_park {
        Some(true) => {
            lines.push(style.success("You Can Park Here!"));
            lines.push(style.dim("Based on current time and conditions"));
        }
        Some(false) => {
            lines.push(style.error("No Parking Allowed"));
            lines.push(style.dim("Parking restrictions are in effect"));
        }
        None => {
            lines.push(style.warning("Could not determine parking rules"));
            if let Some(error) = &result.error {
                lines.push(style.dim(error));
            }
        }
    }

    lines.push(String::new());
    lines.push(style.header("Parking Details"));

    if let Some(limit) = &result.time_limit {
        lines.push(style.detail("Time Limit", limit));
    }
    if result.payment_required == Some(true) {
        lines.push(style.detail("Payment Required", "Paid parking zone"));
    }
    if !result.days.is_empty() {
        lines.push(style.detail("Active Days", &result.days.join(", ")));
    }
    if let Some(hours) = &result.hours {
        lines.push(style.detail("Active Hours", hours));
    }
    if !result.vehicle_types.is_empty() {
        lines.push(style.detail("Allowed Vehicles", &result.vehicle_types.join(", ")));
    }
    if !result.special_conditions.is_empty() {
        lines.push(style.detail("Special Conditions", ""));
        for condition in &result.special_conditions {
            lines.push(format!("    - {}", condition));
        }
    }
    if !result.raw_text.is_empty() {
        lines.push(style.detail("Detected Text", &format!("\"{}\"", result.raw_text)));
    }

    lines.push(style.detail(
        "AI Confidence",
        &format!(
            "{} ({}%)",
            result.confidence_level().label(),
            result.confidence_percent()
        ),
    ));
    lines.push(style.dim(&format!(
        "  Model {} at {}",
        result.model,
        result.timestamp.to_rfc3339()
    )));

    lines.join("\n")
}

/// Render `result` as pretty-printed camelCase JSON.
pub fn render_json(result: &ParkingAnalysisResult) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
