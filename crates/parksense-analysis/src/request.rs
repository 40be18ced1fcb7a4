//! Construction of the vision request sent to the provider.

use chrono::{DateTime, FixedOffset};
use parksense_images::EncodedImage;
use parksense_providers::{ChatRequest, ImageDetail, Message};
use tracing::debug;

/// Default model for sign reading.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature. Kept low so readings are repeatable.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default completion budget.
pub const DEFAULT_MAX_TOKENS: usize = 500;

const SYSTEM_PROMPT: &str = "You are a parking sign reader. Analyze the parking sign in the image and \
extract its rules. Respond with a single JSON object containing exactly these fields:\n\
- canPark: boolean, whether parking is allowed at the current day and time given below, \
judged against the rules posted on the sign\n\
- timeLimit: string or null, e.g. \"2 hours\"\n\
- days: array of strings, weekday names the rules apply to\n\
- hours: string or null, the time range the rules apply to\n\
- paymentRequired: boolean\n\
- vehicleTypes: array of strings, vehicle types the sign allows\n\
- specialConditions: array of strings, any other posted rules\n\
- confidence: number between 0 and 1\n\
- rawText: string, the text printed on the sign\n\
canPark MUST reflect the current day and time, not the sign in general. \
Return only the JSON object, with no prose and no code fences.";

/// Tunables for the outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub detail: ImageDetail,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            detail: ImageDetail::High,
        }
    }
}

/// Builds the multimodal chat request for one sign photo.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequestBuilder {
    settings: RequestSettings,
}

impl AnalysisRequestBuilder {
    pub fn new(settings: RequestSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    /// Build the request for `image`, telling the model that it is `now`.
    pub fn build_request(&self, image: &EncodedImage, now: DateTime<FixedOffset>) -> ChatRequest {
        let current_time = describe_time(&now);
        debug!(
            model = %self.settings.model,
            width = image.width,
            height = image.height,
            bytes = image.size_bytes(),
            current_time = %current_time,
            "Building sign analysis request"
        );

        let instruction = format!(
            "The current date and time is {}. Read the parking sign in this photo and decide \
             whether parking is allowed right now.",
            current_time
        );

        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user_with_image(instruction, image.data_url(), self.settings.detail),
            ],
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        }
    }
}

/// Human-readable local time, e.g. "Monday, January 6, 2025 at 10:00 AM (UTC+00:00)".
pub fn describe_time(now: &DateTime<FixedOffset>) -> String {
    now.format("%A, %B %-d, %Y at %-I:%M %p (UTC%:z)").to_string()
}
