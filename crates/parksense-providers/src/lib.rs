//! ParkSense AI providers
//!
//! Abstraction over vision-capable chat completion services, the multimodal
//! request model they consume, and the credential source that decides whether
//! a real provider is reachable at all.

pub mod api_key;
pub mod error;
pub mod models;
pub mod provider;
pub mod providers;

pub use api_key::{Credential, CredentialSource, DEFAULT_API_KEY_ENV};
pub use error::ProviderError;
pub use models::{
    Capability, ChatRequest, ChatResponse, ContentPart, FinishReason, ImageDetail, ImageUrl,
    Message, MessageContent, ModelInfo, TokenUsage,
};
pub use provider::Provider;
pub use providers::OpenAiProvider;
