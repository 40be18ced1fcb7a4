//! Routing of analyze requests to the provider or to the mock oracle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parksense_images::{CapturedImage, ImageCodec};
use parksense_providers::{Credential, CredentialSource, OpenAiProvider, Provider};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::mock::MockOracle;
use crate::request::AnalysisRequestBuilder;
use crate::result::ParkingAnalysisResult;
use crate::validator::ResponseValidator;

/// Anything that can turn a captured frame into a parking reading.
#[async_trait]
pub trait SignAnalyzer: Send + Sync {
    async fn analyze(&self, image: &CapturedImage) -> AnalysisResult<ParkingAnalysisResult>;
}

/// Analyzes sign photos with a vision provider, or with the mock oracle when
/// no credential is configured.
///
/// The credential is resolved on every call, so a key added or removed at
/// runtime takes effect on the next analysis.
pub struct ParkingAnalysisService {
    config: AnalysisConfig,
    credential: CredentialSource,
    clock: Arc<dyn Clock>,
    provider: Option<Arc<dyn Provider>>,
    codec: ImageCodec,
    builder: AnalysisRequestBuilder,
    oracle: MockOracle,
}

impl ParkingAnalysisService {
    pub fn new(config: AnalysisConfig, credential: CredentialSource) -> Self {
        let codec = ImageCodec::new(config.image.clone());
        let builder = AnalysisRequestBuilder::new(config.request_settings());
        let oracle = config.mock_oracle();

        Self {
            config,
            credential,
            clock: Arc::new(SystemClock),
            provider: None,
            codec,
            builder,
            oracle,
        }
    }

    /// Use `clock` as the source of "now".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send requests to `provider` instead of the configured OpenAI endpoint.
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether the next analysis will use synthetic data.
    pub fn uses_mock(&self) -> bool {
        self.config.mock.force || !self.credential.is_configured()
    }

    fn provider_for(&self, credential: Credential) -> AnalysisResult<Arc<dyn Provider>> {
        if let Some(provider) = &self.provider {
            return Ok(Arc::clone(provider));
        }

        let provider = match &self.config.provider.base_url {
            Some(base_url) => OpenAiProvider::with_base_url(credential, base_url.clone())?,
            None => OpenAiProvider::new(credential)?,
        }
        .with_timeout(self.config.timeout())?;

        Ok(Arc::new(provider))
    }

    async fn mock_result(&self) -> ParkingAnalysisResult {
        let mut result = self.oracle.respond(self.clock.now()).await;
        result.is_mock_data = true;
        result
    }
}

#[async_trait]
impl SignAnalyzer for ParkingAnalysisService {
    async fn analyze(&self, image: &CapturedImage) -> AnalysisResult<ParkingAnalysisResult> {
        if self.config.mock.force {
            info!("Mock analysis forced by configuration");
            return Ok(self.mock_result().await);
        }

        let credential = match self.credential.resolve() {
            Some(credential) => credential,
            None => {
                warn!("No provider credential configured, returning mock analysis");
                return Ok(self.mock_result().await);
            }
        };

        if credential.is_blank() {
            return Err(AnalysisError::Configuration(
                "Provider credential is set but empty".to_string(),
            ));
        }

        let provider = self.provider_for(credential)?;
        let now = self.clock.now();

        let encoded = self.codec.optimize(&image.bytes)?;
        debug!(
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.size_bytes(),
            "Optimized captured frame"
        );

        let request = self.builder.build_request(&encoded, now);
        let requested_model = request.model.clone();

        let response = provider.chat(request).await.map_err(|e| {
            error!(provider = provider.id(), error = %e, "Sign analysis request failed");
            e
        })?;

        let model = if response.model.is_empty() {
            requested_model
        } else {
            response.model
        };

        // Stamped when the result is built, after the round trip
        let resolved_at = self.clock.now().with_timezone(&Utc);
        let outcome = ResponseValidator::new(model).validate_at(&response.content, resolved_at);
        Ok(outcome.into_result())
    }
}
