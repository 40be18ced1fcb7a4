//! Command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use parksense_analysis::{
    AnalysisConfig, Clock, MockOracle, MockStrategy, ParkingAnalysisResult, ParkingAnalysisService,
    SystemClock,
};
use parksense_images::{CameraConfig, FileCamera};
use parksense_sessions::{FailureKind, SessionStateMachine, ViewState};
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;
use crate::render::{render_json, render_text};

/// Overrides from `parksense analyze` flags.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub mock: bool,
    pub random: bool,
    pub model: Option<String>,
    pub mock_delay_ms: Option<u64>,
}

impl AnalyzeOptions {
    fn apply(&self, config: &mut AnalysisConfig) {
        if self.mock {
            config.mock.force = true;
        }
        if self.random {
            config.mock.strategy = MockStrategy::RandomCatalog;
        }
        if let Some(model) = &self.model {
            config.provider.model = model.clone();
        }
        if let Some(delay) = self.mock_delay_ms {
            config.mock.delay_ms = delay;
        }
    }
}

/// Run the parsed command and return what should be printed.
pub async fn run(cli: Cli, style: &OutputStyle) -> CliResult<String> {
    match cli.command {
        Commands::Analyze {
            image,
            mock,
            random,
            model,
            mock_delay_ms,
            json,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            AnalyzeOptions {
                mock,
                random,
                model,
                mock_delay_ms,
            }
            .apply(&mut config);
            config
                .validate()
                .map_err(|e| CliError::Config(e.to_string()))?;

            let result = analyze_photo(config, &image).await?;
            format_result(&result, json, style)
        }
        Commands::Mock { at, random, json } => {
            let result = mock_result(at.as_deref(), random)?;
            format_result(&result, json, style)
        }
    }
}

/// Load the layered configuration, reporting the failing layer.
pub fn load_config(explicit: Option<&Path>) -> CliResult<AnalysisConfig> {
    load_layered(explicit).map_err(|e| CliError::Config(format!("{:#}", e)))
}

fn load_layered(explicit: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let config = AnalysisConfig::load_with_hierarchy(explicit).with_context(|| match explicit {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "loading configuration".to_string(),
    })?;
    debug!(model = %config.provider.model, "Configuration loaded");
    Ok(config)
}

/// Walk one session from capture to results for the photo at `image`.
pub async fn analyze_photo(config: AnalysisConfig, image: &Path) -> CliResult<ParkingAnalysisResult> {
    let credential = config.credential_source();
    let service = ParkingAnalysisService::new(config, credential);
    if service.uses_mock() {
        info!("Using mock analysis");
    }

    let machine = SessionStateMachine::new(Arc::new(service));
    let mut camera = FileCamera::new(PathBuf::from(image));

    let captured = machine
        .capture_from(&mut camera, &CameraConfig::default())
        .await;
    if captured.view() != ViewState::Preview {
        return Err(session_failure(&machine, CliError::Camera).await);
    }

    let analyzed = machine.analyze().await;
    match analyzed.view() {
        ViewState::Results => {
            let result = machine
                .result()
                .await
                .ok_or_else(|| CliError::Analysis("session finished without a result".to_string()))?;
            machine.analyze_another().await.expect_view(ViewState::Home)?;
            Ok(result)
        }
        _ => Err(session_failure(&machine, CliError::Analysis).await),
    }
}

async fn session_failure(machine: &SessionStateMachine, fallback: fn(String) -> CliError) -> CliError {
    match machine.snapshot().await.last_error {
        Some(failure) => match failure.kind {
            FailureKind::Configuration => CliError::Config(failure.message),
            FailureKind::Camera => CliError::Camera(failure.message),
            FailureKind::Analysis => CliError::Analysis(failure.message),
        },
        None => fallback("session stopped unexpectedly".to_string()),
    }
}

/// Produce a mock result without a photo.
pub fn mock_result(at: Option<&str>, random: bool) -> CliResult<ParkingAnalysisResult> {
    if random {
        return Ok(MockOracle::random_catalog(&mut rand::thread_rng(), Utc::now()));
    }

    let now = match at {
        Some(text) => DateTime::parse_from_rfc3339(text).map_err(|e| CliError::InvalidArgument {
            message: format!("'{}' is not an RFC 3339 timestamp: {}", text, e),
        })?,
        None => SystemClock.now(),
    };
    Ok(MockOracle::time_of_day(&now))
}

fn format_result(result: &ParkingAnalysisResult, json: bool, style: &OutputStyle) -> CliResult<String> {
    if json {
        render_json(result)
    } else {
        Ok(render_text(result, style))
    }
}
