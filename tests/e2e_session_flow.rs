//! End-to-End Test Suite: capture, analyze and display of a parking sign photo
//!
//! Drives a full session through the state machine with the real analysis
//! service, in mock mode and against a mock OpenAI-compatible endpoint.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{FixedOffset, TimeZone};
use parksense_analysis::{AnalysisConfig, FixedClock, ParkingAnalysisService};
use parksense_cli::{output::OutputStyle, render::render_text};
use parksense_images::{CameraConfig, FileCamera};
use parksense_providers::CredentialSource;
use parksense_sessions::{FailureKind, SessionStateMachine, Transition, ViewState};
use tempfile::TempDir;

fn write_sign_photo(dir: &Path) -> PathBuf {
    let img = image::RgbImage::from_fn(1920, 1080, |x, _| {
        if x % 40 < 20 {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([200, 0, 0])
        }
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .unwrap();
    let path = dir.join("sign.jpg");
    std::fs::write(&path, bytes).unwrap();
    path
}

fn offline_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.mock.delay_ms = 0;
    config
}

fn tuesday_evening() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 7, 20, 30, 0)
            .unwrap(),
    ))
}

/// Capture -> no credential -> analyze -> mock result that satisfies the
/// minimal display contract.
#[tokio::test]
async fn test_offline_session_produces_mock_result() {
    let dir = TempDir::new().unwrap();
    let photo = write_sign_photo(dir.path());

    let service = ParkingAnalysisService::new(offline_config(), CredentialSource::none())
        .with_clock(tuesday_evening());
    let machine = SessionStateMachine::new(Arc::new(service));
    let mut camera = FileCamera::new(&photo);

    let captured = machine.capture_from(&mut camera, &CameraConfig::default()).await;
    assert_eq!(captured.view(), ViewState::Preview);

    let analyzed = machine.analyze().await;
    assert_eq!(
        analyzed,
        Transition::Moved {
            from: ViewState::Analyzing,
            to: ViewState::Results
        }
    );

    let result = machine.result().await.unwrap();
    assert!(result.is_mock_data);
    assert_eq!(result.model, "mock");
    assert!(result.can_park.is_some());
    assert!((0.0..=1.0).contains(&result.confidence));
    assert!(!result.raw_text.is_empty());
    // 20:30 on a weekday is outside business hours
    assert_eq!(result.can_park, Some(true));

    let rendered = render_text(&result, &OutputStyle::plain());
    assert!(rendered.contains("Demo Result"));

    assert_eq!(machine.analyze_another().await.view(), ViewState::Home);
    assert!(machine.snapshot().await.captured_image.is_none());
}

/// Capture -> credential -> provider call with a downscaled image -> typed result.
#[tokio::test]
async fn test_online_session_against_mock_provider() {
    let dir = TempDir::new().unwrap();
    let photo = write_sign_photo(dir.path());

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-e2e")
        .match_body(mockito::Matcher::Regex(
            "Tuesday, January 7, 2025 at 8:30 PM".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "model": "gpt-4o",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"canPark\": true, \"timeLimit\": \"2 hours\", \"days\": [\"Monday\"], \"hours\": \"8:00 AM - 6:00 PM\", \"paymentRequired\": false, \"vehicleTypes\": [], \"specialConditions\": [], \"confidence\": 1.7, \"rawText\": \"2 HR PARKING 8AM-6PM\"}"
                    },
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut config = offline_config();
    config.provider.base_url = Some(server.url());
    let service = ParkingAnalysisService::new(config, CredentialSource::fixed("sk-e2e"))
        .with_clock(tuesday_evening());
    let machine = SessionStateMachine::new(Arc::new(service));
    let mut camera = FileCamera::new(&photo);

    machine.capture_from(&mut camera, &CameraConfig::default()).await;
    assert_eq!(machine.analyze().await.view(), ViewState::Results);
    mock.assert_async().await;

    let result = machine.result().await.unwrap();
    assert!(!result.is_mock_data);
    assert_eq!(result.can_park, Some(true));
    // Out-of-range confidence is coerced
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.model, "gpt-4o");
}

/// A rejected key sends the session home with a configuration failure.
#[tokio::test]
async fn test_rejected_key_routes_home() {
    let dir = TempDir::new().unwrap();
    let photo = write_sign_photo(dir.path());

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "invalid api key"}}"#)
        .create_async()
        .await;

    let mut config = offline_config();
    config.provider.base_url = Some(server.url());
    let service = ParkingAnalysisService::new(config, CredentialSource::fixed("sk-revoked"));
    let machine = SessionStateMachine::new(Arc::new(service));
    let mut camera = FileCamera::new(&photo);

    machine.capture_from(&mut camera, &CameraConfig::default()).await;
    assert_eq!(machine.analyze().await.view(), ViewState::Home);

    let state = machine.snapshot().await;
    assert_eq!(state.last_error.unwrap().kind, FailureKind::Configuration);
    assert!(state.result.is_none());
}

/// A provider outage leaves the photo in preview so the user can retry.
#[tokio::test]
async fn test_provider_outage_routes_to_preview() {
    let dir = TempDir::new().unwrap();
    let photo = write_sign_photo(dir.path());

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(502)
        .create_async()
        .await;

    let mut config = offline_config();
    config.provider.base_url = Some(server.url());
    let service = ParkingAnalysisService::new(config, CredentialSource::fixed("sk-e2e"));
    let machine = SessionStateMachine::new(Arc::new(service));
    let mut camera = FileCamera::new(&photo);

    machine.capture_from(&mut camera, &CameraConfig::default()).await;
    assert_eq!(machine.analyze().await.view(), ViewState::Preview);

    let state = machine.snapshot().await;
    assert_eq!(state.last_error.unwrap().kind, FailureKind::Analysis);
    assert!(state.captured_image.is_some());
}
