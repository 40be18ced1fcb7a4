//! Shared, async driver around the session transition table.

use std::sync::Arc;

use parksense_analysis::{ParkingAnalysisResult, SignAnalyzer};
use parksense_images::{Camera, CameraConfig, CapturedImage};
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::state::{
    FailureKind, SessionEvent, SessionFailure, SessionState, Transition, ViewState,
};

/// Drives one session from capture to results.
///
/// Clones share the same session. The analyzer is awaited without holding the
/// state lock; the session stays in `Analyzing` meanwhile, which is what makes
/// a second analyze request a no-op.
#[derive(Clone)]
pub struct SessionStateMachine {
    state: Arc<Mutex<SessionState>>,
    analyzer: Arc<dyn SignAnalyzer>,
}

impl SessionStateMachine {
    pub fn new(analyzer: Arc<dyn SignAnalyzer>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            analyzer,
        }
    }

    /// Copy of the current state for display.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> ViewState {
        self.state.lock().await.view
    }

    pub async fn result(&self) -> Option<ParkingAnalysisResult> {
        self.state.lock().await.result.clone()
    }

    /// Apply a single user trigger.
    ///
    /// Analysis outcomes are ignored here; only [`analyze`](Self::analyze)
    /// resolves the `Analyzing` view.
    pub async fn dispatch(&self, event: SessionEvent) -> Transition {
        let mut state = self.state.lock().await;
        if event.is_resolution() {
            warn!(trigger = event.name(), "Analysis outcome from outside the running analysis ignored");
            return Transition::Ignored {
                state: state.view,
                trigger: event.name(),
            };
        }
        state.apply(event)
    }

    async fn resolve(&self, event: SessionEvent) -> Transition {
        self.state.lock().await.apply(event)
    }

    pub async fn start_capture(&self) -> Transition {
        self.dispatch(SessionEvent::StartCapture).await
    }

    /// Enter the camera view and grab one frame from `camera`.
    ///
    /// A camera that cannot be started or read sends the session back home
    /// with the failure recorded.
    pub async fn capture_from(&self, camera: &mut dyn Camera, config: &CameraConfig) -> Transition {
        let entered = self.start_capture().await;
        if !entered.is_moved() {
            return entered;
        }

        let stream = match camera.start_stream(config) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Camera could not be started");
                return self.dispatch(SessionEvent::CameraFailed(e.to_string())).await;
            }
        };

        let frame = camera.capture_frame(&stream);
        camera.stop_stream(stream);

        match frame {
            Ok(image) => self.image_captured(image).await,
            Err(e) => {
                warn!(error = %e, "Camera frame could not be read");
                self.dispatch(SessionEvent::CameraFailed(e.to_string())).await
            }
        }
    }

    pub async fn image_captured(&self, image: CapturedImage) -> Transition {
        self.dispatch(SessionEvent::ImageCaptured(image)).await
    }

    pub async fn cancel(&self) -> Transition {
        self.dispatch(SessionEvent::Cancel).await
    }

    pub async fn retake(&self) -> Transition {
        self.dispatch(SessionEvent::Retake).await
    }

    /// Analyze the captured image and move to results or back on failure.
    ///
    /// Ignored unless the session is in `Preview`, so overlapping calls run the
    /// analyzer once.
    pub async fn analyze(&self) -> Transition {
        let image = {
            let mut state = self.state.lock().await;
            let entered = state.apply(SessionEvent::AnalyzeRequested);
            if !entered.is_moved() {
                return entered;
            }
            state.captured_image.clone()
        };

        let event = match image {
            Some(image) => match self.analyzer.analyze(&image).await {
                Ok(result) => SessionEvent::AnalysisSucceeded(result),
                Err(e) => {
                    error!(error = %e, "Sign analysis failed");
                    SessionEvent::AnalysisFailed(SessionFailure::from(&e))
                }
            },
            None => SessionEvent::AnalysisFailed(SessionFailure::new(
                FailureKind::Analysis,
                "No captured image to analyze",
            )),
        };

        self.resolve(event).await
    }

    pub async fn analyze_another(&self) -> Transition {
        self.dispatch(SessionEvent::AnalyzeAnother).await
    }
}
