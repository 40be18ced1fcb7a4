//! Session views and the transition table between them.

use std::fmt;

use chrono::{DateTime, Utc};
use parksense_analysis::{AnalysisError, ParkingAnalysisResult};
use parksense_images::CapturedImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

/// The screen a session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Home,
    Camera,
    Preview,
    Analyzing,
    Results,
}

impl ViewState {
    /// Controls should be disabled while this view is showing.
    pub fn is_busy(&self) -> bool {
        matches!(self, ViewState::Analyzing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Home => "home",
            ViewState::Camera => "camera",
            ViewState::Preview => "preview",
            ViewState::Analyzing => "analyzing",
            ViewState::Results => "results",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong, which decides where the session goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credential or provider settings are unusable
    Configuration,
    /// The analysis call failed in a way a retry may fix
    Analysis,
    /// The camera could not be opened or read
    Camera,
}

/// A failure recorded on the session for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SessionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn camera(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Camera, message)
    }

    /// View the session returns to after this failure.
    pub fn next_view(&self) -> ViewState {
        match self.kind {
            FailureKind::Configuration | FailureKind::Camera => ViewState::Home,
            FailureKind::Analysis => ViewState::Preview,
        }
    }
}

impl From<&AnalysisError> for SessionFailure {
    fn from(err: &AnalysisError) -> Self {
        let kind = if err.is_configuration() {
            FailureKind::Configuration
        } else {
            FailureKind::Analysis
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Triggers accepted by the transition table.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StartCapture,
    CameraFailed(String),
    ImageCaptured(CapturedImage),
    Cancel,
    Retake,
    AnalyzeRequested,
    AnalysisSucceeded(ParkingAnalysisResult),
    AnalysisFailed(SessionFailure),
    AnalyzeAnother,
}

impl SessionEvent {
    /// Outcome of an analysis run. Only the running analysis may apply these.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            SessionEvent::AnalysisSucceeded(_) | SessionEvent::AnalysisFailed(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::StartCapture => "start_capture",
            SessionEvent::CameraFailed(_) => "camera_failed",
            SessionEvent::ImageCaptured(_) => "image_captured",
            SessionEvent::Cancel => "cancel",
            SessionEvent::Retake => "retake",
            SessionEvent::AnalyzeRequested => "analyze_requested",
            SessionEvent::AnalysisSucceeded(_) => "analysis_succeeded",
            SessionEvent::AnalysisFailed(_) => "analysis_failed",
            SessionEvent::AnalyzeAnother => "analyze_another",
        }
    }
}

/// What applying a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: ViewState, to: ViewState },
    /// The trigger is not listed for this view; nothing changed
    Ignored {
        state: ViewState,
        trigger: &'static str,
    },
}

impl Transition {
    pub fn is_moved(&self) -> bool {
        matches!(self, Transition::Moved { .. })
    }

    /// View the session is in after the transition.
    pub fn view(&self) -> ViewState {
        match self {
            Transition::Moved { to, .. } => *to,
            Transition::Ignored { state, .. } => *state,
        }
    }

    /// Turn an ignored trigger into an error.
    pub fn accepted(self) -> SessionResult<ViewState> {
        match self {
            Transition::Moved { to, .. } => Ok(to),
            Transition::Ignored { state, trigger } => {
                Err(SessionError::TransitionRejected { state, trigger })
            }
        }
    }

    /// Require that the session ended up in `expected`.
    pub fn expect_view(self, expected: ViewState) -> SessionResult<()> {
        let actual = self.accepted()?;
        if actual == expected {
            Ok(())
        } else {
            Err(SessionError::UnexpectedView { expected, actual })
        }
    }
}

/// Everything one session knows.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub view: ViewState,
    pub captured_image: Option<CapturedImage>,
    pub result: Option<ParkingAnalysisResult>,
    pub last_error: Option<SessionFailure>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh session on the home view.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            view: ViewState::Home,
            captured_image: None,
            result: None,
            last_error: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply `event`. Triggers not listed for the current view change nothing.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        let from = self.view;
        let trigger = event.name();

        let to = match (from, event) {
            (ViewState::Home, SessionEvent::StartCapture) => {
                self.last_error = None;
                ViewState::Camera
            }
            (ViewState::Camera, SessionEvent::CameraFailed(message)) => {
                self.last_error = Some(SessionFailure::camera(message));
                ViewState::Home
            }
            (ViewState::Camera, SessionEvent::ImageCaptured(image)) => {
                self.captured_image = Some(image);
                self.last_error = None;
                ViewState::Preview
            }
            (ViewState::Camera, SessionEvent::Cancel) => ViewState::Home,
            (ViewState::Preview, SessionEvent::Retake) => {
                self.captured_image = None;
                self.last_error = None;
                ViewState::Camera
            }
            (ViewState::Preview, SessionEvent::AnalyzeRequested) => {
                self.last_error = None;
                ViewState::Analyzing
            }
            (ViewState::Analyzing, SessionEvent::AnalysisSucceeded(result)) => {
                self.result = Some(result);
                ViewState::Results
            }
            (ViewState::Analyzing, SessionEvent::AnalysisFailed(failure)) => {
                let next = failure.next_view();
                self.last_error = Some(failure);
                next
            }
            (ViewState::Results, SessionEvent::AnalyzeAnother) => {
                self.captured_image = None;
                self.result = None;
                self.last_error = None;
                ViewState::Home
            }
            (state, _) => {
                debug!(session = %self.id, state = %state, trigger, "Ignoring trigger");
                return Transition::Ignored { state, trigger };
            }
        };

        self.view = to;
        self.updated_at = Utc::now();
        info!(session = %self.id, from = %from, to = %to, trigger, "Session transition");
        Transition::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parksense_images::{ImageError, ImageFormat};

    fn frame() -> CapturedImage {
        CapturedImage {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            format: ImageFormat::Jpeg,
        }
    }

    fn in_view(view: ViewState) -> SessionState {
        let mut state = SessionState::new();
        state.view = view;
        if matches!(view, ViewState::Preview | ViewState::Analyzing) {
            state.captured_image = Some(frame());
        }
        state
    }

    fn result() -> ParkingAnalysisResult {
        ParkingAnalysisResult::fallback("unused", "mock", Utc::now())
    }

    #[test]
    fn test_new_session_starts_home() {
        let state = SessionState::new();
        assert_eq!(state.view, ViewState::Home);
        assert!(state.captured_image.is_none());
        assert!(state.result.is_none());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_listed_transitions() {
        let cases: Vec<(ViewState, SessionEvent, ViewState)> = vec![
            (ViewState::Home, SessionEvent::StartCapture, ViewState::Camera),
            (ViewState::Camera, SessionEvent::ImageCaptured(frame()), ViewState::Preview),
            (ViewState::Camera, SessionEvent::Cancel, ViewState::Home),
            (ViewState::Camera, SessionEvent::CameraFailed("denied".into()), ViewState::Home),
            (ViewState::Preview, SessionEvent::Retake, ViewState::Camera),
            (ViewState::Preview, SessionEvent::AnalyzeRequested, ViewState::Analyzing),
            (ViewState::Analyzing, SessionEvent::AnalysisSucceeded(result()), ViewState::Results),
            (
                ViewState::Analyzing,
                SessionEvent::AnalysisFailed(SessionFailure::new(FailureKind::Configuration, "no key")),
                ViewState::Home,
            ),
            (
                ViewState::Analyzing,
                SessionEvent::AnalysisFailed(SessionFailure::new(FailureKind::Analysis, "timeout")),
                ViewState::Preview,
            ),
            (ViewState::Results, SessionEvent::AnalyzeAnother, ViewState::Home),
        ];

        for (from, event, to) in cases {
            let name = event.name();
            let mut state = in_view(from);
            assert_eq!(
                state.apply(event),
                Transition::Moved { from, to },
                "{} from {}",
                name,
                from
            );
            assert_eq!(state.view, to);
        }
    }

    #[test]
    fn test_unlisted_triggers_are_ignored() {
        let cases = vec![
            (ViewState::Home, SessionEvent::AnalyzeRequested),
            (ViewState::Home, SessionEvent::Retake),
            (ViewState::Camera, SessionEvent::AnalyzeRequested),
            (ViewState::Preview, SessionEvent::StartCapture),
            (ViewState::Analyzing, SessionEvent::AnalyzeRequested),
            (ViewState::Analyzing, SessionEvent::Cancel),
            (ViewState::Results, SessionEvent::Retake),
        ];

        for (view, event) in cases {
            let trigger = event.name();
            let mut state = in_view(view);
            let before = state.updated_at;

            assert_eq!(state.apply(event), Transition::Ignored { state: view, trigger });
            assert_eq!(state.view, view);
            assert_eq!(state.updated_at, before);
        }
    }

    #[test]
    fn test_retake_discards_image() {
        let mut state = in_view(ViewState::Preview);
        state.apply(SessionEvent::Retake);
        assert!(state.captured_image.is_none());
    }

    #[test]
    fn test_failure_is_recorded_and_cleared() {
        let mut state = in_view(ViewState::Analyzing);
        state.apply(SessionEvent::AnalysisFailed(SessionFailure::new(
            FailureKind::Analysis,
            "Provider error: Network error: reset",
        )));
        assert_eq!(state.last_error.as_ref().unwrap().kind, FailureKind::Analysis);
        assert!(state.captured_image.is_some());

        state.apply(SessionEvent::AnalyzeRequested);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_analyze_another_resets_everything() {
        let mut state = in_view(ViewState::Results);
        state.captured_image = Some(frame());
        state.result = Some(result());

        state.apply(SessionEvent::AnalyzeAnother);

        assert_eq!(state.view, ViewState::Home);
        assert!(state.captured_image.is_none());
        assert!(state.result.is_none());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_failure_from_analysis_error() {
        let config = SessionFailure::from(&AnalysisError::Configuration("bad key".into()));
        assert_eq!(config.kind, FailureKind::Configuration);
        assert_eq!(config.next_view(), ViewState::Home);

        let image = SessionFailure::from(&AnalysisError::Image(ImageError::InvalidFile(
            "truncated".into(),
        )));
        assert_eq!(image.kind, FailureKind::Analysis);
        assert_eq!(image.next_view(), ViewState::Preview);
    }

    #[test]
    fn test_transition_helpers() {
        let moved = Transition::Moved {
            from: ViewState::Preview,
            to: ViewState::Analyzing,
        };
        assert!(moved.is_moved());
        assert_eq!(moved.view(), ViewState::Analyzing);
        assert!(moved.expect_view(ViewState::Analyzing).is_ok());
        assert_eq!(
            moved.expect_view(ViewState::Home),
            Err(SessionError::UnexpectedView {
                expected: ViewState::Home,
                actual: ViewState::Analyzing
            })
        );

        let ignored = Transition::Ignored {
            state: ViewState::Home,
            trigger: "retake",
        };
        assert_eq!(ignored.view(), ViewState::Home);
        assert_eq!(
            ignored.accepted(),
            Err(SessionError::TransitionRejected {
                state: ViewState::Home,
                trigger: "retake"
            })
        );
        assert!(ViewState::Analyzing.is_busy());
        assert!(!ViewState::Preview.is_busy());
    }
}
