// CLI error types

use parksense_sessions::SessionError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// User-facing message with a hint on what to do next
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {}\n\nRun 'parksense --help' for usage information.", message)
            }
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nCheck OPENAI_API_KEY and your parksense config file.",
                    msg
                )
            }
            CliError::Camera(msg) => {
                format!("Could not read the photo: {}", msg)
            }
            CliError::Analysis(msg) => {
                format!("Analysis failed: {}\n\nTry again, or retake the photo.", msg)
            }
            CliError::Session(e) => format!("Internal error: {}", e),
            CliError::Output(e) => format!("Failed to format result: {}", e),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument { .. } => 2,
            CliError::Config(_) => 3,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
