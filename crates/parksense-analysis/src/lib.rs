//! Parking sign analysis pipeline.
//!
//! Turns a captured frame into a typed [`ParkingAnalysisResult`]:
//! - [`AnalysisRequestBuilder`] builds the vision request, embedding "now"
//! - [`ResponseValidator`] parses provider output and degrades to a fallback
//! - [`MockOracle`] produces synthetic results when no credential is set
//! - [`ParkingAnalysisService`] routes between provider and mock per request

pub mod clock;
pub mod config;
pub mod error;
pub mod mock;
pub mod request;
pub mod result;
pub mod service;
pub mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AnalysisConfig, MockSettings, ProviderSettings};
pub use error::{AnalysisError, AnalysisResult};
pub use mock::{MockOracle, MockStrategy};
pub use request::{AnalysisRequestBuilder, RequestSettings};
pub use result::{ConfidenceLevel, ParkingAnalysisResult, MOCK_MODEL};
pub use service::{ParkingAnalysisService, SignAnalyzer};
pub use validator::{ResponseValidator, ValidationOutcome};
