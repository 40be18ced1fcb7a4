//! Synthetic parking readings for offline use.

use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::result::{ParkingAnalysisResult, MOCK_MODEL};

/// Simulated provider latency used by the application.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(3000);

const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// How synthetic results are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockStrategy {
    /// Derive the reading from the current day and hour
    #[default]
    TimeOfDay,
    /// Pick uniformly from a small catalog of plausible signs
    RandomCatalog,
}

/// Stand-in for the provider when no credential is configured.
#[derive(Debug, Clone)]
pub struct MockOracle {
    strategy: MockStrategy,
    delay: Duration,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new(MockStrategy::default(), DEFAULT_MOCK_DELAY)
    }
}

impl MockOracle {
    pub fn new(strategy: MockStrategy, delay: Duration) -> Self {
        Self { strategy, delay }
    }

    pub fn strategy(&self) -> MockStrategy {
        self.strategy
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the simulated latency, then produce a reading for `now`.
    pub async fn respond(&self, now: DateTime<FixedOffset>) -> ParkingAnalysisResult {
        debug!(strategy = ?self.strategy, delay_ms = self.delay.as_millis() as u64, "Producing mock analysis");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.produce(now)
    }

    fn produce(&self, now: DateTime<FixedOffset>) -> ParkingAnalysisResult {
        match self.strategy {
            MockStrategy::TimeOfDay => Self::time_of_day(&now),
            MockStrategy::RandomCatalog => {
                Self::random_catalog(&mut rand::thread_rng(), now.with_timezone(&Utc))
            }
        }
    }

    /// Reading for a weekday 9 AM to 6 PM paid zone, evaluated at `now`.
    ///
    /// Business hours cover hours 9 through 18 inclusive.
    pub fn time_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> ParkingAnalysisResult {
        let is_weekday = !matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
        let is_business_hours = (9..=18).contains(&now.hour());
        let restricted = is_weekday && is_business_hours;

        ParkingAnalysisResult {
            can_park: Some(!restricted),
            time_limit: is_weekday.then(|| "2 hours".to_string()),
            days: to_strings(&WEEKDAYS),
            hours: Some("9:00 AM - 6:00 PM".to_string()),
            payment_required: Some(restricted),
            vehicle_types: vec!["Passenger vehicles".to_string()],
            special_conditions: Vec::new(),
            confidence: 0.85,
            raw_text: "2 HR PARKING 9AM-6PM MON-FRI PAYMENT REQUIRED".to_string(),
            is_mock_data: true,
            error: None,
            timestamp: now.with_timezone(&Utc),
            model: MOCK_MODEL.to_string(),
        }
    }

    /// One catalog entry chosen uniformly with `rng`.
    pub fn random_catalog<R: Rng + ?Sized>(rng: &mut R, timestamp: DateTime<Utc>) -> ParkingAnalysisResult {
        let mut catalog = Self::catalog(timestamp);
        let index = rng.gen_range(0..catalog.len());
        catalog.swap_remove(index)
    }

    /// The fixed set of readings used by [`MockStrategy::RandomCatalog`].
    pub fn catalog(timestamp: DateTime<Utc>) -> Vec<ParkingAnalysisResult> {
        let base = ParkingAnalysisResult {
            can_park: Some(true),
            time_limit: None,
            days: to_strings(&WEEKDAYS),
            hours: None,
            payment_required: Some(false),
            vehicle_types: Vec::new(),
            special_conditions: Vec::new(),
            confidence: 0.0,
            raw_text: String::new(),
            is_mock_data: true,
            error: None,
            timestamp,
            model: MOCK_MODEL.to_string(),
        };

        vec![
            ParkingAnalysisResult {
                time_limit: Some("2 hours".to_string()),
                hours: Some("9:00 AM - 6:00 PM".to_string()),
                payment_required: Some(true),
                vehicle_types: vec!["Passenger vehicles".to_string()],
                confidence: 0.92,
                raw_text: "2 HR PARKING 9AM-6PM MON-FRI PAYMENT REQUIRED".to_string(),
                ..base.clone()
            },
            ParkingAnalysisResult {
                can_park: Some(false),
                hours: Some("7:00 AM - 9:00 AM, 4:00 PM - 6:00 PM".to_string()),
                special_conditions: vec!["No Parking - Tow Zone".to_string()],
                confidence: 0.88,
                raw_text: "NO PARKING 7-9AM 4-6PM MON-FRI TOW ZONE".to_string(),
                ..base.clone()
            },
            ParkingAnalysisResult {
                time_limit: Some("30 minutes".to_string()),
                days: to_strings(&["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]),
                hours: Some("8:00 AM - 8:00 PM".to_string()),
                payment_required: Some(true),
                vehicle_types: vec!["Passenger vehicles".to_string()],
                special_conditions: vec!["Loading zone - 15 min max for commercial vehicles".to_string()],
                confidence: 0.95,
                raw_text: "30 MIN PARKING 8AM-8PM MON-SAT LOADING ZONE".to_string(),
                ..base
            },
        ]
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
