// Strong typing over loose JSON. Newtypes for playback positions and accumulated watch time.
// Wire payloads (camelCase, as sent by the player page) live next to the validated types.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Playback position in seconds. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(try_from = "f64", into = "f64")]
pub struct Timestamp(f64);

impl Timestamp {
    /// Convert a client-reported position.
    /// Negative positions clamp to zero; NaN and infinities are refused.
    pub fn from_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        Some(Timestamp(secs.max(0.0)))
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Timestamp {
    type Error = String;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        Timestamp::from_secs(secs).ok_or_else(|| format!("position is not finite: {}", secs))
    }
}

impl From<Timestamp> for f64 {
    fn from(ts: Timestamp) -> f64 {
        ts.0
    }
}

/// Accumulated watch time in seconds. Only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(try_from = "f64", into = "f64")]
pub struct WatchTime(f64);

impl WatchTime {
    pub fn from_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        Some(WatchTime(secs.max(0.0)))
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Credit a positive, finite step. Anything else leaves the total as is.
    pub fn credit(self, delta_secs: f64) -> Self {
        if delta_secs > 0.0 && (self.0 + delta_secs).is_finite() {
            WatchTime(self.0 + delta_secs)
        } else {
            self
        }
    }
}

impl TryFrom<f64> for WatchTime {
    type Error = String;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        WatchTime::from_secs(secs).ok_or_else(|| format!("watch time is not finite: {}", secs))
    }
}

impl From<WatchTime> for f64 {
    fn from(total: WatchTime) -> f64 {
        total.0
    }
}

/// Identity of one accumulator instance: a user watching a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngagementKey {
    pub user_id: String,
    pub video_id: String,
}

impl EngagementKey {
    pub fn new(user_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        EngagementKey {
            user_id: user_id.into(),
            video_id: video_id.into(),
        }
    }
}

/// Per-(user, video) accumulator state, owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EngagementState {
    pub last_observed_time: Timestamp,
    pub cumulative_watch_time: WatchTime,
}

impl EngagementState {
    pub fn new(last_observed_time: Timestamp, cumulative_watch_time: WatchTime) -> Self {
        EngagementState {
            last_observed_time,
            cumulative_watch_time,
        }
    }
}

/// One validated heartbeat. The accumulator only ever sees this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub reported_time: Timestamp,
    pub is_playing: bool,
    pub is_tab_active: bool,
    pub is_present: bool,
}

impl Observation {
    pub fn is_engaged(&self) -> bool {
        self.is_playing && self.is_tab_active && self.is_present
    }
}

/// Heartbeat as posted by the player page. Untrusted until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationPayload {
    #[serde(default)]
    pub current_time: Option<f64>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub is_tab_active: bool,
    #[serde(default)]
    pub face_detected: Option<bool>,
}

impl ObservationPayload {
    /// Validate the reported position. Checked before anything else is consulted.
    pub fn reported_time(&self) -> Result<Timestamp, EngineError> {
        let secs = self
            .current_time
            .ok_or_else(|| EngineError::InvalidObservation("missing currentTime".to_string()))?;

        Timestamp::from_secs(secs).ok_or_else(|| {
            EngineError::InvalidObservation(format!("currentTime is not finite: {}", secs))
        })
    }

    /// Build the observation once the position is validated and presence resolved.
    pub fn observation(&self, reported_time: Timestamp, is_present: bool) -> Observation {
        Observation {
            reported_time,
            is_playing: self.is_playing,
            is_tab_active: self.is_tab_active,
            is_present,
        }
    }
}

/// Accumulation policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorConfig {
    /// Forward deltas at or above this are treated as seeks/gaps (seconds).
    #[serde(default = "default_max_step")]
    pub max_step_secs: f64,
    /// Require a presence signal before crediting watch time.
    #[serde(default)]
    pub presence_gating: bool,
}

fn default_max_step() -> f64 {
    5.0
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        AccumulatorConfig {
            max_step_secs: default_max_step(),
            presence_gating: false,
        }
    }
}

/// Which view the host should render for this component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Student,
    Studio,
}

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub accumulator: AccumulatorConfig,
    #[serde(default)]
    pub settings: crate::settings::VideoSettings,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let max_step = self.accumulator.max_step_secs;
        if !max_step.is_finite() || max_step <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "max_step_secs must be a positive number of seconds, got {}",
                max_step
            )));
        }
        Ok(())
    }
}

/// Reply to a tracked heartbeat, returned to JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResponse {
    pub status: String,
    /// Seconds, for display.
    pub total_watch_time: f64,
    pub accepted: bool,
}

impl TrackResponse {
    pub fn success(total: WatchTime, accepted: bool) -> Self {
        TrackResponse {
            status: "success".to_string(),
            total_watch_time: total.as_secs(),
            accepted,
        }
    }
}
