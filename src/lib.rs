// engagement_core: video engagement engine for the course player page.
// The page reports heartbeats; all watch-time policy lives here. JS is plumbing.

mod accumulator;
mod error;
mod metadata;
mod presence;
mod settings;
mod store;
mod tracker;
mod types;

use wasm_bindgen::prelude::*;

pub use accumulator::{EngagementAccumulator, Outcome};
pub use error::EngineError;
pub use metadata::{
    lookup_metadata, FetchedMetadata, MetadataRequest, MetadataResponse, MetadataSource,
    UpstreamError,
};
pub use presence::{presence_for, AlwaysPresent, PresenceSource, ReportedPresence};
pub use settings::{SettingsResponse, SettingsUpdate, VideoSettings};
pub use store::{EngagementStore, MemoryStore};
pub use tracker::EngagementTracker;
pub use types::*;

/// User id recorded when the page cannot identify the viewer.
const ANONYMOUS_USER: &str = "anonymous";

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Main engine interface exposed to JavaScript.
/// One instance per rendered component; the component's video id keys every heartbeat.
#[wasm_bindgen]
pub struct EngagementEngine {
    tracker: EngagementTracker<MemoryStore, Box<dyn PresenceSource>>,
    settings: VideoSettings,
}

impl EngagementEngine {
    pub fn from_config(config: EngineConfig) -> Result<EngagementEngine, EngineError> {
        config.validate()?;
        let presence = presence_for(config.accumulator.presence_gating);

        Ok(EngagementEngine {
            tracker: EngagementTracker::new(config.accumulator, MemoryStore::new(), presence),
            settings: config.settings,
        })
    }

    fn key_for(&self, user_id: &str) -> EngagementKey {
        let user_id = match user_id.trim() {
            "" => ANONYMOUS_USER,
            id => id,
        };
        EngagementKey::new(user_id, self.settings.video_id.as_str())
    }

    pub fn track(&mut self, user_id: &str, payload_json: &str) -> Result<TrackResponse, EngineError> {
        let payload: ObservationPayload = serde_json::from_str(payload_json)?;
        let key = self.key_for(user_id);
        self.tracker.track(&key, &payload)
    }

    pub fn state(&self, user_id: &str) -> Result<EngagementState, EngineError> {
        self.tracker.state(&self.key_for(user_id))
    }

    pub fn restore(&mut self, user_id: &str, state_json: &str) -> Result<(), EngineError> {
        let state: EngagementState = serde_json::from_str(state_json)?;
        let key = self.key_for(user_id);
        self.tracker.restore(&key, state)
    }

    pub fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    pub fn metadata(
        &self,
        request_json: &str,
        upstream_json: &str,
    ) -> Result<MetadataResponse, EngineError> {
        let request: MetadataRequest = serde_json::from_str(request_json)?;
        let mut fetched: FetchedMetadata = serde_json::from_str(upstream_json)?;
        Ok(lookup_metadata(&mut fetched, &request))
    }
}

#[wasm_bindgen]
impl EngagementEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<EngagementEngine, JsValue> {
        let config: EngineConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        EngagementEngine::from_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Fold one heartbeat into the viewer's watch time.
    /// Returns JSON with { status, total_watch_time, accepted }.
    pub fn track_event(&mut self, user_id: &str, payload_json: &str) -> Result<String, JsValue> {
        let response = self
            .track(user_id, payload_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_json::to_string(&response)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Viewer state as JSON, for the host to persist.
    pub fn state_json(&self, user_id: &str) -> Result<String, JsValue> {
        let state = self
            .state(user_id)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_json::to_string(&state)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Seed a viewer's state from the host's persisted copy.
    pub fn restore_state(&mut self, user_id: &str, state_json: &str) -> Result<(), JsValue> {
        self.restore(user_id, state_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Apply an authoring update. Returns JSON with { status, message }.
    pub fn save_settings(&mut self, update_json: &str) -> Result<String, JsValue> {
        let update: SettingsUpdate = serde_json::from_str(update_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?;
        let response = self.settings.apply(update);

        serde_json::to_string(&response)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.settings)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Shape the video API's reply for the authoring page.
    /// `upstream_json` is the body the page fetched for the requested id.
    /// Returns JSON with { status: "ok", metadata } or { status: "error", message }.
    pub fn lookup_metadata_json(
        &self,
        request_json: &str,
        upstream_json: &str,
    ) -> Result<String, JsValue> {
        let response = self
            .metadata(request_json, upstream_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_json::to_string(&response)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// True when the host should render the authoring view instead of the player.
    pub fn shows_authoring_view(&self) -> bool {
        self.settings.shows_authoring_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_creation_works() {
        let engine = EngagementEngine::new("{}");
        assert!(engine.is_ok());
    }

    #[test]
    fn zero_step_config_is_refused() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"accumulator":{"max_step_secs":0}}"#).unwrap();
        let err = EngagementEngine::from_config(config).err().unwrap();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn track_event_returns_running_total() {
        let mut engine = EngagementEngine::new("{}").expect("Should parse empty config");

        engine
            .track_event("alice", r#"{"currentTime":2.0,"isPlaying":true,"isTabActive":true}"#)
            .expect("Should track");
        let output = engine
            .track_event("alice", r#"{"currentTime":3.5,"isPlaying":true,"isTabActive":true}"#)
            .expect("Should track");

        let response: TrackResponse = serde_json::from_str(&output).expect("Should parse response");
        assert_eq!(response.status, "success");
        assert!(response.accepted);
        assert!((response.total_watch_time - 3.5).abs() < 1e-9);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let mut engine = EngagementEngine::new("{}").expect("Should parse empty config");
        let err = engine.track("alice", "not json").unwrap_err();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn blank_user_is_tracked_as_anonymous() {
        let mut engine = EngagementEngine::new("{}").expect("Should parse empty config");
        engine
            .track("  ", r#"{"currentTime":1.0,"isPlaying":true,"isTabActive":true}"#)
            .expect("Should track");

        let state = engine.state(ANONYMOUS_USER).expect("Should load");
        assert_eq!(state.cumulative_watch_time.as_secs(), 1.0);
    }

    #[test]
    fn presence_gating_from_config() {
        let mut engine = EngagementEngine::new(r#"{"accumulator":{"presence_gating":true}}"#)
            .expect("Should parse config");

        let response = engine
            .track(
                "alice",
                r#"{"currentTime":1.0,"isPlaying":true,"isTabActive":true,"faceDetected":false}"#,
            )
            .expect("Should track");
        assert!(!response.accepted);

        let response = engine
            .track(
                "alice",
                r#"{"currentTime":2.0,"isPlaying":true,"isTabActive":true,"faceDetected":true}"#,
            )
            .expect("Should track");
        assert!(response.accepted);
    }

    #[test]
    fn state_round_trips_through_host() {
        let mut engine = EngagementEngine::new("{}").expect("Should parse empty config");
        engine
            .restore_state(
                "alice",
                r#"{"last_observed_time":10.0,"cumulative_watch_time":7.0}"#,
            )
            .expect("Should restore");

        engine
            .track_event("alice", r#"{"currentTime":11.0,"isPlaying":true,"isTabActive":true}"#)
            .expect("Should track");

        let state: EngagementState =
            serde_json::from_str(&engine.state_json("alice").expect("Should serialize"))
                .expect("Should parse state");
        assert_eq!(state.last_observed_time.as_secs(), 11.0);
        assert_eq!(state.cumulative_watch_time.as_secs(), 8.0);
    }

    #[test]
    fn metadata_lookup_through_engine() {
        let engine = EngagementEngine::new("{}").expect("Should parse empty config");

        let output = engine
            .lookup_metadata_json(r#"{"id":"abc"}"#, r#"{"items":[{"id":"abc","snippet":{}}]}"#)
            .expect("Should look up");
        let response: MetadataResponse = serde_json::from_str(&output).expect("Should parse");
        assert_eq!(
            response,
            MetadataResponse::Ok {
                metadata: serde_json::json!({"id": "abc", "snippet": {}})
            }
        );

        let output = engine
            .lookup_metadata_json("{}", r#"{"items":[]}"#)
            .expect("Should look up");
        assert_eq!(output, r#"{"status":"error","message":"Missing video ID"}"#);

        let output = engine
            .lookup_metadata_json(r#"{"id":"abc"}"#, r#"{"items":[]}"#)
            .expect("Should look up");
        assert_eq!(output, r#"{"status":"error","message":"No video found"}"#);
    }

    #[test]
    fn malformed_upstream_body_is_an_error() {
        let engine = EngagementEngine::new("{}").expect("Should parse empty config");
        let err = engine.metadata(r#"{"id":"abc"}"#, "<html>").unwrap_err();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn settings_update_through_engine() {
        let mut engine =
            EngagementEngine::new(r#"{"settings":{"video_id":"bunny","mode":"studio"}}"#)
                .expect("Should parse config");
        assert!(engine.shows_authoring_view());

        let output = engine
            .save_settings(r#"{"video_url":"https://example.com/bunny.mp4"}"#)
            .expect("Should save");
        let response: SettingsResponse = serde_json::from_str(&output).expect("Should parse");
        assert_eq!(response.message, "Settings saved.");

        let settings: VideoSettings =
            serde_json::from_str(&engine.settings_json().expect("Should serialize"))
                .expect("Should parse settings");
        assert_eq!(settings.video_url, "https://example.com/bunny.mp4");
        assert_eq!(settings.video_id, "bunny");
        assert_eq!(settings.display_name, "Video Engagement Tracker");
    }
}
