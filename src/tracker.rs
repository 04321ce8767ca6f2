// Heartbeat handling: load state, validate, resolve presence, accumulate, save.
// `&mut self` keeps one writer per tracker; share across threads behind the caller's own lock.

use tracing::{info, warn};

use crate::accumulator::EngagementAccumulator;
use crate::error::EngineError;
use crate::presence::PresenceSource;
use crate::store::EngagementStore;
use crate::types::*;

/// Wires a store and a presence source around the accumulator.
pub struct EngagementTracker<S, P> {
    accumulator: EngagementAccumulator,
    store: S,
    presence: P,
}

impl<S: EngagementStore, P: PresenceSource> EngagementTracker<S, P> {
    pub fn new(config: AccumulatorConfig, store: S, presence: P) -> Self {
        EngagementTracker {
            accumulator: EngagementAccumulator::new(config),
            store,
            presence,
        }
    }

    pub fn config(&self) -> &AccumulatorConfig {
        self.accumulator.config()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state for a pair, zeroed if it never reported.
    pub fn state(&self, key: &EngagementKey) -> Result<EngagementState, EngineError> {
        Ok(self.store.load(key)?.unwrap_or_default())
    }

    /// Seed a pair's state, e.g. from the host's durable copy.
    pub fn restore(&mut self, key: &EngagementKey, state: EngagementState) -> Result<(), EngineError> {
        self.store.save(key, state)
    }

    /// Process one heartbeat. Invalid payloads leave state untouched and earn nothing.
    /// Store failures are the only errors.
    pub fn track(
        &mut self,
        key: &EngagementKey,
        payload: &ObservationPayload,
    ) -> Result<TrackResponse, EngineError> {
        let state = self.state(key)?;

        let reported_time = match payload.reported_time() {
            Ok(reported_time) => reported_time,
            Err(err) => {
                warn!(
                    user_id = %key.user_id,
                    video_id = %key.video_id,
                    error = %err,
                    "heartbeat ignored"
                );
                return Ok(TrackResponse::success(state.cumulative_watch_time, false));
            }
        };

        // Presence is only sampled for heartbeats that will be folded in.
        let is_present = self.presence.is_present(payload.face_detected);
        let observation = payload.observation(reported_time, is_present);

        let (next, outcome) = self.accumulator.classify(state, &observation);
        self.store.save(key, next)?;

        info!(
            user_id = %key.user_id,
            video_id = %key.video_id,
            position_secs = observation.reported_time.as_secs(),
            playing = observation.is_playing,
            tab_active = observation.is_tab_active,
            present = observation.is_present,
            watch_time_secs = next.cumulative_watch_time.as_secs(),
            ?outcome,
            "heartbeat tracked"
        );

        Ok(TrackResponse::success(
            next.cumulative_watch_time,
            outcome.is_accepted(),
        ))
    }
}
