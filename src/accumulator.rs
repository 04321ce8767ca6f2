// Watch-time accumulation rule.
// Only small positive deltas while engaged earn credit; the position tracker always follows the client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::*;

/// Why an observation did or did not earn credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Delta credited to the watch-time total.
    Accepted,
    /// Paused, tab hidden, or presence absent.
    NotEngaged,
    /// Replay, duplicate report, or backward seek.
    NonPositive,
    /// Forward seek, dropped heartbeats, or a gap after a tab hop.
    StepTooLarge,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// Applies the bounded-window accumulation policy to engagement state.
#[derive(Debug, Clone)]
pub struct EngagementAccumulator {
    config: AccumulatorConfig,
}

impl EngagementAccumulator {
    pub fn new(config: AccumulatorConfig) -> Self {
        EngagementAccumulator { config }
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// Fold one observation into `state`. Total: never fails, never panics.
    /// Returns the new state and whether the delta was credited.
    pub fn observe(
        &self,
        state: EngagementState,
        observation: &Observation,
    ) -> (EngagementState, bool) {
        let (next, outcome) = self.classify(state, observation);
        (next, outcome.is_accepted())
    }

    /// Same as `observe`, reporting the reason behind the verdict.
    pub fn classify(
        &self,
        state: EngagementState,
        observation: &Observation,
    ) -> (EngagementState, Outcome) {
        let last = state.last_observed_time.as_secs();
        let reported = observation.reported_time.as_secs();
        let delta = reported - last;

        let outcome = if !observation.is_engaged() {
            Outcome::NotEngaged
        } else if delta <= 0.0 {
            Outcome::NonPositive
        } else if !(delta < self.config.max_step_secs) {
            Outcome::StepTooLarge
        } else {
            Outcome::Accepted
        };

        let cumulative_watch_time = if outcome.is_accepted() {
            state.cumulative_watch_time.credit(delta)
        } else {
            state.cumulative_watch_time
        };

        debug!(
            last_secs = last,
            reported_secs = reported,
            total_secs = cumulative_watch_time.as_secs(),
            ?outcome,
            "observation folded"
        );

        (
            EngagementState {
                last_observed_time: observation.reported_time,
                cumulative_watch_time,
            },
            outcome,
        )
    }
}

impl Default for EngagementAccumulator {
    fn default() -> Self {
        Self::new(AccumulatorConfig::default())
    }
}
