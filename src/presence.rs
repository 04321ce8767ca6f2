// Presence signal as a pluggable capability.
// The detector (webcam classifier or anything else) runs outside the engine; only its boolean verdict reaches us.

/// Produces the `is_present` flag for an observation.
pub trait PresenceSource {
    /// `reported` is the presence flag carried by the heartbeat, if the page sent one.
    fn is_present(&mut self, reported: Option<bool>) -> bool;
}

/// Presence gating off: every observation counts as attended.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPresent;

impl PresenceSource for AlwaysPresent {
    fn is_present(&mut self, _reported: Option<bool>) -> bool {
        true
    }
}

/// Presence gating on: trust the detector verdict sent with the heartbeat.
/// A heartbeat without a verdict counts as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedPresence;

impl PresenceSource for ReportedPresence {
    fn is_present(&mut self, reported: Option<bool>) -> bool {
        reported.unwrap_or(false)
    }
}

impl<P: PresenceSource + ?Sized> PresenceSource for Box<P> {
    fn is_present(&mut self, reported: Option<bool>) -> bool {
        (**self).is_present(reported)
    }
}

/// Pick the source matching the configured gating policy.
pub fn presence_for(gating: bool) -> Box<dyn PresenceSource> {
    if gating {
        Box::new(ReportedPresence)
    } else {
        Box::new(AlwaysPresent)
    }
}
