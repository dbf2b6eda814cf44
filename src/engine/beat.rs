//! Beat descriptors and the judgement vocabulary shared by the scheduler,
//! judge and resource model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two input channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Lane {
    Left,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::Left, Lane::Right];

    /// Slot of this lane in per-lane arrays.
    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Right => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Lane::Left => "left",
            Lane::Right => "right",
        }
    }
}

/// Hit quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Timing {
    Perfect,
    Okay,
    Miss,
}

impl Timing {
    pub fn label(self) -> &'static str {
        match self {
            Timing::Perfect => "PERFECT",
            Timing::Okay => "OKAY",
            Timing::Miss => "MISS",
        }
    }
}

/// Beat lifecycle. `Hit` and `Missed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", content = "timing", rename_all = "lowercase"))]
pub enum BeatState {
    /// Scheduled but not yet visible in its lane.
    Pending,
    /// Travelling toward the target; eligible for judging.
    Spawned,
    /// Resolved by a key press.
    Hit(Timing),
    /// Passed the target unanswered.
    Missed,
}

impl BeatState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BeatState::Hit(_) | BeatState::Missed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Beat {
    /// Level-relative time at which the beat reaches the target.
    pub scheduled_ms: f64,
    pub lane: Lane,
    pub required_key: String,
    pub state: BeatState,
}

impl Beat {
    pub fn new(scheduled_ms: f64, lane: Lane, required_key: impl Into<String>) -> Self {
        Self {
            scheduled_ms,
            lane,
            required_key: required_key.into(),
            state: BeatState::Pending,
        }
    }

    /// Timing classification if resolved, `None` while still in play.
    pub fn hit_timing(&self) -> Option<Timing> {
        match self.state {
            BeatState::Hit(t) => Some(t),
            BeatState::Missed => Some(Timing::Miss),
            _ => None,
        }
    }

    /// Travel progress toward the target: 0.0 on lane entry, 1.0 on the target,
    /// above 1.0 once past it.
    pub fn progress(&self, elapsed_ms: f64, lookahead_ms: f64) -> f64 {
        if lookahead_ms <= 0.0 {
            return 1.0;
        }
        1.0 - (self.scheduled_ms - elapsed_ms) / lookahead_ms
    }

    /// Move to a terminal state. Returns false (and leaves the beat alone) if
    /// it was already resolved.
    pub(crate) fn resolve(&mut self, state: BeatState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = state;
        true
    }
}

/// Result of judging (or expiring) a single beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Outcome {
    pub lane: Lane,
    /// Index of the beat inside its lane's schedule.
    pub beat: usize,
    pub timing: Timing,
}
