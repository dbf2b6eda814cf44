//! Game state and the resource model: gate stability, mover progress, combo
//! and the right-lane gate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::beat::{Lane, Outcome, Timing};
use crate::config::Tuning;

pub const METER_MAX: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LossReason {
    /// Gate stability decayed to zero.
    GateCollapsed,
    /// The level's time limit ran out.
    TimeUp,
}

impl LossReason {
    pub fn message(self) -> &'static str {
        match self {
            LossReason::GateCollapsed => "The gate collapsed!",
            LossReason::TimeUp => "Time's up!",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "result", content = "reason", rename_all = "snake_case"))]
pub enum GameResult {
    Won,
    Lost(LossReason),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "phase", rename_all = "snake_case"))]
pub enum Phase {
    Playing,
    /// Level cleared; the next level starts after the intermission.
    LevelComplete { since_ms: f64 },
    /// Terminal until restart.
    GameOver { result: GameResult },
}

/// Display band of the gate meter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GateBand {
    Critical,
    Unstable,
    Stable,
}

/// Per-level judgement tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitStats {
    pub perfect: u32,
    pub okay: u32,
    pub miss: u32,
}

impl HitStats {
    fn record(&mut self, timing: Timing) {
        match timing {
            Timing::Perfect => self.perfect += 1,
            Timing::Okay => self.okay += 1,
            Timing::Miss => self.miss += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameState {
    pub phase: Phase,
    pub score: u32,
    pub gate_stability: f64,
    pub mover_progress: f64,
    pub combo: u32,
    pub max_combo: u32,
    pub right_lane_unlocked: bool,
    pub level_index: usize,
    pub stats: HitStats,
}

impl GameState {
    pub fn new(tuning: &Tuning) -> Self {
        let mut s = Self {
            phase: Phase::Playing,
            score: 0,
            gate_stability: tuning.start_gate.clamp(0.0, METER_MAX),
            mover_progress: 0.0,
            combo: 0,
            max_combo: 0,
            right_lane_unlocked: false,
            level_index: 0,
            stats: HitStats::default(),
        };
        s.refresh_unlock(tuning.unlock_threshold);
        s
    }

    /// Reset meters for a fresh level; score and max combo carry over.
    pub fn begin_level(&mut self, level_index: usize, tuning: &Tuning) {
        self.phase = Phase::Playing;
        self.level_index = level_index;
        self.gate_stability = tuning.start_gate.clamp(0.0, METER_MAX);
        self.mover_progress = 0.0;
        self.combo = 0;
        self.stats = HitStats::default();
        self.refresh_unlock(tuning.unlock_threshold);
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing)
    }

    /// Apply one judged outcome. Right-lane outcomes are dropped while the lane
    /// is locked; returns whether the outcome changed anything.
    pub fn apply(&mut self, outcome: &Outcome, tuning: &Tuning) -> bool {
        if outcome.lane == Lane::Right && !self.right_lane_unlocked {
            return false;
        }
        self.stats.record(outcome.timing);
        let (gain, points) = match (outcome.lane, outcome.timing) {
            (_, Timing::Miss) => {
                self.combo = 0;
                return true;
            }
            (Lane::Left, Timing::Perfect) => (tuning.gate_gain_perfect, tuning.score_perfect),
            (Lane::Left, Timing::Okay) => (tuning.gate_gain_okay, tuning.score_okay),
            (Lane::Right, Timing::Perfect) => (tuning.mover_gain_perfect, tuning.score_perfect),
            (Lane::Right, Timing::Okay) => (tuning.mover_gain_okay, tuning.score_okay),
        };
        match outcome.lane {
            Lane::Left => self.gate_stability = clamp_meter(self.gate_stability + gain),
            Lane::Right => self.mover_progress = clamp_meter(self.mover_progress + gain),
        }
        self.score = self.score.saturating_add(points);
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        true
    }

    /// Passive gate decay over `seconds`. Returns true when the gate hit zero.
    pub fn decay(&mut self, rate_per_sec: f64, seconds: f64) -> bool {
        if seconds > 0.0 {
            self.gate_stability = clamp_meter(self.gate_stability - rate_per_sec * seconds);
        }
        self.gate_stability <= 0.0
    }

    /// Level-triggered right-lane gate. Returns `Some(new)` when it flipped.
    pub fn refresh_unlock(&mut self, threshold: f64) -> Option<bool> {
        let open = self.gate_stability >= threshold;
        if open == self.right_lane_unlocked {
            return None;
        }
        self.right_lane_unlocked = open;
        Some(open)
    }

    pub fn has_won_level(&self, unlock_threshold: f64) -> bool {
        self.mover_progress >= METER_MAX && self.gate_stability >= unlock_threshold
    }

    pub fn gate_band(&self, unlock_threshold: f64) -> GateBand {
        if self.gate_stability >= unlock_threshold {
            GateBand::Stable
        } else if self.gate_stability >= 20.0 {
            GateBand::Unstable
        } else {
            GateBand::Critical
        }
    }
}

fn clamp_meter(v: f64) -> f64 {
    v.clamp(0.0, METER_MAX)
}
