//! Beat timing & judging engine.
//!
//! `Engine` is the single owned context for one game: it holds the level list,
//! the per-lane beat schedules, the clock and the `GameState`. Hosts drive it
//! with three calls:
//!
//! - `tick(now)` once per display frame,
//! - `key_down(key, now)` for every key press,
//! - `snapshot(now)` / `drain_events()` to render and play sounds.
//!
//! Timestamps are host milliseconds (`performance.now()` in the browser); the
//! engine never reads a clock of its own, which keeps every rule deterministic
//! under test.

pub mod beat;
pub mod clock;
mod driver;
pub mod judge;
mod progression;
pub mod scheduler;
pub mod state;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::config::{Judging, Tuning};
use crate::error::ConfigError;
use crate::levels::LevelConfig;
use beat::{Beat, BeatState, Lane, Outcome};
use clock::Clock;
use state::{GameResult, GameState, GateBand, HitStats, Phase};

/// Things that happened inside the engine, queued for the audio / effects
/// collaborators. Purely observational.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum EngineEvent {
    BeatSpawned { lane: Lane, beat: usize },
    /// A key press resolved a beat.
    Judged { outcome: Outcome },
    /// A beat passed the target unanswered.
    BeatExpired { outcome: Outcome },
    LaneUnlocked,
    LaneLocked,
    GateWarning { gate: f64 },
    LevelStarted { index: usize, name: String },
    LevelComplete { index: usize },
    GameOver { result: GameResult, score: u32 },
    Restarted,
}

/// Read-only view of a beat on screen.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BeatView {
    pub lane: Lane,
    pub beat: usize,
    pub key: String,
    /// 0.0 at lane entry, 1.0 on the target.
    pub progress: f64,
    pub overlap: f64,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Snapshot {
    pub phase: Phase,
    pub score: u32,
    pub gate_stability: f64,
    pub mover_progress: f64,
    pub combo: u32,
    pub max_combo: u32,
    pub right_lane_unlocked: bool,
    pub level_index: usize,
    pub level_count: usize,
    pub level_name: String,
    pub level_elapsed_ms: f64,
    pub level_remaining_ms: f64,
    pub gate_band: GateBand,
    pub goal_near: bool,
    pub stats: HitStats,
    pub beats: Vec<BeatView>,
}

pub struct Engine {
    tuning: Tuning,
    levels: Vec<LevelConfig>,
    clock: Clock,
    lanes: [Vec<Beat>; 2],
    state: GameState,
    events: Vec<EngineEvent>,
    // Level time up to which decay has been applied.
    decayed_to_ms: f64,
    // Level time before which no further gate warning fires.
    warning_ready_ms: f64,
}

impl Engine {
    /// Validate the configuration and start the first level at host time `now`.
    pub fn new(tuning: Tuning, levels: Vec<LevelConfig>, now: f64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        let restart_key = tuning.restart_key();
        for level in &levels {
            level.validate(&restart_key)?;
        }
        let state = GameState::new(&tuning);
        let mut engine = Self {
            tuning,
            levels,
            clock: Clock::new(now),
            lanes: [Vec::new(), Vec::new()],
            state,
            events: Vec::new(),
            decayed_to_ms: 0.0,
            warning_ready_ms: 0.0,
        };
        engine.start_level(0, now);
        Ok(engine)
    }

    /// Engine with default tuning and the built-in levels.
    pub fn with_builtin_levels(now: f64) -> Result<Self, ConfigError> {
        Self::new(Tuning::default(), crate::levels::builtin_levels(), now)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn beats(&self, lane: Lane) -> &[Beat] {
        &self.lanes[lane.index()]
    }

    pub fn current_level(&self) -> &LevelConfig {
        &self.levels[self.state.level_index]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Level time at host time `now`.
    pub fn elapsed(&self, now: f64) -> f64 {
        self.clock.elapsed(now)
    }

    /// Judging thresholds in force for the current level.
    pub fn judging(&self) -> Judging {
        self.current_level().judging.unwrap_or(self.tuning.judging)
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Handle a key press at host time `now`.
    ///
    /// The restart key works in every phase. Other keys are judged only while
    /// playing, against the lanes whose pattern contains them (left first).
    /// Keys in no pattern, and presses with no beat in reach, change nothing.
    pub fn key_down(&mut self, key: &str, now: f64) -> Option<Outcome> {
        let key = key.to_lowercase();
        if key == self.tuning.restart_key() {
            self.restart(now);
            return None;
        }
        if !self.state.is_playing() {
            return None;
        }
        let elapsed = self.clock.elapsed(now);
        let judging = self.judging();
        for lane in Lane::ALL {
            if !self.current_level().pattern(lane).contains(&key) {
                continue;
            }
            if lane == Lane::Right && !self.state.right_lane_unlocked {
                continue;
            }
            if let Some(outcome) = judge::judge(&mut self.lanes[lane.index()], &key, elapsed, &judging) {
                self.settle(outcome, now, EngineEvent::Judged { outcome });
                return Some(outcome);
            }
        }
        None
    }

    /// Back to the first level with fresh state. Beats, meters and the clock
    /// origin are all replaced before this returns.
    pub fn restart(&mut self, now: f64) {
        log::info!("restart");
        self.events.clear();
        self.state = GameState::new(&self.tuning);
        self.events.push(EngineEvent::Restarted);
        self.start_level(0, now);
    }

    pub fn snapshot(&self, now: f64) -> Snapshot {
        let elapsed = self.clock.elapsed(now);
        let judging = self.judging();
        let lookahead = self.tuning.lookahead_ms;
        let beats = self
            .lanes
            .iter()
            .flat_map(|lane| lane.iter().enumerate())
            .filter(|(_, b)| b.state == BeatState::Spawned)
            .filter(|(_, b)| b.lane == Lane::Left || self.state.right_lane_unlocked)
            .map(|(idx, b)| BeatView {
                lane: b.lane,
                beat: idx,
                key: b.required_key.clone(),
                progress: b.progress(elapsed, lookahead),
                overlap: judging.overlap(elapsed - b.scheduled_ms),
            })
            .collect();
        let level = self.current_level();
        let s = &self.state;
        Snapshot {
            phase: s.phase,
            score: s.score,
            gate_stability: s.gate_stability,
            mover_progress: s.mover_progress,
            combo: s.combo,
            max_combo: s.max_combo,
            right_lane_unlocked: s.right_lane_unlocked,
            level_index: s.level_index,
            level_count: self.levels.len(),
            level_name: level.name.clone(),
            level_elapsed_ms: elapsed,
            level_remaining_ms: (level.duration_ms - elapsed).max(0.0),
            gate_band: s.gate_band(self.tuning.unlock_threshold),
            goal_near: s.gate_stability >= self.tuning.unlock_threshold
                && s.mover_progress >= self.tuning.goal_glow_at,
            stats: s.stats,
            beats,
        }
    }

    /// Apply an outcome to the meters and re-evaluate the lane gate and the
    /// win condition right away, so a winning hit wins on the same call.
    fn settle(&mut self, outcome: Outcome, now: f64, event: EngineEvent) {
        if !self.state.apply(&outcome, &self.tuning) {
            return;
        }
        self.events.push(event);
        self.refresh_unlock();
        self.check_win(now);
    }

    fn refresh_unlock(&mut self) {
        match self.state.refresh_unlock(self.tuning.unlock_threshold) {
            Some(true) => {
                log::info!("right lane unlocked at gate {:.1}%", self.state.gate_stability);
                self.events.push(EngineEvent::LaneUnlocked);
            }
            Some(false) => {
                log::info!("right lane locked at gate {:.1}%", self.state.gate_stability);
                self.events.push(EngineEvent::LaneLocked);
            }
            None => {}
        }
    }
}
