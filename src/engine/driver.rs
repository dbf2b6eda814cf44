//! Per-frame tick.

use super::beat::Lane;
use super::scheduler::spawn_due;
use super::state::{GameResult, LossReason, Phase};
use super::{Engine, EngineEvent, judge};

impl Engine {
    /// Advance the game to host time `now`. Call once per display frame.
    ///
    /// While playing, runs in order: gate decay (a collapse ends the tick),
    /// beat spawning, the expiry sweep, then the win and time-limit checks.
    /// The host renders after this returns.
    pub fn tick(&mut self, now: f64) {
        match self.state.phase {
            Phase::GameOver { .. } => return,
            Phase::LevelComplete { since_ms } => {
                if now - since_ms >= self.tuning.intermission_ms {
                    let next = self.state.level_index + 1;
                    self.start_level(next, now);
                }
                return;
            }
            Phase::Playing => {}
        }
        let elapsed = self.clock.elapsed(now);

        if self.step_decay(elapsed) {
            self.game_over(GameResult::Lost(LossReason::GateCollapsed));
            return;
        }
        self.refresh_unlock();
        self.step_gate_warning(elapsed);

        self.step_spawn(elapsed);
        self.step_expiry(elapsed, now);
        if !self.state.is_playing() {
            return;
        }

        if self.check_win(now) {
            return;
        }
        if elapsed >= self.current_level().duration_ms {
            self.game_over(GameResult::Lost(LossReason::TimeUp));
        }
    }

    /// Drain the gate for the time since the last tick, excluding the grace
    /// period. Returns true if the gate collapsed.
    fn step_decay(&mut self, elapsed: f64) -> bool {
        let from = self.decayed_to_ms.max(self.tuning.grace_ms);
        self.decayed_to_ms = self.decayed_to_ms.max(elapsed);
        if elapsed <= from {
            return false;
        }
        self.state.decay(self.tuning.decay_per_sec, (elapsed - from) / 1000.0)
    }

    fn step_gate_warning(&mut self, elapsed: f64) {
        let gate = self.state.gate_stability;
        if gate > 0.0 && gate < self.tuning.warning_below && elapsed >= self.warning_ready_ms {
            self.warning_ready_ms = elapsed + self.tuning.warning_cooldown_ms;
            self.events.push(EngineEvent::GateWarning { gate });
        }
    }

    fn step_spawn(&mut self, elapsed: f64) {
        let late_after = self.judging().expire_after_ms();
        for lane in Lane::ALL {
            if lane == Lane::Right && !self.state.right_lane_unlocked {
                continue;
            }
            let spawned = spawn_due(
                &mut self.lanes[lane.index()],
                elapsed,
                self.tuning.lookahead_ms,
                late_after,
            );
            self.events
                .extend(spawned.into_iter().map(|beat| EngineEvent::BeatSpawned { lane, beat }));
        }
    }

    fn step_expiry(&mut self, elapsed: f64, now: f64) {
        let judging = self.judging();
        for lane in Lane::ALL {
            if lane == Lane::Right && !self.state.right_lane_unlocked {
                continue;
            }
            for outcome in judge::expire(&mut self.lanes[lane.index()], elapsed, &judging) {
                log::debug!("{} beat #{} expired", lane.name(), outcome.beat);
                self.settle(outcome, now, EngineEvent::BeatExpired { outcome });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Tuning;
    use crate::engine::beat::{BeatState, Lane};
    use crate::engine::state::{GameResult, LossReason, Phase};
    use crate::engine::{Engine, EngineEvent};
    use crate::levels::{LanePattern, LevelConfig};

    fn level(duration_ms: f64) -> LevelConfig {
        LevelConfig {
            id: 1,
            name: "driver".into(),
            beat_interval_ms: 1000.0,
            left: LanePattern::new(&["a"], 4000.0, 0.0),
            right: LanePattern::new(&["l"], 4000.0, 0.0),
            duration_ms,
            judging: None,
        }
    }

    #[test]
    fn no_decay_during_grace() {
        let mut e = Engine::new(Tuning::default(), vec![level(60_000.0)], 0.0).unwrap();
        e.tick(0.0);
        e.tick(1999.0);
        assert_eq!(e.state().gate_stability, 20.0);
        e.tick(3000.0);
        assert!((e.state().gate_stability - 14.0).abs() < 1e-9);
    }

    #[test]
    fn collapse_stops_tick_before_spawning() {
        let tuning = Tuning {
            start_gate: 1.0,
            grace_ms: 0.0,
            ..Tuning::default()
        };
        let mut e = Engine::new(tuning, vec![level(60_000.0)], 0.0).unwrap();
        e.tick(1000.0);
        assert_eq!(
            e.state().phase,
            Phase::GameOver {
                result: GameResult::Lost(LossReason::GateCollapsed)
            }
        );
        assert!(e.beats(Lane::Left).iter().all(|b| b.state == BeatState::Pending));
    }

    #[test]
    fn unanswered_beat_expires_as_miss() {
        let mut e = Engine::new(Tuning::default(), vec![level(60_000.0)], 0.0).unwrap();
        e.tick(0.0);
        e.key_down("a", 3000.0); // out of reach: no-op
        e.tick(3000.0);
        assert_eq!(e.state().stats.miss, 0);
        e.tick(4300.0);
        assert_eq!(e.beats(Lane::Left)[0].state, BeatState::Missed);
        assert_eq!(e.state().stats.miss, 1);
        assert_eq!(e.state().combo, 0);
        let events = e.drain_events();
        assert!(events.iter().any(|ev| matches!(ev, EngineEvent::BeatExpired { .. })));
    }

    #[test]
    fn beats_starting_at_level_start_are_playable() {
        let mut lvl = level(60_000.0);
        lvl.left = LanePattern::new(&["a"], 0.0, 0.0);
        let mut e = Engine::new(Tuning::default(), vec![lvl], 0.0).unwrap();
        e.tick(0.0);
        let left = e.beats(Lane::Left);
        assert!(left[..5].iter().all(|b| b.state == BeatState::Spawned));
        assert_eq!(left[5].state, BeatState::Pending);

        assert!(e.key_down("a", 10.0).is_some());
        e.tick(1300.0);
        assert_eq!(e.beats(Lane::Left)[0].state, BeatState::Hit(crate::engine::beat::Timing::Perfect));
        assert_eq!(e.beats(Lane::Left)[1].state, BeatState::Missed);
        assert_eq!(e.state().stats.miss, 1);
        assert_eq!(e.state().combo, 0);
    }

    #[test]
    fn time_limit_ends_game() {
        let tuning = Tuning {
            decay_per_sec: 0.0,
            ..Tuning::default()
        };
        let mut e = Engine::new(tuning, vec![level(5000.0)], 0.0).unwrap();
        e.tick(4999.0);
        assert!(e.state().is_playing());
        e.tick(5000.0);
        assert_eq!(
            e.state().phase,
            Phase::GameOver {
                result: GameResult::Lost(LossReason::TimeUp)
            }
        );
        // Terminal: further ticks change nothing.
        let before = e.state().clone();
        e.tick(9000.0);
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn gate_warning_is_rate_limited() {
        let tuning = Tuning {
            decay_per_sec: 0.0,
            ..Tuning::default()
        };
        let mut e = Engine::new(tuning, vec![level(60_000.0)], 0.0).unwrap();
        for t in [0.0, 500.0, 999.0, 1000.0] {
            e.tick(t);
        }
        let warnings = e
            .drain_events()
            .into_iter()
            .filter(|ev| matches!(ev, EngineEvent::GateWarning { .. }))
            .count();
        assert_eq!(warnings, 2);
    }
}
