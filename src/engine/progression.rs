//! Level sequencing: start, clear, win and loss transitions.

use super::beat::Lane;
use super::scheduler::schedule;
use super::state::{GameResult, Phase};
use super::{Engine, EngineEvent};

impl Engine {
    /// Reset the clock, schedules and meters for level `index`.
    pub(super) fn start_level(&mut self, index: usize, now: f64) {
        self.clock.restart(now);
        self.state.begin_level(index, &self.tuning);
        let level = &self.levels[index];
        self.lanes = [schedule(level, Lane::Left, 0.0), schedule(level, Lane::Right, 0.0)];
        self.decayed_to_ms = 0.0;
        self.warning_ready_ms = 0.0;
        log::info!(
            "level {} '{}' started ({} + {} beats)",
            level.id,
            level.name,
            self.lanes[0].len(),
            self.lanes[1].len()
        );
        self.events.push(EngineEvent::LevelStarted {
            index,
            name: level.name.clone(),
        });
    }

    /// Win check. Clearing the last level wins the game; otherwise the next
    /// level starts once the intermission has passed.
    pub(super) fn check_win(&mut self, now: f64) -> bool {
        if !self.state.is_playing() || !self.state.has_won_level(self.tuning.unlock_threshold) {
            return false;
        }
        let index = self.state.level_index;
        log::info!("level {} cleared with score {}", index + 1, self.state.score);
        self.events.push(EngineEvent::LevelComplete { index });
        if index + 1 < self.levels.len() {
            self.state.phase = Phase::LevelComplete { since_ms: now };
        } else {
            self.state.score = self.state.score.saturating_add(self.tuning.win_bonus);
            self.game_over(GameResult::Won);
        }
        true
    }

    pub(super) fn game_over(&mut self, result: GameResult) {
        match result {
            GameResult::Won => log::info!("game won, final score {}", self.state.score),
            GameResult::Lost(reason) => {
                log::info!("game lost: {} (score {})", reason.message(), self.state.score)
            }
        }
        self.state.phase = Phase::GameOver { result };
        self.events.push(EngineEvent::GameOver {
            result,
            score: self.state.score,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Tuning;
    use crate::engine::beat::{Lane, Timing};
    use crate::engine::state::{GameResult, Phase};
    use crate::engine::{Engine, EngineEvent};
    use crate::levels::{LanePattern, LevelConfig};

    fn level(id: u32) -> LevelConfig {
        LevelConfig {
            id,
            name: format!("L{id}"),
            beat_interval_ms: 1000.0,
            left: LanePattern::new(&["a"], 4000.0, 0.0),
            right: LanePattern::new(&["l"], 4000.0, 0.0),
            duration_ms: 60_000.0,
            judging: None,
        }
    }

    fn tuning() -> Tuning {
        Tuning {
            start_gate: 60.0,
            decay_per_sec: 0.0,
            mover_gain_perfect: 100.0,
            intermission_ms: 1000.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn clearing_a_level_advances_after_intermission() {
        let mut e = Engine::new(tuning(), vec![level(1), level(2)], 0.0).unwrap();
        e.tick(0.0);
        e.state.score = 500;
        let out = e.key_down("l", 4000.0).unwrap();
        assert_eq!((out.lane, out.timing), (Lane::Right, Timing::Perfect));
        assert_eq!(e.state().phase, Phase::LevelComplete { since_ms: 4000.0 });
        // Input is ignored during the intermission.
        assert_eq!(e.key_down("a", 4100.0), None);
        e.tick(4500.0);
        assert!(!e.state().is_playing());
        e.tick(5000.0);
        assert!(e.state().is_playing());
        assert_eq!(e.state().level_index, 1);
        assert_eq!(e.state().mover_progress, 0.0);
        assert_eq!(e.state().score, 520);
        assert_eq!(e.elapsed(5000.0), 0.0);
        let events = e.drain_events();
        assert!(events.contains(&EngineEvent::LevelComplete { index: 0 }));
        assert!(matches!(events.last(), Some(EngineEvent::LevelStarted { index: 1, .. })));
    }

    #[test]
    fn clearing_last_level_wins_with_bonus() {
        let mut e = Engine::new(tuning(), vec![level(1)], 0.0).unwrap();
        e.tick(0.0);
        e.key_down("l", 4000.0);
        assert_eq!(e.state().phase, Phase::GameOver { result: GameResult::Won });
        assert_eq!(e.state().score, 20 + 200);
    }
}
