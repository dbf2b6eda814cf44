//! Gameplay tuning. Every constant the engine reads lives here so a page can
//! ship its own balance as JSON without rebuilding the wasm module.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::beat::Timing;
use crate::error::ConfigError;

/// How a key press is matched and graded.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "lowercase"))]
pub enum Judging {
    /// Geometric model: overlap (0..=100) between the note and the lane
    /// target, falling linearly from 100 at zero offset to 0 at `span_ms`.
    Overlap {
        span_ms: f64,
        consider: f64, // minimum overlap for a beat to be matched at all
        okay: f64,
        perfect: f64,
    },
    /// Time-delta model: absolute distance to the scheduled time.
    Window {
        perfect_ms: f64,
        okay_ms: f64,
        miss_ms: f64,
    },
}

impl Default for Judging {
    fn default() -> Self {
        Judging::Overlap {
            span_ms: 300.0,
            consider: 18.0,
            okay: 40.0,
            perfect: 75.0,
        }
    }
}

impl Judging {
    /// Overlap percentage of a beat `delta_ms` away from the target.
    /// Only meaningful for the overlap model; the window model reports 100/0.
    pub fn overlap(&self, delta_ms: f64) -> f64 {
        match *self {
            Judging::Overlap { span_ms, .. } => {
                if span_ms <= 0.0 {
                    return 0.0;
                }
                (100.0 * (1.0 - delta_ms.abs() / span_ms)).clamp(0.0, 100.0)
            }
            Judging::Window { miss_ms, .. } => {
                if delta_ms.abs() <= miss_ms { 100.0 } else { 0.0 }
            }
        }
    }

    /// Match quality of a press `delta_ms` away from the beat. `None` means the
    /// beat is out of reach and must not be considered. Higher is better.
    pub fn score(&self, delta_ms: f64) -> Option<f64> {
        match *self {
            Judging::Overlap { consider, .. } => {
                let o = self.overlap(delta_ms);
                (o > 0.0 && o >= consider).then_some(o)
            }
            Judging::Window { miss_ms, .. } => {
                let d = delta_ms.abs();
                (d <= miss_ms).then_some(-d)
            }
        }
    }

    pub fn classify(&self, delta_ms: f64) -> Timing {
        match *self {
            Judging::Overlap { okay, perfect, .. } => {
                let o = self.overlap(delta_ms);
                if o >= perfect {
                    Timing::Perfect
                } else if o >= okay {
                    Timing::Okay
                } else {
                    Timing::Miss
                }
            }
            Judging::Window {
                perfect_ms,
                okay_ms,
                ..
            } => {
                let d = delta_ms.abs();
                if d <= perfect_ms {
                    Timing::Perfect
                } else if d <= okay_ms {
                    Timing::Okay
                } else {
                    Timing::Miss
                }
            }
        }
    }

    /// How long after its scheduled time an unanswered beat stays hittable.
    pub fn expire_after_ms(&self) -> f64 {
        match *self {
            Judging::Overlap {
                span_ms, consider, ..
            } => span_ms * (1.0 - consider / 100.0),
            Judging::Window { okay_ms, .. } => okay_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = match *self {
            Judging::Overlap {
                span_ms,
                consider,
                okay,
                perfect,
            } => {
                span_ms > 0.0
                    && (0.0..=100.0).contains(&consider)
                    && consider <= okay
                    && okay <= perfect
                    && perfect <= 100.0
            }
            Judging::Window {
                perfect_ms,
                okay_ms,
                miss_ms,
            } => 0.0 <= perfect_ms && perfect_ms < okay_ms && okay_ms < miss_ms,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidThresholds(format!("{self:?}")))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tuning {
    // --- Meters ---
    pub start_gate: f64,
    pub unlock_threshold: f64,
    pub grace_ms: f64,
    pub decay_per_sec: f64,
    pub gate_gain_perfect: f64,
    pub gate_gain_okay: f64,
    pub mover_gain_perfect: f64,
    pub mover_gain_okay: f64,
    // --- Score ---
    pub score_perfect: u32,
    pub score_okay: u32,
    pub win_bonus: u32,
    // --- Beat travel ---
    pub lookahead_ms: f64,
    pub judging: Judging,
    // --- Presentation cues ---
    pub warning_below: f64,
    pub warning_cooldown_ms: f64,
    pub goal_glow_at: f64,
    pub intermission_ms: f64,
    pub restart_key: String,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_gate: 20.0,
            unlock_threshold: 60.0,
            grace_ms: 2000.0,
            decay_per_sec: 6.0,
            gate_gain_perfect: 12.0,
            gate_gain_okay: 7.0,
            mover_gain_perfect: 9.0,
            mover_gain_okay: 5.0,
            score_perfect: 20,
            score_okay: 10,
            win_bonus: 200,
            lookahead_ms: 4000.0,
            judging: Judging::default(),
            warning_below: 25.0,
            warning_cooldown_ms: 1000.0,
            goal_glow_at: 80.0,
            intermission_ms: 1500.0,
            restart_key: "r".to_string(),
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.judging.validate()?;
        let meters_ok = (0.0..=100.0).contains(&self.start_gate)
            && (0.0..=100.0).contains(&self.unlock_threshold)
            && self.decay_per_sec >= 0.0
            && self.grace_ms >= 0.0
            && self.lookahead_ms > 0.0;
        if !meters_ok {
            return Err(ConfigError::InvalidThresholds(
                "meter, decay or lookahead settings out of range".into(),
            ));
        }
        if self.restart_key.chars().count() != 1 {
            return Err(ConfigError::ReservedKey(self.restart_key.clone()));
        }
        Ok(())
    }

    /// Restart key, lowercase.
    pub fn restart_key(&self) -> String {
        self.restart_key.to_lowercase()
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn overlap_classification_bands() {
        let j = Judging::default();
        // span 300: perfect within 75ms, okay within 180ms, considered within 246ms
        assert_eq!(j.classify(0.0), Timing::Perfect);
        assert_eq!(j.classify(-70.0), Timing::Perfect);
        assert_eq!(j.classify(150.0), Timing::Okay);
        assert_eq!(j.classify(200.0), Timing::Miss);
        assert!(j.score(240.0).is_some());
        assert!(j.score(250.0).is_none());
        assert!((j.expire_after_ms() - 246.0).abs() < 1e-9);
    }

    #[test]
    fn window_prefers_smaller_distance() {
        let j = Judging::Window {
            perfect_ms: 120.0,
            okay_ms: 200.0,
            miss_ms: 300.0,
        };
        assert!(j.score(50.0) > j.score(-100.0));
        assert_eq!(j.score(301.0), None);
        assert_eq!(j.classify(120.0), Timing::Perfect);
        assert_eq!(j.classify(-199.0), Timing::Okay);
        assert_eq!(j.classify(250.0), Timing::Miss);
        assert_eq!(j.expire_after_ms(), 200.0);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let j = Judging::Overlap {
            span_ms: 300.0,
            consider: 50.0,
            okay: 40.0,
            perfect: 75.0,
        };
        assert!(matches!(j.validate(), Err(ConfigError::InvalidThresholds(_))));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "decay_per_sec": 3.5, "judging": { "mode": "window", "perfect_ms": 100, "okay_ms": 180, "miss_ms": 260 } }"#)
            .unwrap();
        assert_eq!(t.decay_per_sec, 3.5);
        assert_eq!(t.start_gate, 20.0);
        assert!(matches!(t.judging, Judging::Window { .. }));
    }
}
