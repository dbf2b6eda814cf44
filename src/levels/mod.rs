//! Level definitions: lane key patterns, tempo and time limit.
//! Built-in levels live one per file; pages may also supply their own list as
//! JSON (feature `serde_json`).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::beat::Lane;
use crate::error::ConfigError;
use crate::config::Judging;

mod level1;
mod level2;
mod level3;

/// Cyclic key sequence for one lane. Beat `i` expects `keys[i % keys.len()]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LanePattern {
    pub keys: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_delay_ms: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_ms: f64,
}

impl LanePattern {
    pub fn new(keys: &[&str], start_delay_ms: f64, offset_ms: f64) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_lowercase()).collect(),
            start_delay_ms,
            offset_ms,
        }
    }

    /// Key expected for the `i`-th beat of the lane.
    pub fn key_at(&self, i: usize) -> &str {
        &self.keys[i % self.keys.len()]
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    pub beat_interval_ms: f64,
    pub left: LanePattern,
    pub right: LanePattern,
    pub duration_ms: f64,
    /// Per-level override of the global judging thresholds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub judging: Option<Judging>,
}

impl LevelConfig {
    pub fn pattern(&self, lane: Lane) -> &LanePattern {
        match lane {
            Lane::Left => &self.left,
            Lane::Right => &self.right,
        }
    }

    pub fn validate(&self, restart_key: &str) -> Result<(), ConfigError> {
        if !(self.beat_interval_ms > 0.0) {
            return Err(ConfigError::NonPositiveInterval {
                level: self.name.clone(),
            });
        }
        if !(self.duration_ms > 0.0) {
            return Err(ConfigError::NonPositiveDuration {
                level: self.name.clone(),
            });
        }
        for lane in Lane::ALL {
            let p = self.pattern(lane);
            if p.keys.is_empty() || p.keys.iter().any(|k| k.is_empty()) {
                return Err(ConfigError::EmptyPattern {
                    level: self.name.clone(),
                });
            }
            if let Some(k) = p.keys.iter().find(|k| k.to_lowercase() == restart_key) {
                return Err(ConfigError::ReservedKey(k.clone()));
            }
        }
        if let Some(j) = &self.judging {
            j.validate()?;
        }
        Ok(())
    }

    /// Parse a JSON array of levels. Keys are lowercased on the way in.
    #[cfg(feature = "serde_json")]
    pub fn list_from_json(json: &str) -> Result<Vec<LevelConfig>, ConfigError> {
        let mut list: Vec<LevelConfig> =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        for level in &mut list {
            for k in level.left.keys.iter_mut().chain(level.right.keys.iter_mut()) {
                *k = k.to_lowercase();
            }
        }
        Ok(list)
    }
}

// Runtime-built static level list, mirroring the per-file `levelN()` getters.
pub fn levels() -> &'static [&'static LevelConfig] {
    use std::sync::OnceLock;
    static LEVELS_STATIC: OnceLock<&'static [&'static LevelConfig]> = OnceLock::new();
    LEVELS_STATIC.get_or_init(|| {
        let l1 = level1::level1();
        let l2 = level2::level2();
        let l3 = level3::level3();
        Box::leak(vec![l1, l2, l3].into_boxed_slice())
    })
}

/// Owned copy of the built-in campaign, ready to hand to `Engine::new`.
pub fn builtin_levels() -> Vec<LevelConfig> {
    levels().iter().map(|l| (*l).clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_levels_validate() {
        for lvl in levels() {
            assert!(lvl.validate("r").is_ok(), "level '{}' invalid", lvl.name);
        }
        assert_eq!(levels().len(), 3);
    }

    #[test]
    fn builtin_ids_are_sequential() {
        for (i, lvl) in levels().iter().enumerate() {
            assert_eq!(lvl.id as usize, i + 1);
        }
    }

    #[test]
    fn key_at_cycles() {
        let p = LanePattern::new(&["A", "s", "d"], 0.0, 0.0);
        assert_eq!(p.key_at(0), "a");
        assert_eq!(p.key_at(4), "s");
        assert!(p.contains("d"));
        assert!(!p.contains("A"));
    }

    #[test]
    fn restart_key_cannot_be_a_lane_key() {
        let mut lvl = (*levels()[0]).clone();
        lvl.right = LanePattern::new(&["r"], 0.0, 0.0);
        assert_eq!(lvl.validate("r"), Err(ConfigError::ReservedKey("r".into())));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn levels_parse_from_json() {
        let json = r#"[{
            "id": 9, "name": "Custom", "beat_interval_ms": 500, "duration_ms": 30000,
            "left": { "keys": ["Q"] },
            "right": { "keys": ["p", "o"], "start_delay_ms": 4000, "offset_ms": 250 }
        }]"#;
        let list = LevelConfig::list_from_json(json).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].left.keys, vec!["q".to_string()]);
        assert_eq!(list[0].right.offset_ms, 250.0);
        assert!(list[0].judging.is_none());
    }
}
