// Level 1 definition
// One key per lane, one beat per second. The first note enters the lane as
// the level starts.
use super::{LanePattern, LevelConfig};
use std::sync::OnceLock;

pub fn level1() -> &'static LevelConfig {
    static LD: OnceLock<LevelConfig> = OnceLock::new();
    LD.get_or_init(|| LevelConfig {
        id: 1,
        name: "Plank Practice".to_string(),
        beat_interval_ms: 1000.0,
        left: LanePattern::new(&["a"], 4000.0, 0.0),
        right: LanePattern::new(&["l"], 4000.0, 0.0),
        duration_ms: 90_000.0,
        judging: None,
    })
}
