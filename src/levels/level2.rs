// Level 2 definition
// Two keys per lane; the right lane plays on the off-beat.
use super::{LanePattern, LevelConfig};
use std::sync::OnceLock;

pub fn level2() -> &'static LevelConfig {
    static LD: OnceLock<LevelConfig> = OnceLock::new();
    LD.get_or_init(|| LevelConfig {
        id: 2,
        name: "Double Step".to_string(),
        beat_interval_ms: 800.0,
        left: LanePattern::new(&["a", "s"], 4000.0, 0.0),
        right: LanePattern::new(&["l", "k"], 4000.0, 400.0),
        duration_ms: 80_000.0,
        judging: None,
    })
}
