// Level 3 definition
// Three-key rolls on both lanes at a faster tempo, judged a little tighter.
use super::{LanePattern, LevelConfig};
use crate::config::Judging;
use std::sync::OnceLock;

pub fn level3() -> &'static LevelConfig {
    static LD: OnceLock<LevelConfig> = OnceLock::new();
    LD.get_or_init(|| LevelConfig {
        id: 3,
        name: "Cross Rhythm".to_string(),
        beat_interval_ms: 600.0,
        left: LanePattern::new(&["a", "s", "d"], 4000.0, 0.0),
        right: LanePattern::new(&["j", "k", "l"], 4000.0, 300.0),
        duration_ms: 75_000.0,
        judging: Some(Judging::Overlap {
            span_ms: 260.0,
            consider: 20.0,
            okay: 45.0,
            perfect: 78.0,
        }),
    })
}
