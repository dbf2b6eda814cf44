use super::beat::{Beat, BeatState, Lane};
use crate::levels::LevelConfig;

/// Extra beats scheduled past the level duration so the lane never runs dry
/// while the last notes are still travelling.
pub const SCHEDULE_BUFFER: usize = 4;

/// Build the beat list for one lane of `level`.
///
/// Beat `i` lands at `start_delay + offset + i * beat_interval` and expects
/// `keys[i % len]`. Beats more than one interval in the past relative to
/// `current_ms` are dropped, so rescheduling mid-level does not resurrect
/// history the player can no longer reach.
pub fn schedule(level: &LevelConfig, lane: Lane, current_ms: f64) -> Vec<Beat> {
    let pattern = level.pattern(lane);
    if pattern.keys.is_empty() || level.beat_interval_ms <= 0.0 {
        return Vec::new();
    }
    let count = (level.duration_ms / level.beat_interval_ms).ceil().max(0.0) as usize + SCHEDULE_BUFFER;
    let base = pattern.start_delay_ms + pattern.offset_ms;
    (0..count)
        .filter_map(|i| {
            let t = base + i as f64 * level.beat_interval_ms;
            (t > current_ms - level.beat_interval_ms).then(|| Beat::new(t, lane, pattern.key_at(i)))
        })
        .collect()
}

/// Make pending beats visible once they are inside the lookahead window.
///
/// A beat enters the lane `lookahead_ms` before its scheduled time and stays
/// spawnable until `late_after_ms` past it, the point where the expiry sweep
/// would retire it anyway. Beats already beyond that point (the lane was
/// locked while they went by) stay `Pending` and never reach the judge.
/// Returns the indices that spawned.
pub fn spawn_due(beats: &mut [Beat], elapsed_ms: f64, lookahead_ms: f64, late_after_ms: f64) -> Vec<usize> {
    let mut spawned = Vec::new();
    for (idx, beat) in beats.iter_mut().enumerate() {
        if beat.state != BeatState::Pending {
            continue;
        }
        if beat.scheduled_ms - lookahead_ms > elapsed_ms {
            // Sorted by time: everything after this is further away.
            break;
        }
        if elapsed_ms <= beat.scheduled_ms + late_after_ms {
            beat.state = BeatState::Spawned;
            spawned.push(idx);
        }
    }
    spawned
}
