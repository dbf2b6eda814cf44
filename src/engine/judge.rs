//! Matching key presses to beats, and retiring beats nobody answered.
//!
//! Both functions work on one lane's beat list and only ever touch beats in
//! the `Spawned` state, so a resolved beat can never be judged twice.

use super::beat::{Beat, BeatState, Outcome, Timing};
use crate::config::Judging;

/// Judge a press of `key` (already lowercased) at level time `elapsed_ms`.
///
/// Picks the spawned beat with the best match score under `judging`; ties go
/// to the first beat in lane order. Returns `None` when no beat is in reach,
/// which is not a miss and changes nothing.
pub fn judge(beats: &mut [Beat], key: &str, elapsed_ms: f64, judging: &Judging) -> Option<Outcome> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, beat) in beats.iter().enumerate() {
        if beat.state != BeatState::Spawned || beat.required_key != key {
            continue;
        }
        let Some(quality) = judging.score(elapsed_ms - beat.scheduled_ms) else {
            continue;
        };
        if let Some((_, best_q)) = best {
            if quality <= best_q {
                continue;
            }
        }
        best = Some((idx, quality));
    }

    let (idx, _) = best?;
    let beat = &mut beats[idx];
    let timing = judging.classify(elapsed_ms - beat.scheduled_ms);
    if !beat.resolve(BeatState::Hit(timing)) {
        return None;
    }
    log::debug!(
        "judged {} beat #{idx} key '{key}' at {:.0}ms (target {:.0}ms): {:?}",
        beat.lane.name(),
        elapsed_ms,
        beat.scheduled_ms,
        timing
    );
    Some(Outcome {
        lane: beat.lane,
        beat: idx,
        timing,
    })
}

/// Force every spawned beat that is past its hittable range to `Missed`.
/// Already-resolved beats are skipped, so repeated sweeps are no-ops.
pub fn expire(beats: &mut [Beat], elapsed_ms: f64, judging: &Judging) -> Vec<Outcome> {
    let late_after = judging.expire_after_ms();
    let mut missed = Vec::new();
    for (idx, beat) in beats.iter_mut().enumerate() {
        if beat.state != BeatState::Spawned {
            continue;
        }
        if elapsed_ms > beat.scheduled_ms + late_after && beat.resolve(BeatState::Missed) {
            missed.push(Outcome {
                lane: beat.lane,
                beat: idx,
                timing: Timing::Miss,
            });
        }
    }
    missed
}
