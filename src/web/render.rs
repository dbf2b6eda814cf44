// Canvas drawing. Reads the snapshot only; never touches the engine.

use web_sys::CanvasRenderingContext2d;

use super::WebGame;
use crate::engine::Snapshot;
use crate::engine::beat::{Lane, Timing};
use crate::engine::state::{GameResult, GateBand, Phase};

const LANE_TOP: f64 = 150.0;
const TARGET_Y: f64 = 440.0;
const NOTE_R: f64 = 24.0;
const TARGET_R: f64 = 28.0;

pub(super) fn timing_color(t: Timing) -> &'static str {
    match t {
        Timing::Perfect => "#7bd389",
        Timing::Okay => "#ffd166",
        Timing::Miss => "#ff6b6b",
    }
}

fn band_color(b: GateBand) -> &'static str {
    match b {
        GateBand::Stable => "#7bd389",
        GateBand::Unstable => "#f4a261",
        GateBand::Critical => "#e63946",
    }
}

fn lane_x(width: f64, lane: Lane) -> f64 {
    match lane {
        Lane::Left => width * 0.3,
        Lane::Right => width * 0.7,
    }
}

pub(super) fn draw(game: &WebGame, snap: &Snapshot, now: f64) {
    let ctx = &game.ctx;
    let w = game.canvas.width() as f64;
    let h = game.canvas.height() as f64;

    set_fill(ctx, "#181818");
    ctx.fill_rect(0.0, 0.0, w, h);

    draw_meters(ctx, snap, w);
    for lane in Lane::ALL {
        draw_lane(game, snap, lane, w, now);
    }

    // Notes
    ctx.set_font("bold 22px 'Fira Code', monospace");
    for b in &snap.beats {
        let x = lane_x(w, b.lane);
        let y = LANE_TOP + (TARGET_Y - LANE_TOP) * b.progress.clamp(0.0, 1.2);
        set_fill(ctx, "#3a86ff");
        circle(ctx, x, y, NOTE_R);
        ctx.fill();
        set_fill(ctx, "#fff");
        ctx.fill_text(&b.key.to_uppercase(), x, y + 8.0).ok();
    }

    // Status line
    ctx.set_font("15px 'Fira Code', monospace");
    set_fill(ctx, "#ffd166");
    ctx.fill_text(&format!("Score: {}", snap.score), w * 0.15, 28.0).ok();
    ctx.fill_text(
        &format!("Level {}/{}", snap.level_index + 1, snap.level_count),
        w * 0.5,
        28.0,
    )
    .ok();
    ctx.fill_text(
        &format!("Time {:.0}s", (snap.level_remaining_ms / 1000.0).ceil()),
        w * 0.85,
        28.0,
    )
    .ok();
    if snap.combo > 1 {
        ctx.fill_text(&format!("Combo x{}", snap.combo), w * 0.5, h - 20.0).ok();
    }

    if let Some(f) = &game.feedback {
        let alpha = 1.0 - ((now - f.start_ms) / f.duration_ms).clamp(0.0, 1.0);
        ctx.set_global_alpha(alpha);
        ctx.set_font("bold 34px 'Fira Code', monospace");
        set_fill(ctx, f.color);
        ctx.fill_text(&f.text, w * 0.5, h * 0.5).ok();
        ctx.set_global_alpha(1.0);
    }
    if let Some(b) = &game.banner {
        ctx.set_font("bold 20px 'Fira Code', monospace");
        set_fill(ctx, b.color);
        ctx.fill_text(&b.text, w * 0.5, 128.0).ok();
    }

    draw_phase_overlay(ctx, snap, w, h);
}

fn draw_meters(ctx: &CanvasRenderingContext2d, snap: &Snapshot, w: f64) {
    let bar_x = w * 0.1;
    let bar_w = w * 0.8;

    // Gate stability bar
    set_fill(ctx, "#2a2a2a");
    ctx.fill_rect(bar_x, 48.0, bar_w, 16.0);
    set_fill(ctx, band_color(snap.gate_band));
    ctx.fill_rect(bar_x, 48.0, bar_w * snap.gate_stability / 100.0, 16.0);
    ctx.set_font("12px 'Fira Code', monospace");
    set_fill(ctx, "#ddd");
    ctx.fill_text(&format!("GATE {}%", snap.gate_stability.floor()), w * 0.5, 60.0).ok();

    // Mover track: cat walks left to right toward the door
    set_fill(ctx, "#2a2a2a");
    ctx.fill_rect(bar_x, 84.0, bar_w, 6.0);
    set_fill(ctx, if snap.goal_near { "#ffd166" } else { "#555" });
    ctx.fill_rect(bar_x + bar_w - 8.0, 72.0, 16.0, 30.0);
    ctx.set_font("24px serif");
    ctx.fill_text("🐈", bar_x + bar_w * snap.mover_progress / 100.0, 94.0).ok();
}

fn draw_lane(game: &WebGame, snap: &Snapshot, lane: Lane, w: f64, now: f64) {
    let ctx = &game.ctx;
    let x = lane_x(w, lane);
    let locked = lane == Lane::Right && !snap.right_lane_unlocked;

    ctx.set_stroke_style_str(if locked { "#2b2b2b" } else { "#444" });
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(x, LANE_TOP - 10.0);
    ctx.line_to(x, TARGET_Y + TARGET_R);
    ctx.stroke();

    // Target ring, flashing in the colour of the last judgement for 200ms
    let ring = match game.lane_flash[lane.index()] {
        Some((t, at)) if now - at < 200.0 => timing_color(t),
        _ if locked => "#333",
        _ => "#bbb",
    };
    ctx.set_stroke_style_str(ring);
    ctx.set_line_width(4.0);
    circle(ctx, x, TARGET_Y, TARGET_R);
    ctx.stroke();

    if locked {
        ctx.set_font("14px 'Fira Code', monospace");
        set_fill(ctx, "#666");
        ctx.fill_text("LOCKED", x, (LANE_TOP + TARGET_Y) / 2.0).ok();
    }
}

fn draw_phase_overlay(ctx: &CanvasRenderingContext2d, snap: &Snapshot, w: f64, h: f64) {
    let (title, sub) = match snap.phase {
        Phase::Playing => return,
        Phase::LevelComplete { .. } => ("LEVEL CLEAR!".to_string(), "Get ready...".to_string()),
        Phase::GameOver { result: GameResult::Won } => {
            ("YOU WIN!".to_string(), format!("Score {}  -  press R to play again", snap.score))
        }
        Phase::GameOver {
            result: GameResult::Lost(reason),
        } => (
            "GAME OVER".to_string(),
            format!("{}  Score {}  -  press R to restart", reason.message(), snap.score),
        ),
    };
    set_fill(ctx, "rgba(0,0,0,0.65)");
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.set_font("bold 44px 'Fira Code', monospace");
    set_fill(ctx, "#ffd166");
    ctx.fill_text(&title, w * 0.5, h * 0.45).ok();
    ctx.set_font("16px 'Fira Code', monospace");
    set_fill(ctx, "#ddd");
    ctx.fill_text(&sub, w * 0.5, h * 0.45 + 40.0).ok();
}

fn set_fill(ctx: &CanvasRenderingContext2d, color: &str) {
    ctx.set_fill_style_str(color);
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
    ctx.begin_path();
    ctx.arc(x, y, r, 0.0, std::f64::consts::TAU).ok();
}
