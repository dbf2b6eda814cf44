//! Browser host: canvas, keyboard listener and the animation-frame loop.
//!
//! The engine lives in a `thread_local!` slot exactly once per page. Each frame
//! ticks it with `performance.now()`, forwards queued events to the optional
//! JS hook and redraws the canvas from a fresh snapshot. Key presses are judged
//! immediately with the event's own timestamp, between frames.

mod render;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, window};

use crate::engine::beat::Timing;
use crate::engine::{Engine, EngineEvent};

const CANVAS_ID: &str = "gc-canvas";
const CANVAS_W: u32 = 720;
const CANVAS_H: u32 = 520;

/// Short-lived text shown in the middle of the screen.
struct Flash {
    text: String,
    color: &'static str,
    start_ms: f64,
    duration_ms: f64,
}

/// Runtime page state.
struct WebGame {
    engine: Engine,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    // Last judgement per lane, drives the target ring flash.
    lane_flash: [Option<(Timing, f64)>; 2],
    feedback: Option<Flash>,
    banner: Option<Flash>,
    hook: Option<js_sys::Function>,
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Start with the default tuning and the built-in levels.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    let engine = Engine::with_builtin_levels(performance_now()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    launch(engine)
}

/// Start with page-supplied JSON. Either argument may be empty to keep the
/// defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(tuning_json: &str, levels_json: &str) -> Result<(), JsValue> {
    use crate::config::Tuning;
    use crate::levels::LevelConfig;

    let to_js = |e: crate::error::ConfigError| JsValue::from_str(&e.to_string());
    let tuning = if tuning_json.trim().is_empty() {
        Tuning::default()
    } else {
        Tuning::from_json(tuning_json).map_err(to_js)?
    };
    let levels = if levels_json.trim().is_empty() {
        crate::levels::builtin_levels()
    } else {
        LevelConfig::list_from_json(levels_json).map_err(to_js)?
    };
    let engine = Engine::new(tuning, levels, performance_now()).map_err(to_js)?;
    launch(engine)
}

/// Register a JS function called as `hook(kind, detail)` for every engine
/// event (sound effects, analytics). `detail` is a JSON string when the
/// `serde_json` feature is on, otherwise `null`.
#[wasm_bindgen]
pub fn set_event_hook(hook: js_sys::Function) {
    GAME.with(|cell| {
        if let Some(game) = cell.borrow_mut().as_mut() {
            game.hook = Some(hook);
        } else {
            log::warn!("set_event_hook called before start_game; ignored");
        }
    });
}

#[wasm_bindgen]
pub fn restart_game() {
    let now = performance_now();
    GAME.with(|cell| {
        if let Some(game) = cell.borrow_mut().as_mut() {
            game.engine.restart(now);
        }
    });
}

/// Current snapshot as JSON for custom renderers.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn snapshot_json() -> Option<String> {
    let now = performance_now();
    GAME.with(|cell| {
        let borrow = cell.borrow();
        let game = borrow.as_ref()?;
        match serde_json::to_string(&game.engine.snapshot(now)) {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("snapshot serialization failed: {e}");
                None
            }
        }
    })
}

fn launch(engine: Engine) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the game canvas
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_width(CANVAS_W);
        c.set_height(CANVAS_H);
        c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border-radius:18px; border:2px solid #222; background:#181818;").ok();
        match doc.body() {
            Some(body) => {
                body.append_child(&c)?;
            }
            None => log::warn!("document has no <body>; canvas created but not attached"),
        }
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into()?;
    ctx.set_text_align("center");

    let already_running = GAME.with(|cell| cell.borrow().is_some());
    GAME.with(|cell| {
        cell.replace(Some(WebGame {
            engine,
            canvas,
            ctx,
            lane_flash: [None, None],
            feedback: None,
            banner: None,
            hook: None,
        }))
    });
    if already_running {
        // Listener and frame loop are already installed; they pick up the new engine.
        return Ok(());
    }

    // Keyboard listener: every key goes to the engine, which ignores keys it
    // does not know.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if evt.repeat() {
                return;
            }
            let key = evt.key();
            let ts = evt.time_stamp();
            GAME.with(|cell| {
                if let Some(game) = cell.borrow_mut().as_mut() {
                    game.engine.key_down(&key, ts);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_loop();
    log::info!("gate cat started");
    Ok(())
}

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        run_frame(ts);
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    let Some(w) = window() else { return };
    if let Some(closure) = cb.borrow().as_ref() {
        let _ = w.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}

/// One animation frame. The hook runs after the `GAME` borrow is released so
/// it may call back into any export.
fn run_frame(now: f64) {
    let pending = GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let game = borrow.as_mut()?;
        let events = frame(game, now);
        Some((game.hook.clone(), events))
    });
    if let Some((Some(hook), events)) = pending {
        notify(&hook, &events);
    }
}

fn frame(game: &mut WebGame, now: f64) -> Vec<EngineEvent> {
    game.engine.tick(now);
    let events = game.engine.drain_events();
    for event in &events {
        on_event(game, event, now);
    }
    // Expire cosmetic overlays against the frame clock
    if game.feedback.as_ref().is_some_and(|f| now - f.start_ms > f.duration_ms) {
        game.feedback = None;
    }
    if game.banner.as_ref().is_some_and(|b| now - b.start_ms > b.duration_ms) {
        game.banner = None;
    }
    let snap = game.engine.snapshot(now);
    render::draw(game, &snap, now);
    events
}

fn on_event(game: &mut WebGame, event: &EngineEvent, now: f64) {
    log::debug!("event: {event:?}");
    match event {
        EngineEvent::Judged { outcome } | EngineEvent::BeatExpired { outcome } => {
            game.lane_flash[outcome.lane.index()] = Some((outcome.timing, now));
            game.feedback = Some(Flash {
                text: outcome.timing.label().to_string(),
                color: render::timing_color(outcome.timing),
                start_ms: now,
                duration_ms: 500.0,
            });
        }
        EngineEvent::LaneUnlocked => {
            game.banner = Some(Flash {
                text: "GATE STABLE! Right lane open".to_string(),
                color: "#7bd389",
                start_ms: now,
                duration_ms: 2000.0,
            });
        }
        EngineEvent::GateWarning { .. } => {
            game.feedback = Some(Flash {
                text: "GATE DROPPING!".to_string(),
                color: "#ff6b6b",
                start_ms: now,
                duration_ms: 500.0,
            });
        }
        EngineEvent::LevelStarted { index, name } => {
            game.lane_flash = [None, None];
            game.banner = Some(Flash {
                text: format!("Level {}: {}", index + 1, name),
                color: "#ffd166",
                start_ms: now,
                duration_ms: 2000.0,
            });
        }
        EngineEvent::Restarted => {
            game.feedback = None;
        }
        _ => {}
    }
}

fn notify(hook: &js_sys::Function, events: &[EngineEvent]) {
    for event in events {
        let detail = event_detail(event);
        if let Err(e) = hook.call2(&JsValue::NULL, &JsValue::from_str(event_kind(event)), &detail) {
            log::warn!("event hook threw: {e:?}");
        }
    }
}

fn event_kind(event: &EngineEvent) -> &'static str {
    match event {
        EngineEvent::BeatSpawned { .. } => "beat_spawned",
        EngineEvent::Judged { .. } => "judged",
        EngineEvent::BeatExpired { .. } => "beat_expired",
        EngineEvent::LaneUnlocked => "lane_unlocked",
        EngineEvent::LaneLocked => "lane_locked",
        EngineEvent::GateWarning { .. } => "gate_warning",
        EngineEvent::LevelStarted { .. } => "level_started",
        EngineEvent::LevelComplete { .. } => "level_complete",
        EngineEvent::GameOver { .. } => "game_over",
        EngineEvent::Restarted => "restarted",
    }
}

#[cfg(feature = "serde_json")]
fn event_detail(event: &EngineEvent) -> JsValue {
    serde_json::to_string(event)
        .map(|s| JsValue::from_str(&s))
        .unwrap_or(JsValue::NULL)
}

#[cfg(not(feature = "serde_json"))]
fn event_detail(_event: &EngineEvent) -> JsValue {
    JsValue::NULL
}
