// Browser smoke tests. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn start_game_creates_canvas() {
    gate_cat::web::start_game().expect("start_game failed");
    let doc = web_sys::window().unwrap().document().unwrap();
    assert!(doc.get_element_by_id("gc-canvas").is_some());
}

#[wasm_bindgen_test]
fn engine_runs_in_wasm() {
    let mut e = gate_cat::Engine::with_builtin_levels(0.0).unwrap();
    e.tick(0.0);
    assert_eq!(e.key_down("a", 4000.0).map(|o| o.timing), Some(gate_cat::Timing::Perfect));
}
