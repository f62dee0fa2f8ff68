//! Browser bindings
//!
//! wasm-bindgen cannot export generic structs, so the session lives in a
//! thread-local and JS calls free functions. Snapshots and events cross the
//! boundary as JSON strings.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::persistence::LocalStorageStore;
use crate::session::Session;
use crate::settings::Settings;

thread_local! {
    static SESSION: RefCell<Option<Session<LocalStorageStore>>> = const { RefCell::new(None) };
}

/// Run `f` against the session; does nothing before `cascade_init`
fn with_session<R: Default>(f: impl FnOnce(&mut Session<LocalStorageStore>) -> R) -> R {
    SESSION.with(|cell| match cell.borrow_mut().as_mut() {
        Some(session) => f(session),
        None => {
            log::warn!("cascade_init() has not been called");
            R::default()
        }
    })
}

#[wasm_bindgen]
pub fn cascade_init(seed: f64) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let session = Session::new(Settings::load(), LocalStorageStore, seed as u64);
    SESSION.with(|cell| *cell.borrow_mut() = Some(session));
    log::info!("Color Cascade: initialized");
}

#[wasm_bindgen]
pub fn cascade_new_game() {
    with_session(|s| s.start_new_game());
}

#[wasm_bindgen]
pub fn cascade_toggle_pause() {
    with_session(|s| s.toggle_pause());
}

/// Called once per animation frame with the elapsed milliseconds
#[wasm_bindgen]
pub fn cascade_frame(frame_ms: f32) -> u32 {
    with_session(|s| s.advance(frame_ms))
}

#[wasm_bindgen]
pub fn cascade_pointer_down(x: f32, y: f32) {
    with_session(|s| s.pointer_down(x, y));
}

#[wasm_bindgen]
pub fn cascade_pointer_move(x: f32, y: f32) {
    with_session(|s| s.pointer_move(x, y));
}

/// Returns true if a barrier was created
#[wasm_bindgen]
pub fn cascade_pointer_up(x: f32, y: f32) -> bool {
    with_session(|s| s.pointer_up(x, y).is_ok())
}

#[wasm_bindgen]
pub fn cascade_pointer_leave() -> bool {
    with_session(|s| s.pointer_cancel().is_ok())
}

/// Current render state as JSON
#[wasm_bindgen]
pub fn cascade_snapshot() -> String {
    with_session(|s| serde_json::to_string(&s.snapshot()).unwrap_or_default())
}

/// Events since the last call, as a JSON array
#[wasm_bindgen]
pub fn cascade_events() -> String {
    with_session(|s| serde_json::to_string(&s.drain_events()).unwrap_or_default())
}
