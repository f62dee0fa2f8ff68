//! Platform abstraction layer
//!
//! Native hosts drive `Session` directly. On the web, `web` exports free
//! functions a JS host calls from its pointer handlers and animation frame.

#[cfg(target_arch = "wasm32")]
pub mod web;
