//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events
//! - Wall-clock time
//!
//! Storage lives in `persistence::storage`.

pub mod input;

pub use input::{Action, InputState};

/// Wall-clock Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
