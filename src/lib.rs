//! Hellrun - a DOOM-themed side-scrolling action platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, tile collision, combat, level flow)
//! - `editor`: Level authoring and playtest hot-swap
//! - `renderer`: Frame snapshot handed to the drawing layer
//! - `platform`: Browser/native platform abstraction (input)
//! - `persistence`: LocalStorage-backed saves
//! - `backend`: Leaderboard score submission
//! - `tuning`: Data-driven game balance

pub mod backend;
pub mod editor;
pub mod highscores;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Edge length of one map tile in pixels
    pub const TILE_SIZE: f32 = 32.0;

    /// Upper bound on a single simulation step (seconds).
    /// A stalled tab must never integrate more than this in one frame.
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Nominal frame time used for the very first frame
    pub const NOMINAL_DT: f32 = 1.0 / 60.0;

    /// Viewport dimensions in pixels
    pub const VIEWPORT_WIDTH: f32 = 960.0;
    pub const VIEWPORT_HEIGHT: f32 = 540.0;

    /// Player body size
    pub const PLAYER_WIDTH: f32 = 24.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;

    /// Pickup and checkpoint body sizes
    pub const PICKUP_SIZE: f32 = 20.0;
    pub const CHECKPOINT_WIDTH: f32 = 24.0;
    pub const CHECKPOINT_HEIGHT: f32 = 48.0;

    /// LocalStorage keys
    pub const SETTINGS_KEY: &str = "hellrun_settings";
    pub const HIGHSCORES_KEY: &str = "hellrun_highscores";
    pub const PROGRESS_KEY: &str = "hellrun_progress";
}

/// Clamp a raw frame delta into a safe simulation step.
///
/// Negative, NaN and infinite deltas collapse to zero (an idempotent step);
/// anything above [`consts::MAX_FRAME_DT`] is clamped to it.
#[inline]
pub fn clamp_frame_dt(raw: f32) -> f32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    raw.min(consts::MAX_FRAME_DT)
}

/// Convert a pixel coordinate to a tile index
#[inline]
pub fn pixel_to_tile(pixel: f32) -> i32 {
    (pixel / consts::TILE_SIZE).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_frame_dt_degenerate() {
        assert_eq!(clamp_frame_dt(0.0), 0.0);
        assert_eq!(clamp_frame_dt(-0.5), 0.0);
        assert_eq!(clamp_frame_dt(f32::NAN), 0.0);
        assert_eq!(clamp_frame_dt(f32::INFINITY), 0.0);
        assert_eq!(clamp_frame_dt(0.016), 0.016);
    }

    #[test]
    fn test_pixel_to_tile_negative() {
        assert_eq!(pixel_to_tile(0.0), 0);
        assert_eq!(pixel_to_tile(31.9), 0);
        assert_eq!(pixel_to_tile(32.0), 1);
        assert_eq!(pixel_to_tile(-0.1), -1);
    }

    proptest! {
        #[test]
        fn prop_large_dt_clamps_to_max(raw in 0.1f32..1000.0) {
            prop_assert_eq!(clamp_frame_dt(raw), consts::MAX_FRAME_DT);
        }
    }
}
