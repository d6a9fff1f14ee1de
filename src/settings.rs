//! Game settings and preferences
//!
//! Persisted separately from progress and high scores.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::storage;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }

    /// Whether to draw the parallax hell backdrop
    pub fn backdrop_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Blood, sparks and explosion debris
    pub particles: bool,
    /// Flash sprites white when hit
    pub hurt_flash: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes, no particles)
    pub reduced_motion: bool,
    /// High contrast mode
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            particles: true,
            hurt_flash: true,

            show_fps: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.6,
            mute_on_blur: true,

            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.hurt_flash = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective hurt flash (respects reduced_motion)
    pub fn effective_hurt_flash(&self) -> bool {
        self.hurt_flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles || self.reduced_motion {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Volume for sound effects after the master scale, 0 when muted
    pub fn effective_sfx_volume(&self, focused: bool) -> f32 {
        if self.mute_on_blur && !focused {
            return 0.0;
        }
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Music volume after the master scale, 0 when muted
    pub fn effective_music_volume(&self, focused: bool) -> f32 {
        if self.mute_on_blur && !focused {
            return 0.0;
        }
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Backdrop is drawn on Medium and up, never with reduced motion
    pub fn backdrop(&self) -> bool {
        self.quality.backdrop_enabled() && !self.reduced_motion
    }

    pub fn load() -> Self {
        match storage::load::<Settings>(SETTINGS_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        match storage::save(SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_effects() {
        let mut s = Settings::default();
        assert!(s.effective_screen_shake());
        assert!(s.max_particles() > 0);
        s.reduced_motion = true;
        assert!(!s.effective_screen_shake());
        assert!(!s.effective_hurt_flash());
        assert_eq!(s.max_particles(), 0);
    }

    #[test]
    fn test_preset_caps_particles() {
        assert!(Settings::from_preset(QualityPreset::Low).max_particles() < Settings::from_preset(QualityPreset::High).max_particles());
        assert!(!Settings::from_preset(QualityPreset::Low).hurt_flash);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_mute_on_blur() {
        let s = Settings::default();
        assert_eq!(s.effective_sfx_volume(false), 0.0);
        assert!((s.effective_sfx_volume(true) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_music_volume_scales_and_mutes() {
        let s = Settings {
            master_volume: 0.5,
            music_volume: 0.6,
            ..Settings::default()
        };
        assert!((s.effective_music_volume(true) - 0.3).abs() < 1e-6);
        assert_eq!(s.effective_music_volume(false), 0.0);
    }

    #[test]
    fn test_backdrop_follows_quality() {
        let mut s = Settings::default();
        s.apply_preset(QualityPreset::Low);
        assert!(!s.backdrop());
        s.apply_preset(QualityPreset::High);
        assert!(s.backdrop());
        s.reduced_motion = true;
        assert!(!s.backdrop());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{"quality":"High","reduced_motion":true}"#).unwrap();
        assert_eq!(s.quality, QualityPreset::High);
        assert!(s.reduced_motion);
        assert!(s.particles);
    }

    #[test]
    fn test_save_and_load() {
        let mut s = Settings::default();
        s.music_volume = 0.25;
        s.save();
        assert_eq!(Settings::load(), s);
    }
}
