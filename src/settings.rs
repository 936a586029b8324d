//! Job-level configuration (spec §6 "Settings").

use serde::{Deserialize, Serialize};

/// Scales every spring half-life used by the zoom planner (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    Mellow,
    Quick,
    Rapid,
}

impl AnimationSpeed {
    pub fn multiplier(self) -> f64 {
        match self {
            AnimationSpeed::Slow => 1.5,
            AnimationSpeed::Mellow => 1.0,
            AnimationSpeed::Quick => 0.7,
            AnimationSpeed::Rapid => 0.5,
        }
    }
}

impl Default for AnimationSpeed {
    fn default() -> Self {
        AnimationSpeed::Mellow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    Display,
    Window,
    Area,
}

impl Default for RecordingMode {
    fn default() -> Self {
        RecordingMode::Display
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Gradient,
    Solid,
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color { r: 20, g: 20, b: 28 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    pub kind: BackgroundKind,
    pub start_color: Color,
    pub end_color: Color,
    pub angle_deg: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig {
            kind: BackgroundKind::Gradient,
            start_color: Color { r: 30, g: 30, b: 46 },
            end_color: Color { r: 10, g: 10, b: 18 },
            angle_deg: 135.0,
        }
    }
}

/// Mirrors spec §6's settings list 1:1; every field has the documented
/// default so a partial `drift.toml` is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auto_zoom_enabled: bool,
    pub max_zoom: f64,
    pub animation_speed: AnimationSpeed,
    pub zoom_out_idle_ms: f64,
    pub overview_idle_ms: f64,
    pub click_ring_enabled: bool,
    pub key_badge_enabled: bool,
    pub cursor_smoothing: bool,
    pub border_radius: u32,
    pub shadow_enabled: bool,
    pub background: BackgroundConfig,
    pub recording_mode: RecordingMode,
    pub output_width: u32,
    pub output_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_zoom_enabled: true,
            max_zoom: 3.0,
            animation_speed: AnimationSpeed::Mellow,
            zoom_out_idle_ms: 5_000.0,
            overview_idle_ms: 8_000.0,
            click_ring_enabled: true,
            key_badge_enabled: true,
            cursor_smoothing: true,
            border_radius: 18,
            shadow_enabled: true,
            background: BackgroundConfig::default(),
            recording_mode: RecordingMode::Display,
            output_width: 1920,
            output_height: 1080,
        }
    }
}

impl Settings {
    /// Loads a TOML config file, falling back to defaults for absent fields.
    pub fn load_from_str(text: &str) -> anyhow::Result<Settings> {
        let settings: Settings = toml::from_str(text)?;
        Ok(settings)
    }
}
