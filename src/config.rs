//! Tunable constants for a round, grouped by the component that reads them.
//!
//! Every group implements `Default` with the values the game ships with, and the
//! whole tree is `#[serde(default)]` so the page can override a handful of fields
//! through `start_game_with_config` without restating the rest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub input: InputConfig,
    pub travel: TravelConfig,
    pub particles: ParticleConfig,
    pub shake: ShakeConfig,
    pub overlay: OverlayConfig,
    pub render: RenderConfig,
    pub dom: DomConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of concentric rings around the player.
    pub layers: u32,
    /// Ring spacing is `min(width, height) / radius_divisor`.
    pub radius_divisor: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { layers: 3, radius_divisor: 6.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub hit_radius: f64,       // exclusive
    pub near_miss_radius: f64, // exclusive
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { hit_radius: 50.0, near_miss_radius: 20.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Progress added per frame; 0.01 means the kick lasts ~100 frames.
    pub step: f64,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self { step: 0.01 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub gravity: f64,
    pub decay: f64,
    pub palette: Vec<String>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            gravity: 0.2,
            decay: 0.02,
            palette: ["#FFD700", "#FF6B6B", "#4CAF50", "#64B5F6", "#BA68C8"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    pub ticks: u32,
    pub offset: f64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self { ticks: 6, offset: 5.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Delay between the ball landing and the message appearing.
    pub delay_ms: f64,
    pub text: String,
    pub fade_step: f64,
    pub reset_label: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000.0,
            text: "NICE HIT!".to_string(),
            fade_step: 0.05,
            reset_label: "返回".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub trail_len: usize,
    pub ball_size: f64,
    /// Ball sits this far above the footprint anchor.
    pub ball_lift: f64,
    pub marker_radius: f64,
    pub footprint_font: String,
    pub footprint_glyph: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trail_len: 8,
            ball_size: 40.0,
            ball_lift: 40.0,
            marker_radius: 12.0,
            footprint_font: "60px Arial".to_string(),
            footprint_glyph: "👣".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomConfig {
    pub canvas_id: String,
    pub start_button_id: String,
    pub ball_src: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            canvas_id: "gameCanvas".to_string(),
            start_button_id: "startButton".to_string(),
            ball_src: "./足球.png".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.layers == 0 || self.grid.layers > MAX_LAYERS {
            return Err(ConfigError::Invalid("grid.layers must be between 1 and 64"));
        }
        if !positive(self.grid.radius_divisor) {
            return Err(ConfigError::Invalid("grid.radius_divisor must be positive"));
        }
        if !positive(self.input.hit_radius) || !positive(self.input.near_miss_radius) {
            return Err(ConfigError::Invalid("input radii must be positive"));
        }
        if !positive(self.travel.step) {
            return Err(ConfigError::Invalid("travel.step must be positive"));
        }
        if !positive(self.particles.decay) {
            return Err(ConfigError::Invalid("particles.decay must be positive"));
        }
        if !self.particles.gravity.is_finite() {
            return Err(ConfigError::Invalid("particles.gravity must be finite"));
        }
        if self.particles.count > MAX_PARTICLES {
            return Err(ConfigError::Invalid("particles.count must be at most 10000"));
        }
        if self.particles.palette.is_empty() {
            return Err(ConfigError::Invalid("particles.palette must not be empty"));
        }
        if !self.shake.offset.is_finite() {
            return Err(ConfigError::Invalid("shake.offset must be finite"));
        }
        if !(self.overlay.delay_ms >= 0.0 && self.overlay.delay_ms.is_finite()) {
            return Err(ConfigError::Invalid("overlay.delay_ms must be a non-negative number"));
        }
        if !positive(self.overlay.fade_step) {
            return Err(ConfigError::Invalid("overlay.fade_step must be positive"));
        }
        let r = &self.render;
        if ![r.ball_size, r.ball_lift, r.marker_radius].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid("render sizes must be finite"));
        }
        Ok(())
    }
}

/// Upper bound on rings; the grid holds `4 * n * (n + 1)` positions.
pub const MAX_LAYERS: u32 = 64;
pub const MAX_PARTICLES: usize = 10_000;

/// Finite and strictly above zero. NaN fails.
fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.grid.layers, 3);
        assert_eq!(cfg.particles.palette.len(), 5);
        assert_eq!(cfg.overlay.text, "NICE HIT!");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = GameConfig::from_json(r#"{"grid":{"layers":4},"overlay":{"text":"GOAL!"}}"#)
            .unwrap();
        assert_eq!(cfg.grid.layers, 4);
        assert_eq!(cfg.grid.radius_divisor, 6.0);
        assert_eq!(cfg.overlay.text, "GOAL!");
        assert_eq!(cfg.overlay.delay_ms, 1000.0);
        assert_eq!(cfg.input, InputConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{"grid":{"layers":0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"particles":{"palette":[]}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(GameConfig::from_json("{not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn rejects_oversized_grid() {
        assert!(matches!(
            GameConfig::from_json(r#"{"grid":{"layers":4000000000}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(GameConfig::from_json(r#"{"grid":{"layers":64}}"#).is_ok());
        assert!(GameConfig::from_json(r#"{"grid":{"layers":65}}"#).is_err());
        assert!(GameConfig::from_json(r#"{"particles":{"count":1000000}}"#).is_err());
    }

    #[test]
    fn rejects_non_finite_numbers() {
        // JSON cannot carry NaN, but configs built in code can
        let mut cfg = GameConfig::default();
        cfg.travel.step = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = GameConfig::default();
        cfg.input.hit_radius = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = GameConfig::default();
        cfg.overlay.fade_step = f64::INFINITY;
        assert!(cfg.validate().is_err());

        let mut cfg = GameConfig::default();
        cfg.grid.radius_divisor = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = GameConfig::default();
        cfg.overlay.delay_ms = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = GameConfig::default();
        cfg.particles.gravity = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
