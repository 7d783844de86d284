//! Host-supplied game configuration
//!
//! Handed over once at startup by the embedding page, usually as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_GRAVITY, DEFAULT_SPEED};
use crate::tuning::Tuning;

/// Configuration rejected at the host boundary
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gravity must be a positive finite number, got {0}")]
    InvalidGravity(f32),
    #[error("speed must be a positive finite number, got {0}")]
    InvalidSpeed(f32),
}

/// Optional media URLs; anything missing gets a procedural fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetUrls {
    pub player: Option<String>,
    pub coin: Option<String>,
    pub obstacle: Option<String>,
    pub bgm: Option<String>,
    pub jump: Option<String>,
    pub crash: Option<String>,
    pub powerup: Option<String>,
}

/// Gravity and base scroll speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Base scroll speed (px/frame)
    pub speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            speed: DEFAULT_SPEED,
        }
    }
}

impl PhysicsConfig {
    /// Physics the simulation can always run with; bad values take defaults
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let usable = |v: f32| v.is_finite() && v > 0.0;
        Self {
            gravity: if usable(self.gravity) { self.gravity } else { d.gravity },
            speed: if usable(self.speed) { self.speed } else { d.speed },
        }
    }
}

/// Volume preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
        }
    }
}

/// Cosmetic effect toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Particle bursts on double jump
    pub particles: bool,
    /// Reduced motion (no bobbing pickups, no scale pulses)
    pub reduced_motion: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            particles: true,
            reduced_motion: false,
        }
    }
}

/// Everything the host hands the game at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Who made this level (shown on the HUD)
    pub creator: String,
    #[serde(default)]
    pub creator_social: String,
    #[serde(default)]
    pub assets: AssetUrls,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub effects: EffectSettings,
    #[serde(default)]
    pub tuning: Tuning,
}

impl GameConfig {
    /// Parse and validate a host JSON payload
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Reject physics the simulation cannot run with, clamp the rest
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let PhysicsConfig { gravity, speed } = self.physics;
        if !gravity.is_finite() || gravity <= 0.0 {
            return Err(ConfigError::InvalidGravity(gravity));
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        self.tuning = self.tuning.sanitized();
        self.audio.master_volume = self.audio.master_volume.clamp(0.0, 1.0);
        self.audio.sfx_volume = self.audio.sfx_volume.clamp(0.0, 1.0);
        self.audio.music_volume = self.audio.music_volume.clamp(0.0, 1.0);
        Ok(self)
    }

    /// Short HUD credit line, e.g. "by Ada (@ada)"
    pub fn credit_line(&self) -> Option<String> {
        let creator = self.creator.trim();
        if creator.is_empty() {
            return None;
        }
        let social = self.creator_social.trim();
        if social.is_empty() {
            Some(format!("by {creator}"))
        } else {
            Some(format!("by {creator} ({social})"))
        }
    }
}
