//! Ridge Runner - an endless-runner simulation core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (terrain, spawning, physics, collisions)
//! - `session`: Run lifecycle and the explicit simulation context
//! - `renderer`: Backend-agnostic scene extraction and tessellation
//! - `assets` / `audio`: Media binding with procedural fallbacks
//! - `config` / `tuning`: Host configuration and data-driven game balance

pub mod assets;
pub mod audio;
pub mod config;
pub mod input;
pub mod renderer;
pub mod session;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use session::{PlayerIdentity, Session, StartError};
pub use sim::{GamePhase, RunResult};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Fixed timestep in milliseconds (drives the jump cooldown clock)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Host frame deltas are clamped to this (tab switches, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Visible window
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Player is pinned at this camera-relative x
    pub const PLAYER_X: f32 = 150.0;
    /// Player sprite size
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Player hitbox is a little tighter than the sprite
    pub const PLAYER_HITBOX_WIDTH: f32 = 32.0;
    pub const PLAYER_HITBOX_HEIGHT: f32 = 36.0;

    /// Entity sizes (width, height)
    pub const OBSTACLE_SIZE: (f32, f32) = (30.0, 40.0);
    pub const COLLECTIBLE_SIZE: (f32, f32) = (24.0, 24.0);
    pub const POWERUP_SIZE: (f32, f32) = (28.0, 28.0);

    /// Default physics
    pub const DEFAULT_GRAVITY: f32 = 1600.0;
    pub const DEFAULT_SPEED: f32 = 6.0;

    /// Running players stay glued to downhill slopes within this gap
    pub const GROUND_SNAP_TOLERANCE: f32 = 4.0;

    /// Cosmetic feedback timings (frames)
    pub const POWERUP_TINT_FRAMES: u32 = 30;
    pub const DOUBLE_JUMP_PULSE_FRAMES: u32 = 12;
    pub const DOUBLE_JUMP_PULSE_SCALE: f32 = 1.3;
    /// Per-frame rotation decay while airborne
    pub const AIR_ROTATION_DECAY: f32 = 0.85;
}
