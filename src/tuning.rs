//! Data-driven game balance
//!
//! Every gameplay constant that a designer might want to tweak lives here.
//! Hosts may override any subset through the `tuning` section of the config.

use serde::{Deserialize, Serialize};

/// Balance parameters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Chance per frame that the spawner places something at the frontier
    pub spawn_chance: f32,
    /// Minimum world distance between consecutive obstacles (px)
    pub min_obstacle_spacing: f32,
    /// Chance a spawn becomes an obstacle when spacing allows it
    pub obstacle_bias: f32,
    /// Share of non-obstacle spawns that become power-ups
    pub powerup_share: f32,
    /// Scroll speed added every frame (px/frame per frame)
    pub speed_increment: f32,
    /// Upward impulse for both ground and double jumps (px/s)
    pub jump_velocity: f32,
    /// Minimum interval between accepted jumps (ms)
    pub jump_cooldown_ms: f64,
    /// Points per collected coin
    pub coin_value: u32,
    /// World pixels per metre on the distance readout
    pub scale_factor: f32,
    /// How far ahead of the player the spawn frontier sits (px)
    pub spawn_lookahead: f32,
    /// Floating pickups hover this far above the terrain (px)
    pub float_min: f32,
    pub float_max: f32,
    /// Entities are culled once fully this far behind the left edge (px)
    pub cull_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_chance: 0.04,
            min_obstacle_spacing: 420.0,
            obstacle_bias: 0.55,
            powerup_share: 0.10,
            speed_increment: 0.001,
            jump_velocity: 620.0,
            jump_cooldown_ms: 250.0,
            coin_value: 10,
            scale_factor: 20.0,
            spawn_lookahead: 800.0,
            float_min: 60.0,
            float_max: 150.0,
            cull_margin: 80.0,
        }
    }
}

impl Tuning {
    /// Tuning with spawning switched off (scripted runs, demos)
    pub fn without_spawns() -> Self {
        Self {
            spawn_chance: 0.0,
            ..Self::default()
        }
    }

    /// Clamp values that would otherwise break invariants
    ///
    /// Non-finite entries fall back to their defaults.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        let mut t = Self {
            spawn_chance: finite(self.spawn_chance, d.spawn_chance).clamp(0.0, 1.0),
            min_obstacle_spacing: finite(self.min_obstacle_spacing, d.min_obstacle_spacing)
                .max(0.0),
            obstacle_bias: finite(self.obstacle_bias, d.obstacle_bias).clamp(0.0, 1.0),
            powerup_share: finite(self.powerup_share, d.powerup_share).clamp(0.0, 1.0),
            speed_increment: finite(self.speed_increment, d.speed_increment).max(0.0),
            jump_velocity: finite(self.jump_velocity, d.jump_velocity),
            jump_cooldown_ms: if self.jump_cooldown_ms.is_finite() {
                self.jump_cooldown_ms.max(0.0)
            } else {
                d.jump_cooldown_ms
            },
            coin_value: self.coin_value,
            scale_factor: finite(self.scale_factor, d.scale_factor),
            spawn_lookahead: finite(self.spawn_lookahead, d.spawn_lookahead),
            float_min: finite(self.float_min, d.float_min),
            float_max: finite(self.float_max, d.float_max),
            cull_margin: finite(self.cull_margin, d.cull_margin).max(0.0),
        };
        if t.scale_factor <= 0.0 {
            t.scale_factor = d.scale_factor;
        }
        if t.float_max < t.float_min {
            std::mem::swap(&mut t.float_min, &mut t.float_max);
        }
        t
    }

    /// Distance readout for a world offset
    pub fn distance_meters(&self, global_distance: f32) -> u32 {
        (global_distance / self.scale_factor).floor().max(0.0) as u32
    }
}
