//! Per-frame scene extraction
//!
//! Turns the simulation state into a flat, backend-agnostic description of
//! what to draw. Nothing here feeds back into gameplay.

use glam::Vec2;
use serde::Serialize;

use super::camera::Camera;
use super::vertex::colors;
use crate::assets::SpriteSlot;
use crate::config::EffectSettings;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::sim::{EntityKind, GamePhase, GameState, terrain};

/// Horizontal spacing of terrain samples (px)
pub const TERRAIN_STEP: f32 = 10.0;
/// Power-up bob amplitude (px) and period (s)
pub const POWERUP_BOB_AMPLITUDE: f32 = 8.0;
pub const POWERUP_BOB_PERIOD: f32 = 1.0;

/// One sprite, positioned by its center in screen space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteDraw {
    /// Entity id; `None` for the runner
    pub id: Option<u32>,
    pub slot: SpriteSlot,
    pub center: Vec2,
    pub size: Vec2,
    /// Screen-space rotation (radians, clockwise)
    pub rotation: f32,
    pub scale: f32,
    pub tint: Option<[f32; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleDraw {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hud {
    pub distance_meters: u32,
    pub coins: u32,
    pub credit: Option<String>,
    pub double_jump_ready: bool,
    pub crashed: bool,
}

impl Hud {
    pub fn distance_text(&self) -> String {
        format!("Distance: {}m", self.distance_meters)
    }

    pub fn coins_text(&self) -> String {
        format!("Coins: {}", self.coins)
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// Background fill
    pub clear_color: [f32; 4],
    /// HUD text color
    pub text_color: [f32; 4],
    /// Closed ground polygon: surface left to right, then the bottom corners
    pub terrain: Vec<Vec2>,
    /// Entities in id order, runner last
    pub sprites: Vec<SpriteDraw>,
    pub particles: Vec<ParticleDraw>,
    pub hud: Hud,
}

/// Ground polygon for the visible window
pub fn terrain_polygon(camera: &Camera) -> Vec<Vec2> {
    let samples = terrain::sample(camera.offset, camera.view.x, TERRAIN_STEP);
    let mut polygon: Vec<Vec2> = samples
        .into_iter()
        .map(|(local_x, h)| camera.to_screen(local_x, h))
        .collect();
    polygon.push(Vec2::new(camera.view.x, camera.view.y));
    polygon.push(Vec2::new(0.0, camera.view.y));
    polygon
}

/// Extract the scene for the current state
pub fn build_scene(state: &GameState, effects: &EffectSettings, credit: Option<String>) -> Scene {
    let camera = Camera::new(state.world.global_distance);
    let elapsed_s = (state.world.elapsed_ms / 1000.0) as f32;

    let mut sprites = Vec::with_capacity(state.entities.len() + 1);
    for entity in state.entities.iter() {
        let size = entity.kind().size();
        let mut bottom = entity.base_y();
        if entity.kind() == EntityKind::PowerUp && !effects.reduced_motion {
            let phase = elapsed_s / POWERUP_BOB_PERIOD * std::f32::consts::TAU + entity.bob_phase;
            bottom += POWERUP_BOB_AMPLITUDE * phase.sin();
        }
        sprites.push(SpriteDraw {
            id: Some(entity.id()),
            slot: SpriteSlot::for_entity(entity.kind()),
            center: camera.to_screen(entity.screen_x, bottom + size.y / 2.0),
            size,
            rotation: 0.0,
            scale: 1.0,
            tint: None,
        });
    }

    let player = &state.player;
    sprites.push(SpriteDraw {
        id: None,
        slot: SpriteSlot::Player,
        center: camera.to_screen(player.pos.x, player.pos.y + PLAYER_HEIGHT / 2.0),
        size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        // Uphill is counter-clockwise on screen
        rotation: -player.rotation,
        scale: if effects.reduced_motion {
            1.0
        } else {
            player.scale()
        },
        tint: (player.tint_frames > 0).then_some(colors::POWERUP_TINT),
    });

    let particles = if effects.particles {
        state
            .particles
            .iter()
            .map(|p| ParticleDraw {
                center: camera.to_screen(p.pos.x, p.pos.y),
                radius: p.size,
                alpha: p.life.clamp(0.0, 1.0),
            })
            .collect()
    } else {
        Vec::new()
    };

    Scene {
        clear_color: colors::SKY,
        text_color: colors::HUD_TEXT,
        terrain: terrain_polygon(&camera),
        sprites,
        particles,
        hud: Hud {
            distance_meters: state.distance_meters(),
            coins: state.world.coin_score,
            credit,
            double_jump_ready: player.can_double_jump,
            crashed: state.phase == GamePhase::Crashed,
        },
    }
}
