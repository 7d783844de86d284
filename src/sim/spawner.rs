//! Procedural entity spawning
//!
//! Each frame the spawner may drop one entity at the frontier, a fixed
//! look-ahead beyond the runner. Obstacles respect a minimum spacing from
//! the previous obstacle so hazards never arrive back to back.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{EntityKind, EntityStore};
use super::terrain;
use crate::consts::PLAYER_X;
use crate::tuning::Tuning;

/// Spawner bookkeeping for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    /// World x of the most recent obstacle
    last_obstacle_x: Option<f32>,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_obstacle_x(&self) -> Option<f32> {
        self.last_obstacle_x
    }

    /// World x where new entities appear
    pub fn frontier(global_distance: f32, tuning: &Tuning) -> f32 {
        global_distance + PLAYER_X + tuning.spawn_lookahead
    }

    /// Whether an obstacle at `world_x` keeps the minimum spacing
    pub fn obstacle_allowed(&self, world_x: f32, tuning: &Tuning) -> bool {
        self.last_obstacle_x
            .is_none_or(|last| world_x - last >= tuning.min_obstacle_spacing)
    }

    /// Weighted pick: obstacles when spacing allows, otherwise coins with
    /// the occasional power-up
    pub fn choose_kind(&self, world_x: f32, rng: &mut Pcg32, tuning: &Tuning) -> EntityKind {
        if self.obstacle_allowed(world_x, tuning) && rng.random::<f32>() < tuning.obstacle_bias {
            return EntityKind::Obstacle;
        }
        if rng.random::<f32>() < tuning.powerup_share {
            EntityKind::PowerUp
        } else {
            EntityKind::Collectible
        }
    }

    /// Roll for this frame's spawn; returns the new entity's id
    pub fn step(
        &mut self,
        entities: &mut EntityStore,
        rng: &mut Pcg32,
        tuning: &Tuning,
        global_distance: f32,
    ) -> Option<u32> {
        if tuning.spawn_chance <= 0.0 || rng.random::<f32>() >= tuning.spawn_chance {
            return None;
        }
        let world_x = Self::frontier(global_distance, tuning);
        let kind = self.choose_kind(world_x, rng, tuning);
        let id = self.place(entities, rng, tuning, kind, world_x);
        log::debug!("Spawned {:?} #{} at x={:.0}", kind, id, world_x);
        Some(id)
    }

    /// Put an entity of `kind` at `world_x` with its natural elevation
    pub fn place(
        &mut self,
        entities: &mut EntityStore,
        rng: &mut Pcg32,
        tuning: &Tuning,
        kind: EntityKind,
        world_x: f32,
    ) -> u32 {
        let ground = terrain::height(world_x);
        let base_y = match kind {
            EntityKind::Obstacle => {
                self.last_obstacle_x = Some(world_x);
                ground
            }
            EntityKind::Collectible | EntityKind::PowerUp => {
                ground + rng.random_range(tuning.float_min..=tuning.float_max)
            }
        };
        let id = entities.spawn(kind, world_x, base_y);
        if kind == EntityKind::PowerUp {
            if let Some(entity) = entities.get_mut(id) {
                entity.bob_phase = rng.random_range(0.0..std::f32::consts::TAU);
            }
        }
        id
    }
}
