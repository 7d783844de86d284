//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform dependencies:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)

pub mod collision;
pub mod spawner;
pub mod state;
pub mod terrain;
pub mod tick;

pub use collision::{Aabb, entity_bounds, overlapping, player_bounds};
pub use spawner::Spawner;
pub use state::{
    Entity, EntityKind, EntityStore, GameEvent, GamePhase, GameState, JumpState, Particle, Player,
    RunResult, WorldState, MAX_PARTICLES,
};
pub use tick::{JumpOutcome, TickInput, integrate_player, tick, try_jump};
