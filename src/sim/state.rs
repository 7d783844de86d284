//! Game state and core simulation types
//!
//! Everything one run owns: the scrolling world, the runner, the entity
//! store and the seeded RNG that drives spawning.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spawner::Spawner;
use super::terrain;
use crate::config::PhysicsConfig;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, waiting for the host to supply a player identity
    Start,
    /// Simulation active
    Playing,
    /// Hit an obstacle; frozen until an explicit restart
    Crashed,
}

/// Scrolling world, mutated once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// World-scroll offset; the camera's left edge in world space
    pub global_distance: f32,
    /// Scroll per frame (px)
    pub game_speed: f32,
    pub is_dead: bool,
    pub coin_score: u32,
    /// Simulated clock (ms since the run began)
    pub elapsed_ms: f64,
    /// Frames simulated this run
    pub frame: u64,
}

impl WorldState {
    pub fn new(base_speed: f32) -> Self {
        Self {
            global_distance: 0.0,
            game_speed: base_speed,
            is_dead: false,
            coin_score: 0,
            elapsed_ms: 0.0,
            frame: 0,
        }
    }
}

/// Where the runner is in the jump state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpState {
    Grounded,
    /// In the air with nothing left to spend
    Airborne,
    /// In the air holding a double jump
    DoubleJumpAvailable,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// x is camera-relative and fixed; y is the elevation of the feet
    pub pos: Vec2,
    pub velocity_y: f32,
    /// Off the ground since the last landing, by jump or by running off a crest
    pub is_jumping: bool,
    /// Granted by a power-up, spent by a mid-air jump
    pub can_double_jump: bool,
    /// Simulated time of the last accepted jump
    pub last_jump_ms: Option<f64>,
    /// Touching the terrain after this frame's ground resolution
    pub grounded: bool,
    /// Visual tilt (radians)
    pub rotation: f32,
    /// Frames of power-up tint left
    pub tint_frames: u32,
    /// Frames of double-jump scale pulse left
    pub pulse_frames: u32,
}

impl Player {
    /// Runner standing on the terrain at the start of a run
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, terrain::height(PLAYER_X)),
            velocity_y: 0.0,
            is_jumping: false,
            can_double_jump: false,
            last_jump_ms: None,
            grounded: true,
            rotation: terrain::surface_angle(PLAYER_X),
            tint_frames: 0,
            pulse_frames: 0,
        }
    }

    pub fn jump_state(&self) -> JumpState {
        if !self.is_jumping {
            JumpState::Grounded
        } else if self.can_double_jump {
            JumpState::DoubleJumpAvailable
        } else {
            JumpState::Airborne
        }
    }

    /// Sprite scale including the double-jump pulse
    pub fn scale(&self) -> f32 {
        if self.pulse_frames == 0 {
            return 1.0;
        }
        let t = self.pulse_frames as f32 / DOUBLE_JUMP_PULSE_FRAMES as f32;
        1.0 + (DOUBLE_JUMP_PULSE_SCALE - 1.0) * t
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Entity variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Fatal on contact
    Obstacle,
    /// Coin; +1 to the coin score
    Collectible,
    /// Grants a double jump
    PowerUp,
}

impl EntityKind {
    /// Width and height (px)
    pub fn size(self) -> Vec2 {
        let (w, h) = match self {
            EntityKind::Obstacle => OBSTACLE_SIZE,
            EntityKind::Collectible => COLLECTIBLE_SIZE,
            EntityKind::PowerUp => POWERUP_SIZE,
        };
        Vec2::new(w, h)
    }
}

/// A spawned obstacle, coin or power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: u32,
    kind: EntityKind,
    world_x: f32,
    /// Elevation of the entity's bottom edge
    base_y: f32,
    /// `world_x - global_distance`, refreshed every frame
    pub screen_x: f32,
    /// Cosmetic bob phase (radians)
    pub bob_phase: f32,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, world_x: f32, base_y: f32) -> Self {
        Self {
            id,
            kind,
            world_x,
            base_y,
            screen_x: world_x,
            bob_phase: 0.0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Fixed at spawn
    pub fn world_x(&self) -> f32 {
        self.world_x
    }

    pub fn base_y(&self) -> f32 {
        self.base_y
    }

    pub fn update_screen(&mut self, global_distance: f32) {
        self.screen_x = self.world_x - global_distance;
    }

    /// Fully behind the left edge by more than `margin`
    pub fn is_offscreen(&self, margin: f32) -> bool {
        self.screen_x + self.kind.size().x / 2.0 < -margin
    }
}

/// Arena of live entities keyed by stable id
///
/// Iteration is always in id (spawn) order.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: BTreeMap<u32, Entity>,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate an id and insert a new entity
    pub fn spawn(&mut self, kind: EntityKind, world_x: f32, base_y: f32) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.entities.insert(id, Entity::new(id, kind, world_x, base_y));
        id
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn remove(&mut self, id: u32) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.kind == kind)
    }

    /// Drop entities that no longer satisfy `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&Entity) -> bool) {
        self.entities.retain(|_, e| keep(e));
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    CoinCollected { id: u32 },
    PowerUpCollected { id: u32 },
    Crashed(RunResult),
}

/// Final tally for a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub distance_meters: u32,
    pub coins_collected: u32,
    pub total_score: u32,
}

impl RunResult {
    pub fn new(distance_meters: u32, coins_collected: u32, coin_value: u32) -> Self {
        Self {
            distance_meters,
            coins_collected,
            total_score: distance_meters.saturating_add(coins_collected.saturating_mul(coin_value)),
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Camera-relative x, elevation y
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 64;

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub world: WorldState,
    pub player: Player,
    pub entities: EntityStore,
    pub spawner: Spawner,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Speed the run started at
    pub base_speed: f32,
    pub tuning: Tuning,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Set once, on the crash frame
    pub result: Option<RunResult>,
}

impl GameState {
    /// Fresh run in the Start phase
    ///
    /// Physics and tuning are sanitized so every tick stays total.
    pub fn new(seed: u64, physics: PhysicsConfig, tuning: Tuning) -> Self {
        let physics = physics.sanitized();
        let tuning = tuning.sanitized();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            world: WorldState::new(physics.speed),
            player: Player::new(),
            entities: EntityStore::new(),
            spawner: Spawner::new(),
            gravity: physics.gravity,
            base_speed: physics.speed,
            tuning,
            events: Vec::new(),
            particles: Vec::new(),
            result: None,
        }
    }

    /// Start -> Playing
    pub fn begin(&mut self) {
        if self.phase == GamePhase::Start {
            self.phase = GamePhase::Playing;
        }
    }

    /// World x directly under the runner
    pub fn player_world_x(&self) -> f32 {
        self.world.global_distance + self.player.pos.x
    }

    pub fn distance_meters(&self) -> u32 {
        self.tuning.distance_meters(self.world.global_distance)
    }

    /// Place an entity at a chosen world x, bypassing the dice
    ///
    /// `hover` lifts collectibles and power-ups above the terrain; `None`
    /// picks a random height like a natural spawn. Obstacles always sit on
    /// the surface.
    pub fn force_spawn(&mut self, kind: EntityKind, world_x: f32, hover: Option<f32>) -> u32 {
        let id = match hover {
            Some(h) if kind != EntityKind::Obstacle => {
                let base_y = terrain::height(world_x) + h;
                self.entities.spawn(kind, world_x, base_y)
            }
            _ => self.spawner.place(&mut self.entities, &mut self.rng, &self.tuning, kind, world_x),
        };
        if let Some(entity) = self.entities.get_mut(id) {
            entity.update_screen(self.world.global_distance);
        }
        id
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
