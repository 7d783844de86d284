//! Fixed timestep simulation tick
//!
//! One frame of the run, in order: scroll the world, roll the spawner,
//! apply the jump intent, integrate the runner against the terrain, move
//! and cull entities, then resolve overlaps.

use glam::Vec2;
use rand::Rng;

use super::collision;
use super::state::{
    EntityKind, GameEvent, GamePhase, GameState, JumpState, MAX_PARTICLES, Particle, Player,
    RunResult,
};
use super::terrain;
use crate::consts::*;
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Jump intent recorded since the previous tick
    pub jump: bool,
}

/// Which impulse a jump request produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Ground,
    Double,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Playing || state.world.is_dead {
        return;
    }

    state.world.frame += 1;
    state.world.elapsed_ms += f64::from(dt) * 1000.0;

    // Scroll and ramp
    state.world.global_distance += state.world.game_speed;
    state.world.game_speed += state.tuning.speed_increment;

    state.spawner.step(
        &mut state.entities,
        &mut state.rng,
        &state.tuning,
        state.world.global_distance,
    );

    if input.jump {
        match try_jump(&mut state.player, state.world.elapsed_ms, &state.tuning) {
            Some(JumpOutcome::Ground) => state.events.push(GameEvent::Jumped),
            Some(JumpOutcome::Double) => {
                state.events.push(GameEvent::DoubleJumped);
                burst_particles(state);
            }
            None => {}
        }
    }

    integrate_player(
        &mut state.player,
        state.world.global_distance,
        state.gravity,
        dt,
    );

    // Entities never move in world space; only the camera does
    let global_distance = state.world.global_distance;
    let cull_margin = state.tuning.cull_margin;
    for entity in state.entities.iter_mut() {
        entity.update_screen(global_distance);
    }
    state.entities.retain(|e| !e.is_offscreen(cull_margin));

    resolve_overlaps(state);
    if state.world.is_dead {
        return;
    }

    update_cosmetics(state, dt);
}

/// Apply a jump request at simulated time `now_ms`
///
/// Requests inside the cooldown are dropped. Returns the impulse applied.
pub fn try_jump(player: &mut Player, now_ms: f64, tuning: &Tuning) -> Option<JumpOutcome> {
    if let Some(last) = player.last_jump_ms {
        if now_ms - last < tuning.jump_cooldown_ms {
            return None;
        }
    }

    let outcome = match player.jump_state() {
        JumpState::Grounded => {
            player.is_jumping = true;
            JumpOutcome::Ground
        }
        JumpState::DoubleJumpAvailable => {
            player.can_double_jump = false;
            player.pulse_frames = DOUBLE_JUMP_PULSE_FRAMES;
            JumpOutcome::Double
        }
        JumpState::Airborne => return None,
    };

    player.velocity_y = tuning.jump_velocity;
    player.grounded = false;
    player.last_jump_ms = Some(now_ms);
    Some(outcome)
}

/// Gravity, then ground contact against the terrain under the runner
pub fn integrate_player(player: &mut Player, global_distance: f32, gravity: f32, dt: f32) {
    player.velocity_y -= gravity * dt;
    player.pos.y += player.velocity_y * dt;

    let world_x = global_distance + player.pos.x;
    let ground = terrain::height(world_x);
    let gap = player.pos.y - ground;

    let falling = player.velocity_y <= 0.0;
    let landed = gap <= 0.0 && falling;
    // Stay glued to downhill slopes while running
    let stuck = !player.is_jumping && falling && gap <= GROUND_SNAP_TOLERANCE;

    if landed || stuck {
        player.pos.y = ground;
        player.velocity_y = 0.0;
        player.is_jumping = false;
        player.grounded = true;
        player.rotation = terrain::surface_angle(world_x);
    } else {
        if gap < 0.0 {
            // Rising but the slope climbed faster
            player.pos.y = ground;
        }
        // Running off a crest counts as a jump until the next landing
        player.is_jumping = true;
        player.grounded = false;
        player.rotation *= AIR_ROTATION_DECAY;
    }
}

fn resolve_overlaps(state: &mut GameState) {
    for (id, kind) in collision::overlapping(&state.player, &state.entities) {
        match kind {
            EntityKind::Collectible => {
                state.entities.remove(id);
                state.world.coin_score += 1;
                state.events.push(GameEvent::CoinCollected { id });
            }
            EntityKind::PowerUp => {
                state.entities.remove(id);
                state.player.can_double_jump = true;
                state.player.tint_frames = POWERUP_TINT_FRAMES;
                state.events.push(GameEvent::PowerUpCollected { id });
                log::debug!("Power-up #{} collected, double jump armed", id);
            }
            EntityKind::Obstacle => {
                crash(state);
                return;
            }
        }
    }
}

/// Playing -> Crashed
fn crash(state: &mut GameState) {
    let result = RunResult::new(
        state.distance_meters(),
        state.world.coin_score,
        state.tuning.coin_value,
    );
    state.world.is_dead = true;
    state.phase = GamePhase::Crashed;
    state.player.velocity_y = 0.0;
    state.result = Some(result);
    state.events.push(GameEvent::Crashed(result));
    log::info!(
        "Crashed at {} m with {} coins (score {})",
        result.distance_meters,
        result.coins_collected,
        result.total_score
    );
}

fn burst_particles(state: &mut GameState) {
    let origin = state.player.pos;
    for _ in 0..12 {
        if state.particles.len() >= MAX_PARTICLES {
            break;
        }
        let angle = state.rng.random_range(std::f32::consts::PI..std::f32::consts::TAU);
        let speed = state.rng.random_range(60.0..160.0);
        state.particles.push(Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
            size: state.rng.random_range(2.0..5.0),
        });
    }
}

fn update_cosmetics(state: &mut GameState, dt: f32) {
    let player = &mut state.player;
    player.tint_frames = player.tint_frames.saturating_sub(1);
    player.pulse_frames = player.pulse_frames.saturating_sub(1);

    // Particles live in camera space and drift back with the scroll
    let scroll = state.world.game_speed;
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.pos.x -= scroll;
        particle.vel.y -= 300.0 * dt;
        particle.life -= dt * 2.0;
    }
    state.particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, PhysicsConfig::default(), Tuning::without_spawns());
        state.begin();
        state
    }

    fn run(state: &mut GameState, frames: u32) {
        for _ in 0..frames {
            tick(state, &TickInput::default(), SIM_DT);
        }
    }

    const JUMP: TickInput = TickInput { jump: true };

    #[test]
    fn test_no_tick_outside_playing() {
        let mut state = GameState::new(1, PhysicsConfig::default(), Tuning::default());
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.world.frame, 0);
        assert!(state.world.global_distance.abs() < f32::EPSILON);
    }

    #[test]
    fn test_scroll_and_speed_ramp() {
        let mut state = playing(1);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!((state.world.global_distance - 6.0).abs() < 1e-4);
        assert!((state.world.game_speed - 6.001).abs() < 1e-4);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!((state.world.global_distance - 12.001).abs() < 1e-3);
    }

    #[test]
    fn test_grounded_runner_tracks_terrain() {
        let mut state = playing(2);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.player.grounded {
                let ground = terrain::height(state.player_world_x());
                assert!((state.player.pos.y - ground).abs() < 1e-3);
            }
            assert!(state.player.pos.y >= terrain::height(state.player_world_x()) - 1e-3);
        }
    }

    #[test]
    fn test_ground_jump_applies_impulse() {
        let mut state = playing(3);
        run(&mut state, 5);
        tick(&mut state, &JUMP, SIM_DT);
        assert!(state.player.is_jumping);
        assert!(!state.player.grounded);
        let expected = state.tuning.jump_velocity - state.gravity * SIM_DT;
        assert!((state.player.velocity_y - expected).abs() < 1e-3);
        assert_eq!(state.drain_events(), vec![GameEvent::Jumped]);
    }

    #[test]
    fn test_airborne_jump_without_power_up_is_noop() {
        let mut state = playing(4);
        tick(&mut state, &JUMP, SIM_DT);
        run(&mut state, 20);
        let before = state.player.velocity_y;
        tick(&mut state, &JUMP, SIM_DT);
        let after = state.player.velocity_y;
        assert!((after - (before - state.gravity * SIM_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_no_ground_jump_after_leaving_crest() {
        let physics = PhysicsConfig {
            speed: 16.0,
            ..PhysicsConfig::default()
        };
        let mut state = GameState::new(11, physics, Tuning::without_spawns());
        state.begin();

        let mut left_ground = false;
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            let gap = state.player.pos.y - terrain::height(state.player_world_x());
            if !state.player.grounded && gap > GROUND_SNAP_TOLERANCE {
                left_ground = true;
                break;
            }
        }
        assert!(left_ground);
        assert_eq!(state.player.jump_state(), JumpState::Airborne);

        let vy = state.player.velocity_y;
        let now = state.world.elapsed_ms;
        assert_eq!(try_jump(&mut state.player, now, &state.tuning), None);
        assert!((state.player.velocity_y - vy).abs() < f32::EPSILON);
        assert!(state.player.last_jump_ms.is_none());

        // Contact restores the ground jump
        let mut landed = false;
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.player.grounded {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(state.player.jump_state(), JumpState::Grounded);
    }

    #[test]
    fn test_cooldown_drops_jump() {
        let tuning = Tuning::default();
        let mut player = Player::new();
        assert_eq!(try_jump(&mut player, 1000.0, &tuning), Some(JumpOutcome::Ground));
        player.can_double_jump = true;
        player.velocity_y = -50.0;
        assert_eq!(try_jump(&mut player, 1100.0, &tuning), None);
        assert!((player.velocity_y + 50.0).abs() < f32::EPSILON);
        assert!(player.can_double_jump);
        assert_eq!(try_jump(&mut player, 1250.0, &tuning), Some(JumpOutcome::Double));
        assert!(!player.can_double_jump);
        assert!((player.velocity_y - tuning.jump_velocity).abs() < f32::EPSILON);
    }

    #[test]
    fn test_landing_clears_jump() {
        let mut state = playing(5);
        tick(&mut state, &JUMP, SIM_DT);
        run(&mut state, 120);
        assert!(!state.player.is_jumping);
        assert!(state.player.grounded);
        assert!(state.player.velocity_y.abs() < f32::EPSILON);
    }

    #[test]
    fn test_coin_pickup() {
        let mut state = playing(6);
        let x = state.player_world_x() + state.world.game_speed;
        let id = state.force_spawn(EntityKind::Collectible, x, Some(4.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.world.coin_score, 1);
        assert!(state.entities.get(id).is_none());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.drain_events(), vec![GameEvent::CoinCollected { id }]);
    }

    #[test]
    fn test_power_up_arms_double_jump() {
        let mut state = playing(7);
        let x = state.player_world_x() + state.world.game_speed;
        state.force_spawn(EntityKind::PowerUp, x, Some(2.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player.can_double_jump);
        assert!(state.player.tint_frames > 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.world.is_dead);
    }

    #[test]
    fn test_obstacle_crashes_and_freezes() {
        let mut state = playing(8);
        run(&mut state, 30);
        let x = state.player_world_x();
        state.force_spawn(EntityKind::Obstacle, x, None);
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::Crashed);
        assert!(state.world.is_dead);
        let result = state.result.unwrap();
        assert_eq!(
            result.distance_meters,
            (state.world.global_distance / state.tuning.scale_factor).floor() as u32
        );

        let frozen = state.world;
        let player_y = state.player.pos.y;
        run(&mut state, 10);
        assert_eq!(state.world, frozen);
        assert!((state.player.pos.y - player_y).abs() < f32::EPSILON);
        let crashes = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Crashed(_)))
            .count();
        assert_eq!(crashes, 1);
    }

    #[test]
    fn test_offscreen_entities_are_culled() {
        let mut state = playing(9);
        let id = state.force_spawn(EntityKind::Collectible, 20.0, Some(200.0));
        run(&mut state, 30);
        assert!(state.entities.get(id).is_none());
    }

    #[test]
    fn test_double_jump_particles_capped() {
        let mut state = playing(10);
        for _ in 0..20 {
            burst_particles(&mut state);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }
}
