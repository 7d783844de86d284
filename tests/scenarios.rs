//! Scripted end-to-end runs through the public session API.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use ridge_runner::consts::*;
use ridge_runner::sim::{EntityKind, JumpState, terrain};
use ridge_runner::{GameConfig, GamePhase, PlayerIdentity, Session, Tuning};

fn scripted_session() -> Session {
    let config = GameConfig {
        creator: "ada".to_string(),
        creator_social: "@ada".to_string(),
        tuning: Tuning::without_spawns(),
        ..Default::default()
    };
    let mut session = Session::new(config, 2024).unwrap();
    session.start(PlayerIdentity::new("tester")).unwrap();
    session
}

/// Place a coin `ahead` px in front of the runner, hovering at hip height
fn coin_ahead(session: &mut Session, ahead: f32) -> u32 {
    let x = session.state().player_world_x() + ahead;
    session
        .state_mut()
        .force_spawn(EntityKind::Collectible, x, Some(8.0))
}

#[test]
fn long_run_collects_scripted_coins() {
    let mut session = scripted_session();
    let mut placed = Vec::new();
    for frame in 0..1000u32 {
        if frame % 100 == 50 {
            placed.push(coin_ahead(&mut session, 120.0));
        }
        assert!(session.step().is_none(), "crashed on frame {frame}");
    }

    let state = session.state();
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.world.frame, 1000);
    assert_eq!(state.world.coin_score, placed.len() as u32);
    for id in placed {
        assert!(state.entities.get(id).is_none());
    }

    // Speed ramps linearly from the configured base
    let expected_speed = DEFAULT_SPEED + 1000.0 * state.tuning.speed_increment;
    assert!((state.world.game_speed - expected_speed).abs() < 1e-2);
    let ground = terrain::height(state.player_world_x());
    assert!((state.player.pos.y - ground).abs() < 1e-3);

    let hud = session.scene().hud;
    assert_eq!(hud.coins_text(), format!("Coins: {}", hud.coins));
    assert_eq!(hud.credit.as_deref(), Some("by ada (@ada)"));
}

#[test]
fn forced_obstacle_ends_run_exactly_once() {
    let reports = Rc::new(RefCell::new(Vec::new()));
    let mut session = scripted_session();
    let sink = reports.clone();
    session.on_game_over(move |distance, coins| sink.borrow_mut().push((distance, coins)));

    coin_ahead(&mut session, 60.0);
    for _ in 0..300 {
        session.step();
    }
    let x = session.state().player_world_x() + 30.0;
    session.state_mut().force_spawn(EntityKind::Obstacle, x, None);

    let mut result = None;
    for _ in 0..60 {
        if let Some(r) = session.update(SIM_DT) {
            result = Some(r);
            break;
        }
    }
    let result = result.unwrap();
    let state = session.state();
    assert_eq!(state.phase, GamePhase::Crashed);
    assert_eq!(result.distance_meters, state.distance_meters());
    assert_eq!(
        result.distance_meters,
        (state.world.global_distance / state.tuning.scale_factor).floor() as u32
    );
    assert_eq!(result.coins_collected, 1);
    assert_eq!(result.total_score, result.distance_meters + 10);

    // Frozen afterwards
    let frozen = state.world;
    for _ in 0..30 {
        assert!(session.update(SIM_DT).is_none());
    }
    assert_eq!(session.state().world, frozen);
    assert_eq!(*reports.borrow(), vec![(result.distance_meters, 1)]);

    session.restart().unwrap();
    assert_eq!(session.phase(), GamePhase::Playing);
    assert_eq!(session.state().world.coin_score, 0);
    assert!(session.state().entities.is_empty());
}

#[test]
fn power_up_grants_one_double_jump() {
    let mut session = scripted_session();
    let x = session.state().player_world_x() + 30.0;
    session.state_mut().force_spawn(EntityKind::PowerUp, x, Some(6.0));

    let mut collected = false;
    for _ in 0..20 {
        session.step();
        collected |= session.state().player.can_double_jump;
    }
    assert!(collected);
    assert!(session.state().player.tint_frames > 0);

    session.request_jump();
    session.step();
    assert_eq!(session.state().player.jump_state(), JumpState::DoubleJumpAvailable);

    // Wait out the cooldown, then spend it
    for _ in 0..16 {
        session.step();
    }
    session.request_jump();
    session.step();
    let player = &session.state().player;
    assert_eq!(player.jump_state(), JumpState::Airborne);
    assert!(player.scale() > 1.0);
    assert!(!session.scene().particles.is_empty());

    // A third press in the air does nothing
    let vy = session.state().player.velocity_y;
    for _ in 0..16 {
        session.step();
    }
    let last_jump = session.state().player.last_jump_ms;
    session.request_jump();
    session.step();
    let player = &session.state().player;
    assert!(player.velocity_y < vy);
    assert_eq!(player.last_jump_ms, last_jump);
    assert!(!player.can_double_jump);
    assert_eq!(player.jump_state(), JumpState::Airborne);
}

#[test]
fn config_json_round_trip_from_host() {
    let json = r#"{
        "creator": "ada",
        "assets": { "player": "https://cdn.example.com/runner.png" },
        "physics": { "gravity": 1800, "speed": 7 },
        "tuning": { "spawn_chance": 0 }
    }"#;
    let config = GameConfig::from_json(json).unwrap();
    let mut session = Session::new(config, 9).unwrap();
    assert_eq!(session.phase(), GamePhase::Start);
    session.start(PlayerIdentity::new("tester")).unwrap();
    session.step();
    assert!((session.state().world.global_distance - 7.0).abs() < 1e-4);
    assert_eq!(session.phase(), GamePhase::Playing);
    assert!((session.state().gravity - 1800.0).abs() < f32::EPSILON);
}
