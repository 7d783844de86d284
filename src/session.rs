//! Run lifecycle
//!
//! A [`Session`] is the simulation context a host owns: it binds media
//! once, gates Start -> Playing on a player identity, steps the simulation
//! at a fixed rate, reports the result when the runner crashes, and builds
//! fresh state on retry.
//!
//! Media bindings belong to the session, not the run: a retry reuses the
//! sprites and sounds resolved at construction. Hosts that want to swap
//! assets build a new session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::assets::{AssetBindings, AssetLoader, UrlLoader};
use crate::audio::{AudioBackend, AudioManager, NullBackend, SoundEffect};
use crate::config::{ConfigError, GameConfig};
use crate::consts::*;
use crate::input::InputLatch;
use crate::renderer::{Scene, Vertex, build_scene, scene_vertices};
use crate::sim::{GameEvent, GamePhase, GameState, RunResult, TickInput, tick};

/// Longest accepted player name (characters)
pub const MAX_NAME_LEN: usize = 24;

/// Why a run could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("a player name is required")]
    MissingName,
    #[error("player name is longer than {max} characters")]
    NameTooLong { max: usize },
    #[error("cannot start a run while {0:?}")]
    WrongPhase(GamePhase),
}

/// Who is playing; captured by the host before the first run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub name: String,
    pub social: Option<String>,
}

impl PlayerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            social: None,
        }
    }

    pub fn with_social(mut self, social: impl Into<String>) -> Self {
        let social = social.into();
        self.social = (!social.trim().is_empty()).then_some(social);
        self
    }

    /// Trimmed identity, or why it is unusable
    pub fn validated(self) -> Result<Self, StartError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StartError::MissingName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(StartError::NameTooLong { max: MAX_NAME_LEN });
        }
        Ok(Self {
            name: name.to_string(),
            social: self.social.map(|s| s.trim().to_string()),
        })
    }
}

/// Called with (distance in metres, coins) when a run ends
pub type GameOverHandler = Box<dyn FnMut(u32, u32)>;

/// Simulation context for one embedded game
pub struct Session {
    config: GameConfig,
    assets: AssetBindings,
    audio: AudioManager,
    state: GameState,
    identity: Option<PlayerIdentity>,
    input: InputLatch,
    accumulator: f32,
    /// Seeds later runs
    seeder: Pcg32,
    on_game_over: Option<GameOverHandler>,
    /// Result already handed to the host this run
    reported: bool,
    runs_completed: u32,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.state.phase)
            .field("identity", &self.identity)
            .field("runs_completed", &self.runs_completed)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session with URL-checked assets and silent audio
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_backends(config, seed, &mut UrlLoader, Box::new(NullBackend))
    }

    /// Session with platform-specific asset loading and audio output
    pub fn with_backends(
        config: GameConfig,
        seed: u64,
        loader: &mut dyn AssetLoader,
        audio_backend: Box<dyn AudioBackend>,
    ) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let assets = AssetBindings::bind(&config.assets, loader);
        let audio = AudioManager::new(audio_backend, assets.audio.clone(), config.audio);
        let mut seeder = Pcg32::seed_from_u64(seed);
        let state = GameState::new(seeder.random(), config.physics, config.tuning.clone());
        Ok(Self {
            config,
            assets,
            audio,
            state,
            identity: None,
            input: InputLatch::default(),
            accumulator: 0.0,
            seeder,
            on_game_over: None,
            reported: false,
            runs_completed: 0,
        })
    }

    /// Register the end-of-run callback
    pub fn on_game_over(&mut self, handler: impl FnMut(u32, u32) + 'static) {
        self.on_game_over = Some(Box::new(handler));
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for scripted placements
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetBindings {
        &self.assets
    }

    pub fn identity(&self) -> Option<&PlayerIdentity> {
        self.identity.as_ref()
    }

    pub fn runs_completed(&self) -> u32 {
        self.runs_completed
    }

    /// Start -> Playing, once the host has a player identity
    pub fn start(&mut self, identity: PlayerIdentity) -> Result<(), StartError> {
        if self.state.phase != GamePhase::Start {
            return Err(StartError::WrongPhase(self.state.phase));
        }
        let identity = match identity.validated() {
            Ok(identity) => identity,
            Err(e) => {
                log::warn!("Refusing to start: {}", e);
                return Err(e);
            }
        };
        log::info!("Run started for {} (seed {})", identity.name, self.state.seed);
        self.identity = Some(identity);
        self.begin_run();
        Ok(())
    }

    /// Crashed -> Playing with entirely fresh state
    pub fn restart(&mut self) -> Result<(), StartError> {
        if self.state.phase != GamePhase::Crashed {
            return Err(StartError::WrongPhase(self.state.phase));
        }
        self.state = GameState::new(
            self.seeder.random(),
            self.config.physics,
            self.config.tuning.clone(),
        );
        log::info!("Retry #{} (seed {})", self.runs_completed, self.state.seed);
        self.begin_run();
        Ok(())
    }

    fn begin_run(&mut self) {
        self.state.begin();
        self.input.clear();
        self.accumulator = 0.0;
        self.reported = false;
        self.audio.start_music();
    }

    /// Silence or restore all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
        if !muted && self.state.phase == GamePhase::Playing {
            self.audio.start_music();
        }
    }

    /// Master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.audio.set_master_volume(volume);
    }

    pub fn is_music_playing(&self) -> bool {
        self.audio.is_music_playing()
    }

    /// Record a jump intent for the next tick
    pub fn request_jump(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.input.press_jump();
        }
    }

    /// Advance by a host frame of `frame_dt` seconds
    ///
    /// Returns the run result on the frame the runner crashes.
    pub fn update(&mut self, frame_dt: f32) -> Option<RunResult> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
            if let Some(result) = self.step() {
                return Some(result);
            }
        }
        None
    }

    /// Exactly one fixed tick, consuming any pending jump intent
    pub fn step(&mut self) -> Option<RunResult> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        let input = TickInput {
            jump: self.input.take_jump(),
        };
        tick(&mut self.state, &input, SIM_DT);

        let mut crashed = None;
        for event in self.state.drain_events() {
            match event {
                GameEvent::Jumped => self.audio.play(SoundEffect::Jump),
                GameEvent::DoubleJumped => self.audio.play(SoundEffect::DoubleJump),
                GameEvent::CoinCollected { .. } => self.audio.play(SoundEffect::Coin),
                GameEvent::PowerUpCollected { .. } => self.audio.play(SoundEffect::PowerUp),
                GameEvent::Crashed(result) => {
                    self.audio.play(SoundEffect::Crash);
                    crashed = Some(result);
                }
            }
        }
        crashed.map(|result| self.finish_run(result))
    }

    /// Playing -> Crashed bookkeeping; reports to the host once
    fn finish_run(&mut self, result: RunResult) -> RunResult {
        self.audio.stop_music();
        self.accumulator = 0.0;
        if !self.reported {
            self.reported = true;
            self.runs_completed += 1;
            if let Some(handler) = self.on_game_over.as_mut() {
                handler(result.distance_meters, result.coins_collected);
            }
        }
        result
    }

    /// What to draw this frame
    pub fn scene(&self) -> Scene {
        build_scene(&self.state, &self.config.effects, self.config.credit_line())
    }

    /// Triangles for this frame; textured sprites are left to the host
    pub fn vertices(&self) -> Vec<Vertex> {
        scene_vertices(&self.scene(), &self.assets)
    }

    /// Stop audio and release the session
    pub fn teardown(self) {
        log::info!("Session torn down after {} runs", self.runs_completed);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.audio.stop_music();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::tests::{Played, RecordingBackend};
    use crate::sim::EntityKind;
    use crate::tuning::Tuning;

    fn config() -> GameConfig {
        GameConfig {
            creator: "ada".to_string(),
            tuning: Tuning::without_spawns(),
            ..Default::default()
        }
    }

    fn playing() -> Session {
        let mut session = Session::new(config(), 7).unwrap();
        session.start(PlayerIdentity::new("runner")).unwrap();
        session
    }

    #[test]
    fn test_start_requires_identity() {
        let mut session = Session::new(config(), 1).unwrap();
        assert_eq!(session.start(PlayerIdentity::new("   ")), Err(StartError::MissingName));
        assert_eq!(
            session.start(PlayerIdentity::new("x".repeat(MAX_NAME_LEN + 1))),
            Err(StartError::NameTooLong { max: MAX_NAME_LEN })
        );
        assert_eq!(session.phase(), GamePhase::Start);
        assert!(session.update(0.5).is_none());
        assert_eq!(session.state().world.frame, 0);

        session
            .start(PlayerIdentity::new("  runner ").with_social("@run"))
            .unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.identity().unwrap().name, "runner");
        assert_eq!(
            session.start(PlayerIdentity::new("again")),
            Err(StartError::WrongPhase(GamePhase::Playing))
        );
    }

    #[test]
    fn test_update_uses_fixed_steps() {
        let mut session = playing();
        session.update(SIM_DT * 2.5);
        assert_eq!(session.state().world.frame, 2);
        session.update(SIM_DT * 0.6);
        assert_eq!(session.state().world.frame, 3);
        // Clamped to MAX_FRAME_DT and capped at MAX_SUBSTEPS
        session.update(5.0);
        assert_eq!(session.state().world.frame, 3 + u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_jump_intent_consumed_by_next_tick() {
        let mut session = playing();
        session.step();
        session.request_jump();
        assert!(!session.state().player.is_jumping);
        session.step();
        assert!(session.state().player.is_jumping);
    }

    #[test]
    fn test_crash_reports_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut session = playing();
        let sink = calls.clone();
        session.on_game_over(move |d, c| sink.borrow_mut().push((d, c)));

        for _ in 0..40 {
            session.step();
        }
        let x = session.state().player_world_x();
        session.state_mut().force_spawn(EntityKind::Obstacle, x, None);
        let result = session.step().unwrap();

        assert_eq!(session.phase(), GamePhase::Crashed);
        assert_eq!(*calls.borrow(), vec![(result.distance_meters, 0)]);
        assert!(session.update(1.0).is_none());
        assert!(session.step().is_none());
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(session.runs_completed(), 1);
    }

    #[test]
    fn test_restart_discards_state() {
        let mut session = playing();
        assert_eq!(session.restart(), Err(StartError::WrongPhase(GamePhase::Playing)));

        for _ in 0..10 {
            session.step();
        }
        session.state_mut().world.coin_score = 5;
        session
            .state_mut()
            .force_spawn(EntityKind::Collectible, 2000.0, Some(100.0));
        let x = session.state().player_world_x();
        session.state_mut().force_spawn(EntityKind::Obstacle, x, None);
        session.step().unwrap();

        session.restart().unwrap();
        let state = session.state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.entities.is_empty());
        assert_eq!(state.world.coin_score, 0);
        assert!(state.world.global_distance.abs() < f32::EPSILON);
        assert!((state.world.game_speed - session.config().physics.speed).abs() < f32::EPSILON);
        assert!(state.spawner.last_obstacle_x().is_none());
        assert!(state.result.is_none());
    }

    #[test]
    fn test_audio_follows_events() {
        let backend = RecordingBackend::default();
        let log = backend.log.clone();
        let mut session =
            Session::with_backends(config(), 3, &mut UrlLoader, Box::new(backend)).unwrap();
        session.start(PlayerIdentity::new("runner")).unwrap();
        assert_eq!(*log.borrow(), vec![Played::MusicStart]);

        session.step();
        session.request_jump();
        session.step();
        for _ in 0..90 {
            session.step();
        }
        let x = session.state().player_world_x();
        session.state_mut().force_spawn(EntityKind::Obstacle, x, None);
        session.step();

        let crash_tone = crate::audio::Tone::fallback(SoundEffect::Crash).notes.len();
        let jump_tone = crate::audio::Tone::fallback(SoundEffect::Jump).notes.len();
        assert_eq!(
            *log.borrow(),
            vec![
                Played::MusicStart,
                Played::Tone(jump_tone),
                Played::Tone(crash_tone),
                Played::MusicStop,
            ]
        );
    }

    #[test]
    fn test_rejects_unusable_physics() {
        let mut bad = config();
        bad.physics.speed = -6.0;
        assert!(matches!(
            Session::new(bad, 1),
            Err(ConfigError::InvalidSpeed(_))
        ));
        let mut bad = config();
        bad.physics.gravity = f32::NAN;
        assert!(matches!(
            Session::new(bad, 1),
            Err(ConfigError::InvalidGravity(_))
        ));
    }

    #[test]
    fn test_inverted_float_range_is_repaired() {
        let mut config = config();
        config.tuning = Tuning {
            float_min: 200.0,
            float_max: 50.0,
            spawn_chance: 1.0,
            obstacle_bias: 0.0,
            ..Tuning::default()
        };
        let mut session = Session::new(config, 5).unwrap();
        assert!(session.config().tuning.float_min <= session.config().tuning.float_max);
        session.start(PlayerIdentity::new("runner")).unwrap();
        for _ in 0..30 {
            assert!(session.step().is_none());
        }
        assert!(!session.state().entities.is_empty());
    }

    #[test]
    fn test_bindings_survive_restart() {
        let mut config = config();
        config.assets.player = Some("sprites/runner.png".to_string());
        let mut session = Session::new(config, 8).unwrap();
        session.start(PlayerIdentity::new("runner")).unwrap();
        let bound = session.assets().clone();

        let x = session.state().player_world_x();
        session.state_mut().force_spawn(EntityKind::Obstacle, x, None);
        session.step().unwrap();
        session.restart().unwrap();
        assert_eq!(session.assets(), &bound);
    }

    #[test]
    fn test_vertices_cover_terrain_and_runner() {
        let session = playing();
        let terrain = crate::renderer::shapes::terrain_fill(
            &session.scene().terrain,
            crate::renderer::vertex::colors::TERRAIN,
        );
        assert!(session.vertices().len() > terrain.len());
    }

    #[test]
    fn test_volume_and_mute() {
        let backend = RecordingBackend::default();
        let log = backend.log.clone();
        let mut session =
            Session::with_backends(config(), 4, &mut UrlLoader, Box::new(backend)).unwrap();
        session.set_master_volume(0.0);
        session.start(PlayerIdentity::new("runner")).unwrap();
        assert!(!session.is_music_playing());

        session.set_master_volume(1.0);
        session.set_muted(false);
        assert!(session.is_music_playing());
        session.set_muted(true);
        assert!(!session.is_music_playing());
        assert_eq!(*log.borrow(), vec![Played::MusicStart, Played::MusicStop]);
    }

    #[test]
    fn test_scene_carries_credit() {
        let session = playing();
        let scene = session.scene();
        assert_eq!(scene.hud.credit.as_deref(), Some("by ada"));
        assert_eq!(scene.hud.distance_meters, 0);
    }
}
