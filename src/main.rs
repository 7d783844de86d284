//! Ridge Runner entry point
//!
//! The browser build is driven through `ridge_runner::web`. Natively this
//! runs a headless autopilot run, handy for checking tuning changes.

#[cfg(not(target_arch = "wasm32"))]
use ridge_runner::consts::*;
#[cfg(not(target_arch = "wasm32"))]
use ridge_runner::renderer::as_bytes;
#[cfg(not(target_arch = "wasm32"))]
use ridge_runner::sim::EntityKind;
#[cfg(not(target_arch = "wasm32"))]
use ridge_runner::{GameConfig, PlayerIdentity, Session};

/// Give up after two simulated minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u32 = 60 * 120;
/// Jump when the next rock is this close (px, screen space)
#[cfg(not(target_arch = "wasm32"))]
const AUTOPILOT_REACH: f32 = 70.0;

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> Result<GameConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            let json = std::fs::read_to_string(&path)?;
            Ok(GameConfig::from_json(&json)?)
        }
        None => Ok(GameConfig {
            creator: "headless".to_string(),
            ..Default::default()
        }),
    }
}

/// Whether an obstacle is about to reach the runner
#[cfg(not(target_arch = "wasm32"))]
fn rock_ahead(session: &Session) -> bool {
    session
        .state()
        .entities
        .of_kind(EntityKind::Obstacle)
        .any(|e| {
            let ahead = e.screen_x - PLAYER_X;
            ahead > 0.0 && ahead < AUTOPILOT_REACH
        })
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Ridge Runner (native) starting...");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Bad config: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut session = match Session::new(config, seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Bad config: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };
    session.on_game_over(|distance, coins| {
        log::info!("Game over callback: {}m, {} coins", distance, coins);
    });
    if let Err(e) = session.start(PlayerIdentity::new("autopilot")) {
        log::error!("Could not start: {}", e);
        return std::process::ExitCode::FAILURE;
    }

    let mut result = None;
    for _ in 0..MAX_FRAMES {
        if rock_ahead(&session) {
            session.request_jump();
        }
        if let Some(r) = session.update(SIM_DT) {
            result = Some(r);
            break;
        }
    }

    match result {
        Some(r) => println!(
            "Crashed after {}m with {} coins (score {})",
            r.distance_meters, r.coins_collected, r.total_score
        ),
        None => {
            let hud = session.scene().hud;
            println!("Survived: {} / {}", hud.distance_text(), hud.coins_text());
        }
    }
    let vertices = session.vertices();
    log::debug!(
        "Last frame: {} vertices, {} bytes",
        vertices.len(),
        as_bytes(&vertices).len()
    );
    session.teardown();
    std::process::ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is ridge_runner::web::init, this is just to satisfy the compiler
}
