//! Browser host binding
//!
//! The embedding page owns the canvas and the frame loop. It hands over
//! config JSON once, forwards input, and calls `frame` from
//! `requestAnimationFrame`, drawing the returned scene.

use wasm_bindgen::prelude::*;

use crate::assets::UrlLoader;
use crate::audio::WebAudioBackend;
use crate::config::GameConfig;
use crate::input::is_jump_key;
use crate::renderer::as_bytes;
use crate::session::{PlayerIdentity, Session};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Ridge Runner (WASM) loaded");
}

/// One embedded game
#[wasm_bindgen]
pub struct RunnerHandle {
    session: Session,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl RunnerHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed: f64) -> Result<RunnerHandle, JsError> {
        let config = GameConfig::from_json(config_json)?;
        let session = Session::with_backends(
            config,
            seed as u64,
            &mut UrlLoader,
            Box::new(WebAudioBackend::new()),
        )?;
        Ok(Self {
            session,
            last_time: None,
        })
    }

    /// Register `callback(distance, coins)`, called once per run
    #[wasm_bindgen(js_name = onGameOver)]
    pub fn on_game_over(&mut self, callback: js_sys::Function) {
        self.session.on_game_over(move |distance, coins| {
            if let Err(e) = callback.call2(&JsValue::NULL, &distance.into(), &coins.into()) {
                log::error!("Game-over callback threw: {:?}", e);
            }
        });
    }

    pub fn start(&mut self, name: String, social: Option<String>) -> Result<(), JsError> {
        let mut identity = PlayerIdentity::new(name);
        if let Some(social) = social {
            identity = identity.with_social(social);
        }
        self.session.start(identity)?;
        self.last_time = None;
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), JsError> {
        self.session.restart()?;
        self.last_time = None;
        Ok(())
    }

    /// Tap, click or any other jump gesture
    pub fn jump(&mut self) {
        self.session.request_jump();
    }

    /// Returns true when the key was consumed (so the page can prevent
    /// scrolling on Space)
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, code: &str) -> bool {
        if is_jump_key(code) {
            self.session.request_jump();
            true
        } else {
            false
        }
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        self.session.set_muted(muted);
    }

    /// Advance to `now_ms` and return the scene as JSON
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);

        if let Some(result) = self.session.update(dt) {
            log::info!(
                "Game over: {}m, {} coins, score {}",
                result.distance_meters,
                result.coins_collected,
                result.total_score
            );
        }
        Ok(serde_json::to_string(&self.session.scene())?)
    }

    /// Vertex buffer for the current frame (`position: vec2<f32>`,
    /// `color: vec4<f32>`, 24-byte stride)
    #[wasm_bindgen(js_name = frameVertices)]
    pub fn frame_vertices(&self) -> js_sys::Uint8Array {
        let vertices = self.session.vertices();
        js_sys::Uint8Array::from(as_bytes(&vertices))
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f32) {
        self.session.set_master_volume(volume);
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.session.phase())
    }
}
