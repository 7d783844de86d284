//! Audio binding and playback
//!
//! Sounds come from host URLs when supplied; otherwise each effect has a
//! procedural oscillator recipe, so the game is never silent. Playback goes
//! through an [`AudioBackend`]: Web Audio in the browser, a logging no-op
//! elsewhere.

use serde::{Deserialize, Serialize};

use crate::assets::{AssetLoader, resolve};
use crate::config::{AssetUrls, AudioSettings};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ground jump
    Jump,
    /// Mid-air jump
    DoubleJump,
    /// Coin collected
    Coin,
    /// Power-up collected
    PowerUp,
    /// Hit an obstacle
    Crash,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator blip with an exponential pitch and gain envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub waveform: Waveform,
    pub freq_start: f32,
    pub freq_end: f32,
    /// Seconds after the effect is triggered
    pub delay: f64,
    /// Seconds
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
}

impl Note {
    const fn sweep(waveform: Waveform, from: f32, to: f32, duration: f64, gain: f32) -> Self {
        Self {
            waveform,
            freq_start: from,
            freq_end: to,
            delay: 0.0,
            duration,
            gain,
        }
    }
}

/// Procedural sound recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub notes: Vec<Note>,
}

impl Tone {
    /// Notes played one after another, `gap` seconds apart
    fn arpeggio(waveform: Waveform, freqs: &[f32], gap: f64, duration: f64, gain: f32) -> Self {
        let notes = freqs
            .iter()
            .enumerate()
            .map(|(i, &freq)| Note {
                delay: i as f64 * gap,
                ..Note::sweep(waveform, freq, freq, duration, gain)
            })
            .collect();
        Self { notes }
    }

    /// Built-in recipe for an effect
    pub fn fallback(effect: SoundEffect) -> Self {
        match effect {
            // Whoosh up
            SoundEffect::Jump => Self {
                notes: vec![Note::sweep(Waveform::Triangle, 200.0, 600.0, 0.2, 0.3)],
            },
            SoundEffect::DoubleJump => Self {
                notes: vec![Note::sweep(Waveform::Triangle, 400.0, 1000.0, 0.2, 0.3)],
            },
            // Happy ding
            SoundEffect::Coin => Self::arpeggio(Waveform::Sine, &[600.0, 800.0, 1000.0], 0.08, 0.15, 0.25),
            SoundEffect::PowerUp => Self::arpeggio(
                Waveform::Triangle,
                &[500.0, 600.0, 700.0, 800.0, 1000.0],
                0.08,
                0.25,
                0.25,
            ),
            // Sad descending
            SoundEffect::Crash => Self::arpeggio(Waveform::Sine, &[400.0, 350.0, 300.0, 200.0], 0.2, 0.3, 0.3),
        }
    }

    /// Seconds until the last note ends
    pub fn length(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.delay + n.duration)
            .fold(0.0, f64::max)
    }
}

/// Where a sound effect comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SoundSource {
    Clip { url: String },
    Tone(Tone),
}

/// Where the background music comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MusicSource {
    Clip { url: String },
    /// Soft sustained oscillator
    Drone { waveform: Waveform, freq: f32, gain: f32 },
}

impl MusicSource {
    pub fn fallback() -> Self {
        MusicSource::Drone {
            waveform: Waveform::Triangle,
            freq: 110.0,
            gain: 0.08,
        }
    }
}

/// Sounds resolved for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBindings {
    pub music: MusicSource,
    pub jump: SoundSource,
    pub crash: SoundSource,
    pub powerup: SoundSource,
    /// No URL slot; always procedural
    pub coin: SoundSource,
    /// Reuses the jump clip when one was supplied
    pub double_jump: SoundSource,
}

fn bind_sound(
    effect: SoundEffect,
    url: Option<&str>,
    loader: &mut dyn AssetLoader,
) -> SoundSource {
    match resolve(&format!("{effect:?}"), url, loader) {
        Some(url) => SoundSource::Clip { url },
        None => SoundSource::Tone(Tone::fallback(effect)),
    }
}

impl AudioBindings {
    pub fn bind(urls: &AssetUrls, loader: &mut dyn AssetLoader) -> Self {
        let music = match resolve("bgm", urls.bgm.as_deref(), loader) {
            Some(url) => MusicSource::Clip { url },
            None => MusicSource::fallback(),
        };
        let jump = bind_sound(SoundEffect::Jump, urls.jump.as_deref(), loader);
        let double_jump = match &jump {
            SoundSource::Clip { url } => SoundSource::Clip { url: url.clone() },
            SoundSource::Tone(_) => SoundSource::Tone(Tone::fallback(SoundEffect::DoubleJump)),
        };
        Self {
            music,
            jump,
            crash: bind_sound(SoundEffect::Crash, urls.crash.as_deref(), loader),
            powerup: bind_sound(SoundEffect::PowerUp, urls.powerup.as_deref(), loader),
            coin: SoundSource::Tone(Tone::fallback(SoundEffect::Coin)),
            double_jump,
        }
    }

    pub fn source(&self, effect: SoundEffect) -> &SoundSource {
        match effect {
            SoundEffect::Jump => &self.jump,
            SoundEffect::DoubleJump => &self.double_jump,
            SoundEffect::Coin => &self.coin,
            SoundEffect::PowerUp => &self.powerup,
            SoundEffect::Crash => &self.crash,
        }
    }

    /// Sounds that ended up procedural: music, jump, crash and power-up
    /// when their URL was missing or refused, plus the coin chime, which
    /// has no URL slot
    pub fn fallbacks(&self) -> usize {
        let music = usize::from(!matches!(self.music, MusicSource::Clip { .. }));
        music
            + [&self.jump, &self.crash, &self.powerup, &self.coin]
                .iter()
                .filter(|s| matches!(s, SoundSource::Tone(_)))
                .count()
    }
}

/// Platform audio output
pub trait AudioBackend {
    fn play_clip(&mut self, url: &str, volume: f32);
    fn play_tone(&mut self, tone: &Tone, volume: f32);
    fn start_music(&mut self, music: &MusicSource, volume: f32);
    fn stop_music(&mut self);
}

/// Backend for headless and native runs; logs instead of playing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play_clip(&mut self, url: &str, volume: f32) {
        log::trace!("clip {} @ {:.2}", url, volume);
    }

    fn play_tone(&mut self, tone: &Tone, volume: f32) {
        log::trace!(
            "tone ({} notes, {:.2}s) @ {:.2}",
            tone.notes.len(),
            tone.length(),
            volume
        );
    }

    fn start_music(&mut self, music: &MusicSource, volume: f32) {
        log::trace!("music {:?} @ {:.2}", music, volume);
    }

    fn stop_music(&mut self) {}
}

/// Audio manager for one session
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    bindings: AudioBindings,
    settings: AudioSettings,
    music_playing: bool,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("bindings", &self.bindings)
            .field("settings", &self.settings)
            .field("music_playing", &self.music_playing)
            .finish_non_exhaustive()
    }
}

impl AudioManager {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        bindings: AudioBindings,
        settings: AudioSettings,
    ) -> Self {
        Self {
            backend,
            bindings,
            settings,
            music_playing: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.settings.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        if muted {
            self.stop_music();
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    fn sfx_volume(&self) -> f32 {
        if self.settings.muted {
            0.0
        } else {
            self.settings.master_volume * self.settings.sfx_volume
        }
    }

    fn music_volume(&self) -> f32 {
        if self.settings.muted {
            0.0
        } else {
            self.settings.master_volume * self.settings.music_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.sfx_volume();
        if vol <= 0.0 {
            return;
        }
        match self.bindings.source(effect) {
            SoundSource::Clip { url } => self.backend.play_clip(url, vol),
            SoundSource::Tone(tone) => self.backend.play_tone(tone, vol),
        }
    }

    /// Start the background loop (no-op if already running or muted)
    pub fn start_music(&mut self) {
        let vol = self.music_volume();
        if self.music_playing || vol <= 0.0 {
            return;
        }
        self.backend.start_music(&self.bindings.music, vol);
        self.music_playing = true;
    }

    pub fn stop_music(&mut self) {
        if self.music_playing {
            self.backend.stop_music();
            self.music_playing = false;
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web_backend::WebAudioBackend;

#[cfg(target_arch = "wasm32")]
mod web_backend {
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{AudioBackend, MusicSource, Note, Tone, Waveform};

    fn oscillator_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Triangle => OscillatorType::Triangle,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        }
    }

    /// Web Audio output
    pub struct WebAudioBackend {
        ctx: Option<AudioContext>,
        music_clip: Option<HtmlAudioElement>,
        music_drone: Option<OscillatorNode>,
    }

    impl Default for WebAudioBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioBackend {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - procedural audio disabled");
            }
            Self {
                ctx,
                music_clip: None,
                music_drone: None,
            }
        }

        /// Resume context if suspended (browsers require user gesture)
        fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            waveform: Waveform,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(oscillator_type(waveform));
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_note(ctx: &AudioContext, note: &Note, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, note.freq_start, note.waveform) else {
                return;
            };
            let t = ctx.current_time() + note.delay;
            let end = t + note.duration;

            gain.gain().set_value_at_time(vol * note.gain, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
            if (note.freq_end - note.freq_start).abs() > f32::EPSILON {
                osc.frequency().set_value_at_time(note.freq_start, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(note.freq_end, end)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(end + 0.05).ok();
        }
    }

    impl AudioBackend for WebAudioBackend {
        fn play_clip(&mut self, url: &str, volume: f32) {
            match HtmlAudioElement::new_with_src(url) {
                Ok(el) => {
                    el.set_volume(f64::from(volume));
                    if el.play().is_err() {
                        log::warn!("Could not play clip {}", url);
                    }
                }
                Err(_) => log::warn!("Could not create audio element for {}", url),
            }
        }

        fn play_tone(&mut self, tone: &Tone, volume: f32) {
            self.resume();
            let Some(ctx) = &self.ctx else { return };
            for note in &tone.notes {
                Self::play_note(ctx, note, volume);
            }
        }

        fn start_music(&mut self, music: &MusicSource, volume: f32) {
            self.stop_music();
            match music {
                MusicSource::Clip { url } => {
                    if let Ok(el) = HtmlAudioElement::new_with_src(url) {
                        el.set_loop(true);
                        el.set_volume(f64::from(volume));
                        let _ = el.play();
                        self.music_clip = Some(el);
                    }
                }
                MusicSource::Drone {
                    waveform,
                    freq,
                    gain: level,
                } => {
                    self.resume();
                    let Some(ctx) = &self.ctx else { return };
                    if let Some((osc, gain)) = Self::create_osc(ctx, *freq, *waveform) {
                        gain.gain().set_value(volume * level);
                        if osc.start().is_ok() {
                            self.music_drone = Some(osc);
                        }
                    }
                }
            }
        }

        fn stop_music(&mut self) {
            if let Some(el) = self.music_clip.take() {
                let _ = el.pause();
            }
            if let Some(osc) = self.music_drone.take() {
                let _ = osc.stop();
            }
        }
    }
}
