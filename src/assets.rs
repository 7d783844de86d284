//! Sprite binding with procedural fallbacks
//!
//! Each sprite slot resolves once per run to either a host-supplied texture
//! or a simple filled shape, so the game always has something to draw.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioBindings;
use crate::config::AssetUrls;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::sim::EntityKind;

/// Why a URL could not back an asset slot
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset url is empty")]
    Empty,
    #[error("unsupported asset url `{0}`")]
    Unsupported(String),
    #[error("failed to load `{url}`: {reason}")]
    Failed { url: String, reason: String },
}

/// Resolves asset URLs for the platform
pub trait AssetLoader {
    /// Accept `url` for use, or explain why it cannot be used
    fn load(&mut self, url: &str) -> Result<(), AssetError>;
}

/// Accepts anything a browser can fetch: http(s), data/blob URLs, and
/// relative paths that name a file
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlLoader;

impl AssetLoader for UrlLoader {
    fn load(&mut self, url: &str) -> Result<(), AssetError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AssetError::Empty);
        }
        let lower = url.to_ascii_lowercase();
        let remote = ["http://", "https://", "data:", "blob:"]
            .iter()
            .any(|scheme| lower.starts_with(scheme));
        if remote {
            return Ok(());
        }
        if lower.contains("://") || lower.starts_with("javascript:") {
            return Err(AssetError::Unsupported(url.to_string()));
        }
        let file = lower.rsplit('/').next().unwrap_or_default();
        match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Ok(()),
            _ => Err(AssetError::Unsupported(url.to_string())),
        }
    }
}

/// Sprite slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteSlot {
    Player,
    Coin,
    Obstacle,
    PowerUp,
}

impl SpriteSlot {
    pub fn for_entity(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Obstacle => SpriteSlot::Obstacle,
            EntityKind::Collectible => SpriteSlot::Coin,
            EntityKind::PowerUp => SpriteSlot::PowerUp,
        }
    }

    /// Placeholder drawn when the slot has no texture
    pub fn fallback(self) -> FallbackShape {
        match self {
            SpriteSlot::Player => FallbackShape {
                kind: ShapeKind::Rectangle,
                size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
                fill: [0.2, 0.6, 1.0, 1.0],
                outline: [1.0, 1.0, 1.0, 1.0],
            },
            SpriteSlot::Coin => FallbackShape {
                kind: ShapeKind::Circle,
                size: EntityKind::Collectible.size(),
                fill: [1.0, 0.84, 0.0, 1.0],
                outline: [0.72, 0.53, 0.04, 1.0],
            },
            SpriteSlot::Obstacle => FallbackShape {
                kind: ShapeKind::Triangle,
                size: EntityKind::Obstacle.size(),
                fill: [0.9, 0.2, 0.2, 1.0],
                outline: [0.4, 0.0, 0.0, 1.0],
            },
            SpriteSlot::PowerUp => FallbackShape {
                kind: ShapeKind::Diamond,
                size: EntityKind::PowerUp.size(),
                fill: [0.6, 0.3, 1.0, 1.0],
                outline: [1.0, 1.0, 1.0, 1.0],
            },
        }
    }
}

/// Placeholder geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Diamond,
}

/// A filled, outlined placeholder shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackShape {
    pub kind: ShapeKind,
    pub size: Vec2,
    pub fill: [f32; 4],
    pub outline: [f32; 4],
}

/// What to draw for a sprite slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpriteSource {
    Texture { url: String },
    Fallback(FallbackShape),
}

impl SpriteSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SpriteSource::Fallback(_))
    }
}

/// Resolve one optional URL through the loader
///
/// Shared with audio binding. Failures are logged, never returned.
pub(crate) fn resolve(
    slot: &str,
    url: Option<&str>,
    loader: &mut dyn AssetLoader,
) -> Option<String> {
    let url = url?;
    match loader.load(url) {
        Ok(()) => Some(url.trim().to_string()),
        Err(e) => {
            log::warn!("Asset `{}` unusable, using fallback: {}", slot, e);
            None
        }
    }
}

fn bind_sprite(slot: SpriteSlot, url: Option<&str>, loader: &mut dyn AssetLoader) -> SpriteSource {
    match resolve(&format!("{slot:?}"), url, loader) {
        Some(url) => SpriteSource::Texture { url },
        None => SpriteSource::Fallback(slot.fallback()),
    }
}

/// Media resolved for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBindings {
    pub player: SpriteSource,
    pub coin: SpriteSource,
    pub obstacle: SpriteSource,
    pub powerup: SpriteSource,
    pub audio: AudioBindings,
}

impl AssetBindings {
    /// Bind every slot, falling back wherever a URL is absent or refused
    pub fn bind(urls: &AssetUrls, loader: &mut dyn AssetLoader) -> Self {
        let bindings = Self {
            player: bind_sprite(SpriteSlot::Player, urls.player.as_deref(), loader),
            coin: bind_sprite(SpriteSlot::Coin, urls.coin.as_deref(), loader),
            obstacle: bind_sprite(SpriteSlot::Obstacle, urls.obstacle.as_deref(), loader),
            // No URL slot; power-ups are always drawn procedurally
            powerup: SpriteSource::Fallback(SpriteSlot::PowerUp.fallback()),
            audio: AudioBindings::bind(urls, loader),
        };
        log::info!(
            "Bound assets: {} sprite fallbacks, {} sound fallbacks",
            bindings.sprite_fallbacks(),
            bindings.audio.fallbacks()
        );
        bindings
    }

    /// Bindings with every slot on its placeholder
    pub fn fallbacks() -> Self {
        Self::bind(&AssetUrls::default(), &mut UrlLoader)
    }

    pub fn sprite(&self, slot: SpriteSlot) -> &SpriteSource {
        match slot {
            SpriteSlot::Player => &self.player,
            SpriteSlot::Coin => &self.coin,
            SpriteSlot::Obstacle => &self.obstacle,
            SpriteSlot::PowerUp => &self.powerup,
        }
    }

    pub fn sprite_fallbacks(&self) -> usize {
        [&self.player, &self.coin, &self.obstacle, &self.powerup]
            .iter()
            .filter(|s| s.is_fallback())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Refuses everything
    struct OfflineLoader;

    impl AssetLoader for OfflineLoader {
        fn load(&mut self, url: &str) -> Result<(), AssetError> {
            Err(AssetError::Failed {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn test_url_loader() {
        let mut loader = UrlLoader;
        assert!(loader.load("https://cdn.example.com/a.png").is_ok());
        assert!(loader.load("data:image/png;base64,AAAA").is_ok());
        assert!(loader.load("/assets/player.png").is_ok());
        assert!(loader.load("coin.webp").is_ok());
        assert!(matches!(loader.load("  "), Err(AssetError::Empty)));
        assert!(matches!(loader.load("ftp://x/y.png"), Err(AssetError::Unsupported(_))));
        assert!(matches!(loader.load("/assets/"), Err(AssetError::Unsupported(_))));
    }

    #[test]
    fn test_missing_urls_fall_back() {
        let bindings = AssetBindings::fallbacks();
        assert_eq!(bindings.sprite_fallbacks(), 4);
        assert_eq!(
            bindings.sprite(SpriteSlot::Obstacle),
            &SpriteSource::Fallback(SpriteSlot::Obstacle.fallback())
        );
        match bindings.sprite(SpriteSlot::Coin) {
            SpriteSource::Fallback(shape) => assert_eq!(shape.kind, ShapeKind::Circle),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_supplied_urls_bind_textures() {
        let urls = AssetUrls {
            player: Some("https://cdn.example.com/runner.png".to_string()),
            coin: Some("not a file".to_string()),
            ..Default::default()
        };
        let bindings = AssetBindings::bind(&urls, &mut UrlLoader);
        assert_eq!(
            bindings.player,
            SpriteSource::Texture {
                url: "https://cdn.example.com/runner.png".to_string()
            }
        );
        assert!(bindings.coin.is_fallback());
        assert_eq!(bindings.sprite_fallbacks(), 3);
    }

    #[test]
    fn test_loader_failure_is_not_fatal() {
        let urls = AssetUrls {
            player: Some("https://cdn.example.com/runner.png".to_string()),
            obstacle: Some("https://cdn.example.com/rock.png".to_string()),
            jump: Some("https://cdn.example.com/jump.mp3".to_string()),
            ..Default::default()
        };
        let bindings = AssetBindings::bind(&urls, &mut OfflineLoader);
        assert_eq!(bindings.sprite_fallbacks(), 4);
        assert_eq!(bindings.audio.fallbacks(), 5);
    }
}
