//! Overlap tests between the runner and entities
//!
//! Both sides are axis-aligned boxes in camera-relative x and elevation y.
//! Touching edges do not count as contact.

use glam::Vec2;

use super::state::{Entity, EntityKind, EntityStore, Player};
use crate::consts::{PLAYER_HITBOX_HEIGHT, PLAYER_HITBOX_WIDTH};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box standing on `bottom_center`
    pub fn from_bottom_center(bottom_center: Vec2, size: Vec2) -> Self {
        let half_w = size.x / 2.0;
        Self {
            min: Vec2::new(bottom_center.x - half_w, bottom_center.y),
            max: Vec2::new(bottom_center.x + half_w, bottom_center.y + size.y),
        }
    }

    /// Strict overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Runner hitbox
pub fn player_bounds(player: &Player) -> Aabb {
    Aabb::from_bottom_center(
        player.pos,
        Vec2::new(PLAYER_HITBOX_WIDTH, PLAYER_HITBOX_HEIGHT),
    )
}

/// Entity hitbox at its current screen position
///
/// Power-up bobbing is cosmetic and ignored here.
pub fn entity_bounds(entity: &Entity) -> Aabb {
    Aabb::from_bottom_center(
        Vec2::new(entity.screen_x, entity.base_y()),
        entity.kind().size(),
    )
}

/// Every entity touching the runner, in id order
pub fn overlapping(player: &Player, entities: &EntityStore) -> Vec<(u32, EntityKind)> {
    let bounds = player_bounds(player);
    entities
        .iter()
        .filter(|e| bounds.overlaps(&entity_bounds(e)))
        .map(|e| (e.id(), e.kind()))
        .collect()
}
