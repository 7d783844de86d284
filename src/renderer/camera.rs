//! World-to-screen transform
//!
//! The camera follows the runner through a single horizontal offset,
//! `global_distance`. Screen y grows downward; elevations grow upward.

use glam::Vec2;

use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World x of the left edge
    pub offset: f32,
    pub view: Vec2,
}

impl Camera {
    pub fn new(offset: f32) -> Self {
        Self {
            offset,
            view: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
        }
    }

    /// World x to camera-relative x
    #[inline]
    pub fn screen_x(&self, world_x: f32) -> f32 {
        world_x - self.offset
    }

    /// Elevation to screen y
    #[inline]
    pub fn screen_y(&self, elevation: f32) -> f32 {
        self.view.y - elevation
    }

    /// Camera-relative x plus elevation to a screen point
    #[inline]
    pub fn to_screen(&self, local_x: f32, elevation: f32) -> Vec2 {
        Vec2::new(local_x, self.screen_y(elevation))
    }

    /// World point (x, elevation) to a screen point
    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.to_screen(self.screen_x(world.x), world.y)
    }
}
