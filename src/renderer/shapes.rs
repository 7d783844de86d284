//! Shape generation for 2D primitives
//!
//! Tessellates a [`Scene`] into colored triangles for hosts that draw with
//! a vertex buffer. Textured sprites are left to the host; only procedural
//! fallbacks are emitted here.

use glam::Vec2;
use std::f32::consts::PI;

use super::scene::{Scene, SpriteDraw};
use super::vertex::{Vertex, colors};
use crate::assets::{AssetBindings, FallbackShape, ShapeKind, SpriteSource};

/// Outline thickness for fallback shapes (px)
pub const OUTLINE_WIDTH: f32 = 2.0;
/// Grass line along the terrain surface (px)
pub const TERRAIN_EDGE_WIDTH: f32 = 4.0;

fn push_triangle(vertices: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    vertices.push(Vertex::new(a.x, a.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(c.x, c.y, color));
}

/// Fill the ground polygon as a strip of quads down to the bottom edge
///
/// Expects the layout from `terrain_polygon`: surface points, then the
/// bottom-right and bottom-left corners.
pub fn terrain_fill(polygon: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    if polygon.len() < 4 {
        return Vec::new();
    }
    let bottom = polygon[polygon.len() - 1].y;
    let surface = &polygon[..polygon.len() - 2];

    let mut vertices = Vec::with_capacity(surface.len() * 6);
    for pair in surface.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let a_low = Vec2::new(a.x, bottom);
        let b_low = Vec2::new(b.x, bottom);
        push_triangle(&mut vertices, a, b, a_low, color);
        push_triangle(&mut vertices, b, b_low, a_low, color);
    }
    vertices
}

/// Band of quads hanging below the terrain surface
pub fn terrain_edge(polygon: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if polygon.len() < 4 {
        return Vec::new();
    }
    let surface = &polygon[..polygon.len() - 2];
    let drop = Vec2::new(0.0, width);

    let mut vertices = Vec::with_capacity(surface.len() * 6);
    for pair in surface.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        push_triangle(&mut vertices, a, b, a + drop, color);
        push_triangle(&mut vertices, b, b + drop, a + drop, color);
    }
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        push_triangle(
            &mut vertices,
            center,
            center + Vec2::new(theta1.cos(), theta1.sin()) * radius,
            center + Vec2::new(theta2.cos(), theta2.sin()) * radius,
            color,
        );
    }

    vertices
}

/// Convex outline of a shape in local space (screen y down), before rotation
fn outline_points(kind: ShapeKind, half: Vec2) -> Vec<Vec2> {
    match kind {
        ShapeKind::Rectangle => vec![
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ],
        // Point up, base on the ground
        ShapeKind::Triangle => vec![
            Vec2::new(0.0, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ],
        ShapeKind::Diamond => vec![
            Vec2::new(0.0, -half.y),
            Vec2::new(half.x, 0.0),
            Vec2::new(0.0, half.y),
            Vec2::new(-half.x, 0.0),
        ],
        ShapeKind::Circle => (0..16)
            .map(|i| {
                let theta = i as f32 / 16.0 * 2.0 * PI;
                Vec2::new(theta.cos() * half.x, theta.sin() * half.y)
            })
            .collect(),
    }
}

/// Fan-fill a convex polygon
fn convex_fill(points: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(points.len().saturating_sub(2) * 3);
    for i in 1..points.len().saturating_sub(1) {
        push_triangle(&mut vertices, points[0], points[i], points[i + 1], color);
    }
    vertices
}

/// Outlined placeholder shape: a larger outline-colored copy under the fill
pub fn fallback_shape(
    shape: &FallbackShape,
    center: Vec2,
    scale: f32,
    rotation: f32,
    tint: Option<[f32; 4]>,
) -> Vec<Vertex> {
    let half = shape.size * scale / 2.0;
    let rot = Vec2::from_angle(rotation);
    let place = |points: Vec<Vec2>| -> Vec<Vec2> {
        points.into_iter().map(|p| center + rot.rotate(p)).collect()
    };

    let outer = place(outline_points(shape.kind, half + Vec2::splat(OUTLINE_WIDTH)));
    let inner = place(outline_points(shape.kind, half));

    let mut vertices = convex_fill(&outer, shape.outline);
    vertices.extend(convex_fill(&inner, tint.unwrap_or(shape.fill)));
    vertices
}

fn sprite_vertices(sprite: &SpriteDraw, assets: &AssetBindings) -> Vec<Vertex> {
    match assets.sprite(sprite.slot) {
        SpriteSource::Texture { .. } => Vec::new(),
        SpriteSource::Fallback(shape) => {
            let shape = FallbackShape {
                size: sprite.size,
                ..*shape
            };
            fallback_shape(&shape, sprite.center, sprite.scale, sprite.rotation, sprite.tint)
        }
    }
}

/// Triangles for the whole scene: terrain, fallback sprites, particles
pub fn scene_vertices(scene: &Scene, assets: &AssetBindings) -> Vec<Vertex> {
    let mut vertices = terrain_fill(&scene.terrain, colors::TERRAIN);
    vertices.extend(terrain_edge(&scene.terrain, TERRAIN_EDGE_WIDTH, colors::TERRAIN_EDGE));
    for sprite in &scene.sprites {
        vertices.extend(sprite_vertices(sprite, assets));
    }
    for particle in &scene.particles {
        let mut color = colors::PARTICLE;
        color[3] = particle.alpha;
        vertices.extend(circle(particle.center, particle.radius, color, 6));
    }
    vertices
}
