//! Backend-agnostic rendering
//!
//! The simulation is extracted into a [`Scene`] each frame; hosts either
//! draw it directly or tessellate fallback sprites into vertex lists.

pub mod camera;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use camera::Camera;
pub use scene::{Hud, ParticleDraw, Scene, SpriteDraw, build_scene, terrain_polygon};
pub use shapes::scene_vertices;
pub use vertex::{Vertex, as_bytes};
