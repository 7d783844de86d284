//! Terrain height function
//!
//! Ground elevation as a pure function of world x. Two sinusoids of
//! different frequency keep the profile smooth but hard to predict.
//! Heights are measured upward from the bottom of the view.

/// Mean ground elevation (px)
pub const TERRAIN_BASE: f32 = 150.0;
/// Long rolling hills
pub const TERRAIN_AMP_1: f32 = 40.0;
pub const TERRAIN_FREQ_1: f32 = 0.004;
/// Short bumps
pub const TERRAIN_AMP_2: f32 = 20.0;
pub const TERRAIN_FREQ_2: f32 = 0.011;

/// Lowest possible ground elevation
pub const TERRAIN_MIN: f32 = TERRAIN_BASE - TERRAIN_AMP_1 - TERRAIN_AMP_2;
/// Highest possible ground elevation
pub const TERRAIN_MAX: f32 = TERRAIN_BASE + TERRAIN_AMP_1 + TERRAIN_AMP_2;

/// Ground elevation at world x
#[inline]
pub fn height(world_x: f32) -> f32 {
    TERRAIN_BASE
        + TERRAIN_AMP_1 * (world_x * TERRAIN_FREQ_1).sin()
        + TERRAIN_AMP_2 * (world_x * TERRAIN_FREQ_2).cos()
}

/// Analytic slope (d height / d x) at world x
#[inline]
pub fn slope(world_x: f32) -> f32 {
    TERRAIN_AMP_1 * TERRAIN_FREQ_1 * (world_x * TERRAIN_FREQ_1).cos()
        - TERRAIN_AMP_2 * TERRAIN_FREQ_2 * (world_x * TERRAIN_FREQ_2).sin()
}

/// Surface angle (radians, positive = uphill) at world x
#[inline]
pub fn surface_angle(world_x: f32) -> f32 {
    slope(world_x).atan()
}

/// Sample heights every `step` px from `start_x` across `width`
///
/// Always includes both ends so a polygon built from it spans the window.
pub fn sample(start_x: f32, width: f32, step: f32) -> Vec<(f32, f32)> {
    let step = step.max(1.0);
    let count = (width / step).ceil() as usize;
    let mut samples = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let local_x = (i as f32 * step).min(width);
        samples.push((local_x, height(start_x + local_x)));
    }
    samples
}
