//! Irradiance: an interactive, physically-based Monte Carlo path tracer.
//!
//! The crate is organized bottom-up: [`math`] and [`primitive`] provide the
//! geometric kernel, [`mesh`] and [`scene`] compose primitives into a
//! renderable world, [`camera`] generates primary rays, [`integrator`] is the
//! Monte Carlo estimator, and [`framebuffer`] turns accumulated radiance into
//! a displayable image. [`engine`] wires all of it into a render loop behind
//! a narrow [`engine::Presenter`] boundary so this crate never depends on a
//! specific windowing backend.

pub mod camera;
pub mod cli;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod integrator;
pub mod material;
pub mod math;
pub mod mesh;
pub mod obj;
pub mod primitive;
pub mod scene;
pub mod texture;

use crate::math::Float;

/// Render settings resolved from the command line. Every field has a sane
/// default so a bare `irradiance` invocation with no flags still renders
/// something.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub max_bounces: u32,
    /// Samples per pixel traced and averaged each frame.
    pub samples_per_pixel: u32,
    /// Number of captured frames; reserved for a future screenshot-burst
    /// mode and not consumed by the render loop itself.
    pub captures: u32,
    pub fov_degrees: Float,
    pub aperture_radius: Float,
    pub focal_distance: Float,
    pub iso: Float,
    pub shutter_seconds: Float,
    pub scene_path: Option<String>,
    pub output_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            max_bounces: 2,
            samples_per_pixel: 5,
            captures: 1,
            fov_degrees: 60.0,
            aperture_radius: 0.0,
            focal_distance: 10.0,
            iso: 100.0,
            shutter_seconds: 1.0 / 60.0,
            scene_path: None,
            output_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_positive_dimensions() {
        let config = RenderConfig::default();
        assert!(config.width > 0);
        assert!(config.height > 0);
    }
}
