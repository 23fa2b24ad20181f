//! The render loop: camera update, per-pixel dispatch, accumulation, and
//! presentation.
//!
//! Windowing and input are out of scope for this crate; [`Presenter`] and
//! [`InputState`] are the narrow seams a host application fills in.
//! [`render_frame`] itself is the reusable, backend-agnostic part: one call
//! renders one full frame's worth of pixels in parallel and returns them for
//! the caller to hand to a [`Framebuffer`].

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::integrator::{trace, Skybox};
use crate::math::{Color, Float};
use crate::scene::Scene;
use crate::RenderConfig;

/// A host-provided surface this crate can push presented frames to. Kept
/// deliberately minimal — a concrete windowing backend lives outside this
/// crate and implements this trait over whatever surface it owns.
pub trait Presenter {
    fn present(&mut self, width: u32, height: u32, rgb: &[u8]);
}

/// Per-frame input deltas a host application collects from its windowing
/// backend and feeds into [`Engine::step`]. All fields default to "no
/// change" so a host can fill in only what it supports.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub move_forward: f32,
    pub move_right: f32,
    pub move_up: f32,
    pub yaw_delta: f32,
    pub pitch_delta: f32,
    pub fov_delta: f32,
    /// ×10 translation multiplier while held.
    pub speed_modifier: bool,
    pub toggle_depth_of_field: bool,
    /// Grows (positive) or shrinks (negative) the aperture radius, floored
    /// to `EPSILON` by [`crate::camera::Camera::set_aperture`].
    pub aperture_delta: f32,
    /// Adjusts focal distance directly, e.g. from a scroll wheel, floored
    /// to `EPSILON`.
    pub focal_distance_delta: f32,
    /// Cursor pixel `(x, y)` to re-focus on this frame: casts a ray through
    /// that pixel and sets `focal_distance` to the hit depth, or leaves it
    /// unbounded on a sky miss.
    pub focus_at_cursor: Option<(u32, u32)>,
    /// Steps ISO by `±1` doublings/halvings, clamped to `[iso_base, 128 *
    /// iso_base]`.
    pub iso_steps: i32,
    pub request_screenshot: bool,
}

/// The default control-surface mapping a host UI may bind to, documented
/// rather than enforced: WASD for `move_forward`/`move_right` (held with
/// shift for `speed_modifier`), mouse-look for `yaw_delta`/`pitch_delta`,
/// scroll wheel for `fov_delta`/`focal_distance_delta`, `F` to toggle depth
/// of field, `[`/`]` for `aperture_delta`, `-`/`=` for `iso_steps`, `G` to
/// focus at the cursor, and `P` to request a screenshot.
pub const DEFAULT_KEYMAP_DOC: &str =
    "WASD(+shift) move, mouse-look, scroll = fov/focal, F = dof, [ ] = aperture, -/= = iso, G = focus, P = screenshot";

/// ISO is quantized to `[ISO_BASE, 128 * ISO_BASE]`.
pub const ISO_BASE: f32 = 100.0;

pub struct Engine {
    pub config: RenderConfig,
    pub camera: Camera,
    pub scene: Scene,
    pub framebuffer: Framebuffer,
    frame_counter: u64,
    primary_rays: Vec<crate::primitive::Ray>,
}

impl Engine {
    pub fn new(config: RenderConfig, camera: Camera, scene: Scene) -> Self {
        let framebuffer = Framebuffer::new(config.width, config.height);
        let primary_rays = camera.build_primary_rays(config.width, config.height);
        Self {
            config,
            camera,
            scene,
            framebuffer,
            frame_counter: 0,
            primary_rays,
        }
    }

    /// Applies one frame of input, renders it, accumulates it, and presents
    /// the result through `presenter`. Returns `true` if a screenshot was
    /// requested this step (the caller is responsible for actually writing
    /// it — see [`crate::framebuffer::Framebuffer::present`]).
    pub fn step(&mut self, input: &InputState, skybox: Skybox<'_>, presenter: &mut impl Presenter) -> bool {
        self.apply_input(input);

        let dirty = self.camera.is_dirty();
        if dirty {
            self.primary_rays = self.camera.build_primary_rays(self.config.width, self.config.height);
        }

        let frame = render_frame(
            &self.scene,
            &self.camera,
            &self.primary_rays,
            self.config.samples_per_pixel,
            self.config.max_bounces,
            self.frame_counter,
            skybox,
        );
        self.framebuffer.submit_frame(frame, dirty);
        self.camera.clear_dirty();
        self.frame_counter += 1;

        let bytes = self.framebuffer.present(self.config.iso, self.config.shutter_seconds);
        presenter.present(self.config.width, self.config.height, &bytes);

        input.request_screenshot
    }

    fn apply_input(&mut self, input: &InputState) {
        let forward = self.camera.forward();
        let right = forward.cross(&crate::math::Vec3::new(0.0, 1.0, 0.0)).normalized();
        let up = crate::math::Vec3::new(0.0, 1.0, 0.0);

        let speed = if input.speed_modifier { 10.0 } else { 1.0 };
        let delta = (forward * input.move_forward + right * input.move_right + up * input.move_up) * speed;
        self.camera.translate(delta);
        self.camera.rotate(input.yaw_delta, input.pitch_delta);
        if input.fov_delta != 0.0 {
            self.camera.set_fov(self.camera.fov_degrees + input.fov_delta);
        }
        if input.toggle_depth_of_field {
            self.camera.depth_of_field = !self.camera.depth_of_field;
        }
        if input.aperture_delta != 0.0 {
            self.camera
                .set_aperture(self.camera.aperture_radius + input.aperture_delta);
        }
        if input.focal_distance_delta != 0.0 {
            self.camera
                .set_focal_distance(self.camera.focal_distance + input.focal_distance_delta);
        }
        if let Some((x, y)) = input.focus_at_cursor {
            let ray = self
                .camera
                .base_ray(x, y, self.config.width, self.config.height);
            let hit = self.scene.intersect(&ray);
            let distance = if hit.hit { hit.depth } else { Float::INFINITY };
            self.camera.set_focal_distance(distance);
        }
        if input.iso_steps != 0 {
            let stepped = self.config.iso * 2f32.powi(input.iso_steps);
            self.config.iso = stepped.clamp(ISO_BASE, 128.0 * ISO_BASE);
        }
    }
}

/// Renders one frame's worth of pixels, data-parallel across pixels via
/// `rayon`. Each pixel draws `samples_per_pixel` independent paths from its
/// cached, unjittered `primary_rays` entry and averages them; a NaN or
/// infinite sum is clamped to black rather than propagated. Each pixel
/// seeds its own `SmallRng` from its flat index and the frame counter so no
/// two pixels, in this frame or any other, ever draw from a correlated
/// sequence.
pub fn render_frame(
    scene: &Scene,
    camera: &Camera,
    primary_rays: &[crate::primitive::Ray],
    samples_per_pixel: u32,
    max_bounces: u32,
    frame_counter: u64,
    skybox: Skybox<'_>,
) -> Vec<Color> {
    let samples_per_pixel = samples_per_pixel.max(1);
    primary_rays
        .par_iter()
        .enumerate()
        .map(|(pixel_index, base_ray)| {
            let mut rng = SmallRng::seed_from_u64(
                (pixel_index as u64).wrapping_mul(0x9E3779B97F4A7C15) ^ frame_counter,
            );

            let mut total = Color::zero();
            for _ in 0..samples_per_pixel {
                let ray = camera.jitter_sample(base_ray, &mut rng);
                total += trace(scene, ray, max_bounces, skybox, &mut rng);
            }

            let average = total / samples_per_pixel as Float;
            if average.has_nan() || !average.is_finite() {
                Color::zero()
            } else {
                average
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::math::Point3;

    struct NullPresenter {
        pub last_len: usize,
    }

    impl Presenter for NullPresenter {
        fn present(&mut self, width: u32, height: u32, rgb: &[u8]) {
            self.last_len = rgb.len();
            assert_eq!(rgb.len(), (width * height * 3) as usize);
        }
    }

    #[test]
    fn render_frame_produces_one_color_per_pixel() {
        let camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 4.0 / 3.0);
        let scene = Scene::default();
        let primary_rays = camera.build_primary_rays(8, 6);
        let frame = render_frame(&scene, &camera, &primary_rays, 3, 2, 0, None);
        assert_eq!(frame.len(), 8 * 6);
    }

    #[test]
    fn engine_step_presents_a_full_frame() {
        let camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 4.0 / 3.0);
        let mut config = RenderConfig::default();
        config.width = 8;
        config.height = 6;
        let mut engine = Engine::new(config, camera, Scene::default());
        let mut presenter = NullPresenter { last_len: 0 };
        engine.step(&InputState::default(), None, &mut presenter);
        assert_eq!(presenter.last_len, 8 * 6 * 3);
    }
}
