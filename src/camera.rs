//! Thin-lens perspective camera. Tracks a `dirty` flag so the engine knows
//! when the accumulation buffer needs to reset.

use rand::Rng;

use crate::math::{uniform_disk, Float, Mat4, Point3, Vec3};
use crate::primitive::Ray;

const MAX_PITCH_DEGREES: Float = 80.0;
const MIN_FOV_DEGREES: Float = 10.0;
const MAX_FOV_DEGREES: Float = 170.0;

/// Half-width of the per-sample direction-jitter cube: each sample's ray
/// direction is nudged by a uniform offset in `[-SAMPLE_JITTER,
/// SAMPLE_JITTER]` per axis before renormalizing, rather than jittering
/// within the pixel footprint.
pub const SAMPLE_JITTER: Float = 1e-3;

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3,
    /// Yaw in radians, unclamped (wraps freely).
    pub yaw: Float,
    /// Pitch in radians, clamped to `±80°` to avoid gimbal flip at the poles.
    pub pitch: Float,
    pub fov_degrees: Float,
    pub aspect_ratio: Float,
    pub aperture_radius: Float,
    pub focal_distance: Float,
    pub depth_of_field: bool,
    dirty: bool,
}

impl Camera {
    pub fn new(position: Point3, yaw: Float, pitch: Float, fov_degrees: Float, aspect_ratio: Float) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH_DEGREES.to_radians(), MAX_PITCH_DEGREES.to_radians()),
            fov_degrees: fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES),
            aspect_ratio,
            aperture_radius: 0.0,
            focal_distance: 10.0,
            depth_of_field: false,
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
        .normalized()
    }

    pub fn target(&self) -> Point3 {
        self.position + self.forward()
    }

    pub fn translate(&mut self, delta: Vec3) {
        if delta.is_zero() {
            return;
        }
        self.position += delta;
        self.dirty = true;
    }

    pub fn rotate(&mut self, delta_yaw: Float, delta_pitch: Float) {
        if delta_yaw == 0.0 && delta_pitch == 0.0 {
            return;
        }
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch)
            .clamp(-MAX_PITCH_DEGREES.to_radians(), MAX_PITCH_DEGREES.to_radians());
        self.dirty = true;
    }

    pub fn set_fov(&mut self, fov_degrees: Float) {
        let clamped = fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
        if (clamped - self.fov_degrees).abs() > Float::EPSILON {
            self.fov_degrees = clamped;
            self.dirty = true;
        }
    }

    /// Floors to a small epsilon rather than zero: an exact-zero aperture is
    /// indistinguishable from "no depth of field" to a user turning the
    /// control, so keeping it just above zero lets them dial it back up.
    pub fn set_aperture(&mut self, radius: Float) {
        let floored = radius.max(1e-3);
        if (floored - self.aperture_radius).abs() > Float::EPSILON {
            self.aperture_radius = floored;
            self.dirty = true;
        }
    }

    pub fn set_focal_distance(&mut self, distance: Float) {
        if (distance - self.focal_distance).abs() > Float::EPSILON {
            self.focal_distance = distance.max(Float::EPSILON);
            self.dirty = true;
        }
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target(), Vec3::new(0.0, 1.0, 0.0))
    }

    /// The world-space "right" axis: `normalize(direction × world-up)`.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(&Vec3::new(0.0, 1.0, 0.0)).normalized()
    }

    /// Builds the unjittered primary ray through the center of pixel
    /// `(x, y)` of a `width`x`height` image via inverse-projection /
    /// inverse-view. The render loop rebuilds the whole per-pixel array
    /// from this method exactly once per dirty frame and reuses it across
    /// every sample of every subsequent clean frame.
    pub fn base_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let ndc_x = (2.0 * x as Float / width as Float) - 1.0;
        let ndc_y = 1.0 - (2.0 * y as Float / height as Float);

        let projection = Mat4::perspective(self.fov_degrees.to_radians(), self.aspect_ratio, 0.1, 1000.0);
        let inverse_projection = projection.inverse();
        let inverse_view = self.view_matrix().inverse();

        let clip_space = crate::math::Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let view_space = inverse_projection.mul_vec4(clip_space);
        let view_space = view_space.xyz() / view_space.w;
        let direction = inverse_view.transform_vector(view_space.normalized()).normalized();

        Ray::new(self.position, direction)
    }

    /// Builds the full `width * height` array of unjittered primary rays,
    /// row-major by `y * width + x`.
    pub fn build_primary_rays(&self, width: u32, height: u32) -> Vec<Ray> {
        itertools::iproduct!(0..height, 0..width)
            .map(|(y, x)| self.base_ray(x, y, width, height))
            .collect()
    }

    /// Perturbs a cached primary `ray` for one Monte Carlo sample: nudges the
    /// direction by a small uniform cube and renormalizes (anti-aliasing
    /// without center-of-pixel bias), then, if depth of field is enabled,
    /// offsets the origin across the lens aperture and re-aims at the focal
    /// point computed from the *unjittered* ray.
    pub fn jitter_sample(&self, ray: &Ray, rng: &mut impl Rng) -> Ray {
        let noise = Vec3::new(
            rng.gen_range(-SAMPLE_JITTER..SAMPLE_JITTER),
            rng.gen_range(-SAMPLE_JITTER..SAMPLE_JITTER),
            rng.gen_range(-SAMPLE_JITTER..SAMPLE_JITTER),
        );
        let mut direction = (ray.direction + noise).normalized();
        let mut origin = ray.origin;

        if self.depth_of_field && self.aperture_radius > Float::EPSILON {
            let focal_point = ray.origin + ray.direction * self.focal_distance;
            let lens_offset = uniform_disk(rng, self.aperture_radius);
            let right = self.right();
            let up = Vec3::new(0.0, 1.0, 0.0);
            origin += right * lens_offset.x + up * lens_offset.y;
            direction = (focal_point - origin).normalized();
        }

        Ray::new(origin, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped_past_eighty_degrees() {
        let mut camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 1.0);
        camera.rotate(0.0, 10.0);
        assert!(camera.pitch <= MAX_PITCH_DEGREES.to_radians() + 1e-4);
    }

    #[test]
    fn fov_is_clamped_to_valid_range() {
        let mut camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 1.0);
        camera.set_fov(1000.0);
        assert!((camera.fov_degrees - MAX_FOV_DEGREES).abs() < 1e-4);
    }

    #[test]
    fn translation_marks_camera_dirty() {
        let mut camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 1.0);
        camera.clear_dirty();
        camera.translate(Vec3::new(1.0, 0.0, 0.0));
        assert!(camera.is_dirty());
    }

    #[test]
    fn base_ray_direction_is_unit_length() {
        let camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 16.0 / 9.0);
        let ray = camera.base_ray(400, 300, 800, 600);
        assert!((ray.direction.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn build_primary_rays_covers_every_pixel() {
        let camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 4.0 / 3.0);
        let rays = camera.build_primary_rays(8, 6);
        assert_eq!(rays.len(), 48);
    }

    #[test]
    fn jitter_sample_keeps_direction_unit_length() {
        let camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 16.0 / 9.0);
        let base = camera.base_ray(400, 300, 800, 600);
        let mut rng = rand::thread_rng();
        for _ in 0..16 {
            let jittered = camera.jitter_sample(&base, &mut rng);
            assert!((jittered.direction.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn jitter_sample_applies_lens_offset_under_dof() {
        let mut camera = Camera::new(Point3::zero(), 0.0, 0.0, 60.0, 1.0);
        camera.depth_of_field = true;
        camera.aperture_radius = 0.5;
        camera.focal_distance = 5.0;
        let base = camera.base_ray(50, 50, 100, 100);
        let mut rng = rand::thread_rng();
        let jittered = camera.jitter_sample(&base, &mut rng);
        assert!((jittered.direction.length() - 1.0).abs() < 1e-4);
    }
}
