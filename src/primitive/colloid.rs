//! Participating medium: a `container` primitive filled with a homogeneous
//! scattering volume of the given `density`. Free-path sampling follows
//! Beer-Lambert: the distance to the next scattering event is drawn from an
//! exponential distribution with rate `density`.

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{uniform_sphere, Float};

use super::{BoundingVolume, Object, Ray, RayIntersection};

#[derive(Clone, Debug)]
pub struct Colloid {
    pub container: Box<Object>,
    pub density: Float,
    pub material: PBRMaterial,
}

impl Colloid {
    pub fn new(container: Object, density: Float, material: PBRMaterial) -> Self {
        Self {
            container: Box::new(container),
            density: density.max(1e-6),
            material,
        }
    }

    /// Intersects the container surface, then samples an optical path length
    /// inside it via `-(1/density) * ln(U)`. A sample shorter than the
    /// surface-to-surface segment is a scattering event at that depth, with
    /// an isotropic (uniformly-sampled-sphere) normal; a longer sample lets
    /// the ray continue straight through to the container's far side.
    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let surface = self.container.intersect(ray);
        if !surface.hit {
            return surface;
        }

        let segment_length = surface.exit - surface.depth;
        if !segment_length.is_finite() || segment_length <= 0.0 {
            return surface;
        }

        let free_path = -(1.0 / self.density) * rand::thread_rng().gen_range(f32::EPSILON..1.0f32).ln();

        if free_path >= segment_length {
            return surface;
        }

        let depth = surface.depth + free_path;

        let mut material = self.material.clone();
        material.albedo *= (material.albedo * (-self.density * free_path)).exp();

        RayIntersection {
            hit: true,
            position: ray.at(depth),
            normal: uniform_sphere(&mut rand::thread_rng()),
            material,
            depth,
            exit: surface.exit,
            uv: surface.uv,
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> crate::math::Point3 {
        self.container.sample(rng)
    }

    pub fn normal_of(&self, position: crate::math::Point3) -> crate::math::Vec3 {
        self.container.normal_of(position)
    }

    pub fn bounds(&self) -> BoundingVolume {
        self.container.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::PBRMaterial;
    use crate::math::{Point3, Vec3};
    use crate::primitive::{Object, Sphere};

    fn fog_sphere() -> Colloid {
        let sphere = Sphere::new(Point3::zero(), 5.0, PBRMaterial::default());
        Colloid::new(Object::Sphere(sphere), 1.0, PBRMaterial::default())
    }

    #[test]
    fn ray_missing_container_reports_miss() {
        let colloid = fog_sphere();
        let ray = Ray::new(Point3::new(100.0, 100.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!colloid.intersect(&ray).hit);
    }

    #[test]
    fn scatter_depth_never_exceeds_container_exit() {
        let colloid = fog_sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0));
        for _ in 0..64 {
            let hit = colloid.intersect(&ray);
            assert!(hit.hit);
            assert!(hit.depth <= hit.exit + 1e-3);
        }
    }

    #[test]
    fn normal_is_unit_length_when_scattering() {
        let colloid = fog_sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = colloid.intersect(&ray);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }
}
