//! Sphere primitive.

use std::f32::consts::PI;

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{uniform_sphere, Float, Point3, Vec2, EPSILON};

use super::quadratic_solve::solve_quadratic;
use super::{BoundingVolume, Ray, RayIntersection};

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: Point3,
    pub radius: Float,
    pub material: PBRMaterial,
    pub area: Float,
    pub centroid: Point3,
}

impl Sphere {
    pub fn new(center: Point3, radius: Float, material: PBRMaterial) -> Self {
        Self {
            center,
            radius,
            material,
            area: 4.0 * PI * radius * radius,
            centroid: center,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let difference = ray.origin - self.center;

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * difference.dot(&ray.direction);
        let c = difference.dot(&difference) - self.radius * self.radius;

        let Some((t1, t2)) = solve_quadratic(a, b, c) else {
            return RayIntersection::miss();
        };

        let t = if t1 > EPSILON {
            t1
        } else if t2 > EPSILON {
            t2
        } else {
            return RayIntersection::miss();
        };

        let position = ray.at(t);
        let p = (position - self.center).normalized();
        let normal = p;

        let u = 0.5 + p.z.atan2(p.x) / (2.0 * PI);
        let v = 0.5 + p.y.asin() / PI;

        RayIntersection {
            hit: true,
            position,
            normal,
            material: self.material.clone(),
            depth: t,
            exit: t2,
            uv: Vec2::new(u, v),
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Point3 {
        self.center + uniform_sphere(rng) * self.radius
    }

    pub fn normal_of(&self, position: Point3) -> Point3 {
        (position - self.center).normalized()
    }

    pub fn bounds(&self) -> BoundingVolume {
        BoundingVolume::new(
            self.center - Point3::splat(self.radius),
            Point3::splat(2.0 * self.radius),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits_near_side() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 5.0), 1.0, PBRMaterial::default());
        let ray = Ray::new(Point3::zero(), crate::math::Vec3::new(0.0, 0.0, 1.0));
        let hit = sphere.intersect(&ray);
        assert!(hit.hit);
        assert!((hit.depth - 4.0).abs() < 1e-4);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_missing_sphere_reports_miss() {
        let sphere = Sphere::new(Point3::new(10.0, 0.0, 0.0), 1.0, PBRMaterial::default());
        let ray = Ray::new(Point3::zero(), crate::math::Vec3::new(0.0, 0.0, 1.0));
        assert!(!sphere.intersect(&ray).hit);
    }

    #[test]
    fn sampled_points_lie_on_surface() {
        let sphere = Sphere::new(Point3::new(1.0, 2.0, 3.0), 2.0, PBRMaterial::default());
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let p = sphere.sample(&mut rng);
            let dist = (p - sphere.center).length();
            assert!((dist - sphere.radius).abs() < 1e-3);
        }
    }
}
