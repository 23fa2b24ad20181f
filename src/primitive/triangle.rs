//! Triangle primitive via Möller-Trumbore.

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{Float, Point3, Vec2, EPSILON};

use super::{BoundingVolume, Ray, RayIntersection};

#[derive(Clone, Debug)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
    pub uv0: Vec2,
    pub uv1: Vec2,
    pub uv2: Vec2,
    pub material: PBRMaterial,
    edge0: Point3,
    edge1: Point3,
    normal: Point3,
    pub area: Float,
    pub centroid: Point3,
}

impl Triangle {
    pub fn new(
        v0: Point3,
        v1: Point3,
        v2: Point3,
        uv0: Vec2,
        uv1: Vec2,
        uv2: Vec2,
        material: PBRMaterial,
    ) -> Self {
        let edge0 = v1 - v0;
        let edge1 = v2 - v0;
        let cross = edge0.cross(&edge1);
        Self {
            v0,
            v1,
            v2,
            uv0,
            uv1,
            uv2,
            material,
            edge0,
            edge1,
            normal: cross.normalized(),
            area: 0.5 * cross.length(),
            centroid: (v0 + v1 + v2) / 3.0,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let pvec = ray.direction.cross(&self.edge1);
        let determinant = self.edge0.dot(&pvec);
        if determinant.abs() < EPSILON {
            return RayIntersection::miss();
        }

        let inverse_determinant = 1.0 / determinant;
        let tvec = ray.origin - self.v0;
        let u = tvec.dot(&pvec) * inverse_determinant;
        if !(0.0..=1.0).contains(&u) {
            return RayIntersection::miss();
        }

        let qvec = tvec.cross(&self.edge0);
        let v = ray.direction.dot(&qvec) * inverse_determinant;
        if v < 0.0 || u + v > 1.0 {
            return RayIntersection::miss();
        }

        let t = self.edge1.dot(&qvec) * inverse_determinant;
        if t <= EPSILON {
            return RayIntersection::miss();
        }

        RayIntersection {
            hit: true,
            position: ray.at(t),
            normal: self.normal,
            material: self.material.clone(),
            depth: t,
            exit: Float::INFINITY,
            uv: Vec2::new(u, v),
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Point3 {
        let sqrt_r1 = rng.gen_range(0.0..1.0f32).sqrt();
        let r2 = rng.gen_range(0.0..1.0f32);
        let u = 1.0 - sqrt_r1;
        let v = r2 * sqrt_r1;
        self.v0 * (1.0 - u - v) + self.v1 * u + self.v2 * v
    }

    pub fn normal_of(&self, _position: Point3) -> Point3 {
        self.normal
    }

    pub fn bounds(&self) -> BoundingVolume {
        let minimum = self.v0.min(&self.v1).min(&self.v2);
        let maximum = self.v0.max(&self.v1).max(&self.v2);
        BoundingVolume::new(minimum, maximum - minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Point3::new(-1.0, -1.0, 5.0),
            Point3::new(1.0, -1.0, 5.0),
            Point3::new(0.0, 1.0, 5.0),
            Vec2::default(),
            Vec2::default(),
            Vec2::default(),
            PBRMaterial::default(),
        )
    }

    #[test]
    fn ray_through_centroid_hits() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, -1.0 / 3.0, 5.0).normalized());
        let hit = tri.intersect(&ray);
        assert!(hit.hit);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_parallel_to_plane_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!tri.intersect(&ray).hit);
    }

    #[test]
    fn sampled_points_are_inside_bounds() {
        let tri = unit_triangle();
        let bounds = tri.bounds();
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let p = tri.sample(&mut rng);
            assert!(bounds.contains(p));
        }
    }
}
