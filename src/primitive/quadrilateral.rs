//! Parallelogram primitive: an origin `v0` plus two edge vectors.

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{Float, Point3, Vec2, Vec3, EPSILON};

use super::{BoundingVolume, Ray, RayIntersection};

#[derive(Clone, Debug)]
pub struct Quadrilateral {
    pub v0: Point3,
    /// Edge vector toward the U-adjacent corner.
    pub u_edge: Vec3,
    /// Edge vector toward the V-adjacent corner.
    pub v_edge: Vec3,
    pub material: PBRMaterial,
    normal: Vec3,
    /// The plane constant such that `dot(normal, p) == constant` for any point on the plane.
    constant: Float,
    reciprocal: Vec3,
    pub area: Float,
    pub centroid: Point3,
}

impl Quadrilateral {
    pub fn new(v0: Point3, u_edge: Vec3, v_edge: Vec3, material: PBRMaterial) -> Self {
        let orthogonal = u_edge.cross(&v_edge);
        let normal = orthogonal.normalized();
        Self {
            v0,
            u_edge,
            v_edge,
            material,
            normal,
            constant: normal.dot(&v0),
            reciprocal: orthogonal / orthogonal.dot(&orthogonal),
            area: orthogonal.length(),
            centroid: v0 + (u_edge + v_edge) * 0.5,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let denominator = self.normal.dot(&ray.direction);
        if denominator.abs() < EPSILON {
            return RayIntersection::miss();
        }

        let t = (self.constant - self.normal.dot(&ray.origin)) / denominator;
        if t <= EPSILON {
            return RayIntersection::miss();
        }

        let position = ray.at(t);
        let planar = position - self.v0;
        let alpha = self.reciprocal.dot(&planar.cross(&self.v_edge));
        let beta = self.reciprocal.dot(&self.u_edge.cross(&planar));

        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return RayIntersection::miss();
        }

        RayIntersection {
            hit: true,
            position,
            normal: self.normal,
            material: self.material.clone(),
            depth: t,
            exit: Float::INFINITY,
            uv: Vec2::new(alpha, beta),
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Point3 {
        let u = rng.gen_range(0.0..1.0f32);
        let v = rng.gen_range(0.0..1.0f32);
        self.v0 + self.u_edge * u + self.v_edge * v
    }

    pub fn normal_of(&self, _position: Point3) -> Vec3 {
        self.normal
    }

    pub fn bounds(&self) -> BoundingVolume {
        let corners = [
            self.v0,
            self.v0 + self.u_edge,
            self.v0 + self.v_edge,
            self.v0 + self.u_edge + self.v_edge,
        ];
        let mut minimum = corners[0];
        let mut maximum = corners[0];
        for c in &corners[1..] {
            minimum = minimum.min(c);
            maximum = maximum.max(c);
        }
        BoundingVolume::new(minimum, maximum - minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_quad() -> Quadrilateral {
        Quadrilateral::new(
            Point3::new(-1.0, -1.0, 5.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            PBRMaterial::default(),
        )
    }

    #[test]
    fn ray_through_center_hits() {
        let quad = xy_quad();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, 1.0));
        let hit = quad.intersect(&ray);
        assert!(hit.hit);
        assert!((hit.depth - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ray_outside_quad_bounds_misses() {
        let quad = xy_quad();
        let ray = Ray::new(Point3::new(5.0, 5.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!quad.intersect(&ray).hit);
    }

    #[test]
    fn sample_lies_within_bounds() {
        let quad = xy_quad();
        let bounds = quad.bounds();
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            assert!(bounds.contains(quad.sample(&mut rng)));
        }
    }
}
