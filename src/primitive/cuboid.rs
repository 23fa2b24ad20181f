//! Axis-aligned box primitive via the slab method.

use std::f32::consts::PI;

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{Float, Point3, Vec2, Vec3, EPSILON};

use super::{BoundingVolume, Ray, RayIntersection};

#[derive(Clone, Debug)]
pub struct Cuboid {
    pub origin: Point3,
    pub size: Vec3,
    pub material: PBRMaterial,
    pub area: Float,
    pub centroid: Point3,
}

impl Cuboid {
    pub fn new(origin: Point3, size: Vec3, material: PBRMaterial) -> Self {
        let area = 2.0 * (size.x * size.y + size.y * size.z + size.z * size.x);
        Self {
            origin,
            size,
            material,
            area,
            centroid: origin + size * 0.5,
        }
    }

    pub fn bounding_volume(&self) -> BoundingVolume {
        BoundingVolume::new(self.origin, self.size)
    }

    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let minimum = self.origin;
        let maximum = self.origin + self.size;

        let reciprocal = Vec3::new(1.0 / ray.direction.x, 1.0 / ray.direction.y, 1.0 / ray.direction.z);

        let f1 = (minimum.x - ray.origin.x) * reciprocal.x;
        let f2 = (maximum.x - ray.origin.x) * reciprocal.x;
        let f3 = (minimum.y - ray.origin.y) * reciprocal.y;
        let f4 = (maximum.y - ray.origin.y) * reciprocal.y;
        let f5 = (minimum.z - ray.origin.z) * reciprocal.z;
        let f6 = (maximum.z - ray.origin.z) * reciprocal.z;

        let tmin = f1.min(f2).max(f3.min(f4)).max(f5.min(f6));
        let tmax = f1.max(f2).min(f3.max(f4)).min(f5.max(f6));

        if tmax < 0.0 || tmin > tmax {
            return RayIntersection::miss();
        }

        let t1 = if tmin >= 0.0 { tmin } else { tmax };
        let t2 = tmax;

        if t1 <= 0.0 {
            return RayIntersection::miss();
        }

        let mut position = ray.at(t1);
        let normal = self.normal_of(position);
        position += normal * EPSILON;

        // Not per-face accurate: reuses the sphere-style equirectangular
        // formula relative to the box centroid.
        let difference = position - self.centroid;
        let u = 0.5 + difference.z.atan2(difference.x) / (2.0 * PI);
        let v = 0.5 + (difference.y / difference.length()).asin() / PI;

        RayIntersection {
            hit: true,
            position,
            normal,
            material: self.material.clone(),
            depth: t1,
            exit: t2,
            uv: Vec2::new(u, v),
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Point3 {
        let face = rng.gen_range(0..6);
        let u = rng.gen_range(0.0..1.0f32);
        let v = rng.gen_range(0.0..1.0f32);

        match face {
            0 => self.origin + Vec3::new(0.0, u * self.size.y, v * self.size.z),
            1 => self.origin + Vec3::new(self.size.x, u * self.size.y, v * self.size.z),
            2 => self.origin + Vec3::new(u * self.size.x, 0.0, v * self.size.z),
            3 => self.origin + Vec3::new(u * self.size.x, self.size.y, v * self.size.z),
            4 => self.origin + Vec3::new(u * self.size.x, v * self.size.y, 0.0),
            _ => self.origin + Vec3::new(u * self.size.x, v * self.size.y, self.size.z),
        }
    }

    pub fn normal_of(&self, position: Point3) -> Vec3 {
        let max = self.origin + self.size;
        if (position.x - self.origin.x).abs() < EPSILON {
            Vec3::new(-1.0, 0.0, 0.0)
        } else if (position.x - max.x).abs() < EPSILON {
            Vec3::new(1.0, 0.0, 0.0)
        } else if (position.y - self.origin.y).abs() < EPSILON {
            Vec3::new(0.0, -1.0, 0.0)
        } else if (position.y - max.y).abs() < EPSILON {
            Vec3::new(0.0, 1.0, 0.0)
        } else if (position.z - self.origin.z).abs() < EPSILON {
            Vec3::new(0.0, 0.0, -1.0)
        } else if (position.z - max.z).abs() < EPSILON {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            Vec3::zero()
        }
    }

    pub fn bounds(&self) -> BoundingVolume {
        self.bounding_volume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Cuboid {
        Cuboid::new(Point3::splat(-1.0), Vec3::splat(2.0), PBRMaterial::default())
    }

    #[test]
    fn ray_through_center_hits_near_face() {
        let cube = unit_cube();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = cube.intersect(&ray);
        assert!(hit.hit);
        assert!((hit.depth - 4.0).abs() < 1e-2);
        assert!(hit.depth <= hit.exit);
    }

    #[test]
    fn normal_is_axis_aligned_unit_vector() {
        let cube = unit_cube();
        let n = cube.normal_of(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(n, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn ray_missing_box_reports_miss() {
        let cube = unit_cube();
        let ray = Ray::new(Point3::new(10.0, 10.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!cube.intersect(&ray).hit);
    }
}
