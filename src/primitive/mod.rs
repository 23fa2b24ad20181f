//! The primitive library: `Ray`, `RayIntersection`, `BoundingVolume`, and the
//! `Object` tagged union over the six analytic primitive kinds — a sum type
//! rather than a trait object, so the per-pixel hot path stays
//! inline-friendly.

mod colloid;
mod cuboid;
mod quadratic_solve;
mod quadric;
mod quadrilateral;
mod sphere;
mod triangle;

pub use colloid::Colloid;
pub use cuboid::Cuboid;
pub use quadric::Quadric;
pub use quadrilateral::Quadrilateral;
pub use sphere::Sphere;
pub use triangle::Triangle;

use crate::material::PBRMaterial;
use crate::math::{Float, Point3, Vec2, Vec3};

/// A world- or local-space ray: an origin point and a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: Float) -> Point3 {
        self.origin + self.direction * t
    }
}

/// An axis-aligned box: `origin` plus a strictly positive `size`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingVolume {
    pub origin: Point3,
    pub size: Vec3,
}

impl BoundingVolume {
    pub fn new(origin: Point3, size: Vec3) -> Self {
        Self { origin, size }
    }

    pub fn max_corner(&self) -> Point3 {
        self.origin + self.size
    }

    pub fn centroid(&self) -> Point3 {
        self.origin + self.size * 0.5
    }

    pub fn contains(&self, point: Point3) -> bool {
        let max = self.max_corner();
        point.x >= self.origin.x
            && point.x <= max.x
            && point.y >= self.origin.y
            && point.y <= max.y
            && point.z >= self.origin.z
            && point.z <= max.z
    }

    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        let a_max = self.max_corner();
        let b_max = other.max_corner();
        self.origin.x <= b_max.x
            && a_max.x >= other.origin.x
            && self.origin.y <= b_max.y
            && a_max.y >= other.origin.y
            && self.origin.z <= b_max.z
            && a_max.z >= other.origin.z
    }

    /// Union of two bounding volumes.
    pub fn union(&self, other: &BoundingVolume) -> BoundingVolume {
        let min = self.origin.min(&other.origin);
        let max = self.max_corner().max(&other.max_corner());
        BoundingVolume::new(min, max - min)
    }
}

/// The result of intersecting a `Ray` with an `Object`. On miss, `hit` is
/// `false` and `depth` is `+∞`.
#[derive(Clone, Debug)]
pub struct RayIntersection {
    pub hit: bool,
    pub position: Point3,
    pub normal: Vec3,
    pub material: PBRMaterial,
    /// Ray parameter `t` of the near (entry) hit.
    pub depth: Float,
    /// Ray parameter `t` of the far (exit) side, for volumetric primitives.
    /// `+∞` for purely-surface primitives.
    pub exit: Float,
    pub uv: Vec2,
}

impl RayIntersection {
    pub fn miss() -> Self {
        Self {
            hit: false,
            position: Point3::zero(),
            normal: Vec3::zero(),
            material: PBRMaterial::default(),
            depth: Float::INFINITY,
            exit: Float::INFINITY,
            uv: Vec2::default(),
        }
    }
}

impl Default for RayIntersection {
    fn default() -> Self {
        Self::miss()
    }
}

/// A concrete analytic primitive, stored by value inside `Mesh`.
#[derive(Clone, Debug)]
pub enum Object {
    Sphere(Sphere),
    Triangle(Triangle),
    Quadrilateral(Quadrilateral),
    Cuboid(Cuboid),
    Quadric(Quadric),
    Colloid(Box<Colloid>),
}

impl Object {
    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        match self {
            Object::Sphere(s) => s.intersect(ray),
            Object::Triangle(t) => t.intersect(ray),
            Object::Quadrilateral(q) => q.intersect(ray),
            Object::Cuboid(c) => c.intersect(ray),
            Object::Quadric(q) => q.intersect(ray),
            Object::Colloid(c) => c.intersect(ray),
        }
    }

    pub fn sample(&self, rng: &mut impl rand::Rng) -> Point3 {
        match self {
            Object::Sphere(s) => s.sample(rng),
            Object::Triangle(t) => t.sample(rng),
            Object::Quadrilateral(q) => q.sample(rng),
            Object::Cuboid(c) => c.sample(rng),
            Object::Quadric(q) => q.sample(rng),
            Object::Colloid(c) => c.sample(rng),
        }
    }

    pub fn normal_of(&self, position: Point3) -> Vec3 {
        match self {
            Object::Sphere(s) => s.normal_of(position),
            Object::Triangle(t) => t.normal_of(position),
            Object::Quadrilateral(q) => q.normal_of(position),
            Object::Cuboid(c) => c.normal_of(position),
            Object::Quadric(q) => q.normal_of(position),
            Object::Colloid(c) => c.normal_of(position),
        }
    }

    pub fn bounds(&self) -> BoundingVolume {
        match self {
            Object::Sphere(s) => s.bounds(),
            Object::Triangle(t) => t.bounds(),
            Object::Quadrilateral(q) => q.bounds(),
            Object::Cuboid(c) => c.bounds(),
            Object::Quadric(q) => q.bounds(),
            Object::Colloid(c) => c.bounds(),
        }
    }

    pub fn area(&self) -> Float {
        match self {
            Object::Sphere(s) => s.area,
            Object::Triangle(t) => t.area,
            Object::Quadrilateral(q) => q.area,
            Object::Cuboid(c) => c.area,
            Object::Quadric(q) => q.area,
            Object::Colloid(c) => c.container.area(),
        }
    }

    pub fn centroid(&self) -> Point3 {
        match self {
            Object::Sphere(s) => s.centroid,
            Object::Triangle(t) => t.centroid,
            Object::Quadrilateral(q) => q.centroid,
            Object::Cuboid(c) => c.centroid,
            Object::Quadric(q) => q.centroid,
            Object::Colloid(c) => c.container.centroid(),
        }
    }

    pub fn material(&self) -> &PBRMaterial {
        match self {
            Object::Sphere(s) => &s.material,
            Object::Triangle(t) => &t.material,
            Object::Quadrilateral(q) => &q.material,
            Object::Cuboid(c) => &c.material,
            Object::Quadric(q) => &q.material,
            Object::Colloid(c) => &c.material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_volume_contains_interior_point() {
        let b = BoundingVolume::new(Point3::zero(), Vec3::splat(2.0));
        assert!(b.contains(Point3::splat(1.0)));
        assert!(!b.contains(Point3::splat(3.0)));
    }

    #[test]
    fn bounding_volume_overlap() {
        let a = BoundingVolume::new(Point3::zero(), Vec3::splat(2.0));
        let b = BoundingVolume::new(Point3::splat(1.0), Vec3::splat(2.0));
        let c = BoundingVolume::new(Point3::splat(10.0), Vec3::splat(1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn miss_has_infinite_depth() {
        let m = RayIntersection::miss();
        assert!(!m.hit);
        assert_eq!(m.depth, Float::INFINITY);
    }
}
