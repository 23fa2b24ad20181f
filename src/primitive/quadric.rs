//! General second-order implicit surface, clipped to an axis-aligned box.
//! Covers cylinders, cones, paraboloids, hyperboloids, etc. via the ten
//! coefficients of `A*x^2 + B*y^2 + C*z^2 + D*xy + E*yz + F*xz + G*x + H*y +
//! I*z + J = 0`.

use std::f32::consts::PI;

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{Float, Point3, Vec2, Vec3, EPSILON};

use super::quadratic_solve::solve_quadratic;
use super::{BoundingVolume, Ray, RayIntersection};

#[derive(Copy, Clone, Debug)]
pub struct QuadricCoefficients {
    pub a: Float,
    pub b: Float,
    pub c: Float,
    pub d: Float,
    pub e: Float,
    pub f: Float,
    pub g: Float,
    pub h: Float,
    pub i: Float,
    pub j: Float,
}

#[derive(Clone, Debug)]
pub struct Quadric {
    pub coefficients: QuadricCoefficients,
    pub clip: BoundingVolume,
    pub material: PBRMaterial,
    pub area: Float,
    pub centroid: Point3,
}

impl Quadric {
    pub fn new(coefficients: QuadricCoefficients, clip: BoundingVolume, material: PBRMaterial) -> Self {
        // No closed form for a general quadric patch's area; approximated by
        // the clip box's surface area instead.
        let size = clip.size;
        let area = 2.0 * (size.x * size.y + size.y * size.z + size.z * size.x);
        Self {
            coefficients,
            clip,
            material,
            area,
            centroid: clip.centroid(),
        }
    }

    /// Evaluates the quadric's implicit form on the offset of `p` from the
    /// clip box's centroid — the squared and cross terms are centered on
    /// the quadric, not on the world origin.
    fn implicit(&self, p: Point3) -> Float {
        let q = &self.coefficients;
        let o = p - self.centroid;
        q.a * o.x * o.x
            + q.b * o.y * o.y
            + q.c * o.z * o.z
            + q.d * o.x * o.y
            + q.e * o.y * o.z
            + q.f * o.x * o.z
            + q.g * o.x
            + q.h * o.y
            + q.i * o.z
            + q.j
    }

    fn gradient(&self, p: Point3) -> Vec3 {
        let q = &self.coefficients;
        let o = p - self.centroid;
        Vec3::new(
            2.0 * q.a * o.x + q.d * o.y + q.f * o.z + q.g,
            2.0 * q.b * o.y + q.d * o.x + q.e * o.z + q.h,
            2.0 * q.c * o.z + q.e * o.y + q.f * o.x + q.i,
        )
    }

    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let q = &self.coefficients;
        let o = ray.origin;
        let d = ray.direction;

        let a = q.a * d.x * d.x
            + q.b * d.y * d.y
            + q.c * d.z * d.z
            + q.d * d.x * d.y
            + q.e * d.y * d.z
            + q.f * d.x * d.z;

        // The quadratic cross terms are centered on the quadric's centroid like
        // `implicit`/`gradient`; the G/H/I linear terms carry no point factor
        // and so stay un-offset.
        let co = o - self.centroid;

        let b = 2.0 * q.a * co.x * d.x
            + 2.0 * q.b * co.y * d.y
            + 2.0 * q.c * co.z * d.z
            + q.d * (co.x * d.y + co.y * d.x)
            + q.e * (co.y * d.z + co.z * d.y)
            + q.f * (co.x * d.z + co.z * d.x)
            + q.g * d.x
            + q.h * d.y
            + q.i * d.z;

        let c = self.implicit(o);

        let (t1, t2) = if a.abs() < EPSILON {
            if b.abs() < EPSILON {
                return RayIntersection::miss();
            }
            let t = -c / b;
            (t, t)
        } else {
            match solve_quadratic(a, b, c) {
                Some(roots) => roots,
                None => return RayIntersection::miss(),
            }
        };

        let candidate = [t1, t2]
            .into_iter()
            .filter(|t| *t > EPSILON)
            .map(|t| (t, ray.at(t)))
            .find(|(_, p)| self.clip.contains(*p));

        let Some((t, position)) = candidate else {
            return RayIntersection::miss();
        };

        let normal = self.gradient(position).normalized();

        let difference = position - self.centroid;
        let u = 0.5 + difference.z.atan2(difference.x) / (2.0 * PI);
        let v = 0.5 + (difference.y / difference.length().max(EPSILON)).asin() / PI;

        RayIntersection {
            hit: true,
            position,
            normal,
            material: self.material.clone(),
            depth: t,
            exit: t2.max(t1),
            uv: Vec2::new(u, v),
        }
    }

    /// Rejection samples the clip box against the implicit surface rather
    /// than a closed-form area sampler, since no closed form exists for a
    /// general quadric.
    pub fn sample(&self, rng: &mut impl Rng) -> Point3 {
        for _ in 0..64 {
            let candidate = Point3::new(
                rng.gen_range(self.clip.origin.x..self.clip.max_corner().x),
                rng.gen_range(self.clip.origin.y..self.clip.max_corner().y),
                rng.gen_range(self.clip.origin.z..self.clip.max_corner().z),
            );
            if self.implicit(candidate).abs() < 1.0 {
                return candidate;
            }
        }
        self.centroid
    }

    pub fn normal_of(&self, position: Point3) -> Vec3 {
        self.gradient(position).normalized()
    }

    pub fn bounds(&self) -> BoundingVolume {
        self.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere_quadric() -> Quadric {
        let coefficients = QuadricCoefficients {
            a: 1.0,
            b: 1.0,
            c: 1.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
            g: 0.0,
            h: 0.0,
            i: 0.0,
            j: -1.0,
        };
        let clip = BoundingVolume::new(Point3::splat(-1.5), Vec3::splat(3.0));
        Quadric::new(coefficients, clip, PBRMaterial::default())
    }

    #[test]
    fn ray_through_center_hits_implicit_sphere() {
        let quadric = unit_sphere_quadric();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = quadric.intersect(&ray);
        assert!(hit.hit);
        assert!((hit.depth - 4.0).abs() < 1e-2);
    }

    #[test]
    fn normal_points_outward_from_center() {
        let quadric = unit_sphere_quadric();
        let n = quadric.normal_of(Point3::new(1.0, 0.0, 0.0));
        assert!((n.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ray_missing_clip_box_reports_miss() {
        let quadric = unit_sphere_quadric();
        let ray = Ray::new(Point3::new(10.0, 10.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!quadric.intersect(&ray).hit);
    }
}
