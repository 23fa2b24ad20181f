//! `Mesh`: a flat collection of primitives. `MeshInstance`: an affine
//! placement of a mesh in the scene.
//!
//! A mesh's facets are intersected in local space; `MeshInstance::intersect`
//! transforms the incoming ray into local space, walks every facet tracking
//! the nearest entry and farthest exit across the whole mesh (needed by
//! `Colloid` containers built from several primitives), then transforms the
//! winning hit back to world space.

use crate::math::{Float, Mat4, Point3, Vec3};
use crate::primitive::{BoundingVolume, Object, Ray, RayIntersection};

/// A mesh is nothing more than the set of primitives that make it up, always
/// expressed in the mesh's own local coordinate space.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub objects: Vec<Object>,
}

impl Mesh {
    pub fn new(objects: Vec<Object>) -> Self {
        Self { objects }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Local-space bounds: the union of every facet's bounding volume.
    pub fn local_bounds(&self) -> Option<BoundingVolume> {
        self.objects
            .iter()
            .map(Object::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// A placement of a `Mesh` index into the scene via an affine `transform`.
/// `inverse` is precomputed once at construction since every intersection
/// test needs it, and floating-point matrix inversion is not cheap enough to
/// redo per ray.
#[derive(Clone, Debug)]
pub struct MeshInstance {
    pub mesh_index: usize,
    pub transform: Mat4,
    inverse: Mat4,
    pub bounds: BoundingVolume,
}

impl MeshInstance {
    pub fn new(mesh_index: usize, transform: Mat4, mesh: &Mesh) -> Self {
        let inverse = transform.inverse();
        let bounds = world_bounds(&transform, mesh);
        Self {
            mesh_index,
            transform,
            inverse,
            bounds,
        }
    }

    pub fn inverse(&self) -> &Mat4 {
        &self.inverse
    }

    /// Intersects every facet of `mesh` (which must be the mesh this instance
    /// references) in local space, keeping the nearest hit and, across all
    /// facets, the single farthest exit depth — needed so a `Colloid` built
    /// from several overlapping primitives still reports one coherent
    /// surface-to-surface segment.
    pub fn intersect(&self, mesh: &Mesh, ray: &Ray) -> RayIntersection {
        let local_origin = self.inverse.transform_point(ray.origin);
        let local_direction = self.inverse.transform_vector(ray.direction);
        let local_ray = Ray::new(local_origin, local_direction);

        let mut nearest = RayIntersection::miss();
        let mut farthest = f32::NEG_INFINITY;

        for object in &mesh.objects {
            let hit = object.intersect(&local_ray);
            if !hit.hit {
                continue;
            }
            if hit.exit.is_finite() {
                farthest = farthest.max(hit.exit);
            }
            if hit.depth < nearest.depth {
                nearest = hit;
            }
        }

        if !nearest.hit {
            return nearest;
        }

        let world_position = self.transform.transform_point(nearest.position);
        let world_normal = self.inverse.transform_normal(nearest.normal).normalized();

        // Depth/exit are local-frame ray parameters; replace them with the
        // world-space distance from the untransformed ray's origin so a
        // scaled instance's hit reports a correct world-space `t`.
        nearest.depth = (world_position - ray.origin).length();
        nearest.exit = if farthest.is_finite() {
            let world_exit = self.transform.transform_point(local_ray.at(farthest));
            (world_exit - ray.origin).length()
        } else {
            Float::INFINITY
        };
        nearest.position = world_position;
        nearest.normal = world_normal;
        nearest
    }
}

fn world_bounds(transform: &Mat4, mesh: &Mesh) -> BoundingVolume {
    let Some(local) = mesh.local_bounds() else {
        return BoundingVolume::new(Point3::zero(), Vec3::zero());
    };

    let min = local.origin;
    let max = local.max_corner();
    let corners = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(min.x, max.y, max.z),
        Point3::new(max.x, max.y, max.z),
    ];

    let mut world_min = transform.transform_point(corners[0]);
    let mut world_max = world_min;
    for corner in &corners[1..] {
        let p = transform.transform_point(*corner);
        world_min = world_min.min(&p);
        world_max = world_max.max(&p);
    }
    BoundingVolume::new(world_min, world_max - world_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::PBRMaterial;
    use crate::primitive::Sphere;

    #[test]
    fn instance_transforms_local_hit_to_world_space() {
        let mesh = Mesh::new(vec![Object::Sphere(Sphere::new(
            Point3::zero(),
            1.0,
            PBRMaterial::default(),
        ))]);
        let transform = Mat4::translation(Vec3::new(0.0, 0.0, 10.0));
        let instance = MeshInstance::new(0, transform, &mesh);

        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, 1.0));
        let hit = instance.intersect(&mesh, &ray);
        assert!(hit.hit);
        assert!((hit.depth - 9.0).abs() < 1e-3);
    }

    #[test]
    fn instance_bounds_contain_transformed_sphere() {
        let mesh = Mesh::new(vec![Object::Sphere(Sphere::new(
            Point3::zero(),
            1.0,
            PBRMaterial::default(),
        ))]);
        let transform = Mat4::translation(Vec3::new(5.0, 0.0, 0.0));
        let instance = MeshInstance::new(0, transform, &mesh);
        assert!(instance.bounds.contains(Point3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn ray_missing_instance_reports_miss() {
        let mesh = Mesh::new(vec![Object::Sphere(Sphere::new(
            Point3::zero(),
            1.0,
            PBRMaterial::default(),
        ))]);
        let instance = MeshInstance::new(0, Mat4::identity(), &mesh);
        let ray = Ray::new(Point3::new(10.0, 10.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!instance.intersect(&mesh, &ray).hit);
    }
}
