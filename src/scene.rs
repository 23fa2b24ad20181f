//! `Scene`: the set of meshes and their instances, plus the emitter table
//! next-event estimation samples from.
//!
//! Next-event estimation never needs to know "is this occluder the light I
//! just sampled" by identity — the shadow ray is simply clipped a hair short
//! of the sampled point's distance, so any surface inside that span counts as
//! occlusion and the light's own far side can never self-shadow the sample.

use rand::Rng;

use crate::material::PBRMaterial;
use crate::math::{Color, Float, Point3};
use crate::mesh::{Mesh, MeshInstance};
use crate::primitive::{Ray, RayIntersection};

/// One emitting facet: an instance/object pair plus its share of the scene's
/// total emitted power, used to build the sampling CDF.
#[derive(Clone, Debug)]
pub struct Emitter {
    pub instance_index: usize,
    pub object_index: usize,
    /// Cumulative probability mass up to and including this emitter, in `[0, 1]`.
    pub cumulative_weight: Float,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub instances: Vec<MeshInstance>,
    emitters: Vec<Emitter>,
}

impl Scene {
    pub fn new(meshes: Vec<Mesh>, instances: Vec<MeshInstance>) -> Self {
        let mut scene = Self {
            meshes,
            instances,
            emitters: Vec::new(),
        };
        scene.rebuild_emitters();
        scene
    }

    /// Recomputes the emitter table. Call after mutating `meshes`/`instances`
    /// (e.g. after loading a scene file or editing materials interactively).
    pub fn rebuild_emitters(&mut self) {
        let mut weighted = Vec::new();
        let mut total = 0.0;

        for (instance_index, instance) in self.instances.iter().enumerate() {
            let Some(mesh) = self.meshes.get(instance.mesh_index) else {
                continue;
            };
            for (object_index, object) in mesh.objects.iter().enumerate() {
                if !object.material().is_emissive() {
                    continue;
                }
                // Emitted power is approximated from the object's local-space
                // area; a non-uniformly scaled instance's true world-space
                // emitting area is not recomputed here (documented
                // simplification — scaled emitters are rare in practice and
                // the bias is second-order next to sampling noise).
                let power = object.area() * object.material().emission.max_component();
                if power <= 0.0 {
                    continue;
                }
                total += power;
                weighted.push((instance_index, object_index, total));
            }
        }

        self.emitters = weighted
            .into_iter()
            .map(|(instance_index, object_index, running)| Emitter {
                instance_index,
                object_index,
                cumulative_weight: if total > 0.0 { running / total } else { 0.0 },
            })
            .collect();
    }

    pub fn has_emitters(&self) -> bool {
        !self.emitters.is_empty()
    }

    /// Draws one emitter facet proportional to its share of emitted power,
    /// returning a world-space point on it, its emission, and the PDF (in
    /// solid-angle-independent area measure: `1 / (weight * area)`).
    pub fn sample_emitter(&self, rng: &mut impl Rng) -> Option<(Point3, Color, Float)> {
        if self.emitters.is_empty() {
            return None;
        }

        let u = rng.gen_range(0.0..1.0f32);
        let index = self
            .emitters
            .partition_point(|e| e.cumulative_weight < u)
            .min(self.emitters.len() - 1);
        let emitter = &self.emitters[index];

        let instance = &self.instances[emitter.instance_index];
        let mesh = &self.meshes[instance.mesh_index];
        let object = &mesh.objects[emitter.object_index];

        let local_point = object.sample(rng);
        let world_point = instance.transform.transform_point(local_point);

        let probability_mass = if index == 0 {
            emitter.cumulative_weight
        } else {
            emitter.cumulative_weight - self.emitters[index - 1].cumulative_weight
        };
        let pdf = 1.0 / (probability_mass.max(1e-6) * object.area().max(1e-6));

        Some((world_point, object.material().emission, pdf))
    }

    /// Nearest intersection across every instance in the scene.
    pub fn intersect(&self, ray: &Ray) -> RayIntersection {
        let mut nearest = RayIntersection::miss();
        for instance in &self.instances {
            let Some(mesh) = self.meshes.get(instance.mesh_index) else {
                continue;
            };
            let hit = instance.intersect(mesh, ray);
            if hit.hit && hit.depth < nearest.depth {
                nearest = hit;
            }
        }
        nearest
    }

    /// True if anything lies on the segment `[EPSILON, max_distance)` along
    /// `ray` — used for next-event-estimation shadow rays.
    pub fn occluded(&self, ray: &Ray, max_distance: Float) -> bool {
        let clipped = max_distance - crate::math::EPSILON * 4.0;
        if clipped <= 0.0 {
            return false;
        }
        for instance in &self.instances {
            let Some(mesh) = self.meshes.get(instance.mesh_index) else {
                continue;
            };
            let hit = instance.intersect(mesh, ray);
            if hit.hit && hit.depth < clipped {
                return true;
            }
        }
        false
    }

    pub fn material_at(&self, instance_index: usize, object_index: usize) -> Option<&PBRMaterial> {
        let instance = self.instances.get(instance_index)?;
        let mesh = self.meshes.get(instance.mesh_index)?;
        Some(mesh.objects.get(object_index)?.material())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat4, Vec3};
    use crate::primitive::{Object, Sphere};

    fn emissive_sphere_scene() -> Scene {
        let mut material = PBRMaterial::default();
        material.emission = Color::splat(5.0);
        let mesh = Mesh::new(vec![Object::Sphere(Sphere::new(Point3::zero(), 1.0, material))]);
        let instance = MeshInstance::new(0, Mat4::identity(), &mesh);
        Scene::new(vec![mesh], vec![instance])
    }

    #[test]
    fn scene_with_emissive_object_has_emitters() {
        let scene = emissive_sphere_scene();
        assert!(scene.has_emitters());
    }

    #[test]
    fn sampled_emitter_point_has_positive_pdf() {
        let scene = emissive_sphere_scene();
        let mut rng = rand::thread_rng();
        let (_, emission, pdf) = scene.sample_emitter(&mut rng).unwrap();
        assert!(pdf > 0.0);
        assert!(emission.max_component() > 0.0);
    }

    #[test]
    fn scene_intersect_finds_nearest_instance() {
        let scene = emissive_sphere_scene();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = scene.intersect(&ray);
        assert!(hit.hit);
        assert!((hit.depth - 4.0).abs() < 1e-2);
    }

    #[test]
    fn unoccluded_path_reports_false() {
        let scene = emissive_sphere_scene();
        let ray = Ray::new(Point3::new(10.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!scene.occluded(&ray, 5.0));
    }
}
