//! The path tracer's core recursive estimator.
//!
//! `trace` samples one branch per bounce — metal reflection, dielectric
//! reflection, dielectric refraction, or diffuse — weighted by Fresnel and
//! the material's `metallicity`/`transmission` parameters, adds next-event
//! estimation against the scene's emitter table at diffuse/metal vertices,
//! and falls back to an equirectangular skybox lookup on a miss.

use rand::Rng;

use crate::material::{floor_roughness, PBRMaterial};
use crate::math::{Color, Float, Vec2, Vec3, EPSILON};
use crate::primitive::{Ray, RayIntersection};
use crate::scene::Scene;

/// An equirectangular environment lookup sampled on ray miss. `None` is
/// black (no ambient light), matching a Cornell-box-style enclosed scene.
pub type Skybox<'a> = Option<&'a image::Rgb32FImage>;

/// Schlick's Fresnel reflectance approximation.
fn fresnel_schlick(cos_theta: Float, f0: Color) -> Color {
    let m = (1.0 - cos_theta).clamp(0.0, 1.0);
    let m2 = m * m;
    let m5 = m2 * m2 * m;
    f0 + (Color::one() - f0) * m5
}

/// GGX normal distribution function `D`.
fn ggx_distribution(n_dot_h: Float, alpha: Float) -> Float {
    let alpha2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (alpha2 - 1.0) + 1.0;
    alpha2 / (std::f32::consts::PI * denom * denom).max(EPSILON)
}

/// Smith-Schlick-GGX geometry term `G` for one direction.
fn ggx_geometry_1(n_dot_x: Float, k: Float) -> Float {
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

fn ggx_geometry(n_dot_v: Float, n_dot_l: Float, roughness: Float) -> Float {
    let k = (roughness + 1.0).powi(2) / 8.0;
    ggx_geometry_1(n_dot_v, k) * ggx_geometry_1(n_dot_l, k)
}

/// A microfacet reflection sample about `normal`, biased toward the GGX lobe.
fn sample_ggx_direction(normal: Vec3, roughness: Float, rng: &mut impl Rng) -> Vec3 {
    let alpha = roughness * roughness;
    let u1: Float = rng.gen_range(0.0..1.0);
    let u2: Float = rng.gen_range(0.0..1.0);

    let theta = ((alpha * (u1 / (1.0 - u1)).sqrt()).atan()).min(std::f32::consts::FRAC_PI_2);
    let phi = 2.0 * std::f32::consts::PI * u2;

    let (tangent, bitangent) = orthonormal_basis(normal);
    let local = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
    (tangent * local.x + bitangent * local.y + normal * local.z).normalized()
}

fn cosine_sample_hemisphere(normal: Vec3, rng: &mut impl Rng) -> Vec3 {
    let u1: Float = rng.gen_range(0.0..1.0);
    let u2: Float = rng.gen_range(0.0..1.0);
    let r = u1.sqrt();
    let phi = 2.0 * std::f32::consts::PI * u2;

    let (tangent, bitangent) = orthonormal_basis(normal);
    let local = Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - u1).max(0.0).sqrt());
    (tangent * local.x + bitangent * local.y + normal * local.z).normalized()
}

fn orthonormal_basis(normal: Vec3) -> (Vec3, Vec3) {
    let reference = if normal.x.abs() > 0.9 {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        Vec3::new(1.0, 0.0, 0.0)
    };
    let tangent = reference.cross(&normal).normalized();
    let bitangent = normal.cross(&tangent);
    (tangent, bitangent)
}

fn refract(incident: Vec3, normal: Vec3, eta: Float) -> Option<Vec3> {
    let cos_i = (-incident.dot(&normal)).clamp(-1.0, 1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(incident * eta + normal * (eta * cos_i - cos_t))
}

fn sample_skybox(skybox: Skybox<'_>, direction: Vec3) -> Color {
    let Some(image) = skybox else {
        return Color::zero();
    };
    let u = 0.5 + direction.z.atan2(direction.x) / (2.0 * std::f32::consts::PI);
    let v = 0.5 + direction.y.asin() / std::f32::consts::PI;
    let x = ((u * image.width() as Float) as u32).min(image.width() - 1);
    let y = (((1.0 - v) * image.height() as Float) as u32).min(image.height() - 1);
    let pixel = image.get_pixel(x, y);
    Color::new(pixel[0], pixel[1], pixel[2])
}

/// Applies Beer-Lambert attenuation across a traversed `distance` through a
/// medium of the given `absorption` coefficient.
fn beer_lambert(absorption: Color, distance: Float) -> Color {
    (absorption * -distance).exp()
}

/// Samples direct lighting via next-event estimation at a diffuse or rough
/// metal vertex: picks one emitter, traces a shadow ray, and returns its
/// contribution weighted by the emitter's sampling PDF and a cosine term.
fn estimate_direct(
    scene: &Scene,
    position: Vec3,
    normal: Vec3,
    albedo: Color,
    rng: &mut impl Rng,
) -> Color {
    let Some((light_point, emission, pdf)) = scene.sample_emitter(rng) else {
        return Color::zero();
    };

    let offset_origin = position + normal * EPSILON;
    let to_light = light_point - offset_origin;
    let distance = to_light.length();
    if distance <= EPSILON {
        return Color::zero();
    }
    let direction = to_light / distance;

    let cos_theta = normal.dot(&direction);
    if cos_theta <= 0.0 {
        return Color::zero();
    }

    let shadow_ray = Ray::new(offset_origin, direction);
    if scene.occluded(&shadow_ray, distance) {
        return Color::zero();
    }

    emission * albedo * (cos_theta / (std::f32::consts::PI * pdf))
}

/// Recursively estimates incident radiance along `ray`, up to `bounces`
/// remaining. Returns black once `bounces` reaches zero without having
/// struck an emitter (Russian roulette is not used; bounce count is the
/// sole termination criterion).
pub fn trace(scene: &Scene, ray: Ray, bounces: u32, skybox: Skybox<'_>, rng: &mut impl Rng) -> Color {
    if bounces == 0 {
        return Color::zero();
    }

    let hit = scene.intersect(&ray);
    if !hit.hit {
        return sample_skybox(skybox, ray.direction);
    }

    let material = &hit.material;
    if material.is_emissive() {
        return material.emission;
    }

    shade(scene, &ray, &hit, bounces, skybox, rng)
}

fn shade(
    scene: &Scene,
    ray: &Ray,
    hit: &RayIntersection,
    bounces: u32,
    skybox: Skybox<'_>,
    rng: &mut impl Rng,
) -> Color {
    let material: &PBRMaterial = &hit.material;
    let roughness = floor_roughness(material.roughness);
    let albedo = material.resolve_albedo(hit.uv, hit.position);

    let incident = ray.direction;
    let facing_normal = if incident.dot(&hit.normal) < 0.0 {
        hit.normal
    } else {
        -hit.normal
    };

    let cos_theta = (-incident).dot(&facing_normal).clamp(0.0, 1.0);
    let f0 = Color::lerp(&Color::splat(0.04), &albedo, material.metallicity);
    let fresnel = fresnel_schlick(cos_theta, f0);
    let max_f = fresnel.max_component().clamp(0.0, 1.0);

    // Branch weights per the material's dielectric/conductor split, folding
    // the metal contribution into both `metal` and `reflect` before
    // normalizing (the two differ only in whether `transmission` scales the
    // absorption).
    let metallicity = material.metallicity;
    let remaining = 1.0 - metallicity;
    let metal_weight = metallicity;
    let reflect_weight = remaining * max_f + metallicity;
    let refract_weight = remaining * (1.0 - max_f) * material.transmission;
    let diffuse_weight = remaining * (1.0 - max_f) * (1.0 - material.transmission);
    let total_weight = (metal_weight + reflect_weight + refract_weight + diffuse_weight).max(EPSILON);
    let metal_weight = metal_weight / total_weight;
    let reflect_weight = reflect_weight / total_weight;
    let refract_weight = refract_weight / total_weight;
    let diffuse_weight = diffuse_weight / total_weight;

    let branch: Float = rng.gen_range(0.0..1.0);

    if branch < metal_weight {
        let micro_normal = sample_ggx_direction(facing_normal, roughness, rng);
        let reflected = incident.reflect(&micro_normal);
        if reflected.dot(&facing_normal) <= 0.0 {
            return Color::zero();
        }

        let n_dot_l = reflected.dot(&facing_normal).max(EPSILON);
        let n_dot_v = cos_theta.max(EPSILON);
        let n_dot_h = facing_normal.dot(&micro_normal).max(EPSILON);
        let d = ggx_distribution(n_dot_h, roughness * roughness);
        let g = ggx_geometry(n_dot_v, n_dot_l, roughness);
        let specular = fresnel * (d * g / (4.0 * n_dot_v * n_dot_l).max(EPSILON));
        let absorption = specular * albedo;

        let direct = estimate_direct(scene, hit.position, facing_normal, albedo, rng);
        let origin = hit.position + facing_normal * EPSILON;
        let incoming = trace(scene, Ray::new(origin, reflected), bounces - 1, skybox, rng);
        return direct + absorption * incoming * n_dot_l / metal_weight.max(EPSILON);
    }

    if branch < metal_weight + reflect_weight {
        let reflected = incident.reflect(&facing_normal);
        let absorption = fresnel * albedo * material.transmission;
        let origin = hit.position + facing_normal * EPSILON;
        let incoming = trace(scene, Ray::new(origin, reflected), bounces - 1, skybox, rng);
        return absorption * incoming / reflect_weight.max(EPSILON);
    }

    if branch < metal_weight + reflect_weight + refract_weight {
        let entering = incident.dot(&hit.normal) < 0.0;
        let eta = if entering {
            1.0 / material.refraction_index
        } else {
            material.refraction_index
        };
        let normal_for_refraction = if entering { facing_normal } else { -facing_normal };
        let weight = refract_weight.max(EPSILON);

        return match refract(incident, normal_for_refraction, eta) {
            Some(refracted) => {
                let origin = hit.position - facing_normal * EPSILON;
                let radiance = trace(scene, Ray::new(origin, refracted), bounces - 1, skybox, rng);
                let radiance = if entering {
                    radiance
                } else {
                    radiance * beer_lambert(material.absorption, hit.depth)
                };
                radiance / weight
            }
            None => {
                // Total internal reflection.
                let reflected = incident.reflect(&facing_normal);
                let origin = hit.position + facing_normal * EPSILON;
                trace(scene, Ray::new(origin, reflected), bounces - 1, skybox, rng) / weight
            }
        };
    }

    let weight = diffuse_weight.max(EPSILON);
    let direct = estimate_direct(scene, hit.position, facing_normal, albedo, rng);
    let diffuse_direction = cosine_sample_hemisphere(facing_normal, rng);
    let origin = hit.position + facing_normal * EPSILON;
    let incoming = trace(scene, Ray::new(origin, diffuse_direction), bounces - 1, skybox, rng);
    direct + albedo * incoming / weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::PBRMaterial;
    use crate::math::{Mat4, Point3};
    use crate::mesh::{Mesh, MeshInstance};
    use crate::primitive::{Object, Sphere};

    fn emitter_scene() -> Scene {
        let mut emissive = PBRMaterial::default();
        emissive.emission = Color::splat(4.0);
        let light_mesh = Mesh::new(vec![Object::Sphere(Sphere::new(
            Point3::new(0.0, 5.0, 0.0),
            1.0,
            emissive,
        ))]);
        let light_instance = MeshInstance::new(0, Mat4::identity(), &light_mesh);

        let floor_mesh = Mesh::new(vec![Object::Sphere(Sphere::new(
            Point3::new(0.0, -1001.0, 0.0),
            1000.0,
            PBRMaterial::default(),
        ))]);
        let floor_instance = MeshInstance::new(1, Mat4::identity(), &floor_mesh);

        Scene::new(vec![light_mesh, floor_mesh], vec![light_instance, floor_instance])
    }

    #[test]
    fn trace_returns_black_at_zero_bounces() {
        let scene = emitter_scene();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let mut rng = rand::thread_rng();
        let radiance = trace(&scene, ray, 0, None, &mut rng);
        assert_eq!(radiance, Color::zero());
    }

    #[test]
    fn trace_returns_emission_on_direct_hit() {
        let scene = emitter_scene();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let mut rng = rand::thread_rng();
        let radiance = trace(&scene, ray, 4, None, &mut rng);
        assert!(radiance.max_component() > 0.0);
    }

    #[test]
    fn trace_of_miss_with_no_skybox_is_black() {
        let scene = Scene::default();
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let mut rng = rand::thread_rng();
        let radiance = trace(&scene, ray, 4, None, &mut rng);
        assert_eq!(radiance, Color::zero());
    }

    #[test]
    fn fresnel_at_normal_incidence_is_f0() {
        let f0 = Color::splat(0.04);
        let f = fresnel_schlick(1.0, f0);
        assert!((f.x - f0.x).abs() < 1e-5);
    }
}
