//! Surface material parameters.

use crate::math::{Color, Float};
use crate::texture::Texture;

/// An immutable bundle of surface parameters shared by every primitive.
///
/// `absorption` is kept distinct from `albedo` for scenes that want to tint
/// a `Colloid`'s participating medium independently of its surface color,
/// even though the integrator's Beer-Lambert attenuation keys off `albedo`
/// by default (see `integrator::trace`).
#[derive(Clone, Debug, PartialEq)]
pub struct PBRMaterial {
    /// Base color, used as the diffuse/specular reflectance and as the
    /// Fresnel F0 basis for dielectrics.
    pub albedo: Color,

    /// Falloff-absorption color used by a `Colloid`'s participating medium.
    pub absorption: Color,

    /// Radiance emitted by the surface. Zero means non-emissive.
    pub emission: Color,

    /// `0` = dielectric, `1` = conductor.
    pub metallicity: Float,

    /// Relative index of refraction, must be `> 0`.
    pub refraction_index: Float,

    /// `0` = smooth mirror, `1` = fully rough (Lambertian-like) surface.
    pub roughness: Float,

    /// Reserved for future anisotropic roughness; currently unused by the integrator.
    pub anisotropy: Float,

    /// Fraction of non-Fresnel paths that refract rather than diffuse.
    pub transmission: Float,

    /// Overrides `albedo` via UV/world-position lookup when present.
    pub texture: Option<Texture>,
}

impl Default for PBRMaterial {
    fn default() -> Self {
        Self {
            albedo: Color::splat(0.5),
            absorption: Color::zero(),
            emission: Color::zero(),
            metallicity: 0.0,
            refraction_index: 1.5,
            roughness: 1.0,
            anisotropy: 0.0,
            transmission: 0.0,
            texture: None,
        }
    }
}

impl PBRMaterial {
    pub fn is_emissive(&self) -> bool {
        !self.emission.is_zero()
    }

    /// Resolves the effective albedo at a hit point: the texture's sample
    /// when present, otherwise the material's own `albedo`. A texture that
    /// fails to provide a sample degrades to `albedo` the same way.
    pub fn resolve_albedo(&self, uv: crate::math::Vec2, world_pos: crate::math::Point3) -> Color {
        match &self.texture {
            Some(tex) => tex.sample(uv.x, uv.y, world_pos),
            None => self.albedo,
        }
    }
}

/// Floors a roughness value away from zero so the GGX denominator in
/// `integrator::ggx_specular` never divides by a true delta distribution.
pub fn floor_roughness(roughness: Float) -> Float {
    roughness.max(1e-3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_not_emissive() {
        assert!(!PBRMaterial::default().is_emissive());
    }

    #[test]
    fn floor_roughness_never_reaches_zero() {
        assert!(floor_roughness(0.0) > 0.0);
    }
}
