//! Texture providers: image-backed, procedural Perlin turbulence, and a
//! trivial constant-color provider, unified behind one `sample(u, v, p)`
//! surface and dispatched through a tagged union rather than dynamic
//! dispatch.

use std::sync::Arc;

use image::RgbImage;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::math::{Color, Float, Point3};

/// How an image-backed texture resolves a UV coordinate to a pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleMode {
    Nearest,
    Bilinear,
}

/// Hashed-lattice Perlin noise with a power-of-two permutation table: the
/// table is permuted once per axis at construction and is immutable
/// thereafter.
#[derive(Clone, Debug, PartialEq)]
pub struct PerlinNoise {
    permutation: Vec<[u32; 3]>,
    random: Vec<Float>,
    mask: u32,
}

impl PerlinNoise {
    /// `table_size` must be a power of two.
    pub fn new(table_size: usize, rng: &mut impl Rng) -> Self {
        assert!(
            table_size.is_power_of_two(),
            "PerlinNoise table size must be a power of two, got {table_size}"
        );

        let random = (0..table_size)
            .map(|_| rng.gen_range(0.0..1.0f32))
            .collect();

        let mut permutation: Vec<[u32; 3]> = (0..table_size as u32)
            .map(|i| [i, i, i])
            .collect();
        for axis in 0..3 {
            let mut column: Vec<u32> = permutation.iter().map(|p| p[axis]).collect();
            column.shuffle(rng);
            for (entry, value) in permutation.iter_mut().zip(column) {
                entry[axis] = value;
            }
        }

        Self {
            permutation,
            random,
            mask: table_size as u32 - 1,
        }
    }

    /// A single hashed-lattice sample at `p`, scaled by a fixed block size.
    pub fn noise(&self, p: Point3) -> Float {
        let i = (4.0 * p.x).floor() as i64 as u32 & self.mask;
        let j = (4.0 * p.y).floor() as i64 as u32 & self.mask;
        let k = (4.0 * p.z).floor() as i64 as u32 & self.mask;
        let index = self.permutation[i as usize][0]
            ^ self.permutation[j as usize][1]
            ^ self.permutation[k as usize][2];
        self.random[(index & self.mask) as usize]
    }

    /// Summed multi-octave turbulence, `Σ wᵢ·noise(2ⁱ·p)` with `wᵢ = 2⁻ⁱ`.
    pub fn turbulence(&self, p: Point3, octaves: usize) -> Float {
        let mut accum = 0.0;
        let mut weight = 1.0;
        let mut point = p;
        for _ in 0..octaves {
            accum += weight * self.noise(point);
            weight *= 0.5;
            point *= 2.0;
        }
        accum
    }
}

/// A texture provider: `sample(u, v, world_pos) -> RGB`.
#[derive(Clone, Debug, PartialEq)]
pub enum Texture {
    /// Image-backed; ignores `world_pos`, samples the decoded image by UV.
    Image {
        image: Arc<RgbImage>,
        mode: SampleMode,
    },
    /// Procedural marble-like turbulence; ignores `u, v`.
    Perlin {
        noise: Arc<PerlinNoise>,
        frequency: Float,
        amplitude: Float,
        octaves: usize,
    },
    /// A fixed color, used as the "no override" case so material resolution
    /// has one code path instead of threading `Option<Texture>` everywhere.
    Constant(Color),
}

impl Texture {
    pub fn sample(&self, u: Float, v: Float, world_pos: Point3) -> Color {
        match self {
            Texture::Image { image, mode } => sample_image(image, u, v, *mode),
            Texture::Perlin {
                noise,
                frequency,
                amplitude,
                octaves,
            } => {
                let turbulence = noise.turbulence(world_pos, *octaves);
                let banded = (frequency + amplitude * turbulence).sin();
                Color::splat(0.5 * (1.0 + banded))
            }
            Texture::Constant(c) => *c,
        }
    }
}

fn sample_image(image: &RgbImage, u: Float, v: Float, mode: SampleMode) -> Color {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Color::zero();
    }

    // Wrap UV into [0, 1) so textures tile rather than clamp at the seams.
    let u = u.rem_euclid(1.0);
    let v = v.rem_euclid(1.0);

    match mode {
        SampleMode::Nearest => {
            let x = ((u * w as Float) as u32).min(w - 1);
            let y = ((v * h as Float) as u32).min(h - 1);
            pixel_to_color(image.get_pixel(x, y))
        }
        SampleMode::Bilinear => {
            let fx = u * w as Float - 0.5;
            let fy = v * h as Float - 0.5;
            let x0 = fx.floor();
            let y0 = fy.floor();
            let tx = fx - x0;
            let ty = fy - y0;

            let wrap = |v: Float, n: u32| -> u32 {
                let n = n as i64;
                (((v as i64) % n + n) % n) as u32
            };

            let x0i = wrap(x0, w);
            let x1i = wrap(x0 + 1.0, w);
            let y0i = wrap(y0, h);
            let y1i = wrap(y0 + 1.0, h);

            let c00 = pixel_to_color(image.get_pixel(x0i, y0i));
            let c10 = pixel_to_color(image.get_pixel(x1i, y0i));
            let c01 = pixel_to_color(image.get_pixel(x0i, y1i));
            let c11 = pixel_to_color(image.get_pixel(x1i, y1i));

            let top = Color::lerp(&c00, &c10, tx);
            let bottom = Color::lerp(&c01, &c11, tx);
            Color::lerp(&top, &bottom, ty)
        }
    }
}

fn pixel_to_color(pixel: &image::Rgb<u8>) -> Color {
    Color::new(
        pixel[0] as Float / 255.0,
        pixel[1] as Float / 255.0,
        pixel[2] as Float / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_texture_ignores_uv() {
        let tex = Texture::Constant(Color::new(1.0, 0.0, 0.0));
        let a = tex.sample(0.1, 0.2, Point3::zero());
        let b = tex.sample(0.9, 0.9, Point3::new(5.0, 5.0, 5.0));
        assert_eq!(a, b);
    }

    #[test]
    fn perlin_noise_is_deterministic_after_construction() {
        let mut rng = rand::thread_rng();
        let noise = PerlinNoise::new(256, &mut rng);
        let p = Point3::new(1.5, 2.5, 3.5);
        assert_eq!(noise.noise(p), noise.noise(p));
    }

    #[test]
    fn perlin_noise_rejects_non_power_of_two() {
        let result = std::panic::catch_unwind(|| {
            let mut rng = rand::thread_rng();
            PerlinNoise::new(200, &mut rng);
        });
        assert!(result.is_err());
    }

    #[test]
    fn image_texture_samples_within_bounds() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.put_pixel(1, 1, image::Rgb([255, 255, 255]));
        let tex = Texture::Image {
            image: Arc::new(img),
            mode: SampleMode::Nearest,
        };
        let c = tex.sample(0.0, 0.0, Point3::zero());
        assert_eq!(c, Color::new(1.0, 0.0, 0.0));
    }
}
