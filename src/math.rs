//! Math kernel: vector/point/matrix types and the small set of random
//! sampling routines the rest of the crate builds on.
//!
//! A single `Vec3` backs points, vectors, normals and colors alike;
//! `Point3`/`Normal3`/`Color` are aliases of [`Vec3`] so call sites stay
//! self-documenting without paying for a zoo of near-identical newtypes.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;

/// Would double precision benefit accuracy meaningfully for the ray tracer? Not enough to pay for it.
pub type Float = f32;

pub const EPSILON: Float = 1e-3;

/// A 3-component vector used for points, directions, normals and RGB color alike.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

pub type Point3 = Vec3;
pub type Normal3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    pub const fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub const fn zero() -> Self {
        Self::splat(0.0)
    }

    pub const fn one() -> Self {
        Self::splat(1.0)
    }

    pub fn dot(&self, other: &Self) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(&self) -> Float {
        self.dot(self)
    }

    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self / len
        } else {
            *self
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn max_component(&self) -> Float {
        self.x.max(self.y).max(self.z)
    }

    /// Reflects `self` (an incident direction) about `normal`.
    pub fn reflect(&self, normal: &Self) -> Self {
        *self - *normal * (2.0 * self.dot(normal))
    }

    /// Clamp each component to `[lo, hi]`.
    pub fn clamp(&self, lo: Float, hi: Float) -> Self {
        Self::new(
            self.x.clamp(lo, hi),
            self.y.clamp(lo, hi),
            self.z.clamp(lo, hi),
        )
    }

    pub fn powf(&self, p: Float) -> Self {
        Self::new(self.x.powf(p), self.y.powf(p), self.z.powf(p))
    }

    pub fn exp(&self) -> Self {
        Self::new(self.x.exp(), self.y.exp(), self.z.exp())
    }

    /// Linear interpolation between two colors/vectors by `t`, componentwise.
    pub fn lerp(a: &Self, b: &Self, t: Float) -> Self {
        *a + (*b - *a) * t
    }
}

impl Index<usize> for Vec3 {
    type Output = Float;
    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of range: {i}"),
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}
impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}
impl Mul<Float> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: Float) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
impl Mul<Vec3> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: Vec3) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}
impl MulAssign<Float> for Vec3 {
    fn mul_assign(&mut self, rhs: Float) {
        *self = *self * rhs;
    }
}
impl MulAssign<Vec3> for Vec3 {
    fn mul_assign(&mut self, rhs: Vec3) {
        *self = *self * rhs;
    }
}
impl Div<Float> for Vec3 {
    type Output = Self;
    fn div(self, rhs: Float) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}
impl Div<Vec3> for Vec3 {
    type Output = Self;
    fn div(self, rhs: Vec3) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}
impl DivAssign<Float> for Vec3 {
    fn div_assign(&mut self, rhs: Float) {
        *self = *self / rhs;
    }
}
impl DivAssign<Vec3> for Vec3 {
    fn div_assign(&mut self, rhs: Vec3) {
        *self = *self / rhs;
    }
}
impl Mul<Vec3> for Float {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs * self
    }
}

/// A 2-component vector, used for UV coordinates and screen-space deltas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: Float,
    pub y: Float,
}

impl Vec2 {
    pub const fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }
}

/// A 4-component vector, used only as an intermediate in homogeneous transforms.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec4 {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub w: Float,
}

impl Vec4 {
    pub const fn new(x: Float, y: Float, z: Float, w: Float) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_point(p: Point3) -> Self {
        Self::new(p.x, p.y, p.z, 1.0)
    }

    pub fn from_vector(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 0.0)
    }

    pub fn xyz(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// A 4x4 matrix stored row-major, used for the camera's view/projection
/// transforms and for `MeshInstance`'s affine `transform`/`inverse` pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mat4 {
    pub m: [[Float; 4]; 4],
}

impl Mat4 {
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::identity();
        m.m[0][3] = t.x;
        m.m[1][3] = t.y;
        m.m[2][3] = t.z;
        m
    }

    pub fn scaling(s: Vec3) -> Self {
        let mut m = Self::identity();
        m.m[0][0] = s.x;
        m.m[1][1] = s.y;
        m.m[2][2] = s.z;
        m
    }

    /// Rotation about an arbitrary unit `axis` by `radians`, via Rodrigues' formula.
    pub fn rotation(axis: Vec3, radians: Float) -> Self {
        let a = axis.normalized();
        let (s, c) = radians.sin_cos();
        let t = 1.0 - c;
        let mut m = Self::identity();
        m.m[0][0] = t * a.x * a.x + c;
        m.m[0][1] = t * a.x * a.y - s * a.z;
        m.m[0][2] = t * a.x * a.z + s * a.y;
        m.m[1][0] = t * a.x * a.y + s * a.z;
        m.m[1][1] = t * a.y * a.y + c;
        m.m[1][2] = t * a.y * a.z - s * a.x;
        m.m[2][0] = t * a.x * a.z - s * a.y;
        m.m[2][1] = t * a.y * a.z + s * a.x;
        m.m[2][2] = t * a.z * a.z + c;
        m
    }

    pub fn mul_mat(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.m[row][k] * rhs.m[k][col];
                }
                out[row][col] = sum;
            }
        }
        Self { m: out }
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        let c = [v.x, v.y, v.z, v.w];
        let mut out = [0.0; 4];
        for row in 0..4 {
            out[row] = self.m[row][0] * c[0]
                + self.m[row][1] * c[1]
                + self.m[row][2] * c[2]
                + self.m[row][3] * c[3];
        }
        Vec4::new(out[0], out[1], out[2], out[3])
    }

    /// Transforms a point (implicit `w = 1`), dividing through by the
    /// resulting `w` when it is not unity (needed for the projection matrix).
    pub fn transform_point(&self, p: Point3) -> Point3 {
        let r = self.mul_vec4(Vec4::from_point(p));
        if r.w != 0.0 && r.w != 1.0 {
            r.xyz() / r.w
        } else {
            r.xyz()
        }
    }

    /// Transforms a direction (implicit `w = 0`). Critical: the translation
    /// row must never be applied to a direction — that is what `w = 0` guards.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.mul_vec4(Vec4::from_vector(v)).xyz()
    }

    /// Transforms a normal using `self` as the *inverse* of the instance's
    /// transform: normals need the transpose of the inverse, not the forward
    /// matrix, to stay perpendicular to the surface under non-uniform scale.
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        Vec3::new(
            self.m[0][0] * n.x + self.m[1][0] * n.y + self.m[2][0] * n.z,
            self.m[0][1] * n.x + self.m[1][1] * n.y + self.m[2][1] * n.z,
            self.m[0][2] * n.x + self.m[1][2] * n.y + self.m[2][2] * n.z,
        )
    }

    /// General 4x4 inverse via Gauss-Jordan elimination with partial pivoting.
    /// Used both for `MeshInstance::inverse` and for the camera's
    /// inverse-projection / inverse-view matrices.
    pub fn inverse(&self) -> Self {
        let mut a = self.m;
        let mut inv = Self::identity().m;

        for col in 0..4 {
            let mut pivot_row = col;
            let mut pivot_val = a[col][col].abs();
            for row in (col + 1)..4 {
                if a[row][col].abs() > pivot_val {
                    pivot_val = a[row][col].abs();
                    pivot_row = row;
                }
            }
            if pivot_row != col {
                a.swap(col, pivot_row);
                inv.swap(col, pivot_row);
            }

            let pivot = a[col][col];
            let pivot = if pivot.abs() < 1e-12 { 1e-12 } else { pivot };
            for k in 0..4 {
                a[col][k] /= pivot;
                inv[col][k] /= pivot;
            }

            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                for k in 0..4 {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }

        Self { m: inv }
    }

    /// Right-handed perspective projection matching the conventions the
    /// original renderer builds with `glm::perspective(fovy, aspect, near, far)`.
    pub fn perspective(fovy_radians: Float, aspect: Float, near: Float, far: Float) -> Self {
        let f = 1.0 / (fovy_radians / 2.0).tan();
        let mut m = [[0.0; 4]; 4];
        m[0][0] = f / aspect;
        m[1][1] = f;
        m[2][2] = (far + near) / (near - far);
        m[2][3] = (2.0 * far * near) / (near - far);
        m[3][2] = -1.0;
        Self { m }
    }

    /// Right-handed view matrix looking from `eye` toward `target` with `up`.
    pub fn look_at(eye: Point3, target: Point3, up: Vec3) -> Self {
        let f = (target - eye).normalized();
        let s = f.cross(&up).normalized();
        let u = s.cross(&f);

        let mut m = Self::identity();
        m.m[0] = [s.x, s.y, s.z, -s.dot(&eye)];
        m.m[1] = [u.x, u.y, u.z, -u.dot(&eye)];
        m.m[2] = [-f.x, -f.y, -f.z, f.dot(&eye)];
        m
    }
}

/// Draws a uniformly-distributed point on the unit sphere surface (radius 1).
pub fn uniform_sphere(rng: &mut impl Rng) -> Vec3 {
    let z = rng.gen_range(-1.0..=1.0f32);
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Draws a uniformly-distributed point on a disk of the given `radius`,
/// centered at the origin in the local (x, y) plane.
pub fn uniform_disk(rng: &mut impl Rng, radius: Float) -> Vec2 {
    let r = radius * rng.gen_range(0.0..1.0f32).sqrt();
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Draws a uniform scalar in `[0, 1)`.
pub fn uniform_float(rng: &mut impl Rng) -> Float {
    rng.gen_range(0.0..1.0f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_normalize_is_unit_length() {
        let v = Vec3::new(3.0, 4.0, 0.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mat4_identity_inverse_is_identity() {
        let inv = Mat4::identity().inverse();
        for r in 0..4 {
            for c in 0..4 {
                let expect = if r == c { 1.0 } else { 0.0 };
                assert!((inv.m[r][c] - expect).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn mat4_inverse_round_trips() {
        let t = Mat4::translation(Vec3::new(1.0, 2.0, 3.0))
            .mul_mat(&Mat4::rotation(Vec3::new(0.0, 1.0, 0.0), 0.7))
            .mul_mat(&Mat4::scaling(Vec3::new(2.0, 1.0, 0.5)));
        let round_tripped = t.inverse().inverse();
        let p = Point3::new(1.0, 1.0, 1.0);
        let a = t.transform_point(p);
        let b = round_tripped.transform_point(p);
        assert!((a - b).length() < 1e-3);
    }

    #[test]
    fn transform_point_and_vector_differ_under_translation() {
        let t = Mat4::translation(Vec3::new(5.0, 0.0, 0.0));
        let p = t.transform_point(Point3::zero());
        let v = t.transform_vector(Vec3::zero());
        assert!((p - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!(v.length() < 1e-5);
    }

    #[test]
    fn uniform_sphere_is_unit_length() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let v = uniform_sphere(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }
}
