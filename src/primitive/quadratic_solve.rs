//! Shared real-quadratic solver used by `Sphere` and `Quadric`.

use crate::math::Float;

/// Solves `a*t^2 + b*t + c = 0` for real roots, returning `(smaller, larger)`
/// when the discriminant is positive. Returns `None` on a non-positive
/// discriminant: no real roots, or a tangent double-root, both treated as a
/// miss.
pub fn solve_quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);
    if t1 <= t2 {
        Some((t1, t2))
    } else {
        Some((t2, t1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_simple_quadratic() {
        // t^2 - 3t + 2 = 0 -> t = 1, 2
        let (t1, t2) = solve_quadratic(1.0, -3.0, 2.0).unwrap();
        assert!((t1 - 1.0).abs() < 1e-5);
        assert!((t2 - 2.0).abs() < 1e-5);
    }

    #[test]
    fn no_real_roots_returns_none() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_none());
    }
}
