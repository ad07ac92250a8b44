//! 2D vector helpers on top of [`glam::DVec2`].
//!
//! Arithmetic (`+`, `-`, `*`, `/`, negation, dot products) comes straight
//! from glam. [`VectorExt`] adds the polar and reflection operations the
//! particle code relies on, with zero-length guards where a plain division
//! would produce NaN.
//!
//! ```ignore
//! use flurry::vector::{Vector, VectorExt};
//!
//! let v = Vector::from_angle_mag(std::f64::consts::FRAC_PI_2, 2.0);
//! assert!((v.y - 2.0).abs() < 1e-9);
//! ```

use glam::DVec2;

/// The crate's vector type: `{ x: f64, y: f64 }`.
pub type Vector = DVec2;

/// Polar, reflection and guarded-division helpers for [`Vector`].
pub trait VectorExt: Sized {
    /// Build a vector from an angle (radians) and a magnitude.
    fn from_angle_mag(angle: f64, magnitude: f64) -> Self;

    /// Angle of this vector in radians (`atan2(y, x)`).
    fn heading(self) -> f64;

    /// Vector magnitude.
    fn mag(self) -> f64;

    /// Squared magnitude, for comparisons that don't need the root.
    fn mag_sq(self) -> f64;

    /// Divide by `f`. A zero factor leaves the vector unchanged.
    fn div_or_self(self, f: f64) -> Self;

    /// Unit vector in the same direction. Zero vectors stay zero.
    fn normalized_or_self(self) -> Self;

    /// Reflect about the given (unit) normal: `v - 2(v·n)n`.
    fn reflected(self, normal: Self) -> Self;

    /// Project this vector onto `onto`. Projecting onto a zero vector is a no-op.
    fn projected_on(self, onto: Self) -> Self;

    /// Rotate by `angle` radians.
    fn rotated(self, angle: f64) -> Self;

    /// 90° tangent normal derived from this vector's heading.
    fn normal(self) -> Self;

    /// Component product difference `x1*x2 - y1*y2`.
    fn cross_diff(self, other: Self) -> f64;
}

impl VectorExt for DVec2 {
    #[inline]
    fn from_angle_mag(angle: f64, magnitude: f64) -> Self {
        DVec2::new(magnitude * angle.cos(), magnitude * angle.sin())
    }

    #[inline]
    fn heading(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    fn mag(self) -> f64 {
        self.length()
    }

    #[inline]
    fn mag_sq(self) -> f64 {
        self.length_squared()
    }

    #[inline]
    fn div_or_self(self, f: f64) -> Self {
        if f != 0.0 {
            self / f
        } else {
            self
        }
    }

    #[inline]
    fn normalized_or_self(self) -> Self {
        self.div_or_self(self.length())
    }

    #[inline]
    fn reflected(self, normal: Self) -> Self {
        let d = 2.0 * self.dot(normal);
        self - normal * d
    }

    fn projected_on(self, onto: Self) -> Self {
        let len_sq = onto.length_squared();
        if len_sq == 0.0 {
            return self;
        }
        onto * (self.dot(onto) / len_sq)
    }

    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn normal(self) -> Self {
        let a = self.heading();
        DVec2::new(a.sin(), -a.cos())
    }

    #[inline]
    fn cross_diff(self, other: Self) -> f64 {
        self.x * other.x - self.y * other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: Vector, b: Vector) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_from_angle_mag() {
        let v = Vector::from_angle_mag(FRAC_PI_2, 3.0);
        assert!(close(v, Vector::new(0.0, 3.0)));
        assert!((v.heading() - FRAC_PI_2).abs() < 1e-12);
        assert!((v.mag() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_guards() {
        assert_eq!(Vector::ZERO.normalized_or_self(), Vector::ZERO);
        assert_eq!(Vector::new(2.0, 4.0).div_or_self(0.0), Vector::new(2.0, 4.0));
        assert_eq!(Vector::new(1.0, 1.0).projected_on(Vector::ZERO), Vector::new(1.0, 1.0));
    }

    #[test]
    fn test_reflect_about_normal() {
        // Falling onto a horizontal floor (normal pointing up).
        let v = Vector::new(1.0, 2.0).reflected(Vector::new(0.0, -1.0));
        assert!(close(v, Vector::new(1.0, -2.0)));
    }

    #[test]
    fn test_project_is_directional() {
        let a = Vector::new(2.0, 2.0);
        let b = Vector::new(1.0, 0.0);
        assert!(close(a.projected_on(b), Vector::new(2.0, 0.0)));
        assert!(close(b.projected_on(a), Vector::new(0.5, 0.5)));
    }

    #[test]
    fn test_rotate_and_normal() {
        let v = Vector::new(1.0, 0.0).rotated(PI);
        assert!(close(v, Vector::new(-1.0, 0.0)));

        let n = Vector::new(1.0, 0.0).normal();
        assert!(close(n, Vector::new(0.0, -1.0)));
    }

    #[test]
    fn test_dot_is_commutative() {
        let a = Vector::new(3.0, -1.0);
        let b = Vector::new(0.5, 4.0);
        assert_eq!(a.dot(b), b.dot(a));
        assert_eq!(a.cross_diff(b), 3.0 * 0.5 - (-1.0 * 4.0));
    }
}
