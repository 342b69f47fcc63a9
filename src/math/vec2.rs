//! Two-dimensional vector used for positions, velocities and wind.

use serde::{Deserialize, Serialize};

/// A 2D vector in world units (pixels).
///
/// # Examples
///
/// ```
/// use vivarium::math::Vec2;
///
/// let a = Vec2::new(3.0, 4.0);
/// assert!((a.length() - 5.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Creates a vector from components.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Returns the Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector in this direction, or zero for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Scales the vector by a scalar.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        self.scaled(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_unit_axes() {
        assert!((Vec2::new(1.0, 0.0).length() - 1.0).abs() < f32::EPSILON);
        assert!((Vec2::new(0.0, 1.0).length() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vec2::new(100.0, 100.0);
        let b = Vec2::new(150.0, 100.0);
        assert!((a.distance_to(b) - 50.0).abs() < f32::EPSILON);
        assert!((b.distance_to(a) - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn normalized_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn normalized_has_unit_length() {
        let v = Vec2::new(3.0, -4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn arithmetic() {
        let v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0) - Vec2::new(1.0, 1.0);
        assert_eq!(v, Vec2::new(3.0, 5.0));
        assert_eq!(v * 2.0, Vec2::new(6.0, 10.0));
    }
}
