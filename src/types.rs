use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector pointing along `angle` (radians, +y down).
    pub fn from_angle(angle: f64) -> Self {
        Vector2D::new(angle.cos(), angle.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    /// Heading of this vector; a zero vector points along +x.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Truncates toward zero, the way the pixel grid addresses positions.
    pub fn to_pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Wraps an angle into [0, 2π).
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negatives up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_angle_basic() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-9);
        assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-9);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert_eq!(wrap_angle(-1e-18), 0.0);
    }

    #[test]
    fn test_zero_heading_points_right() {
        let heading = Vector2D::new(0.0, 0.0).angle();
        let dir = Vector2D::from_angle(heading);
        assert_eq!(dir, Vector2D::new(1.0, 0.0));
    }

    #[test]
    fn test_to_pixel_truncates() {
        assert_eq!(Vector2D::new(10.9, -0.5).to_pixel(), (10, 0));
    }

    proptest! {
        #[test]
        fn wrapped_angle_in_range(angle in -1.0e6f64..1.0e6) {
            let w = wrap_angle(angle);
            prop_assert!((0.0..TAU).contains(&w));
        }
    }
}
