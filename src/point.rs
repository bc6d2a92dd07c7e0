use std::ops::{Add, Sub};

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn squared_distance(self, other: Self) -> f32 {
        let delta = other - self;
        delta.dot(delta)
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Scale each axis independently.
    #[inline]
    pub fn scaled(self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Point;

    #[test]
    fn xy_points() {
        let a = Point::new(0.5, 0.5);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a.squared_distance(b), 0.5);
    }

    #[test]
    fn squared_distance_is_symmetric() {
        let a = Point::new(3.0, -4.0);
        let b = Point::new(0.0, 0.0);
        assert_eq!(a.squared_distance(b), 25.0);
        assert_eq!(b.squared_distance(a), 25.0);
    }

    #[test]
    fn scaled_by_identity_is_unchanged() {
        let a = Point::new(12.25, 7.5);
        assert_eq!(a.scaled(1.0, 1.0), a);
    }

    #[test]
    fn scaled_per_axis() {
        let a = Point::new(10.0, 20.0);
        assert_eq!(a.scaled(2.0, 0.5), Point::new(20.0, 10.0));
    }
}
