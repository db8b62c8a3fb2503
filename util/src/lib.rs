pub mod bounds;
pub mod collision;
pub mod ray;

use cgmath::{Point3, Vector3};

pub use bounds::Bounds;
pub use collision::{resolve_collisions, CollisionData, Contact};
pub use ray::Ray;

/// Division rounding towards negative infinity, so that negative voxel coordinates land in the
/// chunk below zero rather than in chunk zero.
pub trait DivDown {
    fn div_down(self, divisor: Self) -> Self;
}

impl DivDown for i64 {
    #[inline]
    fn div_down(self, divisor: i64) -> i64 {
        assert!(divisor != 0);
        let q = self / divisor;
        if self % divisor != 0 && (self < 0) != (divisor < 0) {
            q - 1
        } else {
            q
        }
    }
}

impl DivDown for Vector3<i64> {
    #[inline]
    fn div_down(self, divisor: Self) -> Self {
        Vector3::new(
            self.x.div_down(divisor.x),
            self.y.div_down(divisor.y),
            self.z.div_down(divisor.z),
        )
    }
}

impl DivDown for Point3<i64> {
    #[inline]
    fn div_down(self, divisor: Self) -> Self {
        Point3::new(
            self.x.div_down(divisor.x),
            self.y.div_down(divisor.y),
            self.z.div_down(divisor.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_down() {
        assert_eq!(38i64.div_down(4), 9);
        assert_eq!((-38i64).div_down(4), -10);
        assert_eq!((-38i64).div_down(-4), 9);
        assert_eq!(38i64.div_down(-4), -10);
        assert_eq!((-32i64).div_down(16), -2);
        assert_eq!(0i64.div_down(16), 0);
    }

    #[test]
    fn test_div_points() {
        let p = Point3::new(33i64, 0, -1).div_down(Point3::new(16, 16, 16));
        assert_eq!(p, Point3::new(2, 0, -1));
    }
}
