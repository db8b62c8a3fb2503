use cgmath::{BaseNum, EuclideanSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Represents a half-open cuboid of points: the origin is inclusive and the limit is exclusive.
///
/// With a float component type this is also the hitbox type: an anchor corner plus three
/// extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(C)]
pub struct Bounds<T> {
    origin: Point3<T>,
    size: Vector3<T>,
}

impl<T> Bounds<T> {
    pub fn origin(self) -> Point3<T> {
        self.origin
    }

    pub fn size(self) -> Vector3<T> {
        self.size
    }

    /// Moves the origin while keeping the size the same. Note this also changes the limit.
    #[inline]
    pub fn with_origin(mut self, new_origin: Point3<T>) -> Self {
        self.origin = new_origin;
        self
    }
}

impl<T: BaseNum> Bounds<T> {
    #[inline]
    pub fn new(origin: Point3<T>, size: Vector3<T>) -> Self {
        assert!(size.x >= T::zero());
        assert!(size.y >= T::zero());
        assert!(size.z >= T::zero());
        Bounds { origin, size }
    }

    #[inline]
    pub fn from_size(size: Vector3<T>) -> Self {
        Bounds::new(Point3::<T>::origin(), size)
    }

    #[inline]
    pub fn from_limit(origin: Point3<T>, limit: Point3<T>) -> Self {
        assert!(origin.x <= limit.x);
        assert!(origin.y <= limit.y);
        assert!(origin.z <= limit.z);
        Bounds::new(origin, limit - origin)
    }

    #[inline]
    pub fn limit(self) -> Point3<T> {
        self.origin + self.size
    }

    #[inline]
    pub fn contains_point(self, point: Point3<T>) -> bool {
        let limit = self.limit();
        point.x >= self.origin.x
            && point.x < limit.x
            && point.y >= self.origin.y
            && point.y < limit.y
            && point.z >= self.origin.z
            && point.z < limit.z
    }

    /// True if the given bounds is fully contained within self (including if the limits
    /// intersect).
    #[inline]
    pub fn contains_bounds(self, bounds: Bounds<T>) -> bool {
        let limit = self.limit();
        let a = bounds.origin();
        let b = bounds.limit();
        a.x >= self.origin.x
            && b.x <= limit.x
            && a.y >= self.origin.y
            && b.y <= limit.y
            && a.z >= self.origin.z
            && b.z <= limit.z
    }

    /// True if the interiors of the two bounds share at least one point. Bounds that only touch
    /// along a face, edge or corner do not overlap.
    #[inline]
    pub fn overlaps(self, other: Bounds<T>) -> bool {
        let a0 = self.origin;
        let a1 = self.limit();
        let b0 = other.origin;
        let b1 = other.limit();
        a0.x < b1.x && a1.x > b0.x && a0.y < b1.y && a1.y > b0.y && a0.z < b1.z && a1.z > b0.z
    }

    /// Computes a bounds object that is the intersection of self with the given bounds. If the
    /// intersection would be empty, returns `None`.
    #[inline]
    pub fn intersection(self, bounds: Bounds<T>) -> Option<Self> {
        let max = |a, b| if a >= b { a } else { b };
        let min = |a, b| if a <= b { a } else { b };

        let ao = self.origin();
        let al = self.limit();
        let bo = bounds.origin();
        let bl = bounds.limit();

        let origin = Point3 {
            x: max(ao.x, bo.x),
            y: max(ao.y, bo.y),
            z: max(ao.z, bo.z),
        };

        let limit = Point3 {
            x: min(al.x, bl.x),
            y: min(al.y, bl.y),
            z: min(al.z, bl.z),
        };

        if origin.x >= limit.x || origin.y >= limit.y || origin.z >= limit.z {
            None
        } else {
            Some(Self::from_limit(origin, limit))
        }
    }

    /// Moves the origin and limit by a vector while keeping the size the same.
    #[inline]
    pub fn translate(self, offset: Vector3<T>) -> Self {
        Bounds {
            origin: self.origin() + offset,
            size: self.size,
        }
    }

    /// Visits every point in the bounds with x varying slowest and z fastest. This is also the
    /// storage order of the voxel grid.
    #[inline]
    pub fn iter_points(self) -> impl Iterator<Item = Point3<T>>
    where
        std::ops::Range<T>: Iterator<Item = T>,
        T: Copy + 'static,
    {
        let origin = self.origin();
        let limit = self.limit();

        (origin.x..limit.x).flat_map(move |x| {
            (origin.y..limit.y)
                .flat_map(move |y| (origin.z..limit.z).map(move |z| Point3 { x, y, z }))
        })
    }

    #[inline]
    pub fn volume(self) -> T {
        self.size.x * self.size.y * self.size.z
    }
}
