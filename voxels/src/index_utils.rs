use cgmath::{ElementWise, EuclideanSpace, Point3, Vector3};

use voxsim_util::{Bounds, DivDown};

#[inline]
pub const fn chunk_size() -> Vector3<i64> {
    Vector3 {
        x: 16,
        y: 16,
        z: 16,
    }
}

#[inline]
pub const fn chunk_size_total() -> i64 {
    chunk_size().x * chunk_size().y * chunk_size().z
}

/// Index of a point in a dense grid of the given size, with x varying slowest and z fastest.
#[inline]
pub fn pack_xyz(size: Vector3<i64>, p: Point3<i64>) -> usize {
    debug_assert!(point_within_size(p, size));
    ((p.x * size.y + p.y) * size.z + p.z) as usize
}

#[inline]
pub fn unpack_xyz(size: Vector3<i64>, index: usize) -> Point3<i64> {
    let index = index as i64;
    debug_assert!(index < size.x * size.y * size.z);
    Point3 {
        x: index / (size.y * size.z),
        y: (index / size.z) % size.y,
        z: index % size.z,
    }
}

#[inline]
pub fn point_within_size(point: Point3<i64>, size: Vector3<i64>) -> bool {
    point.x >= 0
        && point.y >= 0
        && point.z >= 0
        && point.x < size.x
        && point.y < size.y
        && point.z < size.z
}

/// From a point in block coordinates, return the chunk position and the position of the block
/// within that chunk.
#[inline]
pub fn to_chunk_pos(p: Point3<i64>) -> (Point3<i64>, Point3<i64>) {
    let chunk_limit = Point3::origin() + chunk_size();
    let chunk_pos = p.div_down(chunk_limit);
    let inner_pos = p - chunk_pos.mul_element_wise(chunk_limit).to_vec();
    (chunk_pos, inner_pos)
}

/// The voxel bounds covered by the chunk at the given chunk position.
#[inline]
pub fn chunk_bounds(chunk_pos: Point3<i64>) -> Bounds<i64> {
    Bounds::new(
        chunk_pos.mul_element_wise(Point3::origin() + chunk_size()),
        chunk_size(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let size = Vector3::new(32, 48, 16);
        for &(x, y, z) in &[(0, 0, 0), (0, 0, 1), (0, 1, 0), (1, 0, 0), (31, 47, 15)] {
            let p = Point3::new(x, y, z);
            assert_eq!(unpack_xyz(size, pack_xyz(size, p)), p);
        }
        assert_eq!(pack_xyz(size, Point3::new(0, 1, 0)), 16);
        assert_eq!(pack_xyz(size, Point3::new(1, 0, 0)), 48 * 16);
    }

    #[test]
    fn test_to_chunk_pos() {
        assert_eq!(
            to_chunk_pos(Point3::new(17, 0, 47)),
            (Point3::new(1, 0, 2), Point3::new(1, 0, 15))
        );
        assert_eq!(
            to_chunk_pos(Point3::new(-1, 16, 5)),
            (Point3::new(-1, 1, 0), Point3::new(15, 0, 5))
        );
    }
}
