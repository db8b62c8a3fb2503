//! The chunked write path into a `VoxelWorld`.
//!
//! Every write made through a `ChunkAccessor` marks the chunk that owns the written voxel as
//! modified, along with any chunk sharing a face with the voxel and any chunk whose skylight
//! changed as a result. Modified chunks are handed
//! to a `MeshBuilder` a bounded number at a time and their flags cleared.

use cgmath::{Point3, Vector3};

use voxsim_util::{Bounds, DivDown};

use crate::{block::Block, index_utils, light, voxel_world::VoxelWorld};

const FACE_NEIGHBORS: [Vector3<i64>; 6] = [
    Vector3 { x: 1, y: 0, z: 0 },
    Vector3 { x: -1, y: 0, z: 0 },
    Vector3 { x: 0, y: 1, z: 0 },
    Vector3 { x: 0, y: -1, z: 0 },
    Vector3 { x: 0, y: 0, z: 1 },
    Vector3 { x: 0, y: 0, z: -1 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    bounds: Bounds<i64>,
    modified: bool,
}

/// Read-only association of one chunk with the world that holds its voxels.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView<'a> {
    world: &'a VoxelWorld,
    chunk: &'a Chunk,
}

/// Consumer of modified chunks, e.g. a mesh builder. It may read anything in the chunk plus a
/// one-voxel halo around it.
pub trait MeshBuilder {
    fn rebuild(&mut self, view: ChunkView<'_>);
}

#[derive(Debug, Clone)]
pub struct ChunkAccessor {
    world: VoxelWorld,
    count_chunks: Vector3<i64>,
    chunks: Vec<Chunk>,
}

impl Chunk {
    #[inline]
    pub fn bounds(&self) -> Bounds<i64> {
        self.bounds
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

impl<'a> ChunkView<'a> {
    #[inline]
    pub fn bounds(&self) -> Bounds<i64> {
        self.chunk.bounds
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.chunk.modified
    }

    pub fn world(&self) -> &'a VoxelWorld {
        self.world
    }

    /// Reads a voxel anywhere in the world, including the halo around this chunk. Points outside
    /// the world read as `Block::Null`.
    #[inline]
    pub fn get_safe(&self, p: Point3<i64>) -> Block {
        self.world.get_safe(p)
    }

    #[inline]
    pub fn skylight_safe(&self, p: Point3<i64>) -> u8 {
        self.world.skylight_safe(p)
    }

    /// Visits every voxel inside the chunk, in storage order.
    pub fn iter_voxels(&self) -> impl Iterator<Item = (Point3<i64>, Block)> + 'a {
        let world = self.world;
        self.chunk
            .bounds
            .iter_points()
            .map(move |p| (p, world.get(p)))
    }
}

impl ChunkAccessor {
    /// Partitions the world into chunks. No chunk starts out modified; use `rebuild_all` to
    /// build every chunk once.
    pub fn new(world: VoxelWorld) -> Self {
        let chunk_size = index_utils::chunk_size();
        let count_chunks = world.size().div_down(chunk_size);

        let chunks = Bounds::from_size(count_chunks)
            .iter_points()
            .map(|chunk_pos| Chunk {
                bounds: index_utils::chunk_bounds(chunk_pos),
                modified: false,
            })
            .collect();

        log::debug!(
            "Partitioned world of size {:?} into {:?} chunks",
            world.size(),
            count_chunks
        );

        ChunkAccessor {
            world,
            count_chunks,
            chunks,
        }
    }

    #[inline]
    pub fn world(&self) -> &VoxelWorld {
        &self.world
    }

    pub fn into_world(self) -> VoxelWorld {
        self.world
    }

    #[inline]
    pub fn count_chunks(&self) -> Vector3<i64> {
        self.count_chunks
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn get_safe(&self, p: Point3<i64>) -> Block {
        self.world.get_safe(p)
    }

    /// Index into `chunks` of the chunk owning the given voxel, if the voxel is in the world.
    #[inline]
    pub fn chunk_index(&self, p: Point3<i64>) -> Option<usize> {
        if !self.world.in_bounds(p) {
            return None;
        }
        let (chunk_pos, _) = index_utils::to_chunk_pos(p);
        Some(index_utils::pack_xyz(self.count_chunks, chunk_pos))
    }

    pub fn view(&self, index: usize) -> Option<ChunkView<'_>> {
        Some(ChunkView {
            world: &self.world,
            chunk: self.chunks.get(index)?,
        })
    }

    /// Writes a voxel and marks the affected chunks modified. Returns false, and does nothing,
    /// for points outside the world.
    pub fn set_safe(&mut self, p: Point3<i64>, block: Block) -> bool {
        let index = match self.chunk_index(p) {
            Some(index) => index,
            None => return false,
        };

        self.world.set(p, block);
        self.chunks[index].modified = true;

        // Builders read one voxel past their chunk, so a write on a chunk face is visible from
        // the chunk across it.
        for offset in FACE_NEIGHBORS.iter() {
            if let Some(neighbor) = self.chunk_index(p + *offset) {
                self.chunks[neighbor].modified = true;
            }
        }

        if let Some(changed) = light::relight_column(&mut self.world, p.x, p.z) {
            let chunk_y = index_utils::chunk_size().y;
            let first = changed.start.div_down(chunk_y);
            let last = (changed.end - 1).div_down(chunk_y);
            for cy in first..=last {
                if let Some(index) = self.chunk_index(Point3::new(p.x, cy * chunk_y, p.z)) {
                    self.chunks[index].modified = true;
                }
            }
        }

        true
    }

    pub fn set_safe_if_air(&mut self, p: Point3<i64>, block: Block) -> bool {
        self.world.get_safe(p) == Block::Air && self.set_safe(p, block)
    }

    pub fn set_safe_if_not_air(&mut self, p: Point3<i64>, block: Block) -> bool {
        match self.world.get_safe(p) {
            Block::Air | Block::Null => false,
            _ => self.set_safe(p, block),
        }
    }

    pub fn modified_count(&self) -> usize {
        self.chunks.iter().filter(|chunk| chunk.modified).count()
    }

    /// Hands at most `max_updates` modified chunks to the builder, in chunk index order, and
    /// clears their flags. Returns how many chunks were rebuilt.
    pub fn rebuild_modified<B>(&mut self, max_updates: usize, builder: &mut B) -> usize
    where
        B: MeshBuilder + ?Sized,
    {
        let world = &self.world;
        let mut count = 0;

        for chunk in self.chunks.iter_mut() {
            if count >= max_updates {
                break;
            }
            if !chunk.modified {
                continue;
            }

            builder.rebuild(ChunkView {
                world,
                chunk: &*chunk,
            });
            chunk.modified = false;
            count += 1;
        }

        count
    }

    /// Hands every chunk to the builder regardless of its flag, and clears all flags.
    pub fn rebuild_all<B>(&mut self, builder: &mut B)
    where
        B: MeshBuilder + ?Sized,
    {
        for chunk in self.chunks.iter_mut() {
            chunk.modified = true;
        }
        let total = self.chunks.len();
        self.rebuild_modified(total, builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingBuilder {
        rebuilt: Vec<Bounds<i64>>,
        halo_reads: Vec<Block>,
    }

    impl MeshBuilder for RecordingBuilder {
        fn rebuild(&mut self, view: ChunkView<'_>) {
            assert!(view.is_modified());
            assert_eq!(view.iter_voxels().count(), 16 * 16 * 16);
            self.halo_reads
                .push(view.get_safe(view.bounds().origin() - Vector3::new(1, 0, 0)));
            self.rebuilt.push(view.bounds());
        }
    }

    fn accessor(x: i64, y: i64, z: i64) -> ChunkAccessor {
        let mut world = VoxelWorld::new(Vector3::new(x, y, z)).unwrap();
        light::propagate_skylight(&mut world);
        ChunkAccessor::new(world)
    }

    #[test]
    fn test_chunks_tile_world() {
        let accessor = accessor(32, 48, 16);
        assert_eq!(accessor.count_chunks(), Vector3::new(2, 3, 1));
        assert_eq!(accessor.chunks().len(), 6);

        let total: i64 = accessor.chunks().iter().map(|c| c.bounds().volume()).sum();
        assert_eq!(total, accessor.world().bounds().volume());

        for (i, a) in accessor.chunks().iter().enumerate() {
            assert!(accessor.world().bounds().contains_bounds(a.bounds()));
            for b in &accessor.chunks()[i + 1..] {
                assert!(a.bounds().intersection(b.bounds()).is_none());
            }
        }

        for (p, _) in accessor.world().iter_voxels() {
            let index = accessor.chunk_index(p).unwrap();
            assert!(accessor.chunks()[index].bounds().contains_point(p));
        }
    }

    #[test]
    fn test_write_marks_chunk() {
        let mut accessor = accessor(32, 32, 32);
        assert_eq!(accessor.modified_count(), 0);

        // A transparent block leaves skylight untouched, so only the owning chunk is marked.
        assert!(accessor.set_safe(Point3::new(17, 3, 2), Block::Glass));
        let index = accessor.chunk_index(Point3::new(17, 3, 2)).unwrap();
        assert!(accessor.chunks()[index].is_modified());
        assert_eq!(accessor.modified_count(), 1);

        // Repeated writes into the same chunk keep a single flag set.
        assert!(accessor.set_safe(Point3::new(18, 4, 3), Block::Glass));
        assert!(accessor.set_safe(Point3::new(17, 3, 2), Block::Glass));
        assert_eq!(accessor.modified_count(), 1);

        assert!(!accessor.set_safe(Point3::new(32, 0, 0), Block::Stone));
        assert_eq!(accessor.modified_count(), 1);
    }

    #[test]
    fn test_border_write_marks_neighbor_chunk() {
        let mut accessor = accessor(32, 16, 32);

        assert!(accessor.set_safe(Point3::new(15, 3, 4), Block::Glass));
        assert_eq!(accessor.modified_count(), 2);
        let across = accessor.chunk_index(Point3::new(16, 3, 4)).unwrap();
        assert!(accessor.chunks()[across].is_modified());

        let mut builder = RecordingBuilder::default();
        accessor.rebuild_modified(16, &mut builder);

        // A voxel on a chunk edge touches two other chunks; the world edge adds none.
        assert!(accessor.set_safe(Point3::new(16, 0, 16), Block::Glass));
        assert_eq!(accessor.modified_count(), 3);
    }

    #[test]
    fn test_write_marks_shadowed_chunks() {
        let mut accessor = accessor(16, 48, 16);

        assert!(accessor.set_safe(Point3::new(4, 2, 4), Block::Stone));
        assert_eq!(accessor.modified_count(), 3);
        assert_eq!(accessor.world().skylight(Point3::new(4, 40, 4)), 0);

        let mut builder = RecordingBuilder::default();
        assert_eq!(accessor.rebuild_modified(16, &mut builder), 3);

        // Writing the same block again changes no light and marks only the owning chunk.
        assert!(accessor.set_safe(Point3::new(4, 2, 4), Block::Stone));
        assert_eq!(accessor.modified_count(), 1);
    }

    #[test]
    fn test_conditional_writes() {
        let mut accessor = accessor(16, 16, 16);
        let p = Point3::new(1, 1, 1);

        assert!(!accessor.set_safe_if_not_air(p, Block::Dirt));
        assert_eq!(accessor.modified_count(), 0);

        assert!(accessor.set_safe_if_air(p, Block::Dirt));
        assert!(!accessor.set_safe_if_air(p, Block::Stone));
        assert_eq!(accessor.get_safe(p), Block::Dirt);
        assert_eq!(accessor.modified_count(), 1);
    }

    #[test]
    fn test_rebuild_is_throttled() {
        let mut accessor = accessor(64, 16, 64);
        for x in 0..4 {
            for z in 0..4 {
                accessor.set_safe(Point3::new(x * 16 + 1, 15, z * 16 + 1), Block::Glass);
            }
        }
        assert_eq!(accessor.modified_count(), 16);

        let mut builder = RecordingBuilder::default();
        assert_eq!(accessor.rebuild_modified(5, &mut builder), 5);
        assert_eq!(accessor.modified_count(), 11);
        assert_eq!(builder.rebuilt[0].origin(), Point3::new(0, 0, 0));
        assert_eq!(builder.rebuilt[1].origin(), Point3::new(0, 0, 16));
        assert_eq!(builder.halo_reads[0], Block::Null);
        assert_eq!(builder.halo_reads[4], Block::Air);

        assert_eq!(accessor.rebuild_modified(16, &mut builder), 11);
        assert_eq!(accessor.rebuild_modified(16, &mut builder), 0);
        assert_eq!(builder.rebuilt.len(), 16);
    }

    #[test]
    fn test_rebuild_all() {
        let mut accessor = accessor(32, 16, 16);
        let mut builder = RecordingBuilder::default();
        accessor.rebuild_all(&mut builder);
        assert_eq!(builder.rebuilt.len(), 2);
        assert_eq!(accessor.modified_count(), 0);
    }
}
