use std::convert::TryFrom;
use std::io::{self, Read, Write};

use anyhow::{anyhow, bail, Result};
use byteorder::{ReadBytesExt, WriteBytesExt};
use cgmath::{Point3, Vector3};
use serde::Serialize;

use voxsim_util::Bounds;

use crate::{block::Block, index_utils};

/// A fixed-size dense grid of blocks, plus the skylight arriving at each cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelWorld {
    size: Vector3<i64>,
    voxels: Vec<Block>,
    skylight: Vec<u8>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct VoxelWorldSummary {
    pub count_total: usize,
    pub count_nonempty: usize,
    pub count_chunks: usize,
    pub pct_nonempty: f64,
    pub byte_size: usize,
    pub mb_size: usize,
    pub bounds: Bounds<i64>,
}

impl VoxelWorld {
    /// Constructs a world filled with air. Every extent must be a positive multiple of the chunk
    /// size.
    pub fn new(size: Vector3<i64>) -> Result<VoxelWorld> {
        let chunk_size = index_utils::chunk_size();
        for (extent, chunk_extent) in [size.x, size.y, size.z]
            .iter()
            .zip([chunk_size.x, chunk_size.y, chunk_size.z].iter())
        {
            if *extent <= 0 || extent % chunk_extent != 0 {
                bail!(
                    "world size {:?} is not a positive multiple of the chunk size {:?}",
                    size,
                    chunk_size
                );
            }
        }

        let count = size
            .x
            .checked_mul(size.y)
            .and_then(|xy| xy.checked_mul(size.z))
            .and_then(|count| usize::try_from(count).ok())
            .ok_or_else(|| anyhow!("world size {:?} has too many voxels", size))?;
        Ok(VoxelWorld {
            size,
            voxels: vec![Block::Air; count],
            skylight: vec![0; count],
        })
    }

    #[inline]
    pub fn size(&self) -> Vector3<i64> {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> Bounds<i64> {
        Bounds::from_size(self.size)
    }

    #[inline]
    pub fn in_bounds(&self, p: Point3<i64>) -> bool {
        index_utils::point_within_size(p, self.size)
    }

    #[inline]
    fn index(&self, p: Point3<i64>) -> usize {
        assert!(
            self.in_bounds(p),
            "voxel {:?} is outside a world of size {:?}",
            p,
            self.size
        );
        index_utils::pack_xyz(self.size, p)
    }

    /// Reads a voxel that is known to be in bounds. Panics otherwise.
    #[inline]
    pub fn get(&self, p: Point3<i64>) -> Block {
        self.voxels[self.index(p)]
    }

    /// Reads a voxel, returning `Block::Null` for points outside the world.
    #[inline]
    pub fn get_safe(&self, p: Point3<i64>) -> Block {
        if self.in_bounds(p) {
            self.voxels[index_utils::pack_xyz(self.size, p)]
        } else {
            Block::Null
        }
    }

    /// Writes a voxel that is known to be in bounds. Panics otherwise.
    #[inline]
    pub fn set(&mut self, p: Point3<i64>, block: Block) {
        let index = self.index(p);
        self.voxels[index] = block;
    }

    /// Writes a voxel. Returns false, and does nothing, for points outside the world.
    #[inline]
    pub fn set_safe(&mut self, p: Point3<i64>, block: Block) -> bool {
        if self.in_bounds(p) {
            self.set(p, block);
            true
        } else {
            false
        }
    }

    /// Writes a voxel only if it currently holds air.
    #[inline]
    pub fn set_safe_if_air(&mut self, p: Point3<i64>, block: Block) -> bool {
        self.get_safe(p) == Block::Air && self.set_safe(p, block)
    }

    /// Writes a voxel only if it is in bounds and does not hold air.
    #[inline]
    pub fn set_safe_if_not_air(&mut self, p: Point3<i64>, block: Block) -> bool {
        match self.get_safe(p) {
            Block::Air | Block::Null => false,
            _ => self.set_safe(p, block),
        }
    }

    #[inline]
    pub fn skylight(&self, p: Point3<i64>) -> u8 {
        self.skylight[self.index(p)]
    }

    /// Skylight at a point, or zero outside the world.
    #[inline]
    pub fn skylight_safe(&self, p: Point3<i64>) -> u8 {
        if self.in_bounds(p) {
            self.skylight[index_utils::pack_xyz(self.size, p)]
        } else {
            0
        }
    }

    #[inline]
    pub(crate) fn set_skylight(&mut self, p: Point3<i64>, light: u8) {
        let index = self.index(p);
        self.skylight[index] = light;
    }

    /// The y coordinate of the first non-air voxel in the column, scanning down from the sky.
    pub fn first_non_air(&self, x: i64, z: i64) -> Option<i64> {
        (0..self.size.y).find(|&y| self.get_safe(Point3::new(x, y, z)) != Block::Air)
    }

    /// Visits every voxel in the world exactly once, in storage order.
    #[inline]
    pub fn iter_voxels(&self) -> impl Iterator<Item = (Point3<i64>, Block)> + '_ {
        let size = self.size;
        self.voxels
            .iter()
            .enumerate()
            .map(move |(index, block)| (index_utils::unpack_xyz(size, index), *block))
    }

    /// Number of voxels holding each block type, in registry order, omitting types that do not
    /// occur.
    pub fn block_counts(&self) -> Vec<(Block, usize)> {
        let mut counts = vec![0usize; Block::ALL.len()];
        for block in &self.voxels {
            counts[*block as usize] += 1;
        }

        Block::ALL
            .iter()
            .copied()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Serialize the voxels in the world, one byte per voxel in storage order. Returns the number
    /// of bytes written.
    pub fn serialize_voxels<W>(&self, target: &mut W) -> io::Result<i64>
    where
        W: Write,
    {
        let mut bytes_written = 0;
        for voxel in &self.voxels {
            target.write_u8(voxel.to_u8())?;
            bytes_written += 1;
        }
        Ok(bytes_written)
    }

    /// Deserialize the world voxels from the given reader. The reader must hold exactly as many
    /// voxels as the world's size requires. Skylight is not part of the stream and must be
    /// recomputed afterwards.
    pub fn deserialize_voxels<R: Read>(&mut self, src: &mut R) -> Result<()> {
        let mut raw = vec![0u8; self.voxels.len()];
        src.read_exact(&mut raw)
            .map_err(|err| anyhow!("voxel data is shorter than the world size: {}", err))?;

        match src.read_u8() {
            Ok(_) => bail!("voxel data is longer than the world size {:?}", self.size),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {}
            Err(err) => return Err(err.into()),
        }

        let size = self.size;
        self.voxels = raw
            .into_iter()
            .enumerate()
            .map(|(index, byte)| {
                Block::from_u8(byte).ok_or_else(|| {
                    anyhow!(
                        "unknown block id {} at {:?}",
                        byte,
                        index_utils::unpack_xyz(size, index)
                    )
                })
            })
            .collect::<Result<Vec<Block>>>()?;

        Ok(())
    }

    pub fn debug_summary(&self) -> VoxelWorldSummary {
        let count_total = self.voxels.len();
        let count_nonempty = self.voxels.iter().filter(|v| !v.is_air()).count();

        let pct_nonempty = (count_nonempty as f64 / count_total as f64) * 100.0;
        let byte_size = (std::mem::size_of::<Block>() + std::mem::size_of::<u8>()) * count_total;
        let mb_size = byte_size / (1024 * 1024);

        VoxelWorldSummary {
            count_total,
            count_nonempty,
            count_chunks: (count_total as i64 / index_utils::chunk_size_total()) as usize,
            pct_nonempty,
            byte_size,
            mb_size,
            bounds: self.bounds(),
        }
    }

    /// Every (x, z) column position, x varying slowest.
    pub fn iter_columns(&self) -> impl Iterator<Item = (i64, i64)> {
        let size = self.size;
        (0..size.x).flat_map(move |x| (0..size.z).map(move |z| (x, z)))
    }
}
