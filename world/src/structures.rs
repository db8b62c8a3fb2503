//! Fixed-shape multi-block structures: trees and huge mushrooms.
//!
//! Every stamp is anchored at a ground cell and grows upwards from the cell above it (towards
//! smaller y). Structure cells are only ever written into air.

use cgmath::Point3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use voxsim_util::Bounds;
use voxsim_voxels::{Block, ChunkAccessor, VoxelWorld};

use crate::physics::cell_hitbox;

/// Destination for structure blocks.
pub trait StructureWriter {
    fn in_bounds(&self, p: Point3<i64>) -> bool;

    /// Writes the block if the cell currently holds air.
    fn set_if_air(&mut self, p: Point3<i64>, block: Block);
}

impl StructureWriter for VoxelWorld {
    fn in_bounds(&self, p: Point3<i64>) -> bool {
        VoxelWorld::in_bounds(self, p)
    }

    fn set_if_air(&mut self, p: Point3<i64>, block: Block) {
        self.set_safe_if_air(p, block);
    }
}

/// Writes through a chunk accessor while keeping clear of an agent's hitbox.
pub struct AvoidingWriter<'a> {
    pub accessor: &'a mut ChunkAccessor,
    pub avoid: Bounds<f32>,
}

impl<'a> StructureWriter for AvoidingWriter<'a> {
    fn in_bounds(&self, p: Point3<i64>) -> bool {
        self.accessor.world().in_bounds(p)
    }

    fn set_if_air(&mut self, p: Point3<i64>, block: Block) {
        if !self.avoid.overlaps(cell_hitbox(p)) {
            self.accessor.set_safe_if_air(p, block);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeKind {
    Oak,
    Birch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeShape {
    Column,
    Rounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MushroomKind {
    Red,
    Brown,
}

impl TreeKind {
    pub fn log(self) -> Block {
        match self {
            TreeKind::Oak => Block::OakLog,
            TreeKind::Birch => Block::BirchLog,
        }
    }

    pub fn leaves(self) -> Block {
        match self {
            TreeKind::Oak => Block::OakLeaves,
            TreeKind::Birch => Block::BirchLeaves,
        }
    }
}

impl TreeShape {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            TreeShape::Column
        } else {
            TreeShape::Rounded
        }
    }

    pub fn trunk_height(self) -> i64 {
        match self {
            TreeShape::Column => 5,
            TreeShape::Rounded => 6,
        }
    }

    /// Cells needed above the ground cell.
    pub fn clearance(self) -> i64 {
        self.trunk_height() + 1
    }
}

fn square(radius: i64) -> impl Iterator<Item = (i64, i64)> {
    (-radius..=radius).flat_map(move |dx| (-radius..=radius).map(move |dz| (dx, dz)))
}

/// Plants a tree on the given ground cell. Returns false, writing nothing, if the crown would
/// poke out of the top of the world.
pub fn place_tree<W>(writer: &mut W, ground: Point3<i64>, kind: TreeKind, shape: TreeShape) -> bool
where
    W: StructureWriter + ?Sized,
{
    let Point3 { x, y, z } = ground;
    let trunk = shape.trunk_height();
    let top = y - shape.clearance();

    if !writer.in_bounds(Point3::new(x, top, z)) {
        return false;
    }

    let log = kind.log();
    let leaves = kind.leaves();

    for dy in 1..=trunk {
        writer.set_if_air(Point3::new(x, y - dy, z), log);
    }

    for &(dx, dz) in &[(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
        writer.set_if_air(Point3::new(x + dx, top, z + dz), leaves);
    }

    for (dx, dz) in square(1).filter(|&d| d != (0, 0)) {
        writer.set_if_air(Point3::new(x + dx, top + 1, z + dz), leaves);
    }

    for (dx, dz) in square(2).filter(|&d| d != (0, 0)) {
        writer.set_if_air(Point3::new(x + dx, top + 2, z + dz), leaves);
        writer.set_if_air(Point3::new(x + dx, top + 3, z + dz), leaves);
    }

    if shape == TreeShape::Rounded {
        let rim = square(2).filter(|&(dx, dz)| (dx, dz) != (0, 0) && (dx.abs(), dz.abs()) != (2, 2));
        for (dx, dz) in rim {
            writer.set_if_air(Point3::new(x + dx, top + 4, z + dz), leaves);
        }
    }

    true
}

/// Plants a huge mushroom on the given ground cell. Returns false, writing nothing, if the cap
/// would poke out of the top of the world.
pub fn place_huge_mushroom<W>(writer: &mut W, ground: Point3<i64>, kind: MushroomKind) -> bool
where
    W: StructureWriter + ?Sized,
{
    let Point3 { x, y, z } = ground;
    if !writer.in_bounds(Point3::new(x, y - 6, z)) {
        return false;
    }

    for dy in 1..=5 {
        writer.set_if_air(Point3::new(x, y - dy, z), Block::MushroomStem);
    }

    match kind {
        MushroomKind::Red => {
            let cap = Block::RedMushroomBlock;
            for (j, k) in square(1) {
                writer.set_if_air(Point3::new(x + j, y - 6, z + k), cap);
                writer.set_if_air(Point3::new(x - 2, y - 4 + j, z + k), cap);
                writer.set_if_air(Point3::new(x + 2, y - 4 + j, z + k), cap);
                writer.set_if_air(Point3::new(x + k, y - 4 + j, z - 2), cap);
                writer.set_if_air(Point3::new(x + k, y - 4 + j, z + 2), cap);
            }
        }
        MushroomKind::Brown => {
            for (j, k) in square(3).filter(|&(j, k)| (j.abs(), k.abs()) != (3, 3)) {
                writer.set_if_air(Point3::new(x + j, y - 6, z + k), Block::BrownMushroomBlock);
            }
        }
    }

    true
}
