//! Block placement and removal by an agent, and the ray cast that picks the targeted cell.

use cgmath::{Point3, Vector3};
use log::debug;
use serde::{Deserialize, Serialize};

use voxsim_util::{Bounds, Ray};
use voxsim_voxels::{Block, ChunkAccessor, VoxelWorld};

use crate::physics::{block_shape, cell_hitbox};

/// How far from the eye an agent can reach.
pub const REACH: f32 = 8.0;
const RAY_STEP: f32 = 0.001;

const UP: Vector3<i64> = Vector3 { x: 0, y: -1, z: 0 };
const DOWN: Vector3<i64> = Vector3 { x: 0, y: 1, z: 0 };

/// The first cell a ray ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayHit {
    pub cell: Point3<i64>,
    /// The cell the ray passed through just before `cell`. New blocks go here.
    pub previous: Point3<i64>,
    pub block: Block,
}

fn containing_cell(p: Point3<f32>) -> Point3<i64> {
    Point3::new(p.x.floor() as i64, p.y.floor() as i64, p.z.floor() as i64)
}

/// Marches along the ray until it meets a block that stops rays. Rays pass over the empty upper
/// half of a slab.
pub fn cast_ray(world: &VoxelWorld, ray: &Ray<f32>, reach: f32) -> Option<RayHit> {
    let ray = ray.normalized()?;
    let mut previous = containing_cell(ray.origin);

    for point in ray.march(RAY_STEP, reach) {
        let cell = containing_cell(point);
        let block = world.get_safe(cell);

        let in_empty_half = block.is_slab() && point.y - (cell.y as f32) < 0.5;
        if block.is_not_permeable_ray() && !in_empty_half {
            return Some(RayHit {
                cell,
                previous,
                block,
            });
        }
        previous = cell;
    }

    None
}

fn supports(block: Block, below: Block) -> bool {
    use Block::*;
    match block {
        Dandelion | Rose | OakSapling | BirchSapling => matches!(below, Grass | Dirt),
        Reeds => matches!(below, Sand | Reeds),
        _ if block.is_crop() => matches!(below, DryFarmland | WetFarmland),
        Fire => below.is_fire_supporting(),
        _ => true,
    }
}

/// Places `block` against the hit cell, keeping it out of the agent's hitbox. Returns where the
/// block went and what was written there, which differs from `block` when two slabs merge.
pub fn place_block(
    accessor: &mut ChunkAccessor,
    hit: &RayHit,
    block: Block,
    agent: Bounds<f32>,
) -> Option<(Point3<i64>, Block)> {
    if matches!(block, Block::Air | Block::Null) {
        return None;
    }

    if block.is_slab() && hit.block == block {
        let double = block.slab_to_double_slab()?;
        if agent.overlaps(cell_hitbox(hit.cell)) {
            return None;
        }
        accessor.set_safe(hit.cell, double);
        debug!("Merged {} at {:?}", double, hit.cell);
        return Some((hit.cell, double));
    }

    let target = hit.previous;
    let current = accessor.get_safe(target);
    if current == Block::Null || current.is_not_permeable_ray() {
        return None;
    }

    let fragile = block.is_slab() || block.is_crop() || block.is_cross() || block.is_fire();
    if current == Block::Water && fragile {
        return None;
    }

    if agent.overlaps(block_shape(target, block)) {
        return None;
    }

    let below_pos = target + DOWN;
    let below = accessor.get_safe(below_pos);
    if !supports(block, below) {
        return None;
    }

    accessor.set_safe(target, block);
    if matches!(below, Block::DryFarmland | Block::WetFarmland) && !block.is_crop() {
        accessor.set_safe(below_pos, Block::Dirt);
    }

    debug!("Placed {} at {:?}", block, target);
    Some((target, block))
}

/// Removes the block at `p`, letting neighbouring water flow in and taking anything that stood on
/// it along. Returns the removed block.
pub fn remove_block(accessor: &mut ChunkAccessor, p: Point3<i64>) -> Option<Block> {
    let removed = accessor.get_safe(p);
    if !removed.is_not_permeable_ray() {
        return None;
    }

    let wet = [
        Vector3::new(1, 0, 0),
        Vector3::new(-1, 0, 0),
        Vector3::new(0, 0, 1),
        Vector3::new(0, 0, -1),
        UP,
    ]
    .iter()
    .any(|&offset| accessor.get_safe(p + offset) == Block::Water);

    accessor.set_safe(p, if wet { Block::Water } else { Block::Air });

    let mut above = p + UP;
    let on_top = accessor.get_safe(above);
    if on_top.is_plant() {
        accessor.set_safe(above, Block::Air);
    } else {
        while accessor.get_safe(above) == Block::Reeds {
            accessor.set_safe(above, Block::Air);
            above += UP;
        }
    }

    debug!("Removed {} at {:?}", removed, p);
    Some(removed)
}
