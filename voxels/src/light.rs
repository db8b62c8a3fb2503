//! Column skylight.
//!
//! Light enters each column at the top of the world with strength `MAX_SKYLIGHT` and travels
//! straight down. Each cell records the light that arrives at it. Transparent blocks pass the
//! light on, minus their attenuation. Opaque blocks keep the arriving light but pass none on.

use std::ops::Range;

use cgmath::Point3;

use crate::voxel_world::VoxelWorld;

pub const MAX_SKYLIGHT: u8 = 15;

/// Recomputes skylight for every column of the world.
pub fn propagate_skylight(world: &mut VoxelWorld) {
    let size = world.size();
    for x in 0..size.x {
        for z in 0..size.z {
            relight_column(world, x, z);
        }
    }
}

/// Recomputes skylight for one column. Returns the range of y coordinates whose value changed,
/// or `None` if the column is unchanged or outside the world.
pub fn relight_column(world: &mut VoxelWorld, x: i64, z: i64) -> Option<Range<i64>> {
    if !world.in_bounds(Point3::new(x, 0, z)) {
        return None;
    }

    let mut changed: Option<Range<i64>> = None;
    let mut light = MAX_SKYLIGHT;

    for y in 0..world.size().y {
        let p = Point3::new(x, y, z);

        if world.skylight(p) != light {
            world.set_skylight(p, light);
            changed = Some(match changed {
                Some(range) => range.start..y + 1,
                None => y..y + 1,
            });
        }

        light = match world.get(p).light_attenuation() {
            Some(attenuation) => light.saturating_sub(attenuation),
            None => 0,
        };
    }

    changed
}
