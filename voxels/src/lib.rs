//! Types used to represent the voxel-based world.
//!
pub mod accessor;
pub mod block;
pub mod index_utils;
pub mod light;
mod voxel_world;

pub use crate::{
    accessor::{Chunk, ChunkAccessor, ChunkView, MeshBuilder},
    block::{Block, BlockFlags, BlockInfo, BlockTexture, FaceTextures},
    light::{propagate_skylight, relight_column, MAX_SKYLIGHT},
    voxel_world::{VoxelWorld, VoxelWorldSummary},
};
