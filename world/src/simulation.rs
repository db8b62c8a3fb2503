use cgmath::Vector3;
use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use voxsim_util::{Bounds, Ray};
use voxsim_voxels::{Block, ChunkAccessor, MeshBuilder, VoxelWorld};

use crate::{
    fire::{self, BurningFire},
    growth::{self, GrowingPlant, PlantKind},
    interact::{self, RayHit},
    physics::Agent,
    settings::SimulationSettings,
};

/// Owns a world and everything that changes it over time. All writes go through the chunk
/// accessor so that chunks touched by growth, fire or the agent are rebuilt.
pub struct Simulation {
    accessor: ChunkAccessor,
    plants: Vec<GrowingPlant>,
    fires: Vec<BurningFire>,
    rng: StdRng,
    settings: SimulationSettings,
    ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub plants: usize,
    pub fires: usize,
    pub modified_chunks: usize,
}

impl Simulation {
    pub fn new(world: VoxelWorld, settings: SimulationSettings, seed: u64) -> Self {
        Simulation {
            accessor: ChunkAccessor::new(world),
            plants: Vec::new(),
            fires: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            settings,
            ticks: 0,
        }
    }

    pub fn world(&self) -> &VoxelWorld {
        self.accessor.world()
    }

    pub fn accessor(&self) -> &ChunkAccessor {
        &self.accessor
    }

    pub fn into_world(self) -> VoxelWorld {
        self.accessor.into_world()
    }

    pub fn plants(&self) -> &[GrowingPlant] {
        &self.plants
    }

    pub fn fires(&self) -> &[BurningFire] {
        &self.fires
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            ticks: self.ticks,
            plants: self.plants.len(),
            fires: self.fires.len(),
            modified_chunks: self.accessor.modified_count(),
        }
    }

    /// Moves the world forward by one tick, then hands a bounded number of modified chunks to
    /// the mesher. Returns how many chunks were rebuilt.
    pub fn tick<B>(&mut self, agent: Bounds<f32>, mesher: &mut B) -> usize
    where
        B: MeshBuilder + ?Sized,
    {
        growth::update_plants(
            &mut self.plants,
            &mut self.accessor,
            agent,
            &self.settings,
            &mut self.rng,
        );
        fire::update_fires(
            &mut self.fires,
            &mut self.accessor,
            &self.settings,
            &mut self.rng,
        );
        self.ticks += 1;

        self.accessor
            .rebuild_modified(self.settings.max_chunk_updates, mesher)
    }

    /// Hands every chunk to the mesher, e.g. right after loading.
    pub fn rebuild_all<B>(&mut self, mesher: &mut B)
    where
        B: MeshBuilder + ?Sized,
    {
        self.accessor.rebuild_all(mesher);
    }

    /// The cell the agent is looking at, if it is within reach.
    pub fn target(&self, agent: &Agent, facing: Vector3<f32>) -> Option<RayHit> {
        let ray = Ray {
            origin: agent.eye(),
            dir: facing,
        };
        interact::cast_ray(self.world(), &ray, interact::REACH)
    }

    /// Places a block against the hit cell. Seeds and saplings start growing and fire starts
    /// burning. Returns false if the placement was not allowed.
    pub fn place_block(&mut self, hit: &RayHit, block: Block, agent: Bounds<f32>) -> bool {
        let (position, placed) = match interact::place_block(&mut self.accessor, hit, block, agent)
        {
            Some(placed) => placed,
            None => return false,
        };

        if let Some(kind) = PlantKind::from_planted(placed) {
            debug!("Planted {:?} at {:?}", kind, position);
            self.plants.push(GrowingPlant::new(
                position,
                kind,
                &self.settings,
                &mut self.rng,
            ));
        } else if placed == Block::Fire {
            debug!("Lit fire at {:?}", position);
            self.fires
                .push(BurningFire::new(position, &self.settings, &mut self.rng));
        }

        true
    }

    pub fn remove_block(&mut self, hit: &RayHit) -> Option<Block> {
        interact::remove_block(&mut self.accessor, hit.cell)
    }
}
