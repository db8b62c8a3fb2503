//! Runs the simulation without a renderer.

use std::time::Instant;

use anyhow::{anyhow, Result};
use cgmath::{Point3, Vector3};
use log::{debug, info, warn};

use voxsim_voxels::{Block, ChunkView, MeshBuilder};
use voxsim_world::{Agent, AgentInput, Simulation, SimulationSummary};

use crate::{
    files::SavedWorld,
    settings::{ScriptedAction, Settings},
};

const FACE_OFFSETS: [Vector3<i64>; 6] = [
    Vector3 { x: 1, y: 0, z: 0 },
    Vector3 { x: -1, y: 0, z: 0 },
    Vector3 { x: 0, y: 1, z: 0 },
    Vector3 { x: 0, y: -1, z: 0 },
    Vector3 { x: 0, y: 0, z: 1 },
    Vector3 { x: 0, y: 0, z: -1 },
];

/// Stands in for a mesh builder: counts rebuilds and the faces a mesh would have drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStats {
    pub rebuilds: usize,
    pub visible_faces: usize,
}

impl MeshBuilder for ChunkStats {
    fn rebuild(&mut self, view: ChunkView<'_>) {
        self.rebuilds += 1;
        for (p, block) in view.iter_voxels() {
            if block.is_air() {
                continue;
            }
            self.visible_faces += FACE_OFFSETS
                .iter()
                .filter(|&&offset| {
                    let neighbour = view.get_safe(p + offset);
                    neighbour != block && neighbour.light_attenuation().is_some()
                })
                .count();
        }
    }
}

enum Action {
    Place(Block, Vector3<f32>),
    Remove(Vector3<f32>),
}

pub struct RunOutcome {
    pub saved: SavedWorld,
    pub summary: SimulationSummary,
    pub stats: ChunkStats,
}

fn resolve_actions(actions: &[ScriptedAction]) -> Result<Vec<(u64, Action)>> {
    actions
        .iter()
        .map(|action| {
            let resolved = match action {
                ScriptedAction::Place { block, facing, .. } => {
                    let block = Block::by_name(block)
                        .ok_or_else(|| anyhow!("Unknown block name {:?}", block))?;
                    Action::Place(block, *facing)
                }
                ScriptedAction::Remove { facing, .. } => Action::Remove(*facing),
            };
            Ok((action.tick(), resolved))
        })
        .collect()
}

fn apply(sim: &mut Simulation, agent: &Agent, action: &Action) {
    let facing = match action {
        Action::Place(_, facing) | Action::Remove(facing) => *facing,
    };
    let hit = match sim.target(agent, facing) {
        Some(hit) => hit,
        None => {
            warn!("Nothing within reach along {:?}", facing);
            return;
        }
    };

    match action {
        Action::Place(block, _) => {
            if !sim.place_block(&hit, *block, agent.hitbox) {
                warn!("Could not place {} next to {:?}", block, hit.cell);
            }
        }
        Action::Remove(_) => match sim.remove_block(&hit) {
            Some(removed) => debug!("Removed {} at {:?}", removed, hit.cell),
            None => warn!("Could not remove anything at {:?}", hit.cell),
        },
    }
}

/// Runs the configured number of ticks with the agent walking, jumping and acting as scripted.
pub fn run_simulation(saved: SavedWorld, settings: &Settings) -> Result<RunOutcome> {
    let params = &settings.simulate;
    let actions = resolve_actions(&params.actions)?;

    let mut sim = Simulation::new(saved.world, settings.simulation.clone(), params.seed);
    let mut agent = Agent::new(saved.player_position);
    let mut stats = ChunkStats::default();
    sim.rebuild_all(&mut stats);
    info!("Initial build: {:?}", stats);

    let input = AgentInput {
        walk: params.walk,
        jump: params.jump,
    };

    for tick in 0..params.ticks {
        let ts_start = Instant::now();

        for (_, action) in actions.iter().filter(|(at, _)| *at == tick) {
            apply(&mut sim, &agent, action);
        }

        agent.step(sim.world(), &input);
        let rebuilt = sim.tick(agent.hitbox, &mut stats);

        metrics::timing!("simulate.tick", ts_start.elapsed());
        metrics::counter!("simulate.rebuilt_chunks", rebuilt as u64);

        if params.log_every > 0 && (tick + 1) % params.log_every == 0 {
            info!(
                "Tick {}: {:?}, agent at {:?}",
                tick + 1,
                sim.summary(),
                agent.position()
            );
        }
    }

    let summary = sim.summary();
    let player_position: Point3<f32> = agent.position();
    Ok(RunOutcome {
        saved: SavedWorld {
            world: sim.into_world(),
            player_position,
        },
        summary,
        stats,
    })
}
