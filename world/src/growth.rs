//! Crops and saplings that change over time.

use cgmath::Point3;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use voxsim_util::Bounds;
use voxsim_voxels::{Block, ChunkAccessor};

use crate::{
    settings::{SimulationSettings, TimerRange},
    structures::{self, AvoidingWriter, TreeKind, TreeShape},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantKind {
    Wheat,
    Carrots,
    Potatoes,
    Beetroots,
    OakSapling,
    BirchSapling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowingPlant {
    pub position: Point3<i64>,
    /// The block the plant should currently be. Anything else at `position` means the plant was
    /// disturbed.
    pub expected: Block,
    pub kind: PlantKind,
    pub timer: u32,
    pub done: bool,
}

impl PlantKind {
    /// The kind of plant that starts growing when `block` is placed, if any.
    pub fn from_planted(block: Block) -> Option<Self> {
        Some(match block {
            Block::Wheat0 => PlantKind::Wheat,
            Block::Carrots0 => PlantKind::Carrots,
            Block::Potatoes0 => PlantKind::Potatoes,
            Block::Beetroots0 => PlantKind::Beetroots,
            Block::OakSapling => PlantKind::OakSapling,
            Block::BirchSapling => PlantKind::BirchSapling,
            _ => return None,
        })
    }

    pub fn first_stage(self) -> Block {
        match self {
            PlantKind::Wheat => Block::Wheat0,
            PlantKind::Carrots => Block::Carrots0,
            PlantKind::Potatoes => Block::Potatoes0,
            PlantKind::Beetroots => Block::Beetroots0,
            PlantKind::OakSapling => Block::OakSapling,
            PlantKind::BirchSapling => Block::BirchSapling,
        }
    }

    pub fn final_stage(self) -> Option<Block> {
        match self {
            PlantKind::Wheat => Some(Block::Wheat7),
            PlantKind::Carrots => Some(Block::Carrots3),
            PlantKind::Potatoes => Some(Block::Potatoes3),
            PlantKind::Beetroots => Some(Block::Beetroots3),
            PlantKind::OakSapling | PlantKind::BirchSapling => None,
        }
    }

    pub fn interval(self, settings: &SimulationSettings) -> TimerRange {
        match self {
            PlantKind::Wheat => settings.growth_8,
            PlantKind::Carrots | PlantKind::Potatoes | PlantKind::Beetroots => settings.growth_4,
            PlantKind::OakSapling | PlantKind::BirchSapling => settings.growth_tree,
        }
    }

    fn tree_kind(self) -> Option<TreeKind> {
        match self {
            PlantKind::OakSapling => Some(TreeKind::Oak),
            PlantKind::BirchSapling => Some(TreeKind::Birch),
            _ => None,
        }
    }
}

impl GrowingPlant {
    pub fn new<R: Rng>(
        position: Point3<i64>,
        kind: PlantKind,
        settings: &SimulationSettings,
        rng: &mut R,
    ) -> Self {
        GrowingPlant {
            position,
            expected: kind.first_stage(),
            kind,
            timer: kind.interval(settings).sample(rng),
            done: false,
        }
    }

    /// Advances the plant by one tick. Structures grown from saplings are kept out of `agent`.
    pub fn update<R: Rng>(
        &mut self,
        accessor: &mut ChunkAccessor,
        agent: Bounds<f32>,
        settings: &SimulationSettings,
        rng: &mut R,
    ) {
        if self.done {
            return;
        }
        if self.timer > 0 {
            self.timer -= 1;
            return;
        }

        if accessor.get_safe(self.position) != self.expected {
            debug!("Plant at {:?} was disturbed", self.position);
            self.done = true;
            return;
        }

        match self.kind.tree_kind() {
            Some(tree) => {
                accessor.set_safe(self.position, Block::Air);
                self.position.y += 1;

                let shape = TreeShape::random(rng);
                let mut writer = AvoidingWriter {
                    accessor,
                    avoid: agent,
                };
                let grown = structures::place_tree(&mut writer, self.position, tree, shape);
                debug!(
                    "Sapling at {:?} grew into {:?} tree: {}",
                    self.position, shape, grown
                );
                self.done = true;
            }
            None => match self.expected.next_growth_stage() {
                Some(next) => {
                    accessor.set_safe(self.position, next);
                    self.expected = next;
                    if Some(next) != self.kind.final_stage() {
                        self.timer = self.kind.interval(settings).sample(rng);
                    }
                }
                None => self.done = true,
            },
        }
    }
}

/// Runs one growth tick over every plant and drops the ones that are done, keeping the order of
/// the rest.
pub fn update_plants<R: Rng>(
    plants: &mut Vec<GrowingPlant>,
    accessor: &mut ChunkAccessor,
    agent: Bounds<f32>,
    settings: &SimulationSettings,
    rng: &mut R,
) {
    for plant in plants.iter_mut() {
        plant.update(accessor, agent, settings, rng);
    }
    plants.retain(|plant| !plant.done);
}
