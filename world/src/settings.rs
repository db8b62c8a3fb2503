use rand::Rng;
use serde::{Deserialize, Serialize};

/// A tick count drawn uniformly from `base..base + spread`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRange {
    pub base: u32,
    pub spread: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Growth interval of crops with eight stages.
    pub growth_8: TimerRange,
    /// Growth interval of crops with four stages.
    pub growth_4: TimerRange,
    /// Time before a sapling turns into a tree.
    pub growth_tree: TimerRange,
    /// Lifetime of a fire.
    pub fire_timer: TimerRange,
    /// A burning fire tries to spread to each horizontal neighbour with probability
    /// `1 / fire_spread_chance` per tick.
    pub fire_spread_chance: u32,
    /// Maximum number of chunks handed to the mesh builder per tick.
    pub max_chunk_updates: usize,
}

impl TimerRange {
    pub const fn new(base: u32, spread: u32) -> Self {
        TimerRange { base, spread }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        if self.spread == 0 {
            self.base
        } else {
            self.base.saturating_add(rng.gen_range(0, self.spread))
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            growth_8: TimerRange::new(512, 512),
            growth_4: TimerRange::new(1024, 1024),
            growth_tree: TimerRange::new(2048, 2048),
            fire_timer: TimerRange::new(256, 256),
            fire_spread_chance: 2048,
            max_chunk_updates: 16,
        }
    }
}
