//! Burning fires: they burn out after a while and occasionally spread sideways onto ground that
//! can hold them.

use cgmath::{Point3, Vector3};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use voxsim_voxels::{Block, ChunkAccessor};

use crate::settings::SimulationSettings;

const SPREAD_DIRECTIONS: [Vector3<i64>; 4] = [
    Vector3 { x: 1, y: 0, z: 0 },
    Vector3 { x: -1, y: 0, z: 0 },
    Vector3 { x: 0, y: 0, z: 1 },
    Vector3 { x: 0, y: 0, z: -1 },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurningFire {
    pub position: Point3<i64>,
    pub timer: u32,
    pub done: bool,
}

impl BurningFire {
    pub fn new<R: Rng>(position: Point3<i64>, settings: &SimulationSettings, rng: &mut R) -> Self {
        BurningFire {
            position,
            timer: settings.fire_timer.sample(rng),
            done: false,
        }
    }

    /// Advances the fire by one tick. Fires it ignites are pushed onto `spawned`.
    pub fn update<R: Rng>(
        &mut self,
        accessor: &mut ChunkAccessor,
        settings: &SimulationSettings,
        rng: &mut R,
        spawned: &mut Vec<BurningFire>,
    ) {
        if self.done {
            return;
        }

        if self.timer == 0 {
            if accessor.get_safe(self.position) != Block::Fire {
                self.done = true;
            } else {
                debug!("Fire at {:?} burned out", self.position);
                accessor.set_safe(self.position, Block::Air);
            }
            return;
        }

        for direction in SPREAD_DIRECTIONS.iter() {
            if !rng.gen_ratio(1, settings.fire_spread_chance.max(1)) {
                continue;
            }

            let target = self.position + *direction;
            if can_burn_at(accessor, target) {
                debug!("Fire spread from {:?} to {:?}", self.position, target);
                accessor.set_safe(target, Block::Fire);
                spawned.push(BurningFire::new(target, settings, rng));
            }
        }

        self.timer -= 1;
    }
}

/// True if a fire may be lit at the given cell: it must hold air and rest on a block that
/// supports fire.
pub fn can_burn_at(accessor: &ChunkAccessor, p: Point3<i64>) -> bool {
    let below = Point3::new(p.x, p.y + 1, p.z);
    accessor.get_safe(p) == Block::Air && accessor.get_safe(below).is_fire_supporting()
}

/// Runs one fire tick. Fires ignited during the sweep join the list only after every existing
/// fire has been updated, and fires that are done are dropped.
pub fn update_fires<R: Rng>(
    fires: &mut Vec<BurningFire>,
    accessor: &mut ChunkAccessor,
    settings: &SimulationSettings,
    rng: &mut R,
) {
    let mut spawned = Vec::new();
    for fire in fires.iter_mut() {
        fire.update(accessor, settings, rng, &mut spawned);
    }
    fires.retain(|fire| !fire.done);
    fires.append(&mut spawned);
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use voxsim_voxels::VoxelWorld;

    use super::*;
    use crate::settings::TimerRange;

    fn field() -> ChunkAccessor {
        let mut world = VoxelWorld::new(Vector3::new(16, 16, 16)).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                world.set(Point3::new(x, 10, z), Block::Grass);
            }
        }
        voxsim_voxels::propagate_skylight(&mut world);
        ChunkAccessor::new(world)
    }

    #[test]
    fn test_burns_out() {
        let mut accessor = field();
        let mut rng = StdRng::seed_from_u64(0);
        let settings = SimulationSettings {
            fire_timer: TimerRange::new(3, 0),
            fire_spread_chance: u32::MAX,
            ..SimulationSettings::default()
        };

        let p = Point3::new(5, 9, 5);
        accessor.set_safe(p, Block::Fire);
        let mut fires = vec![BurningFire::new(p, &settings, &mut rng)];

        for _ in 0..3 {
            update_fires(&mut fires, &mut accessor, &settings, &mut rng);
            assert_eq!(accessor.get_safe(p), Block::Fire);
        }

        update_fires(&mut fires, &mut accessor, &settings, &mut rng);
        assert_eq!(accessor.get_safe(p), Block::Air);
        assert_eq!(fires.len(), 1);

        update_fires(&mut fires, &mut accessor, &settings, &mut rng);
        assert!(fires.is_empty());
    }

    #[test]
    fn test_disturbed_fire_is_dropped_quietly() {
        let mut accessor = field();
        let mut rng = StdRng::seed_from_u64(0);
        let settings = SimulationSettings::default();

        let p = Point3::new(5, 9, 5);
        accessor.set_safe(p, Block::Brick);
        let mut fires = vec![BurningFire {
            position: p,
            timer: 0,
            done: false,
        }];

        let before = accessor.world().clone();
        update_fires(&mut fires, &mut accessor, &settings, &mut rng);

        assert!(fires.is_empty());
        assert_eq!(accessor.world(), &before);
    }

    #[test]
    fn test_spread_is_merged_after_sweep() {
        let mut accessor = field();
        let mut rng = StdRng::seed_from_u64(0);
        let settings = SimulationSettings {
            fire_timer: TimerRange::new(10, 0),
            fire_spread_chance: 1,
            ..SimulationSettings::default()
        };

        let p = Point3::new(5, 9, 5);
        accessor.set_safe(p, Block::Fire);
        accessor.set_safe(Point3::new(6, 10, 5), Block::StoneSlab);
        accessor.set_safe(Point3::new(5, 9, 6), Block::Stone);

        let mut fires = vec![BurningFire::new(p, &settings, &mut rng)];
        update_fires(&mut fires, &mut accessor, &settings, &mut rng);

        // Only the original fire spread this tick; the two new ones were not swept yet.
        assert_eq!(fires.len(), 3);
        assert_eq!(fires[0].position, p);
        assert_eq!(fires[0].timer, 9);
        assert_eq!(fires[1].position, Point3::new(4, 9, 5));
        assert_eq!(fires[2].position, Point3::new(5, 9, 4));
        assert!(fires[1..].iter().all(|fire| fire.timer == 10));

        assert_eq!(accessor.get_safe(Point3::new(6, 9, 5)), Block::Air);
        assert_eq!(accessor.get_safe(Point3::new(5, 9, 6)), Block::Stone);
        assert_eq!(accessor.get_safe(Point3::new(4, 9, 5)), Block::Fire);
    }

    #[test]
    fn test_can_burn_at() {
        let mut accessor = field();
        assert!(can_burn_at(&accessor, Point3::new(1, 9, 1)));
        assert!(!can_burn_at(&accessor, Point3::new(1, 8, 1)));
        assert!(!can_burn_at(&accessor, Point3::new(1, 10, 1)));

        accessor.set_safe(Point3::new(2, 10, 2), Block::Wheat0);
        assert!(!can_burn_at(&accessor, Point3::new(2, 9, 2)));

        assert!(!can_burn_at(&accessor, Point3::new(1, 15, 1)));
    }
}
