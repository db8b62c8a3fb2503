use std::time::Instant;

use anyhow::Result;
use cgmath::{Point3, Vector3};
use log::{debug, info};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use voxsim_voxels::{propagate_skylight, Block, VoxelWorld};

use crate::structures::{self, MushroomKind, TreeKind, TreeShape};

/// How many times a tree or huge mushroom site is redrawn after landing somewhere it does not
/// fit before that placement is skipped.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;

const NOISE_FREQUENCY: f64 = 2.0 * 0.01;
const TERRAIN_EXPONENT: f64 = 1.1024;
const TERRAIN_WEIGHT: f64 = 0.6;
const TERRAIN_THRESHOLD: f64 = 0.5;
const HIGHLAND_THRESHOLD: f64 = 0.6;
const WATER_LEVEL: f64 = 0.5;
const SAND_NOISE_THRESHOLD: f64 = -0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateWorldConfig {
    pub size: Vector3<i64>,
    pub seed: u64,
}

impl Default for GenerateWorldConfig {
    fn default() -> Self {
        GenerateWorldConfig {
            size: Vector3::new(128, 128, 128),
            seed: 0,
        }
    }
}

pub struct WorldGenerator<'a, R> {
    config: &'a GenerateWorldConfig,
    world: VoxelWorld,
    noise: Fbm<Perlin>,
    rng: &'a mut R,
    mushroom_world: bool,
}

pub fn generate_world(config: &GenerateWorldConfig) -> Result<VoxelWorld> {
    info!("Creating empty world: {:?}", config);

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut generator = WorldGenerator::new(config, &mut rng)?;
    generator.generate();
    Ok(generator.finish())
}

impl<'a, R> WorldGenerator<'a, R>
where
    R: Rng,
{
    pub fn new(config: &'a GenerateWorldConfig, rng: &'a mut R) -> Result<Self> {
        let world = VoxelWorld::new(config.size)?;
        let noise = Fbm::<Perlin>::new(config.seed as u32).set_octaves(2);

        Ok(Self {
            config,
            world,
            noise,
            rng,
            mushroom_world: false,
        })
    }

    pub fn generate(&mut self) {
        self.mushroom_world = self.rng.gen_ratio(1, 1024);
        if self.mushroom_world {
            info!("Generating a mushroom world");
        }

        let ts_start = Instant::now();
        self.generate_terrain();
        let ts_terrain = Instant::now();
        self.dress_surface();
        let ts_surface = Instant::now();
        self.generate_water();
        let ts_water = Instant::now();
        self.plant_trees();
        self.plant_huge_mushrooms();
        self.plant_flowers();
        self.plant_small_mushrooms();
        self.plant_pumpkins_and_melons();
        let ts_vegetation = Instant::now();
        self.generate_bedrock();
        info!("Propagating skylight");
        propagate_skylight(&mut self.world);
        let ts_light = Instant::now();

        metrics::timing!(
            "world.worldgen.terrain",
            ts_terrain.duration_since(ts_start)
        );
        metrics::timing!(
            "world.worldgen.surface",
            ts_surface.duration_since(ts_terrain)
        );
        metrics::timing!("world.worldgen.water", ts_water.duration_since(ts_surface));
        metrics::timing!(
            "world.worldgen.vegetation",
            ts_vegetation.duration_since(ts_water)
        );
        metrics::timing!(
            "world.worldgen.bedrock_and_light",
            ts_light.duration_since(ts_vegetation)
        );

        info!(
            "Generated world in {:?}",
            ts_light.duration_since(ts_start)
        );
    }

    pub fn finish(self) -> VoxelWorld {
        self.world
    }

    fn column_count(&self) -> i64 {
        self.config.size.x * self.config.size.z
    }

    fn random_column(&mut self) -> (i64, i64) {
        let size = self.config.size;
        (self.rng.gen_range(0, size.x), self.rng.gen_range(0, size.z))
    }

    /// A random offset in `-(spread - 1)..spread`, biased towards zero.
    fn patch_offset(&mut self, spread: i64) -> i64 {
        self.rng.gen_range(0, spread) - self.rng.gen_range(0, spread)
    }

    fn generate_terrain(&mut self) {
        info!("Generating terrain");
        let size = self.config.size;
        let height = size.y as f64;

        for x in 0..size.x {
            for y in 0..size.y {
                let bias = (y as f64 / height).powf(TERRAIN_EXPONENT);
                for z in 0..size.z {
                    let density = self.noise.get([
                        x as f64 * NOISE_FREQUENCY,
                        y as f64 * NOISE_FREQUENCY,
                        z as f64 * NOISE_FREQUENCY,
                    ]);
                    if bias + density * TERRAIN_WEIGHT > TERRAIN_THRESHOLD {
                        self.world.set(Point3::new(x, y, z), Block::Stone);
                    }
                }
            }
        }
    }

    fn dress_surface(&mut self) {
        info!("Dressing surface");
        let height = self.config.size.y as f64;

        for (x, z) in self.world.iter_columns().collect::<Vec<_>>() {
            let y = match self.world.first_non_air(x, z) {
                Some(y) => y,
                None => continue,
            };

            let (top, under) = if y as f64 / height > HIGHLAND_THRESHOLD {
                let shore = self
                    .noise
                    .get([x as f64 * NOISE_FREQUENCY, z as f64 * NOISE_FREQUENCY]);
                if shore >= SAND_NOISE_THRESHOLD {
                    (Block::Sand, Block::Sandstone)
                } else {
                    (Block::Gravel, Block::Gravel)
                }
            } else if self.mushroom_world {
                (Block::Mycelium, Block::Dirt)
            } else {
                (Block::Grass, Block::Dirt)
            };

            self.world.set(Point3::new(x, y, z), top);
            for depth in 1..=3 {
                self.world
                    .set_safe_if_not_air(Point3::new(x, y + depth, z), under);
            }
        }
    }

    fn generate_water(&mut self) {
        info!("Generating beaches and water");
        let height = self.config.size.y as f64;
        let mut seeds = Vec::new();

        for (x, z) in self.world.iter_columns().collect::<Vec<_>>() {
            for y in 0..self.config.size.y {
                let p = Point3::new(x, y, z);
                let below_water_level = y as f64 / height > WATER_LEVEL;

                match self.world.get(p) {
                    Block::Air if below_water_level => {
                        self.world.set(p, Block::Water);
                        seeds.push(p);
                        break;
                    }
                    Block::Air => continue,
                    Block::Grass | Block::Mycelium if below_water_level => {
                        self.world.set(p, Block::Sand);
                        self.plant_reeds(p);
                        break;
                    }
                    _ => break,
                }
            }
        }

        let filled = flood_water(&mut self.world, seeds);
        debug!("Flooded {} cells", filled);
    }

    fn plant_reeds(&mut self, ground: Point3<i64>) {
        let above = Point3::new(ground.x, ground.y - 1, ground.z);
        if self.world.get_safe(above) != Block::Air || !self.rng.gen_bool(0.5) {
            return;
        }

        let reed_height = self.rng.gen_range(1, 5);
        for i in 1..=reed_height {
            self.world
                .set_safe_if_air(Point3::new(ground.x, ground.y - i, ground.z), Block::Reeds);
        }
    }

    fn plant_trees(&mut self) {
        info!("Planting trees");
        let mut planted = 0;

        for _ in 0..self.column_count() / 32 {
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                let (x, z) = self.random_column();
                let kind = if self.rng.gen_ratio(1, 3) {
                    TreeKind::Birch
                } else {
                    TreeKind::Oak
                };

                let y = match self.world.first_non_air(x, z) {
                    Some(y) => y,
                    None => break,
                };
                if self.world.get(Point3::new(x, y, z)) != Block::Grass {
                    break;
                }

                let shape = TreeShape::random(&mut *self.rng);
                if structures::place_tree(&mut self.world, Point3::new(x, y, z), kind, shape) {
                    planted += 1;
                    break;
                }
            }
        }

        debug!("Planted {} trees", planted);
    }

    fn plant_huge_mushrooms(&mut self) {
        info!("Planting huge mushrooms");
        let count = if self.mushroom_world {
            self.config.size.z * self.config.size.z / 32
        } else {
            self.column_count() / 1024
        };

        for _ in 0..count {
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                let (x, z) = self.random_column();
                let y = match self.world.first_non_air(x, z) {
                    Some(y) => y,
                    None => break,
                };

                let ground = Point3::new(x, y, z);
                match self.world.get(ground) {
                    Block::Grass | Block::Mycelium => {}
                    _ => break,
                }
                if !self.world.in_bounds(Point3::new(x, y - 6, z)) {
                    continue;
                }

                let kind = if self.rng.gen_ratio(4, 5) {
                    MushroomKind::Red
                } else {
                    MushroomKind::Brown
                };
                structures::place_huge_mushroom(&mut self.world, ground, kind);
                break;
            }
        }
    }

    /// Plants `block` on top of the grass at each of `candidates` random points around a random
    /// column.
    fn plant_surface_patch(&mut self, block: Block, candidates: usize, spread: i64) {
        let (cx, cz) = self.random_column();

        for _ in 0..candidates {
            let x = cx + self.patch_offset(spread);
            let z = cz + self.patch_offset(spread);
            if !self.world.in_bounds(Point3::new(x, 0, z)) {
                continue;
            }

            if let Some(y) = self.world.first_non_air(x, z) {
                if self.world.get(Point3::new(x, y, z)) == Block::Grass {
                    self.world.set_safe(Point3::new(x, y - 1, z), block);
                }
            }
        }
    }

    fn plant_flowers(&mut self) {
        info!("Planting flowers");
        for _ in 0..self.column_count() / 512 {
            let flower = if self.rng.gen_bool(0.5) {
                Block::Dandelion
            } else {
                Block::Rose
            };
            self.plant_surface_patch(flower, 16, 6);
        }
    }

    fn plant_small_mushrooms(&mut self) {
        info!("Planting small mushrooms");
        let size = self.config.size;

        for _ in 0..self.column_count() / 128 {
            let center = Point3::new(
                self.rng.gen_range(0, size.x),
                self.rng.gen_range(0, size.y),
                self.rng.gen_range(0, size.z),
            );
            let mushroom = if self.rng.gen_bool(0.5) {
                Block::RedMushroom
            } else {
                Block::BrownMushroom
            };

            for _ in 0..24 {
                let p = Point3::new(
                    center.x + self.patch_offset(6),
                    center.y + self.patch_offset(6),
                    center.z + self.patch_offset(6),
                );
                let below = Point3::new(p.x, p.y + 1, p.z);
                if !self.world.in_bounds(p) || !self.world.in_bounds(below) {
                    continue;
                }

                match self.world.get(below) {
                    Block::Stone | Block::Grass | Block::Dirt => {
                        self.world.set_safe_if_air(p, mushroom);
                    }
                    _ => {}
                }
            }
        }
    }

    fn plant_pumpkins_and_melons(&mut self) {
        info!("Planting pumpkins and melons");
        for _ in 0..self.column_count() / 256 {
            let block = if self.rng.gen_bool(0.5) {
                Block::Pumpkin
            } else {
                Block::Melon
            };
            self.plant_surface_patch(block, 8, 4);
        }
    }

    fn generate_bedrock(&mut self) {
        info!("Generating bedrock");
        let floor = self.config.size.y - 1;

        for (x, z) in self.world.iter_columns().collect::<Vec<_>>() {
            self.world.set(Point3::new(x, floor, z), Block::Bedrock);
            if self.rng.gen_bool(0.5) {
                self.world.set(Point3::new(x, floor - 1, z), Block::Bedrock);
            }
        }
    }
}

/// Spreads water from the given seed cells through connected air, sideways and downwards.
/// Solid cells touching the water become sand. Returns the number of cells that were flooded,
/// excluding the seeds.
///
/// Every cell is pushed at most once, because it is pushed only at the moment it turns from air
/// into water, so the fill always terminates.
pub fn flood_water(world: &mut VoxelWorld, seeds: Vec<Point3<i64>>) -> usize {
    const NEIGHBORS: [Vector3<i64>; 5] = [
        Vector3 { x: 1, y: 0, z: 0 },
        Vector3 { x: -1, y: 0, z: 0 },
        Vector3 { x: 0, y: 0, z: 1 },
        Vector3 { x: 0, y: 0, z: -1 },
        Vector3 { x: 0, y: 1, z: 0 },
    ];

    let mut stack = seeds;
    let mut filled = 0;

    while let Some(p) = stack.pop() {
        for offset in NEIGHBORS.iter() {
            let neighbor = p + *offset;
            match world.get_safe(neighbor) {
                Block::Air => {
                    world.set(neighbor, Block::Water);
                    stack.push(neighbor);
                    filled += 1;
                }
                Block::Water | Block::Null => {}
                _ => {
                    world.set(neighbor, Block::Sand);
                }
            }
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> GenerateWorldConfig {
        GenerateWorldConfig {
            size: Vector3::new(32, 48, 32),
            seed,
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_world(&config(1234)).unwrap();
        let b = generate_world(&config(1234)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bedrock_floor() {
        let world = generate_world(&config(7)).unwrap();
        for (x, z) in world.iter_columns() {
            assert_eq!(world.get(Point3::new(x, 47, z)), Block::Bedrock);
        }
        let second = world
            .iter_columns()
            .filter(|&(x, z)| world.get(Point3::new(x, 46, z)) == Block::Bedrock)
            .count();
        assert!(second > 0 && second < 32 * 32);
    }

    #[test]
    fn test_generated_world_is_lit() {
        let world = generate_world(&config(99)).unwrap();
        for (x, z) in world.iter_columns() {
            let top = world.first_non_air(x, z).unwrap();
            assert_eq!(
                world.skylight(Point3::new(x, top, z)),
                voxsim_voxels::MAX_SKYLIGHT
            );
        }
    }

    #[test]
    fn test_small_worlds_light_monotonically() {
        for seed in 0..12 {
            let config = GenerateWorldConfig {
                size: Vector3::new(16, 16, 16),
                seed,
            };
            let world = generate_world(&config).unwrap();

            for (x, z) in world.iter_columns() {
                assert_eq!(
                    world.skylight(Point3::new(x, 0, z)),
                    voxsim_voxels::MAX_SKYLIGHT,
                    "seed {} column ({}, {})",
                    seed,
                    x,
                    z
                );

                let mut previous = voxsim_voxels::MAX_SKYLIGHT;
                for y in 0..16 {
                    let p = Point3::new(x, y, z);
                    if world.get(p).light_attenuation().is_none() {
                        break;
                    }
                    let light = world.skylight(p);
                    assert!(light <= previous, "seed {} brightens at {:?}", seed, p);
                    previous = light;
                }
            }
        }
    }

    #[test]
    fn test_rejects_bad_size() {
        let config = GenerateWorldConfig {
            size: Vector3::new(32, 40, 32),
            seed: 0,
        };
        assert!(generate_world(&config).is_err());
    }

    #[test]
    fn test_flood_fills_basin() {
        let mut world = VoxelWorld::new(Vector3::new(16, 16, 16)).unwrap();

        // A stone floor at y = 12 with a 4x4 pit two cells deep, walled off from x >= 8.
        for x in 0..16 {
            for z in 0..16 {
                for y in 12..16 {
                    world.set(Point3::new(x, y, z), Block::Stone);
                }
            }
        }
        for x in 2..6 {
            for z in 2..6 {
                world.set(Point3::new(x, 12, z), Block::Air);
                world.set(Point3::new(x, 13, z), Block::Air);
            }
        }
        for z in 0..16 {
            for y in 8..12 {
                world.set(Point3::new(8, y, z), Block::Stone);
            }
        }

        world.set(Point3::new(0, 9, 0), Block::Water);
        let filled = flood_water(&mut world, vec![Point3::new(0, 9, 0)]);

        // Layers 9, 10, 11 on the near side of the wall, plus the pit.
        let expected = 3 * 8 * 16 - 1 + 2 * 4 * 4;
        assert_eq!(filled, expected);
        assert_eq!(
            world
                .iter_voxels()
                .filter(|(_, b)| *b == Block::Water)
                .count(),
            expected + 1
        );

        assert_eq!(world.get(Point3::new(3, 13, 3)), Block::Water);
        assert_eq!(world.get(Point3::new(3, 14, 3)), Block::Sand);
        assert_eq!(world.get(Point3::new(0, 12, 0)), Block::Sand);
        assert_eq!(world.get(Point3::new(8, 10, 5)), Block::Sand);
        assert_eq!(world.get(Point3::new(9, 10, 5)), Block::Air);
        assert_eq!(world.get(Point3::new(0, 8, 0)), Block::Air);
    }

    #[test]
    fn test_flood_without_seeds() {
        let mut world = VoxelWorld::new(Vector3::new(16, 16, 16)).unwrap();
        assert_eq!(flood_water(&mut world, Vec::new()), 0);
    }
}
