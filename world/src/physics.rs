//! Movement of a single agent through the voxel grid.

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use voxsim_util::{resolve_collisions, Bounds, CollisionData};
use voxsim_voxels::{Block, VoxelWorld};

pub const AGENT_SIZE: Vector3<f32> = Vector3 {
    x: 0.6,
    y: 1.8,
    z: 0.6,
};

/// Offset of the eye from the hitbox origin.
pub const EYE_OFFSET: Vector3<f32> = Vector3 {
    x: 0.3,
    y: 0.2,
    z: 0.3,
};

pub const ACCELERATION: f32 = 0.0176;
pub const FRICTION: f32 = 0.8;
pub const GRAVITY: f32 = 0.008;
pub const JUMP_VELOCITY: f32 = 0.1536;

/// Cells within this distance of the agent are considered for collision.
pub const HITBOX_RADIUS: i64 = 3;

/// The unit cube occupied by a cell.
pub fn cell_hitbox(p: Point3<i64>) -> Bounds<f32> {
    Bounds::new(
        Point3::new(p.x as f32, p.y as f32, p.z as f32),
        Vector3::new(1.0, 1.0, 1.0),
    )
}

/// The space a block occupies within its cell. Slabs fill the lower half, which is the half with
/// larger y.
pub fn block_shape(p: Point3<i64>, block: Block) -> Bounds<f32> {
    if block.is_slab() {
        Bounds::new(
            Point3::new(p.x as f32, p.y as f32 + 0.5, p.z as f32),
            Vector3::new(1.0, 0.5, 1.0),
        )
    } else {
        cell_hitbox(p)
    }
}

/// Collects the hitboxes of every collidable block in the cube of cells with the given radius
/// around `around`.
pub fn block_hitboxes(world: &VoxelWorld, around: Point3<f32>, radius: i64) -> Vec<Bounds<f32>> {
    let centre = Point3::new(
        around.x.floor() as i64,
        around.y.floor() as i64,
        around.z.floor() as i64,
    );

    let mut hitboxes = Vec::new();
    for x in -radius..=radius {
        for y in -radius..=radius {
            for z in -radius..=radius {
                let p = centre + Vector3::new(x, y, z);
                let block = world.get_safe(p);
                if block.is_not_permeable_mob() {
                    hitboxes.push(block_shape(p, block));
                }
            }
        }
    }
    hitboxes
}

/// What the agent wants to do during one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentInput {
    /// Horizontal walking direction. The y component is ignored.
    pub walk: Vector3<f32>,
    pub jump: bool,
}

impl Default for AgentInput {
    fn default() -> Self {
        AgentInput {
            walk: Vector3::new(0.0, 0.0, 0.0),
            jump: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub hitbox: Bounds<f32>,
    pub velocity: Vector3<f32>,
    /// Contacts from the most recent step.
    pub collision: CollisionData,
}

impl Agent {
    pub fn new(position: Point3<f32>) -> Self {
        Agent {
            hitbox: Bounds::new(position, AGENT_SIZE),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            collision: CollisionData::default(),
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.hitbox.origin()
    }

    pub fn eye(&self) -> Point3<f32> {
        self.hitbox.origin() + EYE_OFFSET
    }

    pub fn on_ground(&self) -> bool {
        self.collision.on_ground()
    }

    pub fn step(&mut self, world: &VoxelWorld, input: &AgentInput) {
        self.velocity.x += ACCELERATION * input.walk.x;
        self.velocity.z += ACCELERATION * input.walk.z;

        let obstacles = block_hitboxes(world, self.hitbox.origin(), HITBOX_RADIUS);
        self.collision = resolve_collisions(&mut self.hitbox, &obstacles, &mut self.velocity);

        if input.jump && self.collision.on_ground() {
            self.velocity.y = -JUMP_VELOCITY;
        }

        self.velocity.x *= FRICTION;
        self.velocity.z *= FRICTION;
        self.velocity.y += GRAVITY;
    }
}

#[cfg(test)]
mod tests {
    use voxsim_util::Contact;

    use super::*;

    fn floor_world() -> VoxelWorld {
        let mut world = VoxelWorld::new(Vector3::new(16, 16, 16)).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                world.set(Point3::new(x, 10, z), Block::Stone);
            }
        }
        world
    }

    fn settle(world: &VoxelWorld, agent: &mut Agent) {
        for _ in 0..60 {
            agent.step(world, &AgentInput::default());
        }
    }

    #[test]
    fn test_block_hitboxes() {
        let mut world = floor_world();
        world.set(Point3::new(5, 9, 5), Block::OakSlab);
        world.set(Point3::new(6, 9, 5), Block::Wheat3);
        world.set(Point3::new(4, 9, 5), Block::Water);

        let hitboxes = block_hitboxes(&world, Point3::new(5.5, 9.5, 5.5), 1);

        assert_eq!(hitboxes.len(), 9 + 1);
        assert!(hitboxes.contains(&Bounds::new(
            Point3::new(5.0, 9.5, 5.0),
            Vector3::new(1.0, 0.5, 1.0)
        )));
        assert!(hitboxes.iter().all(|b| b.origin().y != 9.0));
    }

    #[test]
    fn test_out_of_bounds_cells_do_not_collide() {
        let world = VoxelWorld::new(Vector3::new(16, 16, 16)).unwrap();
        assert!(block_hitboxes(&world, Point3::new(0.0, 0.0, 0.0), 3).is_empty());
    }

    #[test]
    fn test_falls_onto_floor() {
        let world = floor_world();
        let mut agent = Agent::new(Point3::new(5.2, 5.0, 5.2));

        agent.step(&world, &AgentInput::default());
        assert!(!agent.on_ground());
        assert_eq!(agent.velocity.y, GRAVITY);

        settle(&world, &mut agent);

        assert!(agent.on_ground());
        assert!((agent.hitbox.limit().y - 10.0).abs() < 1.0e-4);
        assert_eq!(agent.velocity.y, GRAVITY);
    }

    #[test]
    fn test_jump_needs_ground() {
        let world = floor_world();
        let jump = AgentInput {
            jump: true,
            ..AgentInput::default()
        };

        let mut agent = Agent::new(Point3::new(5.2, 2.0, 5.2));
        agent.step(&world, &jump);
        assert_eq!(agent.velocity.y, GRAVITY);

        settle(&world, &mut agent);
        let rest = agent.position().y;

        agent.step(&world, &jump);
        assert!((agent.velocity.y - (GRAVITY - JUMP_VELOCITY)).abs() < 1.0e-6);

        agent.step(&world, &AgentInput::default());
        assert!(agent.position().y < rest);
        assert!(!agent.on_ground());
    }

    #[test]
    fn test_walks_into_wall() {
        let mut world = floor_world();
        for z in 0..16 {
            world.set(Point3::new(8, 9, z), Block::Stone);
            world.set(Point3::new(8, 8, z), Block::Stone);
        }

        let mut agent = Agent::new(Point3::new(5.2, 8.2, 5.2));
        let walk = AgentInput {
            walk: Vector3::new(1.0, 0.0, 0.0),
            jump: false,
        };

        let mut blocked = false;
        for _ in 0..100 {
            agent.step(&world, &walk);
            blocked |= agent.collision.x == Contact::Positive;
            assert!(agent.hitbox.limit().x <= 8.0 + 1.0e-4);
        }

        assert!(blocked);
        assert!(agent.hitbox.limit().x > 7.9);
    }

    #[test]
    fn test_walks_through_plants() {
        let mut world = floor_world();
        for z in 0..16 {
            world.set(Point3::new(7, 9, z), Block::Rose);
            world.set(Point3::new(8, 9, z), Block::Wheat7);
        }

        let mut agent = Agent::new(Point3::new(5.2, 8.2, 5.2));
        let walk = AgentInput {
            walk: Vector3::new(1.0, 0.0, 0.0),
            jump: false,
        };
        for _ in 0..100 {
            agent.step(&world, &walk);
        }

        assert!(agent.position().x > 9.0);
    }

    #[test]
    fn test_rests_on_slab() {
        let mut world = floor_world();
        world.set(Point3::new(5, 9, 5), Block::StoneSlab);

        let mut agent = Agent::new(Point3::new(5.2, 5.0, 5.2));
        settle(&world, &mut agent);

        assert!(agent.on_ground());
        assert!((agent.hitbox.limit().y - 9.5).abs() < 1.0e-4);
    }
}
