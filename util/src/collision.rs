//! Swept, axis-separated collision response between one moving box and a set of static boxes.
//!
//! Motion is resolved one axis at a time in the order Y, X, Z. Along each axis the box is moved
//! by its velocity component and then clamped against every static box it would pass into or
//! already sits inside, as long as that box lies in the direction of travel. A box that started
//! the step overlapping a block is pushed back out on the side it came from. Boxes that merely
//! touch, or overlap by less than float drift, do not block, so an agent resting on a floor can
//! still slide across it.

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::Bounds;

/// Overlaps thinner than this are float drift from earlier resolutions and are ignored.
const OVERLAP_EPSILON: f32 = 1.0e-4;

/// Which side of the moving box a blocking collision happened on, along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contact {
    None,
    /// Blocked while moving towards negative coordinates.
    Negative,
    /// Blocked while moving towards positive coordinates.
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionData {
    pub x: Contact,
    pub y: Contact,
    pub z: Contact,
}

impl Default for Contact {
    fn default() -> Self {
        Contact::None
    }
}

impl Default for CollisionData {
    fn default() -> Self {
        CollisionData {
            x: Contact::None,
            y: Contact::None,
            z: Contact::None,
        }
    }
}

impl CollisionData {
    /// The world's y axis points down, so ground contact is a block on the positive side.
    pub fn on_ground(&self) -> bool {
        self.y == Contact::Positive
    }

    fn set(&mut self, axis: usize, contact: Contact) {
        match axis {
            0 => self.x = contact,
            1 => self.y = contact,
            _ => self.z = contact,
        }
    }
}

/// Moves `hitbox` by `velocity`, stopping it against `obstacles`. Every velocity component
/// whose motion was blocked is set to zero.
pub fn resolve_collisions(
    hitbox: &mut Bounds<f32>,
    obstacles: &[Bounds<f32>],
    velocity: &mut Vector3<f32>,
) -> CollisionData {
    let mut collision = CollisionData::default();

    for &axis in &[1usize, 0, 2] {
        let requested = velocity[axis];
        if requested == 0.0 {
            continue;
        }

        let mut origin: Point3<f32> = hitbox.origin();
        match clamp_axis(*hitbox, obstacles, axis, requested) {
            Some(stop) => {
                origin[axis] = stop;
                velocity[axis] = 0.0;
                collision.set(
                    axis,
                    if requested > 0.0 {
                        Contact::Positive
                    } else {
                        Contact::Negative
                    },
                );
            }
            None => origin[axis] += requested,
        }
        *hitbox = hitbox.with_origin(origin);
    }

    collision
}

/// Finds the furthest origin coordinate along `axis` the box may reach when moving by
/// `displacement`, given every obstacle between the box's trailing face and its moved leading
/// face. Obstacles the box already overlaps are included, so the result can lie behind the
/// current origin. Returns `None` if nothing is in the way.
fn clamp_axis(
    hitbox: Bounds<f32>,
    obstacles: &[Bounds<f32>],
    axis: usize,
    displacement: f32,
) -> Option<f32> {
    let origin = hitbox.origin()[axis];
    let limit = hitbox.limit()[axis];
    let size = hitbox.size()[axis];

    let mut stop: Option<f32> = None;

    for obstacle in obstacles {
        if !cross_section_overlaps(hitbox, *obstacle, axis) {
            continue;
        }

        if displacement > 0.0 {
            let face = obstacle.origin()[axis];
            if face <= origin || face >= limit + displacement - OVERLAP_EPSILON {
                continue;
            }
            let candidate = face - size;
            stop = Some(stop.map_or(candidate, |s| s.min(candidate)));
        } else {
            let face = obstacle.limit()[axis];
            if face >= limit || face <= origin + displacement + OVERLAP_EPSILON {
                continue;
            }
            stop = Some(stop.map_or(face, |s| s.max(face)));
        }
    }

    stop
}

fn cross_section_overlaps(a: Bounds<f32>, b: Bounds<f32>, axis: usize) -> bool {
    let (a0, a1, b0, b1) = (a.origin(), a.limit(), b.origin(), b.limit());
    (0..3)
        .filter(|&other| other != axis)
        .all(|other| {
            a0[other] < b1[other] - OVERLAP_EPSILON && a1[other] > b0[other] + OVERLAP_EPSILON
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube(x: f32, y: f32, z: f32) -> Bounds<f32> {
        Bounds::new(Point3::new(x, y, z), Vector3::new(1.0, 1.0, 1.0))
    }

    fn agent(x: f32, y: f32, z: f32) -> Bounds<f32> {
        Bounds::new(Point3::new(x, y, z), Vector3::new(0.5, 1.5, 0.5))
    }

    #[test]
    fn test_lands_on_floor() {
        let floor: Vec<_> = (0..3)
            .flat_map(|x| (0..3).map(move |z| unit_cube(x as f32, 10.0, z as f32)))
            .collect();

        let mut hitbox = agent(1.25, 8.25, 1.25);
        let mut velocity = Vector3::new(0.0, 0.5, 0.0);

        let collision = resolve_collisions(&mut hitbox, &floor, &mut velocity);

        assert!(collision.on_ground());
        assert_eq!(velocity.y, 0.0);
        assert_eq!(hitbox.limit().y, 10.0);
        assert!(floor.iter().all(|b| !hitbox.overlaps(*b)));
    }

    #[test]
    fn test_slides_along_floor() {
        let floor: Vec<_> = (0..4).map(|x| unit_cube(x as f32, 10.0, 0.0)).collect();

        let mut hitbox = agent(0.25, 8.5, 0.25);
        let mut velocity = Vector3::new(0.5, 0.25, 0.0);

        let collision = resolve_collisions(&mut hitbox, &floor, &mut velocity);

        assert!(collision.on_ground());
        assert_eq!(collision.x, Contact::None);
        assert_eq!(hitbox.origin().x, 0.75);
        assert_eq!(velocity.x, 0.5);
    }

    #[test]
    fn test_blocked_by_wall() {
        let wall = vec![unit_cube(2.0, 0.0, 0.0), unit_cube(2.0, 1.0, 0.0)];

        let mut hitbox = agent(1.25, 0.25, 0.25);
        let mut velocity = Vector3::new(0.75, 0.0, 0.0);

        let collision = resolve_collisions(&mut hitbox, &wall, &mut velocity);

        assert_eq!(collision.x, Contact::Positive);
        assert_eq!(velocity.x, 0.0);
        assert_eq!(hitbox.limit().x, 2.0);

        let mut velocity = Vector3::new(0.0, 0.0, -0.5);
        let collision = resolve_collisions(&mut hitbox, &wall, &mut velocity);
        assert_eq!(collision.z, Contact::None);
        assert_eq!(hitbox.origin().z, -0.25);
    }

    #[test]
    fn test_ceiling_contact() {
        let ceiling = vec![unit_cube(0.0, 0.0, 0.0)];

        let mut hitbox = agent(0.25, 1.5, 0.25);
        let mut velocity = Vector3::new(0.0, -0.75, 0.0);

        let collision = resolve_collisions(&mut hitbox, &ceiling, &mut velocity);

        assert_eq!(collision.y, Contact::Negative);
        assert!(!collision.on_ground());
        assert_eq!(hitbox.origin().y, 1.0);
    }

    #[test]
    fn test_half_height_slab() {
        let slab = vec![Bounds::new(
            Point3::new(0.0, 5.5, 0.0),
            Vector3::new(1.0, 0.5, 1.0),
        )];

        let mut hitbox = agent(0.25, 3.0, 0.25);
        let mut velocity = Vector3::new(0.0, 1.5, 0.0);

        let collision = resolve_collisions(&mut hitbox, &slab, &mut velocity);

        assert!(collision.on_ground());
        assert_eq!(hitbox.limit().y, 5.5);
    }

    #[test]
    fn test_pushed_out_of_block_it_started_in() {
        let floor = vec![unit_cube(0.0, 10.0, 0.0)];

        // Sunk 0.3 into the floor, still falling.
        let mut hitbox = Bounds::new(Point3::new(0.2, 8.5, 0.2), Vector3::new(0.6, 1.8, 0.6));
        let mut velocity = Vector3::new(0.0, 0.1, 0.0);

        let collision = resolve_collisions(&mut hitbox, &floor, &mut velocity);

        assert!(collision.on_ground());
        assert_eq!(velocity.y, 0.0);
        assert!(!hitbox.overlaps(floor[0]));
        assert!((hitbox.limit().y - 10.0).abs() < 1.0e-5);

        // Stuck in a wall while walking into it.
        let wall = vec![unit_cube(2.0, 0.0, 0.0)];
        let mut hitbox = agent(1.75, 0.25, 0.25);
        let mut velocity = Vector3::new(0.1, 0.0, 0.0);

        let collision = resolve_collisions(&mut hitbox, &wall, &mut velocity);

        assert_eq!(collision.x, Contact::Positive);
        assert!(!hitbox.overlaps(wall[0]));
        assert_eq!(hitbox.limit().x, 2.0);
    }

    #[test]
    fn test_never_overlaps_after_resolution() {
        let obstacles: Vec<_> = [(0, 4, 0), (1, 4, 0), (2, 3, 0), (2, 2, 1), (0, 1, 2), (1, 4, 1)]
            .iter()
            .map(|&(x, y, z)| unit_cube(x as f32, y as f32, z as f32))
            .collect();

        let velocities = [
            Vector3::new(0.5, 0.75, 0.25),
            Vector3::new(-0.75, 0.5, 0.5),
            Vector3::new(0.75, -0.5, -0.25),
            Vector3::new(0.25, 1.0, 0.75),
        ];

        for velocity in velocities.iter() {
            let mut hitbox = agent(1.25, 2.0, 1.25);
            assert!(obstacles.iter().all(|b| !hitbox.overlaps(*b)));

            let mut velocity = *velocity;
            for _ in 0..8 {
                resolve_collisions(&mut hitbox, &obstacles, &mut velocity);
                assert!(
                    obstacles.iter().all(|b| !hitbox.overlaps(*b)),
                    "{:?} overlaps an obstacle",
                    hitbox
                );
            }
        }
    }
}
