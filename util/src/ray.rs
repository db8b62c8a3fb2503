use cgmath::{BaseFloat, BaseNum, InnerSpace, Point3, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray<T> {
    pub origin: Point3<T>,
    pub dir: Vector3<T>,
}

impl<T> Ray<T>
where
    T: BaseNum,
{
    /// Evaluate the ray at a t-value to get a concrete position.
    pub fn get(&self, t: T) -> Point3<T> {
        self.origin + self.dir * t
    }
}

impl<T> Ray<T>
where
    T: BaseFloat,
{
    /// The same ray with a unit-length direction, so that t measures distance. Returns `None` if
    /// the direction is zero.
    pub fn normalized(&self) -> Option<Self> {
        let magnitude = self.dir.magnitude();
        if magnitude == T::zero() {
            return None;
        }
        Some(Self {
            origin: self.origin,
            dir: self.dir / magnitude,
        })
    }

    /// Visits points along the ray from `t = 0` up to and including `max_t`, `step` apart.
    pub fn march(&self, step: T, max_t: T) -> impl Iterator<Item = Point3<T>> {
        let ray = *self;
        let mut t = T::zero();
        std::iter::from_fn(move || {
            if t > max_t {
                return None;
            }
            let point = ray.get(t);
            t += step;
            Some(point)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let ray = Ray {
            origin: Point3::new(1.0f32, 2.0, 3.0),
            dir: Vector3::new(0.0, 0.0, -4.0),
        };
        let unit = ray.normalized().unwrap();
        assert_eq!(unit.dir, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(unit.get(2.0), Point3::new(1.0, 2.0, 1.0));

        let still = Ray {
            origin: Point3::new(0.0f32, 0.0, 0.0),
            dir: Vector3::new(0.0, 0.0, 0.0),
        };
        assert_eq!(still.normalized(), None);
    }

    #[test]
    fn test_march() {
        let ray = Ray {
            origin: Point3::new(0.0f64, 0.0, 0.0),
            dir: Vector3::new(1.0, 0.0, 0.0),
        };
        let points: Vec<_> = ray.march(0.5, 2.0).collect();
        assert_eq!(points.len(), 5);
        assert_eq!(points[4], Point3::new(2.0, 0.0, 0.0));
    }
}
