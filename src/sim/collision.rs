//! Axis-aligned box overlap tests
//!
//! Every collider in the shooter is a centered square, so a min/max box is
//! all the geometry the collision pass needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Square box of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Aabb::centered(Vec2::new(100.0, 100.0), 20.0);
        let b = Aabb::centered(Vec2::new(110.0, 105.0), 4.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_miss() {
        let a = Aabb::centered(Vec2::new(0.0, 0.0), 10.0);
        let b = Aabb::centered(Vec2::new(10.0, 0.0), 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_separated_on_one_axis_misses() {
        let a = Aabb::centered(Vec2::new(0.0, 0.0), 10.0);
        let b = Aabb::centered(Vec2::new(2.0, 30.0), 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_union() {
        let a = Aabb::centered(Vec2::new(0.0, 0.0), 2.0);
        let b = Aabb::centered(Vec2::new(10.0, 4.0), 2.0);
        let u = a.union(&b);
        assert_eq!(u.min, Vec2::new(-1.0, -1.0));
        assert_eq!(u.max, Vec2::new(11.0, 5.0));
        assert_eq!(u.center(), Vec2::new(5.0, 2.0));
    }
}
