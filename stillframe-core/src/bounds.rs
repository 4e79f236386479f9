//! Axis-aligned bounding boxes
//!
//! Used by the renderer to merge per-model extents into scene bounds and to
//! frame the default camera around them.

use crate::point::Point3f;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Create an empty (inverted) bounding box that any point will grow
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Build bounds covering an iterator of points
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Whether the box contains no points yet
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extend the box to contain a point
    pub fn grow(&mut self, p: &Point3f) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Extend the box to contain another box
    pub fn merge(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.grow(&other.min);
        self.grow(&other.max);
    }

    /// Center of the box
    pub fn center(&self) -> Point3f {
        Point3f::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Half the diagonal length, the radius of the enclosing sphere
    pub fn radius(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).norm() * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_bounds() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.radius(), 0.0);
    }

    #[test]
    fn test_grow_and_center() {
        let mut aabb = Aabb::empty();
        aabb.grow(&Point3f::new(-1.0, -1.0, -1.0));
        aabb.grow(&Point3f::new(3.0, 1.0, 1.0));

        assert!(!aabb.is_empty());
        assert_eq!(aabb.center(), Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(aabb.radius(), (4.0f32 * 4.0 + 2.0 * 2.0 + 2.0 * 2.0).sqrt() * 0.5);
    }

    #[test]
    fn test_merge() {
        let mut a = Aabb::from_points([Point3f::new(0.0, 0.0, 0.0)].iter());
        let b = Aabb::from_points([Point3f::new(2.0, -1.0, 5.0)].iter());

        a.merge(&b);
        assert_eq!(a.min, Point3f::new(0.0, -1.0, 0.0));
        assert_eq!(a.max, Point3f::new(2.0, 0.0, 5.0));

        // Merging an empty box changes nothing
        let before = a;
        a.merge(&Aabb::empty());
        assert_eq!(a, before);
    }
}
