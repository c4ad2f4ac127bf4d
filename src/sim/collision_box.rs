//! Axis-aligned collision boxes
//!
//! Boxes are expressed in a body-local frame (origin at the owner's top-left
//! sprite corner, y growing downward) and translated into world space right
//! before a test. Overlap uses half-open intervals: boxes that only share an
//! edge do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An immutable axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CollisionBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open overlap test
    #[inline]
    pub fn overlaps(&self, other: &CollisionBox) -> bool {
        boxes_overlap(self, other)
    }

    /// Shift the box by `offset` (body-local to world space)
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    /// Shrink the box by `border` on all four sides
    pub fn inset(&self, border: f32) -> Self {
        Self {
            x: self.x + border,
            y: self.y + border,
            width: (self.width - 2.0 * border).max(0.0),
            height: (self.height - 2.0 * border).max(0.0),
        }
    }

    /// Smallest box enclosing both `self` and `other`
    pub fn union(&self, other: &CollisionBox) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Half-open AABB overlap: `a.x < b.x+b.w && a.x+a.w > b.x && ...`
#[inline]
pub fn boxes_overlap(a: &CollisionBox, b: &CollisionBox) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Bounding box of a set of boxes, or `None` when the set is empty
pub fn bounds_of(boxes: &[CollisionBox]) -> Option<CollisionBox> {
    let (first, rest) = boxes.split_first()?;
    Some(rest.iter().fold(*first, |acc, b| acc.union(b)))
}
