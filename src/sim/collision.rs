//! Character-versus-obstacle hit testing
//!
//! Two phases: a cheap bounding-box reject, then every sub-box pair. The
//! coarse box of each body is its sprite shrunk by the transparent border,
//! grown to enclose its sub-boxes, so the reject can never discard a pair the
//! fine pass would report. The fine pass alone decides the result.

use glam::Vec2;

use super::collision_box::{CollisionBox, bounds_of, boxes_overlap};
use super::obstacle::Obstacle;
use super::trex::Trex;
use crate::consts::SPRITE_BORDER;

/// The first overlapping pair found, both in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub trex_box: CollisionBox,
    pub obstacle_box: CollisionBox,
}

/// Inset sprite box enlarged to cover every sub-box
fn coarse_box(sprite: CollisionBox, sub_boxes: &[CollisionBox]) -> CollisionBox {
    let inset = sprite.inset(SPRITE_BORDER);
    let origin = Vec2::new(sprite.x, sprite.y);
    sub_boxes
        .iter()
        .map(|b| b.translated(origin))
        .fold(inset, |acc, b| acc.union(&b))
}

pub fn trex_coarse_box(trex: &Trex) -> CollisionBox {
    coarse_box(trex.sprite_box(), trex.collision_boxes())
}

pub fn obstacle_coarse_box(obstacle: &Obstacle) -> CollisionBox {
    coarse_box(obstacle.sprite_box(), &obstacle.collision_boxes)
}

/// Phase one: do the bodies' outer boxes overlap at all
pub fn coarse_overlap(trex: &Trex, obstacle: &Obstacle) -> bool {
    boxes_overlap(&trex_coarse_box(trex), &obstacle_coarse_box(obstacle))
}

/// Phase two: test every (character, obstacle) sub-box pair
pub fn fine_collision(trex: &Trex, obstacle: &Obstacle) -> Option<CollisionResult> {
    let trex_origin = trex.pos();
    for trex_box in trex.collision_boxes() {
        let trex_box = trex_box.translated(trex_origin);
        for obstacle_box in &obstacle.collision_boxes {
            let obstacle_box = obstacle_box.translated(obstacle.pos);
            if boxes_overlap(&trex_box, &obstacle_box) {
                return Some(CollisionResult {
                    trex_box,
                    obstacle_box,
                });
            }
        }
    }
    None
}

/// Full test: coarse reject, then the fine pass
pub fn check_for_collision(trex: &Trex, obstacle: &Obstacle) -> Option<CollisionResult> {
    if !coarse_overlap(trex, obstacle) {
        return None;
    }
    fine_collision(trex, obstacle)
}

/// Test against the nearest obstacle, if there is one
pub fn check_nearest(trex: &Trex, nearest: Option<&Obstacle>) -> Option<CollisionResult> {
    nearest.and_then(|obstacle| check_for_collision(trex, obstacle))
}

/// Bounding box of a body's world-space sub-boxes
pub fn sub_box_bounds(origin: Vec2, sub_boxes: &[CollisionBox]) -> Option<CollisionBox> {
    bounds_of(sub_boxes).map(|b| b.translated(origin))
}
