//! Obstacle entities
//!
//! An obstacle is created from an [`ObstacleTypeConfig`] and then owns all of
//! its per-instance data (position, run length, gap, adjusted sub-boxes), so
//! the spawner can move and evict it without going back to the catalog.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision_box::CollisionBox;
use crate::error::ConfigError;
use crate::scroll_increment;
use crate::settings::ObstacleTypeConfig;

/// Obstacle type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleKind {
    CactusSmall,
    CactusLarge,
    Pterodactyl,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [
        ObstacleKind::CactusSmall,
        ObstacleKind::CactusLarge,
        ObstacleKind::Pterodactyl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::CactusSmall => "CACTUS_SMALL",
            ObstacleKind::CactusLarge => "CACTUS_LARGE",
            ObstacleKind::Pterodactyl => "PTERODACTYL",
        }
    }

}

impl FromStr for ObstacleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObstacleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownObstacleType(s.to_string()))
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum and maximum gap (inclusive) an obstacle may leave behind it.
///
/// `min = round(run_width * speed + min_gap * gap_coefficient)`,
/// `max = round(min * max_gap_coefficient)`.
pub fn gap_bounds(
    config: &ObstacleTypeConfig,
    run_length: u32,
    speed: f32,
    gap_coefficient: f32,
    max_gap_coefficient: f32,
) -> (f32, f32) {
    let min_gap = (config.run_width(run_length) * speed + config.min_gap * gap_coefficient).round();
    let max_gap = (min_gap * max_gap_coefficient).round();
    (min_gap, max_gap)
}

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Units placed side by side (1..=3)
    pub run_length: u32,
    /// Top-left corner in play-field coordinates
    pub pos: Vec2,
    /// Total width of the run
    pub width: f32,
    pub height: f32,
    /// Clearance required behind this obstacle before the next one spawns
    pub gap: f32,
    /// Signed speed adjustment (flying types only)
    pub speed_offset: f32,
    /// Sub-boxes adjusted to the run length, body-local
    pub collision_boxes: Vec<CollisionBox>,
    /// Latch: this obstacle has already triggered its follow-up spawn
    pub following_obstacle_created: bool,
    /// Fully scrolled off the left edge
    pub removed: bool,
    pub anim_frame: u32,
    anim_frames: u32,
    frame_duration_ms: f32,
    anim_timer: f32,
}

impl Obstacle {
    pub fn new(
        id: u32,
        config: &ObstacleTypeConfig,
        run_length: u32,
        pos: Vec2,
        gap: f32,
        speed_offset: f32,
    ) -> Self {
        let width = config.run_width(run_length);
        let mut collision_boxes = config.collision_boxes.clone();

        // Compound runs: stretch the middle box and pin the last one to the
        // right edge so the whole run is solid.
        if run_length > 1 && collision_boxes.len() >= 3 {
            let first_w = collision_boxes[0].width;
            let last_w = collision_boxes[2].width;
            collision_boxes[1].width = width - first_w - last_w;
            collision_boxes[2].x = width - last_w;
        }

        Self {
            id,
            kind: config.kind,
            run_length,
            pos,
            width,
            height: config.height,
            gap,
            speed_offset,
            collision_boxes,
            following_obstacle_created: false,
            removed: false,
            anim_frame: 0,
            anim_frames: config.animation_frames,
            frame_duration_ms: config.frame_duration_ms,
            anim_timer: 0.0,
        }
    }

    /// Scroll left at `speed` (plus this obstacle's own offset) and advance
    /// the wing-flap animation
    pub fn update(&mut self, delta_ms: f32, speed: f32) {
        if self.removed {
            return;
        }

        self.pos.x -= scroll_increment(speed + self.speed_offset, delta_ms);

        if self.anim_frames > 1 {
            self.anim_timer += delta_ms;
            if self.anim_timer >= self.frame_duration_ms {
                self.anim_frame = (self.anim_frame + 1) % self.anim_frames;
                self.anim_timer = 0.0;
            }
        }

        if !self.is_visible() {
            self.removed = true;
        }
    }

    /// Any part of the run is still right of the left edge
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.pos.x + self.width > 0.0
    }

    /// Right edge plus the required clearance
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.pos.x + self.width + self.gap
    }

    /// Full sprite rectangle in world space
    pub fn sprite_box(&self) -> CollisionBox {
        CollisionBox::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}
