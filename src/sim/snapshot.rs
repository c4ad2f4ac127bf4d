//! Read-only render projection
//!
//! Everything a renderer needs for one frame, copied out of the session so
//! drawing code never holds a reference into simulation state.

use serde::{Deserialize, Serialize};

use super::horizon::{Cloud, TerrainSegment};
use super::obstacle::ObstacleKind;
use super::state::{GamePhase, GameState};
use super::trex::TrexStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrexView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub status: TrexStatus,
    pub anim_frame: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub run_length: u32,
    pub anim_frame: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreView {
    /// Zero-padded current score
    pub digits: String,
    pub high_score: Option<String>,
    /// False during the off half of an achievement flash
    pub painted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub tick: u64,
    pub speed: f32,
    pub trex: TrexView,
    /// Left to right
    pub obstacles: Vec<ObstacleView>,
    pub terrain: [TerrainSegment; 2],
    pub terrain_y: f32,
    pub clouds: Vec<Cloud>,
    pub score: ScoreView,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let sprite = state.trex.sprite_box();
        let trex = TrexView {
            x: sprite.x,
            y: sprite.y,
            width: sprite.width,
            height: sprite.height,
            status: state.trex.status,
            anim_frame: state.trex.anim_frame,
        };

        let obstacles = state
            .spawner
            .obstacles()
            .iter()
            .filter(|o| !o.removed)
            .map(|o| ObstacleView {
                id: o.id,
                kind: o.kind,
                x: o.pos.x,
                y: o.pos.y,
                width: o.width,
                height: o.height,
                run_length: o.run_length,
                anim_frame: o.anim_frame,
            })
            .collect();

        let meter = &state.distance_meter;
        Self {
            phase: state.phase,
            tick: state.time_ticks,
            speed: state.current_speed,
            trex,
            obstacles,
            terrain: state.horizon.line.segments,
            terrain_y: state.horizon.line.y_pos,
            clouds: state.horizon.clouds.clouds().to_vec(),
            score: ScoreView {
                digits: meter.digits.clone(),
                high_score: meter.high_score.clone(),
                painted: meter.is_painted(),
            },
        }
    }
}

impl GameState {
    /// Capture the current frame for drawing
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }
}
