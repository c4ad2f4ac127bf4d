//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one `Pcg32` per session)
//! - Wall-clock deltas in, clamped and sub-stepped before physics
//! - Stable iteration order (obstacles oldest first)
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod collision_box;
pub mod distance_meter;
pub mod horizon;
pub mod obstacle;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod trex;

pub use clock::{GameClock, split_delta};
pub use collision::{CollisionResult, check_for_collision, coarse_overlap, fine_collision};
pub use collision_box::{CollisionBox, boxes_overlap};
pub use distance_meter::DistanceMeter;
pub use horizon::{Cloud, CloudLayer, Horizon, HorizonLine, TerrainCrop, TerrainSegment};
pub use obstacle::{Obstacle, ObstacleKind, gap_bounds};
pub use snapshot::RenderSnapshot;
pub use spawner::{ObstacleSpawner, SpawnHistory};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use trex::{Trex, TrexStatus};
