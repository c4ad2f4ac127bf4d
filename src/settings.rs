//! Tuning tables
//!
//! Immutable configuration handed to a session at construction. Defaults
//! reproduce the classic runner's constants; any field can be overridden from
//! a (partial) JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::ConfigError;
use crate::sim::{CollisionBox, ObstacleKind};

/// Speed ramp, spacing and frame-clamping parameters for the whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    /// Starting scroll speed (pixels per reference frame)
    pub speed: f32,
    /// Speed cap
    pub max_speed: f32,
    /// Speed added per frame while running
    pub acceleration: f32,
    /// Scales every obstacle's configured minimum gap
    pub gap_coefficient: f32,
    /// Upper bound of a gap relative to its minimum
    pub max_gap_coefficient: f32,
    /// Largest run length any obstacle may spawn with
    pub max_obstacle_length: u32,
    /// Consecutive spawns of one type before it is blocked
    pub max_obstacle_duplication: usize,
    /// Obstacle-free lead-in after the game starts
    pub clear_time_ms: f32,
    /// Time after a crash before a jump may restart the run
    pub gameover_clear_time_ms: f32,
    /// Play-field size
    pub width: f32,
    pub height: f32,
    /// Space between the character's feet and the bottom of the play field
    pub bottom_pad: f32,
    /// Largest delta fed to the simulation in one tick
    pub max_frame_delta_ms: f32,
    /// Largest physics sub-step, in reference frames
    pub max_physics_step_frames: f32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            speed: 6.0,
            max_speed: 13.0,
            acceleration: 0.001,
            gap_coefficient: 0.6,
            max_gap_coefficient: 1.5,
            max_obstacle_length: 3,
            max_obstacle_duplication: 2,
            clear_time_ms: 3000.0,
            gameover_clear_time_ms: 750.0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bottom_pad: 10.0,
            max_frame_delta_ms: 100.0,
            max_physics_step_frames: 2.0,
        }
    }
}

/// Character dimensions and jump physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrexTuning {
    pub width: f32,
    pub width_duck: f32,
    pub height: f32,
    /// Velocity added per frame while airborne (positive is downward)
    pub gravity: f32,
    /// Take-off velocity at speed 0 (negative is upward)
    pub initial_jump_velocity: f32,
    /// Extra upward velocity per unit of current speed
    pub jump_velocity_per_speed: f32,
    /// Velocity the ascent is cut to once the minimum height is reached
    pub drop_velocity: f32,
    /// Height above ground that must be cleared before a jump may be cut
    pub min_jump_height: f32,
    /// Absolute y above which the ascent is cut
    pub max_jump_height: f32,
    /// Multiplier on vertical movement during a speed drop
    pub speed_drop_coefficient: f32,
    /// Velocity set when a speed drop begins
    pub speed_drop_velocity: f32,
    pub start_x_pos: f32,
}

impl Default for TrexTuning {
    fn default() -> Self {
        Self {
            width: 44.0,
            width_duck: 59.0,
            height: 47.0,
            gravity: 0.6,
            initial_jump_velocity: -10.0,
            jump_velocity_per_speed: 0.1,
            drop_velocity: -5.0,
            min_jump_height: 30.0,
            max_jump_height: 30.0,
            speed_drop_coefficient: 3.0,
            speed_drop_velocity: 1.0,
            start_x_pos: 50.0,
        }
    }
}

/// Score display parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceTuning {
    /// Initial digit width
    pub max_distance_units: usize,
    /// Milestone that triggers the achievement flash
    pub achievement_distance: u64,
    /// Pixels to display units
    pub coefficient: f64,
    /// Length of one flash quarter-period
    pub flash_duration_ms: f32,
    /// Off/on cycles per achievement
    pub flash_iterations: u32,
}

impl Default for DistanceTuning {
    fn default() -> Self {
        Self {
            max_distance_units: 5,
            achievement_distance: 100,
            coefficient: 0.025,
            flash_duration_ms: 1000.0 / 4.0,
            flash_iterations: 3,
        }
    }
}

/// Ground tiles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonTuning {
    pub width: f32,
    pub height: f32,
    pub y_pos: f32,
    /// Probability threshold above which a wrapped tile becomes bumpy
    pub bump_threshold: f32,
}

impl Default for HorizonTuning {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 12.0,
            y_pos: 127.0,
            bump_threshold: 0.5,
        }
    }
}

/// Background clouds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTuning {
    pub width: f32,
    pub height: f32,
    /// Fraction of the scroll speed clouds move at
    pub speed: f32,
    /// Chance per frame of adding a cloud once the gap allows it
    pub frequency: f32,
    pub max_clouds: usize,
    pub min_gap: u32,
    pub max_gap: u32,
    /// Highest point a cloud may sit at (smallest y)
    pub max_sky_level: u32,
    /// Lowest point a cloud may sit at (largest y)
    pub min_sky_level: u32,
}

impl Default for CloudTuning {
    fn default() -> Self {
        Self {
            width: 46.0,
            height: 14.0,
            speed: 0.2,
            frequency: 0.5,
            max_clouds: 6,
            min_gap: 100,
            max_gap: 400,
            max_sky_level: 30,
            min_sky_level: 71,
        }
    }
}

/// Static description of one obstacle type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleTypeConfig {
    pub kind: ObstacleKind,
    /// Width of a single unit
    pub width: f32,
    pub height: f32,
    /// Candidate y positions; one is drawn per spawn
    pub y_positions: Vec<f32>,
    /// Speed required before a run of more than one unit is allowed
    pub multi_obstacle_min_speed: f32,
    /// Base spacing before the gap coefficient is applied
    pub min_gap: f32,
    /// Speed required before the type may spawn at all
    pub min_spawn_speed: f32,
    /// Longest run this type may spawn with
    #[serde(default = "default_max_run_length")]
    pub max_run_length: u32,
    /// Number of animation frames (0 or 1 means static)
    #[serde(default)]
    pub animation_frames: u32,
    #[serde(default)]
    pub frame_duration_ms: f32,
    /// Magnitude of the random per-obstacle speed adjustment
    #[serde(default)]
    pub speed_offset: f32,
    /// Sub-boxes of a single unit, body-local
    pub collision_boxes: Vec<CollisionBox>,
}

fn default_max_run_length() -> u32 {
    3
}

impl ObstacleTypeConfig {
    /// True when the obstacle cycles through animation frames
    pub fn is_animated(&self) -> bool {
        self.animation_frames > 1
    }

    /// Footprint of a run of `run_length` units
    pub fn run_width(&self, run_length: u32) -> f32 {
        self.width * run_length as f32
    }
}

/// The stock obstacle catalog
pub fn default_obstacle_types() -> Vec<ObstacleTypeConfig> {
    vec![
        ObstacleTypeConfig {
            kind: ObstacleKind::CactusSmall,
            width: 17.0,
            height: 35.0,
            y_positions: vec![105.0],
            multi_obstacle_min_speed: 4.0,
            min_gap: 120.0,
            min_spawn_speed: 0.0,
            max_run_length: 3,
            animation_frames: 0,
            frame_duration_ms: 0.0,
            speed_offset: 0.0,
            collision_boxes: vec![
                CollisionBox::new(0.0, 7.0, 5.0, 27.0),
                CollisionBox::new(4.0, 0.0, 6.0, 34.0),
                CollisionBox::new(10.0, 4.0, 7.0, 14.0),
            ],
        },
        ObstacleTypeConfig {
            kind: ObstacleKind::CactusLarge,
            width: 25.0,
            height: 50.0,
            y_positions: vec![90.0],
            multi_obstacle_min_speed: 7.0,
            min_gap: 120.0,
            min_spawn_speed: 0.0,
            max_run_length: 3,
            animation_frames: 0,
            frame_duration_ms: 0.0,
            speed_offset: 0.0,
            collision_boxes: vec![
                CollisionBox::new(0.0, 12.0, 7.0, 38.0),
                CollisionBox::new(8.0, 0.0, 7.0, 49.0),
                CollisionBox::new(13.0, 10.0, 10.0, 38.0),
            ],
        },
        ObstacleTypeConfig {
            kind: ObstacleKind::Pterodactyl,
            width: 46.0,
            height: 40.0,
            y_positions: vec![100.0, 75.0, 50.0],
            multi_obstacle_min_speed: 999.0,
            min_gap: 150.0,
            min_spawn_speed: 8.5,
            max_run_length: 1,
            animation_frames: 2,
            frame_duration_ms: 1000.0 / 6.0,
            speed_offset: 0.8,
            collision_boxes: vec![
                CollisionBox::new(15.0, 15.0, 16.0, 5.0),
                CollisionBox::new(18.0, 21.0, 24.0, 6.0),
                CollisionBox::new(2.0, 14.0, 4.0, 3.0),
                CollisionBox::new(6.0, 10.0, 4.0, 7.0),
                CollisionBox::new(10.0, 8.0, 6.0, 9.0),
            ],
        },
    ]
}

fn default_obstacles() -> Vec<ObstacleTypeConfig> {
    default_obstacle_types()
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub runner: RunnerTuning,
    #[serde(default)]
    pub trex: TrexTuning,
    #[serde(default)]
    pub distance: DistanceTuning,
    #[serde(default)]
    pub horizon: HorizonTuning,
    #[serde(default)]
    pub clouds: CloudTuning,
    #[serde(default = "default_obstacles")]
    pub obstacles: Vec<ObstacleTypeConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runner: RunnerTuning::default(),
            trex: TrexTuning::default(),
            distance: DistanceTuning::default(),
            horizon: HorizonTuning::default(),
            clouds: CloudTuning::default(),
            obstacles: default_obstacle_types(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Resting y of the character's top edge
    pub fn ground_y(&self) -> f32 {
        self.runner.height - self.trex.height - self.runner.bottom_pad
    }

    /// Look up the configuration for an obstacle type
    pub fn obstacle_config(&self, kind: ObstacleKind) -> Result<&ObstacleTypeConfig, ConfigError> {
        self.obstacles
            .iter()
            .find(|t| t.kind == kind)
            .ok_or(ConfigError::MissingObstacleType(kind))
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.runner;
        if !(r.speed > 0.0) {
            return Err(ConfigError::invalid("runner.speed", "must be positive"));
        }
        if r.max_speed < r.speed {
            return Err(ConfigError::invalid("runner.max_speed", "must be >= runner.speed"));
        }
        if r.acceleration < 0.0 {
            return Err(ConfigError::invalid("runner.acceleration", "must not be negative"));
        }
        if r.gap_coefficient < 0.0 {
            return Err(ConfigError::invalid("runner.gap_coefficient", "must not be negative"));
        }
        if r.max_gap_coefficient < 1.0 {
            return Err(ConfigError::invalid("runner.max_gap_coefficient", "must be >= 1"));
        }
        if r.max_obstacle_length == 0 {
            return Err(ConfigError::invalid("runner.max_obstacle_length", "must be >= 1"));
        }
        if r.max_obstacle_duplication == 0 {
            return Err(ConfigError::invalid("runner.max_obstacle_duplication", "must be >= 1"));
        }
        if !(r.width > 0.0) || !(r.height > 0.0) {
            return Err(ConfigError::invalid("runner.width", "play field must be non-empty"));
        }
        if !(r.max_frame_delta_ms > 0.0) {
            return Err(ConfigError::invalid("runner.max_frame_delta_ms", "must be positive"));
        }
        if !(r.max_physics_step_frames >= 1.0) {
            return Err(ConfigError::invalid("runner.max_physics_step_frames", "must be >= 1"));
        }

        let t = &self.trex;
        if !(t.gravity > 0.0) {
            return Err(ConfigError::invalid("trex.gravity", "must be positive"));
        }
        if !(t.initial_jump_velocity < 0.0) {
            return Err(ConfigError::invalid("trex.initial_jump_velocity", "must be upward (negative)"));
        }
        if t.speed_drop_coefficient < 1.0 {
            return Err(ConfigError::invalid("trex.speed_drop_coefficient", "must be >= 1"));
        }
        if self.ground_y() < 0.0 {
            return Err(ConfigError::invalid("trex.height", "character does not fit the play field"));
        }

        let d = &self.distance;
        if d.max_distance_units == 0 || d.max_distance_units > 18 {
            return Err(ConfigError::invalid("distance.max_distance_units", "must be in 1..=18"));
        }
        if d.achievement_distance == 0 {
            return Err(ConfigError::invalid("distance.achievement_distance", "must be positive"));
        }
        if !(d.coefficient > 0.0) {
            return Err(ConfigError::invalid("distance.coefficient", "must be positive"));
        }
        if !(d.flash_duration_ms > 0.0) {
            return Err(ConfigError::invalid("distance.flash_duration_ms", "must be positive"));
        }

        if !(self.horizon.width > 0.0) {
            return Err(ConfigError::invalid("horizon.width", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.horizon.bump_threshold) {
            return Err(ConfigError::invalid("horizon.bump_threshold", "must be in 0..=1"));
        }

        let c = &self.clouds;
        if c.min_gap > c.max_gap {
            return Err(ConfigError::invalid("clouds.min_gap", "must be <= clouds.max_gap"));
        }
        if c.max_sky_level > c.min_sky_level {
            return Err(ConfigError::invalid("clouds.max_sky_level", "must be <= clouds.min_sky_level"));
        }

        self.validate_obstacles()
    }

    fn validate_obstacles(&self) -> Result<(), ConfigError> {
        if self.obstacles.is_empty() {
            return Err(ConfigError::NoObstacleTypes);
        }
        if !self.obstacles.iter().any(|t| t.min_spawn_speed <= 0.0) {
            return Err(ConfigError::NoBaselineObstacle);
        }
        for (i, t) in self.obstacles.iter().enumerate() {
            if self.obstacles[..i].iter().any(|other| other.kind == t.kind) {
                return Err(ConfigError::DuplicateObstacleType(t.kind));
            }
            if !(t.width > 0.0) || !(t.height > 0.0) {
                return Err(ConfigError::invalid("obstacles.width", "must be positive"));
            }
            if t.y_positions.is_empty() {
                return Err(ConfigError::invalid("obstacles.y_positions", "needs at least one entry"));
            }
            if t.collision_boxes.is_empty() {
                return Err(ConfigError::invalid("obstacles.collision_boxes", "needs at least one box"));
            }
            if !(t.min_gap >= 0.0) {
                return Err(ConfigError::invalid("obstacles.min_gap", "must not be negative"));
            }
            if !(t.speed_offset >= 0.0) {
                return Err(ConfigError::invalid("obstacles.speed_offset", "must not be negative"));
            }
            if t.max_run_length == 0 {
                return Err(ConfigError::invalid("obstacles.max_run_length", "must be >= 1"));
            }
            if t.is_animated() && !(t.frame_duration_ms > 0.0) {
                return Err(ConfigError::invalid(
                    "obstacles.frame_duration_ms",
                    "animated obstacles need a positive frame duration",
                ));
            }
        }
        Ok(())
    }
}
