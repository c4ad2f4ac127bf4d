//! Procedural obstacle spawning
//!
//! The spawner owns the live obstacle queue (oldest, left-most first) and a
//! short history of spawned types. Type selection is rejection sampling with
//! a bounded number of draws; if every draw is rejected the eligible set is
//! computed explicitly, and if that is empty too the least recently used
//! speed-eligible type is taken. Selection therefore always terminates.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::obstacle::{Obstacle, ObstacleKind, gap_bounds};
use crate::error::ConfigError;
use crate::settings::{ObstacleTypeConfig, Settings};

/// Random draws attempted before falling back to an explicit eligible set
pub const MAX_SELECTION_ATTEMPTS: usize = 10;

/// The most recent spawned types, newest first
#[derive(Debug, Clone)]
pub struct SpawnHistory {
    entries: VecDeque<ObstacleKind>,
    capacity: usize,
}

impl SpawnHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, kind: ObstacleKind) {
        self.entries.push_front(kind);
        self.entries.truncate(self.capacity);
    }

    /// True when the last `capacity` spawns were all `kind`
    pub fn is_saturated(&self, kind: ObstacleKind) -> bool {
        self.entries.len() >= self.capacity && self.entries.iter().all(|k| *k == kind)
    }

    /// How many spawns ago `kind` last appeared (0 = most recent)
    pub fn last_seen(&self, kind: ObstacleKind) -> Option<usize> {
        self.entries.iter().position(|k| *k == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObstacleKind> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Creates, scrolls and evicts obstacles
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    catalog: Vec<ObstacleTypeConfig>,
    /// Index of a type with no minimum speed
    baseline: usize,
    obstacles: VecDeque<Obstacle>,
    history: SpawnHistory,
    gap_coefficient: f32,
    max_gap_coefficient: f32,
    max_obstacle_length: u32,
    field_width: f32,
    next_id: u32,
}

impl ObstacleSpawner {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        if settings.obstacles.is_empty() {
            return Err(ConfigError::NoObstacleTypes);
        }
        let baseline = settings
            .obstacles
            .iter()
            .position(|t| t.min_spawn_speed <= 0.0)
            .ok_or(ConfigError::NoBaselineObstacle)?;

        Ok(Self {
            catalog: settings.obstacles.clone(),
            baseline,
            obstacles: VecDeque::new(),
            history: SpawnHistory::new(settings.runner.max_obstacle_duplication),
            gap_coefficient: settings.runner.gap_coefficient,
            max_gap_coefficient: settings.runner.max_gap_coefficient,
            max_obstacle_length: settings.runner.max_obstacle_length,
            field_width: settings.runner.width,
            next_id: 1,
        })
    }

    /// Live obstacles, oldest first
    pub fn obstacles(&self) -> &VecDeque<Obstacle> {
        &self.obstacles
    }

    /// The obstacle closest to the character
    pub fn nearest(&self) -> Option<&Obstacle> {
        self.obstacles.front()
    }

    /// The left-most obstacle whose right edge is still past `x`
    pub fn nearest_ahead(&self, x: f32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.pos.x + o.width > x)
    }

    pub fn history(&self) -> &SpawnHistory {
        &self.history
    }

    pub fn catalog(&self) -> &[ObstacleTypeConfig] {
        &self.catalog
    }

    fn speed_eligible(&self, index: usize, speed: f32) -> bool {
        speed >= self.catalog[index].min_spawn_speed
    }

    fn eligible(&self, index: usize, speed: f32) -> bool {
        self.speed_eligible(index, speed) && !self.history.is_saturated(self.catalog[index].kind)
    }

    /// Pick the catalog index of the next obstacle type
    pub fn select_next_type<R: Rng + ?Sized>(&self, speed: f32, rng: &mut R) -> usize {
        let n = self.catalog.len();

        for _ in 0..MAX_SELECTION_ATTEMPTS {
            let index = rng.random_range(0..n);
            if self.eligible(index, speed) {
                return index;
            }
        }

        let eligible: Vec<usize> = (0..n).filter(|&i| self.eligible(i, speed)).collect();
        if !eligible.is_empty() {
            return eligible[rng.random_range(0..eligible.len())];
        }

        // Every type that may appear at this speed has hit the repetition
        // limit: take whichever was seen longest ago.
        let fallback = (0..n)
            .filter(|&i| self.speed_eligible(i, speed))
            .max_by_key(|&i| {
                self.history
                    .last_seen(self.catalog[i].kind)
                    .unwrap_or(usize::MAX)
            })
            .unwrap_or(self.baseline);
        log::warn!(
            "No obstacle type passes the repetition check at speed {speed:.2}, falling back to {}",
            self.catalog[fallback].kind
        );
        fallback
    }

    /// Build an obstacle of catalog type `index` at the right edge
    pub fn instantiate<R: Rng + ?Sized>(&mut self, index: usize, speed: f32, rng: &mut R) -> Obstacle {
        let config = &self.catalog[index];

        let max_len = config.max_run_length.min(self.max_obstacle_length).max(1);
        let mut run_length = rng.random_range(1..=max_len);
        if run_length > 1 && speed < config.multi_obstacle_min_speed {
            run_length = 1;
        }

        let y = config.y_positions[rng.random_range(0..config.y_positions.len())];

        let (min_gap, max_gap) = gap_bounds(
            config,
            run_length,
            speed,
            self.gap_coefficient,
            self.max_gap_coefficient,
        );
        let gap = rng.random_range(min_gap as i64..=max_gap as i64) as f32;

        let speed_offset = if config.speed_offset != 0.0 {
            if rng.random_bool(0.5) {
                config.speed_offset
            } else {
                -config.speed_offset
            }
        } else {
            0.0
        };

        let id = self.next_id;
        self.next_id += 1;

        Obstacle::new(
            id,
            config,
            run_length,
            Vec2::new(self.field_width + config.width, y),
            gap,
            speed_offset,
        )
    }

    fn push(&mut self, obstacle: Obstacle) -> &Obstacle {
        log::debug!(
            "Spawned {} #{} x{} gap={} y={}",
            obstacle.kind,
            obstacle.id,
            obstacle.run_length,
            obstacle.gap,
            obstacle.pos.y
        );
        self.history.push(obstacle.kind);
        self.obstacles.push_back(obstacle);
        &self.obstacles[self.obstacles.len() - 1]
    }

    /// Spawn a randomly selected obstacle
    pub fn spawn<R: Rng + ?Sized>(&mut self, speed: f32, rng: &mut R) -> &Obstacle {
        let index = self.select_next_type(speed, rng);
        let obstacle = self.instantiate(index, speed, rng);
        self.push(obstacle)
    }

    /// Spawn a specific obstacle type, bypassing selection
    pub fn spawn_kind<R: Rng + ?Sized>(
        &mut self,
        kind: ObstacleKind,
        speed: f32,
        rng: &mut R,
    ) -> Result<&Obstacle, ConfigError> {
        let index = self
            .catalog
            .iter()
            .position(|t| t.kind == kind)
            .ok_or(ConfigError::MissingObstacleType(kind))?;
        let obstacle = self.instantiate(index, speed, rng);
        Ok(self.push(obstacle))
    }

    /// Scroll, evict, and spawn a follow-up when the last obstacle has
    /// cleared its gap
    pub fn tick<R: Rng + ?Sized>(&mut self, delta_ms: f32, speed: f32, rng: &mut R) {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.update(delta_ms, speed);
        }

        while self.obstacles.front().is_some_and(|o| o.removed) {
            if let Some(gone) = self.obstacles.pop_front() {
                log::trace!("Evicted {} #{}", gone.kind, gone.id);
            }
        }

        let field_width = self.field_width;
        let needs_spawn = match self.obstacles.back_mut() {
            None => true,
            Some(last) => {
                if !last.following_obstacle_created
                    && last.is_visible()
                    && last.trailing_edge() < field_width
                {
                    last.following_obstacle_created = true;
                    true
                } else {
                    false
                }
            }
        };

        if needs_spawn {
            self.spawn(speed, rng);
        }
    }

    /// Drop every obstacle and forget the spawn history
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.history.clear();
    }
}
