//! Score display and the achievement flash
//!
//! Raw distance is in play-field pixels. The display value is
//! `round(ceil(raw) * coefficient)`, zero-padded to the current digit width.
//! Crossing a multiple of the achievement distance starts a flash: the digits
//! freeze on the milestone value and blink off/on for a fixed number of
//! cycles before normal counting resumes.

use crate::settings::DistanceTuning;

#[derive(Debug, Clone)]
pub struct DistanceMeter {
    tuning: DistanceTuning,
    /// Current digit width; grows by one at most once
    max_units: usize,
    max_score: u64,
    /// Zero-padded display digits
    pub digits: String,
    /// High score digits, if a run has ended with a score
    pub high_score: Option<String>,
    /// Flash in progress
    pub achievement: bool,
    flash_timer: f32,
    flash_iterations: u32,
    /// Highest milestone already celebrated (display distance / achievement distance)
    last_milestone: u64,
    /// False while the digits are blinked off
    paint: bool,
}

fn max_for_units(units: usize) -> u64 {
    10u64.saturating_pow(units as u32).saturating_sub(1)
}

impl DistanceMeter {
    pub fn new(tuning: &DistanceTuning) -> Self {
        let max_units = tuning.max_distance_units;
        Self {
            tuning: tuning.clone(),
            max_units,
            max_score: max_for_units(max_units),
            digits: "0".repeat(max_units),
            high_score: None,
            achievement: false,
            flash_timer: 0.0,
            flash_iterations: 0,
            last_milestone: 0,
            paint: true,
        }
    }

    /// Pixel distance to display units
    pub fn display_distance(&self, distance_ran: f64) -> u64 {
        if distance_ran > 0.0 {
            (distance_ran.ceil() * self.tuning.coefficient).round() as u64
        } else {
            0
        }
    }

    /// Current digit width
    #[inline]
    pub fn units(&self) -> usize {
        self.max_units
    }

    /// Whether the score should be drawn this frame
    #[inline]
    pub fn is_painted(&self) -> bool {
        self.paint
    }

    fn format(&self, distance: u64) -> String {
        let padded = format!("{distance:0width$}", width = self.max_units);
        padded[padded.len() - self.max_units..].to_string()
    }

    /// Advance the meter. Returns true on the frame an achievement starts.
    pub fn update(&mut self, delta_ms: f32, distance_ran: f64) -> bool {
        self.paint = true;

        if self.achievement {
            if self.flash_iterations < self.tuning.flash_iterations {
                self.flash_timer += delta_ms;
                if self.flash_timer < self.tuning.flash_duration_ms {
                    self.paint = false;
                } else if self.flash_timer > self.tuning.flash_duration_ms * 2.0 {
                    self.flash_timer = 0.0;
                    self.flash_iterations += 1;
                }
            } else {
                self.achievement = false;
                self.flash_iterations = 0;
                self.flash_timer = 0.0;
            }
            return false;
        }

        let distance = self.display_distance(distance_ran);

        if distance > self.max_score && self.max_units == self.tuning.max_distance_units {
            self.max_units += 1;
            self.max_score = max_for_units(self.max_units);
            log::debug!("Score display widened to {} digits", self.max_units);
        }

        self.digits = self.format(distance);

        let milestone = distance / self.tuning.achievement_distance;
        if distance > 0 && milestone > self.last_milestone {
            self.last_milestone = milestone;
            self.achievement = true;
            self.flash_timer = 0.0;
            self.flash_iterations = 0;
            log::debug!("Achievement at {distance}");
            return true;
        }

        false
    }

    /// Record a new high score from a raw pixel distance
    pub fn set_high_score(&mut self, distance_ran: f64) {
        let distance = self.display_distance(distance_ran);
        self.high_score = Some(self.format(distance));
    }

    /// Back to zero. Digit width and high score are kept.
    pub fn reset(&mut self) {
        self.achievement = false;
        self.flash_timer = 0.0;
        self.flash_iterations = 0;
        self.last_milestone = 0;
        self.paint = true;
        self.digits = "0".repeat(self.max_units);
    }
}
