//! Dino Runner - simulation core for an endless side-scrolling runner
//!
//! Core modules:
//! - `sim`: Game simulation (character physics, obstacle spawning, collisions,
//!   terrain scrolling, scoring, frame orchestration)
//! - `settings`: Immutable tuning tables injected into a session
//! - `highscores`: In-memory session leaderboard
//! - `error`: Configuration errors
//!
//! Rendering, audio and input-device binding live outside this crate. A host
//! feeds abstract intents plus frame deltas into [`sim::tick`] and draws the
//! [`sim::RenderSnapshot`] it gets back.

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Reference frame rate. Velocities and accelerations in the tuning
    /// tables are expressed per reference frame.
    pub const FPS: f32 = 60.0;
    /// Milliseconds per reference frame
    pub const MS_PER_FRAME: f32 = 1000.0 / FPS;

    /// Play-field dimensions
    pub const DEFAULT_WIDTH: f32 = 600.0;
    pub const DEFAULT_HEIGHT: f32 = 150.0;

    /// Transparent border around every sprite, discounted by the coarse
    /// collision pass
    pub const SPRITE_BORDER: f32 = 1.0;
}

/// Number of whole reference frames covered by `delta_ms`, as a fraction
#[inline]
pub fn frames_elapsed(delta_ms: f32) -> f32 {
    delta_ms / consts::MS_PER_FRAME
}

/// Whole-pixel horizontal scroll for `speed` (pixels per reference frame)
/// over `delta_ms`. Rounds down so slow frames never overshoot.
#[inline]
pub fn scroll_increment(speed: f32, delta_ms: f32) -> f32 {
    // Epsilon absorbs f32 noise when delta_ms is an exact frame multiple
    (speed * (consts::FPS / 1000.0) * delta_ms + 1e-3).floor()
}
