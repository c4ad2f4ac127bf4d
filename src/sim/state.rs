//! Game state and session lifecycle
//!
//! A `GameState` is one self-contained session: it owns the character,
//! obstacles, terrain, score and RNG. Nothing is global, so any number of
//! sessions can run side by side.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionResult;
use super::distance_meter::DistanceMeter;
use super::horizon::Horizon;
use super::spawner::ObstacleSpawner;
use super::trex::Trex;
use crate::error::ConfigError;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first jump
    Waiting,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    Crashed,
}

/// Discrete notifications for the audio/presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A jump was accepted
    Jump,
    /// The score crossed a milestone
    Achievement { score: u64 },
    /// The run ended
    Crash { score: u64 },
    /// The run that just ended set a new high score
    ScoreBeat { score: u64 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub(crate) rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    /// Phase to return to when unpaused
    pub(crate) resume_phase: GamePhase,
    pub trex: Trex,
    pub spawner: ObstacleSpawner,
    pub horizon: Horizon,
    pub distance_meter: DistanceMeter,
    pub high_scores: HighScores,
    /// Scroll speed in pixels per reference frame
    pub current_speed: f32,
    /// Raw distance in play-field pixels
    pub distance_ran: f64,
    /// Time spent playing this run
    pub running_time_ms: f32,
    /// Time since the crash (crashed phase only)
    pub crash_time_ms: f32,
    /// Runs started this session
    pub play_count: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// The hit that ended the run
    pub last_collision: Option<CollisionResult>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session. Fails if the settings violate an invariant.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let trex = Trex::new(&settings);
        let spawner = ObstacleSpawner::new(&settings)?;
        let horizon = Horizon::new(&settings, &mut rng);
        let distance_meter = DistanceMeter::new(&settings.distance);

        log::info!("New session (seed {seed})");

        Ok(Self {
            seed,
            current_speed: settings.runner.speed,
            settings,
            rng,
            phase: GamePhase::Waiting,
            resume_phase: GamePhase::Waiting,
            trex,
            spawner,
            horizon,
            distance_meter,
            high_scores: HighScores::new(),
            distance_ran: 0.0,
            running_time_ms: 0.0,
            crash_time_ms: 0.0,
            play_count: 0,
            time_ticks: 0,
            last_collision: None,
            events: Vec::new(),
        })
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events raised since the last drain, without consuming them
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Score shown for the current distance
    pub fn score(&self) -> u64 {
        self.distance_meter.display_distance(self.distance_ran)
    }

    /// Best score of the session
    pub fn high_score(&self) -> u64 {
        self.distance_meter.display_distance(self.high_scores.best_distance)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Leave the waiting screen and start the first run
    pub(crate) fn start(&mut self) {
        if self.phase != GamePhase::Waiting {
            return;
        }
        self.phase = GamePhase::Playing;
        self.play_count += 1;
        self.trex.start_running();
        log::info!("Run {} started", self.play_count);
    }

    /// Reset everything except the high score and start a new run
    pub fn restart(&mut self) {
        self.play_count += 1;
        self.running_time_ms = 0.0;
        self.crash_time_ms = 0.0;
        self.distance_ran = 0.0;
        self.current_speed = self.settings.runner.speed;
        self.last_collision = None;

        self.trex.reset();
        self.spawner.reset();
        self.horizon.reset();
        self.distance_meter.reset();

        self.phase = GamePhase::Playing;
        log::info!("Run {} started", self.play_count);
    }

    /// End the run
    pub(crate) fn game_over(&mut self, hit: Option<CollisionResult>) {
        self.trex.crash();
        self.phase = GamePhase::Crashed;
        self.crash_time_ms = 0.0;
        self.last_collision = hit;

        let score = self.score();
        self.emit(GameEvent::Crash { score });
        log::info!(
            "Crashed after {:.1}s with score {score} (speed {:.2})",
            self.running_time_ms / 1000.0,
            self.current_speed
        );

        if self.high_scores.beat_distance(self.distance_ran) {
            self.distance_meter.set_high_score(self.high_scores.best_distance);
            self.emit(GameEvent::ScoreBeat { score });
            log::info!("New high score: {score}");
        }

        let rank = self.high_scores.add_score(HighScoreEntry {
            score,
            run: self.play_count,
            distance_ran: self.distance_ran,
            jumps: self.trex.jump_count,
        });
        if let Some(rank) = rank {
            log::debug!("Run {} placed #{rank} on the leaderboard", self.play_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::trex::TrexStatus;

    fn session(seed: u64) -> GameState {
        GameState::new(Settings::default(), seed).unwrap()
    }

    #[test]
    fn test_new_session_waits() {
        let state = session(1);
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.trex.status, TrexStatus::Waiting);
        assert_eq!(state.current_speed, 6.0);
        assert_eq!(state.score(), 0);
        assert!(state.spawner.obstacles().is_empty());
        assert_eq!(state.horizon.clouds.clouds().len(), 1);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.obstacles.clear();
        assert!(matches!(
            GameState::new(settings, 1),
            Err(ConfigError::NoObstacleTypes)
        ));
    }

    #[test]
    fn test_game_over_records_high_score() {
        let mut state = session(3);
        state.start();
        state.distance_ran = 4000.0;
        state.game_over(None);

        assert_eq!(state.phase, GamePhase::Crashed);
        assert_eq!(state.trex.status, TrexStatus::Crashed);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Crash { score: 100 },
                GameEvent::ScoreBeat { score: 100 }
            ]
        );
        assert!(state.drain_events().is_empty());
        assert_eq!(state.high_score(), 100);
        assert_eq!(state.distance_meter.high_score.as_deref(), Some("00100"));
        assert_eq!(state.high_scores.top_score(), Some(100));
    }

    #[test]
    fn test_lower_score_does_not_beat() {
        let mut state = session(3);
        state.start();
        state.distance_ran = 4000.0;
        state.game_over(None);
        state.drain_events();

        state.restart();
        state.distance_ran = 2000.0;
        state.game_over(None);
        assert_eq!(state.drain_events(), vec![GameEvent::Crash { score: 50 }]);
        assert_eq!(state.high_score(), 100);
        assert_eq!(state.high_scores.entries.len(), 2);
    }

    #[test]
    fn test_restart_resets_run_but_keeps_high_score() {
        let mut state = session(5);
        state.start();
        state.current_speed = 10.0;
        state.distance_ran = 8000.0;
        state.game_over(None);

        state.restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.trex.status, TrexStatus::Running);
        assert_eq!(state.current_speed, 6.0);
        assert_eq!(state.distance_ran, 0.0);
        assert_eq!(state.distance_meter.digits, "00000");
        assert!(state.spawner.obstacles().is_empty());
        assert!(state.spawner.history().is_empty());
        assert_eq!(state.high_score(), 200);
        assert_eq!(state.play_count, 2);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = session(7);
        let b = session(7);
        a.start();
        a.distance_ran = 500.0;
        assert_eq!(b.phase, GamePhase::Waiting);
        assert_eq!(b.distance_ran, 0.0);
    }
}
